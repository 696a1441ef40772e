//! The dispatcher: decode, state-gate, look up, invoke.

use super::{HandlerContext, HandlerError, HandlerRegistry};
use crate::connection::Session;
use outpost_protocol::{decode, ErrorCode, ServerMessage};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Result of dispatching one raw inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion.
    Handled,
    /// The message was rejected before or during handling (decode failure,
    /// wrong session state, missing privilege); the sender was told.
    Rejected,
    /// A server-side fault: missing handler registration or handler error.
    /// Fatal to this message only, never to the connection or the process.
    Faulted,
}

/// Routes each inbound frame to the handler registered for its kind.
///
/// Per inbound message: decode via the envelope codec; on failure report to
/// the offending session and stop — no handler is invoked. On success, check
/// the command against the session's lifecycle state, look up the handler,
/// and run it to completion. The caller drives one dispatch at a time per
/// session, which is what preserves per-session ordering.
pub struct Dispatcher {
    handlers: HandlerRegistry,
    ctx: HandlerContext,
}

impl Dispatcher {
    pub fn new(handlers: HandlerRegistry, ctx: HandlerContext) -> Self {
        Self { handlers, ctx }
    }

    /// Handler context, exposed for wiring and tests.
    pub fn ctx(&self) -> &HandlerContext {
        &self.ctx
    }

    /// Decodes and routes one raw text frame from a session.
    pub async fn dispatch(&self, session: &Arc<Session>, raw: &str) -> DispatchOutcome {
        let command = match decode(raw) {
            Ok(command) => command,
            Err(err) => {
                debug!("📨 Session {} sent an undecodable frame: {err}", session.id());
                self.report(session, ErrorCode::DecodeError, &err.to_string());
                return DispatchOutcome::Rejected;
            }
        };

        let kind = command.kind();

        if !session.accepts(kind) {
            warn!(
                "📨 Session {} sent `{kind}` in state {:?}",
                session.id(),
                session.state()
            );
            self.report(
                session,
                ErrorCode::ProtocolState,
                &format!("`{kind}` is not allowed in the current session state"),
            );
            return DispatchOutcome::Rejected;
        }

        let Some(handler) = self.handlers.lookup(kind) else {
            // A valid kind with no handler is a deployment fault, not a
            // client error. Report it distinctly and keep the process alive.
            error!("🔧 No handler registered for valid kind `{kind}`");
            self.report(
                session,
                ErrorCode::Internal,
                "the server cannot currently process this message kind",
            );
            return DispatchOutcome::Faulted;
        };

        match handler.handle(&self.ctx, session, command).await {
            Ok(()) => {
                debug!("📨 Session {} handled `{kind}`", session.id());
                DispatchOutcome::Handled
            }
            Err(HandlerError::Unauthorized(reason)) => {
                warn!("📨 Session {} unauthorized for `{kind}`: {reason}", session.id());
                self.report(session, ErrorCode::Unauthorized, &reason);
                DispatchOutcome::Rejected
            }
            Err(HandlerError::Internal(reason)) => {
                error!("📨 Handler for `{kind}` faulted: {reason}");
                self.report(
                    session,
                    ErrorCode::Internal,
                    "an internal error occurred while handling this message",
                );
                DispatchOutcome::Faulted
            }
        }
    }

    /// Best-effort error report to the offending session only.
    fn report(&self, session: &Arc<Session>, code: ErrorCode, message: &str) {
        let frame = ServerMessage::Error {
            code,
            message: message.to_string(),
        };
        if let Err(err) = session.send(&frame) {
            debug!("📨 Could not report error to session {}: {err}", session.id());
        }
    }
}
