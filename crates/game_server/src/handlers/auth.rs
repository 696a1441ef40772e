//! Authentication handler.

use crate::dispatch::{CommandHandler, HandlerContext, HandlerError};
use crate::connection::{Session, SessionState};
use async_trait::async_trait;
use outpost_protocol::{ClientCommand, ServerMessage};
use std::sync::Arc;
use tracing::{debug, info};

/// Validates credentials and promotes the session to `Authenticated`.
///
/// A rejected credential pair leaves the session in `Connected` so the client
/// can retry; the failure is reported as a normal `auth_result` message, not
/// as a protocol error.
pub struct AuthHandler;

#[async_trait]
impl CommandHandler for AuthHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        let ClientCommand::Auth { credentials } = command else {
            return Err(HandlerError::Internal(
                "auth handler invoked with a non-auth command".to_string(),
            ));
        };

        let Some(user) = ctx.credentials.validate(&credentials).await else {
            debug!(
                "🔑 Session {} failed authentication as `{}`",
                session.id(),
                credentials.username
            );
            let reply = ServerMessage::AuthResult {
                success: false,
                username: None,
            };
            session
                .send(&reply)
                .map_err(|err| HandlerError::Internal(err.to_string()))?;
            return Ok(());
        };

        session
            .advance(SessionState::Authenticated)
            .map_err(|state| {
                HandlerError::Internal(format!(
                    "cannot authenticate a session already in state {state:?}"
                ))
            })?;
        session
            .set_identity(user.username.clone(), user.admin)
            .map_err(|_| {
                HandlerError::Internal("session identity was already established".to_string())
            })?;

        info!(
            "🔑 Session {} authenticated as `{}`{}",
            session.id(),
            user.username,
            if user.admin { " (admin)" } else { "" }
        );

        let reply = ServerMessage::AuthResult {
            success: true,
            username: Some(user.username),
        };
        session
            .send(&reply)
            .map_err(|err| HandlerError::Internal(err.to_string()))?;
        Ok(())
    }
}
