//! Message dispatch: the per-kind handler contract, the handler registry, and
//! the dispatcher that ties decode, state-gating, and handler invocation
//! together.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use registry::HandlerRegistry;

use crate::collaborators::{AdminPolicy, CredentialValidator, PlayerStore};
use crate::connection::{Broadcaster, ConnectionRegistry, Session};
use async_trait::async_trait;
use outpost_protocol::ClientCommand;
use std::sync::Arc;

/// Shared services a handler may need: the connection registry, the broadcast
/// service, and the external collaborator boundaries.
#[derive(Clone)]
pub struct HandlerContext {
    pub connections: Arc<ConnectionRegistry>,
    pub broadcaster: Broadcaster,
    pub player_store: Arc<dyn PlayerStore>,
    pub credentials: Arc<dyn CredentialValidator>,
    pub admin_policy: Arc<dyn AdminPolicy>,
}

/// Failure modes a handler can surface to the dispatcher.
///
/// Both are reported to the originating session only; neither ever takes the
/// connection down or leaks into another session.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The session lacks the privilege this command requires.
    #[error("{0}")]
    Unauthorized(String),

    /// A server-side fault while handling an otherwise valid command.
    #[error("{0}")]
    Internal(String),
}

/// The unit of behavior bound to one command kind.
///
/// Exactly one handler is registered per kind (enforced at startup). The
/// dispatcher invokes the handler to completion before the next message from
/// the same session is processed, preserving per-session ordering; handlers
/// for different sessions run concurrently.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError>;
}
