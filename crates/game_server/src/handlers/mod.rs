//! Built-in command handlers and the default registry wiring.
//!
//! Each handler owns one slice of behavior; the mapping from command kind to
//! handler is assembled once by [`default_registry`], which fails fast at
//! startup if a kind is double-registered or left uncovered.

pub mod admin;
pub mod auth;
pub mod character;
pub mod chat;
pub mod movement;
pub mod system;

pub use admin::AdminHandler;
pub use auth::AuthHandler;
pub use character::CharacterHandler;
pub use chat::ChatHandler;
pub use movement::MoveHandler;
pub use system::{DisconnectHandler, HeartbeatHandler, PingHandler};

use crate::dispatch::HandlerRegistry;
use crate::error::ServerError;
use outpost_protocol::CommandKind;
use std::sync::Arc;

/// Builds the registry covering every command kind the protocol defines.
///
/// # Returns
///
/// The fully populated registry, or `ServerError::Configuration` if a kind
/// ended up double-registered or unregistered. Either is a wiring bug caught
/// before the server accepts its first connection.
pub fn default_registry() -> Result<HandlerRegistry, ServerError> {
    let mut registry = HandlerRegistry::new();

    registry.register(CommandKind::Auth, Arc::new(AuthHandler))?;
    registry.register(CommandKind::Move, Arc::new(MoveHandler))?;
    registry.register(CommandKind::Chat, Arc::new(ChatHandler))?;
    registry.register(CommandKind::Ping, Arc::new(PingHandler))?;

    // Quit and logout share one handler: both mean "this session is done".
    let disconnect = Arc::new(DisconnectHandler);
    registry.register(CommandKind::Quit, disconnect.clone())?;
    registry.register(CommandKind::Logout, disconnect)?;

    registry.register(
        CommandKind::CompleteCharacterCreation,
        Arc::new(CharacterHandler),
    )?;
    registry.register(
        CommandKind::SaveCharacterLookAttributes,
        Arc::new(CharacterHandler),
    )?;

    let heartbeat = Arc::new(HeartbeatHandler);
    registry.register(CommandKind::EnableHeartbeat, heartbeat.clone())?;
    registry.register(CommandKind::DisableHeartbeat, heartbeat)?;

    registry.register(CommandKind::AdminCommand, Arc::new(AdminHandler))?;

    let missing = registry.missing_kinds();
    if !missing.is_empty() {
        return Err(ServerError::Configuration(format!(
            "no handler registered for kinds: {missing:?}"
        )));
    }

    Ok(registry)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for handler tests.

    use crate::collaborators::{
        BasicCredentialValidator, InMemoryPlayerStore, SessionFlagAdminPolicy,
    };
    use crate::connection::{Broadcaster, ConnectionRegistry, Session};
    use crate::dispatch::HandlerContext;
    use outpost_protocol::SessionId;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    pub fn test_context() -> HandlerContext {
        let connections = Arc::new(ConnectionRegistry::new());
        HandlerContext {
            broadcaster: Broadcaster::new(connections.clone()),
            connections,
            player_store: Arc::new(InMemoryPlayerStore::new()),
            credentials: Arc::new(BasicCredentialValidator::new(["root".to_string()])),
            admin_policy: Arc::new(SessionFlagAdminPolicy),
        }
    }

    pub fn test_session(buffer: usize) -> (Arc<Session>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        let session = Arc::new(Session::new(
            SessionId::new(),
            "127.0.0.1:9000".parse().unwrap(),
            tx,
        ));
        (session, rx)
    }

    /// Drains and decodes every frame currently queued for a session.
    pub fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_every_kind() {
        let registry = default_registry().unwrap();
        assert!(registry.missing_kinds().is_empty());
        for kind in CommandKind::ALL {
            assert!(registry.lookup(kind).is_some(), "no handler for {kind}");
        }
    }
}
