//! Plumbing handlers: ping, disconnect, heartbeat toggles.

use crate::connection::Session;
use crate::dispatch::{CommandHandler, HandlerContext, HandlerError};
use async_trait::async_trait;
use outpost_protocol::{utc_timestamp, ClientCommand, ServerMessage};
use std::sync::Arc;
use tracing::{debug, info};

/// Replies `pong` to the sender with the server's UTC time.
pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn handle(
        &self,
        _ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        if !matches!(command, ClientCommand::Ping) {
            return Err(HandlerError::Internal(
                "ping handler invoked with a non-ping command".to_string(),
            ));
        }
        let reply = ServerMessage::Pong {
            timestamp: utc_timestamp(),
        };
        // Best effort: a full buffer means the client is not keeping up, and
        // a dropped pong is not worth failing the dispatch over.
        if let Err(err) = session.send(&reply) {
            debug!("🏓 Dropped pong for session {}: {err}", session.id());
        }
        Ok(())
    }
}

/// Handles `quit` and `logout`: both end the session.
///
/// Removal is delegated to the registry, whose removal path is idempotent, so
/// a quit racing a transport close resolves to a single disconnect.
pub struct DisconnectHandler;

#[async_trait]
impl CommandHandler for DisconnectHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        if !matches!(command, ClientCommand::Quit | ClientCommand::Logout) {
            return Err(HandlerError::Internal(
                "disconnect handler invoked with an unrelated command".to_string(),
            ));
        }
        info!(
            "👋 Session {} requested disconnect ({})",
            session.id(),
            command.kind()
        );
        ctx.connections.remove(session.id()).await;
        Ok(())
    }
}

/// Toggles the per-session liveness-heartbeat flag.
pub struct HeartbeatHandler;

#[async_trait]
impl CommandHandler for HeartbeatHandler {
    async fn handle(
        &self,
        _ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        let enabled = match command {
            ClientCommand::EnableHeartbeat => true,
            ClientCommand::DisableHeartbeat => false,
            _ => {
                return Err(HandlerError::Internal(
                    "heartbeat handler invoked with an unrelated command".to_string(),
                ))
            }
        };
        let previous = session.set_heartbeat(enabled);
        if previous != enabled {
            debug!(
                "💓 Session {} heartbeat {}",
                session.id(),
                if enabled { "enabled" } else { "disabled" }
            );
        }
        Ok(())
    }
}
