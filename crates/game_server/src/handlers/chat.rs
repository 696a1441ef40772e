//! Chat handler.

use crate::connection::Session;
use crate::dispatch::{CommandHandler, HandlerContext, HandlerError};
use async_trait::async_trait;
use outpost_protocol::{utc_timestamp, ClientCommand, ServerMessage};
use std::sync::Arc;
use tracing::debug;

/// Relays a chat line to every other connected session.
///
/// A client-supplied timestamp is passed through verbatim; only when the
/// client omits it does the server stamp the message with its own UTC time at
/// receipt. Empty or absent contents is a silent no-op: nothing is sent to
/// anyone, including the sender.
pub struct ChatHandler;

#[async_trait]
impl CommandHandler for ChatHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        let ClientCommand::Chat {
            chat_contents,
            timestamp,
        } = command
        else {
            return Err(HandlerError::Internal(
                "chat handler invoked with a non-chat command".to_string(),
            ));
        };

        let contents = match chat_contents {
            Some(contents) if !contents.trim().is_empty() => contents,
            _ => {
                debug!("💬 Session {} sent an empty chat line", session.id());
                return Ok(());
            }
        };

        let sender = session
            .username()
            .map(str::to_string)
            .unwrap_or_else(|| session.id().to_string());

        let message = ServerMessage::Chat {
            sender,
            chat_contents: contents,
            timestamp: timestamp.unwrap_or_else(utc_timestamp),
        };

        ctx.broadcaster
            .broadcast_all(&message, Some(session.id()))
            .await
            .map_err(|err| HandlerError::Internal(err.to_string()))?;
        Ok(())
    }
}
