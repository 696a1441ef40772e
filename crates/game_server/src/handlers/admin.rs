//! Administrative command handler.

use crate::connection::Session;
use crate::dispatch::{CommandHandler, HandlerContext, HandlerError};
use async_trait::async_trait;
use outpost_protocol::{utc_timestamp, ClientCommand, ServerMessage};
use std::sync::Arc;
use tracing::{info, warn};

/// Name used as the sender of server-originated replies.
const SERVER_SENDER: &str = "server";

/// Executes privileged subcommands for sessions the admin policy approves.
///
/// Unauthorized attempts are reported to the sender as protocol errors, never
/// silently dropped. Supported subcommands: `who` (list connected sessions to
/// the requester) and `kick <username>` (disconnect a named session).
pub struct AdminHandler;

#[async_trait]
impl CommandHandler for AdminHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        let ClientCommand::AdminCommand { command, args } = command else {
            return Err(HandlerError::Internal(
                "admin handler invoked with a non-admin command".to_string(),
            ));
        };

        if !ctx.admin_policy.is_admin(session) {
            warn!(
                "🛡️ Session {} attempted admin command `{command}` without privilege",
                session.id()
            );
            return Err(HandlerError::Unauthorized(
                "admin privilege is required for this command".to_string(),
            ));
        }

        match command.as_str() {
            "who" => {
                let sessions = ctx.connections.snapshot().await;
                let mut lines: Vec<String> = sessions
                    .iter()
                    .map(|peer| match peer.username() {
                        Some(name) => format!("{} ({name})", peer.id()),
                        None => format!("{} (unauthenticated)", peer.id()),
                    })
                    .collect();
                lines.sort();

                let reply = ServerMessage::Chat {
                    sender: SERVER_SENDER.to_string(),
                    chat_contents: format!(
                        "{} session(s) connected: {}",
                        lines.len(),
                        lines.join(", ")
                    ),
                    timestamp: utc_timestamp(),
                };
                session
                    .send(&reply)
                    .map_err(|err| HandlerError::Internal(err.to_string()))?;
                Ok(())
            }
            "kick" => {
                let Some(target) = args.first() else {
                    return Err(HandlerError::Internal(
                        "kick requires a target username".to_string(),
                    ));
                };
                match ctx.connections.get_by_username(target).await {
                    Some(victim) => {
                        info!(
                            "🛡️ Admin `{}` kicked `{target}`",
                            session.username().unwrap_or("?")
                        );
                        ctx.connections.remove(victim.id()).await;
                        Ok(())
                    }
                    None => Err(HandlerError::Internal(format!(
                        "no connected session for username `{target}`"
                    ))),
                }
            }
            other => Err(HandlerError::Internal(format!(
                "unknown admin subcommand `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SessionState;
    use crate::handlers::testing::{drain, test_context, test_session};

    fn admin_command(command: &str, args: &[&str]) -> ClientCommand {
        ClientCommand::AdminCommand {
            command: command.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn non_admin_is_rejected_with_unauthorized() {
        let ctx = test_context();
        let (session, _rx) = test_session(8);
        session.set_identity("kara".to_string(), false).unwrap();

        let err = AdminHandler
            .handle(&ctx, &session, admin_command("who", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn who_lists_connected_sessions_to_the_requester_only() {
        let ctx = test_context();
        let (admin, mut admin_rx) = test_session(8);
        admin.set_identity("root".to_string(), true).unwrap();
        let (peer, mut peer_rx) = test_session(8);
        peer.set_identity("kara".to_string(), false).unwrap();
        ctx.connections.add(admin.clone()).await;
        ctx.connections.add(peer).await;

        AdminHandler
            .handle(&ctx, &admin, admin_command("who", &[]))
            .await
            .unwrap();

        let frames = drain(&mut admin_rx);
        assert_eq!(frames.len(), 1);
        let contents = frames[0]["chat_contents"].as_str().unwrap();
        assert!(contents.starts_with("2 session(s) connected"));
        assert!(contents.contains("(root)"));
        assert!(contents.contains("(kara)"));
        assert!(drain(&mut peer_rx).is_empty());
    }

    #[tokio::test]
    async fn kick_disconnects_the_named_session() {
        let ctx = test_context();
        let (admin, _admin_rx) = test_session(8);
        admin.set_identity("root".to_string(), true).unwrap();
        let (victim, _victim_rx) = test_session(8);
        victim.set_identity("kara".to_string(), false).unwrap();
        ctx.connections.add(admin.clone()).await;
        ctx.connections.add(victim.clone()).await;

        AdminHandler
            .handle(&ctx, &admin, admin_command("kick", &["kara"]))
            .await
            .unwrap();

        assert_eq!(victim.state(), SessionState::Disconnected);
        assert_eq!(ctx.connections.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_subcommand_is_an_internal_fault() {
        let ctx = test_context();
        let (admin, _rx) = test_session(8);
        admin.set_identity("root".to_string(), true).unwrap();

        let err = AdminHandler
            .handle(&ctx, &admin, admin_command("frobnicate", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Internal(_)));
    }
}
