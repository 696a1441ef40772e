//! Character creation and appearance handlers.

use crate::collaborators::PlayerPosition;
use crate::connection::{Session, SessionState};
use crate::dispatch::{CommandHandler, HandlerContext, HandlerError};
use async_trait::async_trait;
use outpost_protocol::{ClientCommand, Facing};
use std::sync::Arc;
use tracing::{debug, info};

/// Handles `completecharactercreation` and `savecharacterlookattributes`.
///
/// Creation promotes the session from `Authenticated` to `InGame` and seeds a
/// position row for first-time players; saving look attributes changes no
/// session state. The attribute maps themselves are accepted as-is — what the
/// game does with them lives behind the persistence boundary, not here.
pub struct CharacterHandler;

#[async_trait]
impl CommandHandler for CharacterHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        let Some(username) = session.username().map(str::to_string) else {
            return Err(HandlerError::Internal(
                "character command from a session with no authenticated identity".to_string(),
            ));
        };

        match command {
            ClientCommand::CompleteCharacterCreation { attributes } => {
                // Repeating creation while already in game is tolerated; the
                // state machine simply refuses to move.
                if session.advance(SessionState::InGame).is_ok() {
                    info!(
                        "🎭 `{username}` completed character creation ({} attribute(s))",
                        attributes.len()
                    );
                }

                let existing = ctx
                    .player_store
                    .load_player_position(&username)
                    .await
                    .map_err(|err| HandlerError::Internal(err.to_string()))?;
                if existing.is_none() {
                    let spawn = PlayerPosition {
                        x: 0,
                        y: 0,
                        facing: Facing::North,
                    };
                    ctx.player_store
                        .save_player_position(&username, spawn.x, spawn.y, spawn.facing)
                        .await
                        .map_err(|err| HandlerError::Internal(err.to_string()))?;
                }
                Ok(())
            }
            ClientCommand::SaveCharacterLookAttributes { attributes } => {
                debug!(
                    "🎭 `{username}` saved {} look attribute(s)",
                    attributes.len()
                );
                Ok(())
            }
            _ => Err(HandlerError::Internal(
                "character handler invoked with an unrelated command".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{test_context, test_session};
    use serde_json::{json, Map, Value};

    fn attributes() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("hair".to_string(), json!("red"));
        map.insert("height".to_string(), json!(180));
        map
    }

    #[tokio::test]
    async fn creation_promotes_to_in_game_and_seeds_a_spawn_position() {
        let ctx = test_context();
        let (session, _rx) = test_session(8);
        session.set_identity("kara".to_string(), false).unwrap();
        session.advance(SessionState::Authenticated).unwrap();

        CharacterHandler
            .handle(
                &ctx,
                &session,
                ClientCommand::CompleteCharacterCreation {
                    attributes: attributes(),
                },
            )
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::InGame);
        let row = ctx
            .player_store
            .load_player_position("kara")
            .await
            .unwrap()
            .unwrap();
        assert_eq!((row.x, row.y), (0, 0));
        assert_eq!(row.facing, Facing::North);
    }

    #[tokio::test]
    async fn repeated_creation_keeps_the_stored_position() {
        let ctx = test_context();
        let (session, _rx) = test_session(8);
        session.set_identity("kara".to_string(), false).unwrap();
        session.advance(SessionState::Authenticated).unwrap();

        // Returning player with a saved position.
        ctx.player_store
            .save_player_position("kara", 7, -3, Facing::West)
            .await
            .unwrap();

        for _ in 0..2 {
            CharacterHandler
                .handle(
                    &ctx,
                    &session,
                    ClientCommand::CompleteCharacterCreation {
                        attributes: Map::new(),
                    },
                )
                .await
                .unwrap();
        }

        assert_eq!(session.state(), SessionState::InGame);
        let row = ctx
            .player_store
            .load_player_position("kara")
            .await
            .unwrap()
            .unwrap();
        assert_eq!((row.x, row.y), (7, -3));
    }

    #[tokio::test]
    async fn saving_look_attributes_changes_no_state() {
        let ctx = test_context();
        let (session, _rx) = test_session(8);
        session.set_identity("kara".to_string(), false).unwrap();
        session.advance(SessionState::Authenticated).unwrap();

        CharacterHandler
            .handle(
                &ctx,
                &session,
                ClientCommand::SaveCharacterLookAttributes {
                    attributes: attributes(),
                },
            )
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Authenticated);
    }
}
