//! Movement handler.

use crate::collaborators::PlayerPosition;
use crate::connection::Session;
use crate::dispatch::{CommandHandler, HandlerContext, HandlerError};
use async_trait::async_trait;
use outpost_protocol::{ClientCommand, Facing};
use std::sync::Arc;
use tracing::debug;

/// Applies a movement delta to the player's persisted position.
///
/// Positions live entirely behind the persistence collaborator; a player with
/// no stored row starts at the origin facing north. Facing follows the
/// dominant axis of the delta and is kept unchanged for a zero move.
pub struct MoveHandler;

fn facing_for(dx: i64, dy: i64, current: Facing) -> Facing {
    if dx == 0 && dy == 0 {
        current
    } else if dx.abs() >= dy.abs() {
        if dx > 0 {
            Facing::East
        } else {
            Facing::West
        }
    } else if dy > 0 {
        Facing::North
    } else {
        Facing::South
    }
}

#[async_trait]
impl CommandHandler for MoveHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        session: &Arc<Session>,
        command: ClientCommand,
    ) -> Result<(), HandlerError> {
        let ClientCommand::Move { dx, dy } = command else {
            return Err(HandlerError::Internal(
                "move handler invoked with a non-move command".to_string(),
            ));
        };

        // State gating guarantees InGame, and InGame implies an identity.
        let Some(username) = session.username().map(str::to_string) else {
            return Err(HandlerError::Internal(
                "in-game session has no authenticated identity".to_string(),
            ));
        };

        let current = ctx
            .player_store
            .load_player_position(&username)
            .await
            .map_err(|err| HandlerError::Internal(err.to_string()))?
            .unwrap_or(PlayerPosition {
                x: 0,
                y: 0,
                facing: Facing::North,
            });

        let x = current.x.saturating_add(dx);
        let y = current.y.saturating_add(dy);
        let facing = facing_for(dx, dy, current.facing);

        ctx.player_store
            .save_player_position(&username, x, y, facing)
            .await
            .map_err(|err| HandlerError::Internal(err.to_string()))?;

        debug!("🚶 `{username}` moved to ({x}, {y}) facing {facing}");
        Ok(())
    }
}
