//! Broadcast service for fanning one payload out to all connected sessions.

use super::registry::ConnectionRegistry;
use super::session::SessionState;
use crate::error::DeliveryError;
use outpost_protocol::{ServerMessage, SessionId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fans encoded payloads out to every registered session.
///
/// The payload is encoded exactly once; every recipient gets the same bytes.
/// Fan-out operates on a registry snapshot, so no lock is held while sending,
/// and per-recipient failures (slow client, racing disconnect) are isolated:
/// they are logged and never abort delivery to the remaining sessions.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    connections: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(connections: Arc<ConnectionRegistry>) -> Self {
        Self { connections }
    }

    /// Broadcasts a message to every connected session.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to encode once and deliver
    /// * `exclude` - Optional originating session to skip (whether a chat
    ///   sender hears their own echo is the caller's policy, not ours)
    ///
    /// # Returns
    ///
    /// The number of sessions the frame was queued for.
    pub async fn broadcast_all(
        &self,
        message: &ServerMessage,
        exclude: Option<SessionId>,
    ) -> Result<usize, DeliveryError> {
        let frame = message.encode()?;
        let sessions = self.connections.snapshot().await;

        let mut delivered = 0;
        for session in sessions {
            if exclude == Some(session.id()) {
                continue;
            }
            // A session that disconnected between snapshot and send is a
            // tolerated race, not an error.
            if session.state() == SessionState::Disconnected {
                continue;
            }
            match session.send_frame(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(DeliveryError::Closed(id)) => {
                    debug!("📡 Skipping closed session {id} during broadcast");
                }
                Err(err) => {
                    warn!("📡 Dropping broadcast frame for one recipient: {err}");
                }
            }
        }

        debug!("📡 Broadcast queued for {delivered} session(s)");
        Ok(delivered)
    }
}
