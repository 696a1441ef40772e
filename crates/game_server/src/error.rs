//! Error types and handling for the game server.
//!
//! This module defines the error types that can occur during server operations,
//! separating client-visible protocol failures (which live in
//! `outpost_protocol`) from server-side faults.

use outpost_protocol::SessionId;

/// Enumeration of possible server errors.
///
/// Categorizes errors into network, configuration, and internal server errors
/// to help with debugging and error handling. Configuration errors are
/// startup-time faults (for example a duplicate handler registration) and
/// fail fast; nothing here is ever caused by a single client's input.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Network-related errors such as binding failures or handshake issues
    #[error("Network error: {0}")]
    Network(String),

    /// Startup-time configuration faults, e.g. duplicate handler registration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure delivering one frame to one recipient.
///
/// Delivery errors are isolated per-recipient: a broadcast logs them and
/// carries on with the remaining sessions, and delivery to a session that has
/// already disconnected is treated as a no-op by callers.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The session's bounded outbound buffer was full (slow client).
    #[error("outbound buffer full for session {0}")]
    BufferFull(SessionId),

    /// The session's transport has already gone away.
    #[error("session {0} is no longer connected")]
    Closed(SessionId),

    /// The outbound message failed to serialize.
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
}
