//! Outbound server message types.
//!
//! Responses and broadcasts use the same envelope convention as inbound
//! commands: a `type` tag with the message's own fields flat beside it.

use serde::{Deserialize, Serialize};

/// Stable error codes attached to wire-level error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The inbound payload failed to decode (missing/unknown/malformed).
    DecodeError,
    /// The command was valid but not allowed in the session's current state.
    ProtocolState,
    /// The session lacks the privilege the command requires.
    Unauthorized,
    /// A server-side fault while handling an otherwise valid message.
    Internal,
}

/// A message sent from the server to one or more clients.
///
/// # Wire Examples
///
/// ```json
/// {"type":"chat","sender":"kara","chat_contents":"hi","timestamp":"2024-01-15T10:30:45+00:00"}
/// {"type":"error","code":"decode_error","message":"unrecognized message kind `frobnicate`"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Chat fan-out payload. Derived and ephemeral: it exists only for the
    /// duration of the broadcast call and is never persisted.
    #[serde(rename = "chat")]
    Chat {
        sender: String,
        chat_contents: String,
        /// Client-supplied ISO-8601 instant when present, else the server's
        /// own UTC timestamp at receipt.
        timestamp: String,
    },

    /// Reply to a `ping` command.
    #[serde(rename = "pong")]
    Pong { timestamp: String },

    /// Reply to an `auth` command.
    #[serde(rename = "auth_result")]
    AuthResult {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },

    /// Error report delivered to the offending session only.
    #[serde(rename = "error")]
    Error { code: ErrorCode, message: String },
}

impl ServerMessage {
    /// Serializes this message to one logical text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
