//! Core identifier and value types shared across the protocol.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one live client session.
///
/// A wrapper around UUID that provides type safety and ensures session ids
/// cannot be confused with other identifiers in the system. The id is stable
/// for the lifetime of the connection.
///
/// # Examples
///
/// ```rust
/// use outpost_protocol::SessionId;
///
/// let id = SessionId::new();
/// println!("session {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Creates a new random session id using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cardinal facing direction recorded alongside a player position.
///
/// Persisted by the storage collaborator as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "W")]
    West,
}

impl Default for Facing {
    fn default() -> Self {
        Self::North
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Facing::North => "N",
            Facing::East => "E",
            Facing::South => "S",
            Facing::West => "W",
        };
        write!(f, "{code}")
    }
}

/// Returns the current UTC instant as an ISO-8601 string.
///
/// Used wherever the server stamps an outbound payload itself, e.g. a chat
/// broadcast whose sender supplied no timestamp.
pub fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed = SessionId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn facing_serializes_as_single_letter() {
        assert_eq!(serde_json::to_string(&Facing::North).unwrap(), "\"N\"");
        assert_eq!(serde_json::to_string(&Facing::West).unwrap(), "\"W\"");
        let parsed: Facing = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(parsed, Facing::South);
    }

    #[test]
    fn utc_timestamp_parses_back() {
        let ts = utc_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
