//! Typed client command taxonomy and the two-phase envelope codec.
//!
//! Inbound frames are JSON objects whose mandatory `type` field selects one of
//! a closed set of command variants. [`decode`] resolves the tag first, then
//! re-parses the full payload against the schema that tag selects; the typed
//! parse is driven by an explicit tag table rather than a self-referential
//! generic deserializer, so the codec cannot recurse into itself.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authentication credentials carried by an `auth` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A decoded client command.
///
/// Each variant corresponds to exactly one wire-level `type` tag; the mapping
/// is closed and enforced by [`decode`]. Kind-specific fields sit flat next to
/// the `type` field on the wire — encoding a command and decoding the result
/// always yields the original value.
///
/// # Wire Examples
///
/// ```json
/// {"type":"move","dx":1,"dy":0}
/// {"type":"chat","chat_contents":"hello","timestamp":"2024-01-15T10:30:45Z"}
/// {"type":"admincommand","command":"kick","args":["grue"]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Credential presentation; only valid while the session is `Connected`.
    #[serde(rename = "auth")]
    Auth { credentials: Credentials },

    /// Relative movement request; requires an in-game session.
    #[serde(rename = "move")]
    Move { dx: i64, dy: i64 },

    /// Chat message. Both fields are optional on the wire: absent or empty
    /// contents make the message a deliberate no-op, and an absent timestamp
    /// is filled in by the server at receipt.
    #[serde(rename = "chat")]
    Chat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chat_contents: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },

    /// Liveness probe; answered with a `pong` frame.
    #[serde(rename = "ping")]
    Ping,

    /// Client-initiated disconnect.
    #[serde(rename = "quit")]
    Quit,

    /// Client-initiated logout; same terminal effect as `quit`.
    #[serde(rename = "logout")]
    Logout,

    /// Finalizes character creation and moves the session in-game.
    #[serde(rename = "completecharactercreation")]
    CompleteCharacterCreation {
        #[serde(default)]
        attributes: serde_json::Map<String, Value>,
    },

    /// Persists cosmetic character attributes without a state change.
    #[serde(rename = "savecharacterlookattributes")]
    SaveCharacterLookAttributes {
        #[serde(default)]
        attributes: serde_json::Map<String, Value>,
    },

    /// Enables the per-session liveness heartbeat; idempotent.
    #[serde(rename = "enable_heartbeat")]
    EnableHeartbeat,

    /// Disables the per-session liveness heartbeat; idempotent.
    #[serde(rename = "disable_heartbeat")]
    DisableHeartbeat,

    /// Privileged server command; requires an admin session.
    #[serde(rename = "admincommand")]
    AdminCommand {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl ClientCommand {
    /// Returns the kind discriminator for this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            ClientCommand::Auth { .. } => CommandKind::Auth,
            ClientCommand::Move { .. } => CommandKind::Move,
            ClientCommand::Chat { .. } => CommandKind::Chat,
            ClientCommand::Ping => CommandKind::Ping,
            ClientCommand::Quit => CommandKind::Quit,
            ClientCommand::Logout => CommandKind::Logout,
            ClientCommand::CompleteCharacterCreation { .. } => {
                CommandKind::CompleteCharacterCreation
            }
            ClientCommand::SaveCharacterLookAttributes { .. } => {
                CommandKind::SaveCharacterLookAttributes
            }
            ClientCommand::EnableHeartbeat => CommandKind::EnableHeartbeat,
            ClientCommand::DisableHeartbeat => CommandKind::DisableHeartbeat,
            ClientCommand::AdminCommand { .. } => CommandKind::AdminCommand,
        }
    }

    /// Serializes this command to its wire form.
    ///
    /// Structural inverse of [`decode`]: the output carries a `type` field
    /// equal to the variant tag with the variant's own fields alongside it.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Field-less discriminator naming each command kind.
///
/// This is the key type for the handler registry: every [`ClientCommand`]
/// variant maps to exactly one `CommandKind`, and every kind owns exactly one
/// registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Auth,
    Move,
    Chat,
    Ping,
    Quit,
    Logout,
    CompleteCharacterCreation,
    SaveCharacterLookAttributes,
    EnableHeartbeat,
    DisableHeartbeat,
    AdminCommand,
}

impl CommandKind {
    /// Every recognized kind, in wire-tag order.
    pub const ALL: [CommandKind; 11] = [
        CommandKind::Auth,
        CommandKind::Move,
        CommandKind::Chat,
        CommandKind::Ping,
        CommandKind::Quit,
        CommandKind::Logout,
        CommandKind::CompleteCharacterCreation,
        CommandKind::SaveCharacterLookAttributes,
        CommandKind::EnableHeartbeat,
        CommandKind::DisableHeartbeat,
        CommandKind::AdminCommand,
    ];

    /// The canonical (lowercase) wire tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            CommandKind::Auth => "auth",
            CommandKind::Move => "move",
            CommandKind::Chat => "chat",
            CommandKind::Ping => "ping",
            CommandKind::Quit => "quit",
            CommandKind::Logout => "logout",
            CommandKind::CompleteCharacterCreation => "completecharactercreation",
            CommandKind::SaveCharacterLookAttributes => "savecharacterlookattributes",
            CommandKind::EnableHeartbeat => "enable_heartbeat",
            CommandKind::DisableHeartbeat => "disable_heartbeat",
            CommandKind::AdminCommand => "admincommand",
        }
    }

    /// Resolves a wire tag to its kind, ignoring ASCII case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(tag))
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Decodes a raw text frame into a typed [`ClientCommand`].
///
/// Decoding is two-phase:
///
/// 1. Parse the payload as generic JSON and extract only the `type` tag,
///    without committing to any concrete schema. A payload with no string
///    `type` field yields [`DecodeError::MissingKind`].
/// 2. Resolve the tag (case-insensitively) against the closed kind table and
///    re-parse the full payload against the selected schema. An unknown tag
///    yields [`DecodeError::UnknownKind`]; a recognized tag with a
///    non-conforming body yields [`DecodeError::MalformedBody`] carrying the
///    kind for diagnostics.
///
/// # Arguments
///
/// * `raw` - One logical frame of message text from a client
///
/// # Returns
///
/// The decoded command, or the [`DecodeError`] describing exactly which phase
/// rejected the payload.
pub fn decode(raw: &str) -> Result<ClientCommand, DecodeError> {
    let mut envelope: Value = serde_json::from_str(raw).map_err(DecodeError::InvalidJson)?;

    let tag = envelope
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingKind)?
        .to_ascii_lowercase();

    let kind = CommandKind::from_tag(&tag).ok_or(DecodeError::UnknownKind { kind: tag })?;

    // Normalize the tag so the typed parse sees the canonical casing.
    envelope["type"] = Value::String(kind.tag().to_string());

    serde_json::from_value(envelope).map_err(|source| DecodeError::MalformedBody { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_resolves_every_canonical_tag() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn decode_is_case_insensitive_on_the_tag() {
        let cmd = decode(r#"{"type":"PING"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::Ping);

        let cmd = decode(r#"{"type":"Enable_Heartbeat"}"#).unwrap();
        assert_eq!(cmd, ClientCommand::EnableHeartbeat);

        let cmd = decode(r#"{"type":"CHAT","chat_contents":"hi"}"#).unwrap();
        assert_eq!(cmd.kind(), CommandKind::Chat);
    }

    #[test]
    fn missing_type_field_is_missing_kind() {
        let err = decode(r#"{"chat_contents":"hi"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingKind));

        // A non-string tag is equally useless as a discriminator.
        let err = decode(r#"{"type":7}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingKind));

        // Non-object payloads carry no tag at all.
        let err = decode("[1,2,3]").unwrap_err();
        assert!(matches!(err, DecodeError::MissingKind));
    }

    #[test]
    fn unknown_tag_is_rejected_not_defaulted() {
        let err = decode(r#"{"type":"frobnicate"}"#).unwrap_err();
        match err {
            DecodeError::UnknownKind { kind } => assert_eq!(kind, "frobnicate"),
            other => panic!("expected UnknownKind, got {other:?}"),
        }
    }

    #[test]
    fn malformed_body_carries_the_selected_kind() {
        let err = decode(r#"{"type":"move","dx":"east","dy":0}"#).unwrap_err();
        match err {
            DecodeError::MalformedBody { kind, .. } => assert_eq!(kind, CommandKind::Move),
            other => panic!("expected MalformedBody, got {other:?}"),
        }

        let err = decode(r#"{"type":"auth"}"#).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MalformedBody {
                kind: CommandKind::Auth,
                ..
            }
        ));
    }

    #[test]
    fn unparseable_payload_is_invalid_json() {
        let err = decode("{not json").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidJson(_)));
    }

    #[test]
    fn encode_decode_round_trips() {
        let commands = vec![
            ClientCommand::Auth {
                credentials: Credentials {
                    username: "kara".into(),
                    password: "hunter2".into(),
                },
            },
            ClientCommand::Move { dx: -3, dy: 12 },
            ClientCommand::Chat {
                chat_contents: Some("hello world".into()),
                timestamp: Some("2024-01-15T10:30:45Z".into()),
            },
            ClientCommand::Chat {
                chat_contents: None,
                timestamp: None,
            },
            ClientCommand::Ping,
            ClientCommand::Quit,
            ClientCommand::Logout,
            ClientCommand::EnableHeartbeat,
            ClientCommand::DisableHeartbeat,
            ClientCommand::AdminCommand {
                command: "kick".into(),
                args: vec!["grue".into(), "idle".into()],
            },
        ];

        for cmd in commands {
            let raw = cmd.encode().unwrap();
            let decoded = decode(&raw).unwrap();
            assert_eq!(decoded, cmd, "round trip failed for {raw}");
        }
    }

    #[test]
    fn attribute_commands_round_trip() {
        let mut attributes = serde_json::Map::new();
        attributes.insert("hair".into(), serde_json::json!("red"));
        attributes.insert("height".into(), serde_json::json!(182));

        let cmd = ClientCommand::CompleteCharacterCreation {
            attributes: attributes.clone(),
        };
        let decoded = decode(&cmd.encode().unwrap()).unwrap();
        assert_eq!(decoded, cmd);

        let cmd = ClientCommand::SaveCharacterLookAttributes { attributes };
        let decoded = decode(&cmd.encode().unwrap()).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn encoded_frame_carries_flat_fields_next_to_type() {
        let cmd = ClientCommand::Move { dx: 1, dy: 0 };
        let value: Value = serde_json::from_str(&cmd.encode().unwrap()).unwrap();
        assert_eq!(value["type"], "move");
        assert_eq!(value["dx"], 1);
        assert_eq!(value["dy"], 0);
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn tag_spoofing_inside_the_body_does_not_confuse_the_codec() {
        // A second discriminator buried in a field must not redirect parsing.
        let cmd = decode(r#"{"type":"chat","chat_contents":"{\"type\":\"admincommand\"}"}"#)
            .unwrap();
        assert_eq!(cmd.kind(), CommandKind::Chat);
    }
}
