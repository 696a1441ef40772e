//! Decode failure taxonomy for inbound message envelopes.

use crate::command::CommandKind;

/// Enumeration of the ways an inbound payload can fail to decode.
///
/// All of these are client-caused: the dispatcher reports them back to the
/// offending session only and the connection stays open. None of them may
/// affect any other session.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload was not parseable JSON at all.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The payload parsed but carried no string `type` discriminator.
    #[error("message envelope is missing the `type` discriminator")]
    MissingKind,

    /// The `type` tag did not match any recognized command kind.
    #[error("unrecognized message kind `{kind}`")]
    UnknownKind {
        /// The unrecognized tag, lowercased, for diagnostics.
        kind: String,
    },

    /// The tag was recognized but the body did not match that kind's schema.
    #[error("malformed `{kind}` message body: {source}")]
    MalformedBody {
        /// The kind selected by the tag, carried for diagnostics.
        kind: CommandKind,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    /// Short stable code suitable for the wire-level error report.
    pub fn code(&self) -> &'static str {
        match self {
            DecodeError::InvalidJson(_) => "invalid_json",
            DecodeError::MissingKind => "missing_kind",
            DecodeError::UnknownKind { .. } => "unknown_kind",
            DecodeError::MalformedBody { .. } => "malformed_body",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;

    #[test]
    fn each_failure_phase_has_a_distinct_code() {
        assert_eq!(decode("{oops").unwrap_err().code(), "invalid_json");
        assert_eq!(decode("{}").unwrap_err().code(), "missing_kind");
        assert_eq!(
            decode(r#"{"type":"frobnicate"}"#).unwrap_err().code(),
            "unknown_kind"
        );
        assert_eq!(
            decode(r#"{"type":"move","dx":"east"}"#).unwrap_err().code(),
            "malformed_body"
        );
    }

    #[test]
    fn messages_name_the_offending_kind() {
        let err = decode(r#"{"type":"auth"}"#).unwrap_err();
        assert!(err.to_string().contains("auth"));
    }
}
