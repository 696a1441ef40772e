//! # Outpost Wire Protocol
//!
//! Typed message envelope protocol for the Outpost multiplayer server.
//! Every frame exchanged with a client is a single JSON object carrying a
//! mandatory `type` discriminator plus kind-specific fields flattened at the
//! top level — there is no nested payload wrapper on the wire.
//!
//! ## Decoding
//!
//! Decoding is two-phase: the `type` tag is resolved first (without committing
//! to any concrete schema), then the full payload is re-parsed against the
//! schema selected by that tag. Tag comparison is case-insensitive. An
//! unrecognized tag is a hard [`DecodeError::UnknownKind`], never a silent
//! default variant.
//!
//! ## Example
//!
//! ```rust
//! use outpost_protocol::{decode, ClientCommand, CommandKind};
//!
//! let cmd = decode(r#"{"type":"chat","chat_contents":"hi"}"#)?;
//! assert_eq!(cmd.kind(), CommandKind::Chat);
//! # Ok::<(), outpost_protocol::DecodeError>(())
//! ```

pub use command::{decode, ClientCommand, CommandKind, Credentials};
pub use error::DecodeError;
pub use outbound::{ErrorCode, ServerMessage};
pub use types::{utc_timestamp, Facing, SessionId};

mod command;
mod error;
mod outbound;
mod types;
