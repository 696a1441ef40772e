//! # Game Server - Message Routing Core
//!
//! A WebSocket game server focused on routing typed protocol messages between
//! connected clients. The server handles connection lifecycle, message
//! dispatch, and broadcast fan-out while delegating game-logic effects to
//! collaborator boundaries.
//!
//! ## Design Philosophy
//!
//! The server core contains **no game simulation** - it moves messages:
//!
//! * **WebSocket connection management** - Session lifecycle and per-session
//!   bounded outbound buffering
//! * **Typed dispatch** - One handler per command kind, registered at startup
//! * **Broadcast fan-out** - Encode once, deliver to a registry snapshot,
//!   isolate per-recipient failures
//! * **Collaborator boundaries** - Persistence, credential validation, and
//!   admin authorization behind traits
//!
//! ## Message Flow
//!
//! 1. Client sends a WebSocket text frame carrying a JSON envelope with a
//!    top-level `type` discriminator
//! 2. The dispatcher decodes the envelope (`outpost_protocol::decode`) and
//!    reports malformed input to the sender only
//! 3. The command is checked against the session's lifecycle state
//! 4. The registered handler runs to completion; per-session ordering is
//!    preserved because the connection task dispatches one frame at a time
//! 5. Replies go to the sender; chat fans out to every other session
//!
//! ## Error Handling
//!
//! Client-caused protocol failures (`outpost_protocol::DecodeError`) are
//! reported to the offending session and never close the connection. Server
//! faults are categorized by [`ServerError`]; startup-time configuration
//! errors (duplicate or missing handler registrations) fail fast.
//!
//! ## Thread Safety
//!
//! The connection registry serializes mutations behind a write lock and hands
//! out snapshots for iteration; sessions carry interior atomic state so the
//! dispatcher, broadcast fan-out, and the connection task share them freely.

// Re-export core types and functions for easy access
pub use config::{AuthConfig, ServerConfig};
pub use error::{DeliveryError, ServerError};
pub use server::GameServer;
pub use utils::{create_server, create_server_with_config};

// Public module declarations
pub mod collaborators;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod server;
pub mod utils;
