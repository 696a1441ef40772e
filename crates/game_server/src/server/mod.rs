//! Server orchestration: the [`GameServer`] core and per-connection handling.

pub mod core;
pub mod handlers;

pub use core::GameServer;
pub use handlers::handle_connection;
