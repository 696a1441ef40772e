//! Connection tracking, session lifecycle, and broadcast fan-out.

pub mod broadcast;
pub mod registry;
pub mod session;

pub use broadcast::Broadcaster;
pub use registry::ConnectionRegistry;
pub use session::{Session, SessionState};
