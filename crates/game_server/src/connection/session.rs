//! Individual client session representation and lifecycle state machine.
//!
//! A [`Session`] tracks one live client connection: its stable id, the
//! authenticated identity (absent until auth succeeds), the lifecycle state,
//! and the bounded outbound channel used to deliver frames to the client.
//! Sessions are owned by the [`ConnectionRegistry`](super::ConnectionRegistry);
//! handlers only ever receive shared references.

use crate::error::DeliveryError;
use once_cell::sync::OnceCell;
use outpost_protocol::{CommandKind, ServerMessage, SessionId};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::SystemTime;
use tokio::sync::mpsc;

/// Lifecycle state of one client session.
///
/// Transitions are strictly forward:
/// `Connected → Authenticated → InGame → Disconnected`. `Disconnected` is
/// terminal and reachable from any live state (quit, logout, or transport
/// closure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Initial state; the client has not presented credentials yet.
    Connected = 0,
    /// Credentials accepted; character selection/creation still pending.
    Authenticated = 1,
    /// Character creation complete; gameplay messages are accepted.
    InGame = 2,
    /// Terminal state; the session is gone from the registry.
    Disconnected = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Connected,
            1 => SessionState::Authenticated,
            2 => SessionState::InGame,
            _ => SessionState::Disconnected,
        }
    }

    fn rank(self) -> u8 {
        self as u8
    }

    /// Whether a command of the given kind is acceptable in this state.
    ///
    /// A message arriving outside its allowed states is a protocol error
    /// reported to the sender, never a crash.
    pub fn accepts(self, kind: CommandKind) -> bool {
        match self {
            SessionState::Connected => matches!(
                kind,
                CommandKind::Auth | CommandKind::Ping | CommandKind::Quit
            ),
            SessionState::Authenticated => matches!(
                kind,
                CommandKind::CompleteCharacterCreation
                    | CommandKind::SaveCharacterLookAttributes
                    | CommandKind::Ping
                    | CommandKind::Quit
                    | CommandKind::Logout
                    | CommandKind::EnableHeartbeat
                    | CommandKind::DisableHeartbeat
            ),
            SessionState::InGame => !matches!(kind, CommandKind::Auth),
            SessionState::Disconnected => false,
        }
    }
}

/// Represents an individual client session on the server.
///
/// The session id is unique and stable for the connection lifetime. All
/// mutable state is interior and thread-safe, so a session can be shared
/// between the connection task, the dispatcher, and broadcast fan-out without
/// extra locking.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    remote_addr: SocketAddr,
    connected_at: SystemTime,
    outbound: mpsc::Sender<String>,
    state: AtomicU8,
    username: OnceCell<String>,
    admin: AtomicBool,
    heartbeat: AtomicBool,
}

impl Session {
    /// Creates a new session in the `Connected` state.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique session identifier
    /// * `remote_addr` - The network address of the connected client
    /// * `outbound` - Bounded sender feeding this client's socket writer
    pub fn new(id: SessionId, remote_addr: SocketAddr, outbound: mpsc::Sender<String>) -> Self {
        Self {
            id,
            remote_addr,
            connected_at: SystemTime::now(),
            outbound,
            state: AtomicU8::new(SessionState::Connected as u8),
            username: OnceCell::new(),
            admin: AtomicBool::new(false),
            heartbeat: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn connected_at(&self) -> SystemTime {
        self.connected_at
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether this session currently accepts the given command kind.
    pub fn accepts(&self, kind: CommandKind) -> bool {
        self.state().accepts(kind)
    }

    /// Advances the lifecycle state.
    ///
    /// Transitions are strictly forward; an attempt to move sideways or
    /// backwards leaves the state untouched and returns the current state as
    /// the error. Advancing an already-`Disconnected` session is therefore a
    /// no-op, which makes duplicate disconnect signals harmless.
    pub fn advance(&self, next: SessionState) -> Result<(), SessionState> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if next.rank() <= current {
                return Err(SessionState::from_u8(current));
            }
            match self.state.compare_exchange(
                current,
                next.rank(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(observed) => current = observed,
            }
        }
    }

    /// The authenticated username, if auth has succeeded.
    pub fn username(&self) -> Option<&str> {
        self.username.get().map(String::as_str)
    }

    /// Records the authenticated identity. Set exactly once, at auth time.
    pub fn set_identity(&self, username: String, admin: bool) -> Result<(), String> {
        self.username.set(username)?;
        self.admin.store(admin, Ordering::Release);
        Ok(())
    }

    /// Whether this session was granted the admin flag at auth time.
    pub fn is_admin(&self) -> bool {
        self.admin.load(Ordering::Acquire)
    }

    /// Sets the liveness-heartbeat flag, returning the previous value.
    /// Enabling twice (or disabling twice) is a no-op.
    pub fn set_heartbeat(&self, enabled: bool) -> bool {
        self.heartbeat.swap(enabled, Ordering::AcqRel)
    }

    /// Whether the liveness-heartbeat flag is currently set.
    pub fn heartbeat_enabled(&self) -> bool {
        self.heartbeat.load(Ordering::Acquire)
    }

    /// Queues an already-encoded frame for delivery to this client.
    ///
    /// Never blocks: a full buffer or a closed transport is reported as a
    /// per-recipient [`DeliveryError`] and handled by the caller, so one slow
    /// session cannot stall delivery to others.
    pub fn send_frame(&self, frame: String) -> Result<(), DeliveryError> {
        self.outbound.try_send(frame).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DeliveryError::BufferFull(self.id),
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed(self.id),
        })
    }

    /// Encodes and queues a server message for delivery to this client.
    pub fn send(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        self.send_frame(message.encode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session(buffer: usize) -> (Session, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        let session = Session::new(SessionId::new(), "127.0.0.1:9000".parse().unwrap(), tx);
        (session, rx)
    }

    #[test]
    fn lifecycle_only_moves_forward() {
        let (session, _rx) = test_session(4);
        assert_eq!(session.state(), SessionState::Connected);

        session.advance(SessionState::Authenticated).unwrap();
        session.advance(SessionState::InGame).unwrap();

        // Backwards and sideways transitions are rejected.
        assert_eq!(
            session.advance(SessionState::Authenticated),
            Err(SessionState::InGame)
        );
        assert_eq!(session.advance(SessionState::InGame), Err(SessionState::InGame));

        session.advance(SessionState::Disconnected).unwrap();
        assert_eq!(
            session.advance(SessionState::Disconnected),
            Err(SessionState::Disconnected)
        );
    }

    #[test]
    fn state_gates_command_kinds() {
        assert!(SessionState::Connected.accepts(CommandKind::Auth));
        assert!(SessionState::Connected.accepts(CommandKind::Ping));
        assert!(!SessionState::Connected.accepts(CommandKind::Move));
        assert!(!SessionState::Connected.accepts(CommandKind::Chat));

        assert!(SessionState::Authenticated.accepts(CommandKind::CompleteCharacterCreation));
        assert!(!SessionState::Authenticated.accepts(CommandKind::Move));
        assert!(!SessionState::Authenticated.accepts(CommandKind::Auth));

        assert!(SessionState::InGame.accepts(CommandKind::Move));
        assert!(SessionState::InGame.accepts(CommandKind::Chat));
        assert!(SessionState::InGame.accepts(CommandKind::AdminCommand));
        assert!(!SessionState::InGame.accepts(CommandKind::Auth));

        for kind in CommandKind::ALL {
            assert!(!SessionState::Disconnected.accepts(kind));
        }
    }

    #[test]
    fn heartbeat_toggle_is_idempotent() {
        let (session, _rx) = test_session(4);
        assert!(!session.heartbeat_enabled());

        assert!(!session.set_heartbeat(true));
        assert!(session.heartbeat_enabled());
        // Second enable reports no change.
        assert!(session.set_heartbeat(true));
        assert!(session.heartbeat_enabled());

        assert!(session.set_heartbeat(false));
        assert!(!session.set_heartbeat(false));
    }

    #[test]
    fn identity_is_set_once() {
        let (session, _rx) = test_session(4);
        assert!(session.username().is_none());
        assert!(!session.is_admin());

        session.set_identity("kara".to_string(), true).unwrap();
        assert_eq!(session.username(), Some("kara"));
        assert!(session.is_admin());

        assert!(session.set_identity("impostor".to_string(), false).is_err());
        assert_eq!(session.username(), Some("kara"));
    }

    #[test]
    fn full_buffer_is_a_per_recipient_failure() {
        let (session, mut rx) = test_session(1);
        session.send_frame("one".to_string()).unwrap();
        let err = session.send_frame("two".to_string()).unwrap_err();
        assert!(matches!(err, DeliveryError::BufferFull(_)));

        // Draining frees the slot again.
        assert_eq!(rx.try_recv().unwrap(), "one");
        session.send_frame("three".to_string()).unwrap();
    }

    #[test]
    fn send_to_closed_transport_reports_closed() {
        let (session, rx) = test_session(1);
        drop(rx);
        let err = session.send_frame("frame".to_string()).unwrap_err();
        assert!(matches!(err, DeliveryError::Closed(_)));
    }
}
