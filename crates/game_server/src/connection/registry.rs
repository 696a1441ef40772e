//! Connection registry for tracking all live client sessions.
//!
//! This is the only piece of shared mutable state touched by every session
//! concurrently. Mutations are serialized by a write lock; iteration works on
//! a snapshot taken under the read lock so that sending never holds any lock.

use super::session::{Session, SessionState};
use outpost_protocol::SessionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Central registry of all currently connected sessions, keyed by session id.
///
/// Removal from the registry is the single authoritative "session ended"
/// event: it drives the session's state machine to `Disconnected` and is
/// idempotent, so duplicate disconnect signals (quit racing a transport
/// close) are harmless.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session to the registry.
    pub async fn add(&self, session: Arc<Session>) {
        let mut sessions = self.sessions.write().await;
        info!("🔗 Session {} from {}", session.id(), session.remote_addr());
        sessions.insert(session.id(), session);
    }

    /// Removes a session, driving it to `Disconnected`.
    ///
    /// Returns `true` if the session was present. Removing a session that has
    /// already been removed is a no-op and returns `false` — never an error.
    pub async fn remove(&self, session_id: SessionId) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(&session_id)
        };
        match removed {
            Some(session) => {
                // Idempotent: the session may already have advanced itself.
                let _ = session.advance(SessionState::Disconnected);
                info!(
                    "❌ Session {} from {} disconnected",
                    session.id(),
                    session.remote_addr()
                );
                true
            }
            None => false,
        }
    }

    /// Looks up a session by id.
    pub async fn get(&self, session_id: SessionId) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions.get(&session_id).cloned()
    }

    /// Finds a session by its authenticated username.
    pub async fn get_by_username(&self, username: &str) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions
            .values()
            .find(|session| session.username() == Some(username))
            .cloned()
    }

    /// Takes a consistent snapshot of the current sessions.
    ///
    /// The read lock is released before the snapshot is returned, so callers
    /// can iterate and send without excluding concurrent `add`/`remove`. A
    /// session removed after the snapshot simply fails individual delivery,
    /// and one added after it is not visited — neither outcome is an error.
    pub async fn snapshot(&self) -> Vec<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions.values().cloned().collect()
    }

    /// Number of currently registered sessions.
    pub async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_session() -> Arc<Session> {
        let (tx, _rx) = mpsc::channel(8);
        // Receiver intentionally dropped; these tests never deliver frames.
        Arc::new(Session::new(
            SessionId::new(),
            "127.0.0.1:9000".parse().unwrap(),
            tx,
        ))
    }

    #[tokio::test]
    async fn add_get_remove_round_trip() {
        let registry = ConnectionRegistry::new();
        let session = test_session();
        let id = session.id();

        registry.add(session.clone()).await;
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get(id).await.unwrap().id(), id);

        assert!(registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(registry.is_empty().await);
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn duplicate_remove_is_a_noop() {
        let registry = ConnectionRegistry::new();
        let session = test_session();
        let id = session.id();
        registry.add(session).await;

        assert!(registry.remove(id).await);
        // Second disconnect signal for the same session: no error, no effect.
        assert!(!registry.remove(id).await);
        assert!(!registry.remove(id).await);
    }

    #[tokio::test]
    async fn snapshot_is_stable_across_concurrent_mutation() {
        let registry = ConnectionRegistry::new();
        let a = test_session();
        let b = test_session();
        registry.add(a.clone()).await;
        registry.add(b.clone()).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 2);

        // Mutating the registry does not disturb the snapshot already taken.
        registry.remove(a.id()).await;
        registry.add(test_session()).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn lookup_by_username_sees_authenticated_sessions() {
        let registry = ConnectionRegistry::new();
        let session = test_session();
        session.set_identity("kara".to_string(), false).unwrap();
        registry.add(session.clone()).await;

        let found = registry.get_by_username("kara").await.unwrap();
        assert_eq!(found.id(), session.id());
        assert!(registry.get_by_username("nobody").await.is_none());
    }
}
