//! Boundary traits for external collaborators.
//!
//! The routing core treats persistence, credential validation, and admin
//! authorization as external concerns: handlers talk to these traits only.
//! The shipped implementations are deliberately simple in-process stand-ins
//! used by the default server wiring and by tests.

use crate::connection::Session;
use async_trait::async_trait;
use dashmap::DashMap;
use outpost_protocol::{Credentials, Facing};
use std::collections::HashSet;

/// A player's persisted position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPosition {
    pub x: i64,
    pub y: i64,
    pub facing: Facing,
}

/// Failure inside a persistence backend.
#[derive(Debug, thiserror::Error)]
#[error("player store failure: {0}")]
pub struct StoreError(pub String);

/// Persistence collaborator holding one position row per user.
///
/// User identity here is a plain username; the foreign key into the identity
/// store is not enforced at this boundary, and a missing facing falls back to
/// north. Both are known gaps in the persisted schema, inherited as-is rather
/// than silently fixed.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn save_player_position(
        &self,
        user_id: &str,
        x: i64,
        y: i64,
        facing: Facing,
    ) -> Result<(), StoreError>;

    async fn load_player_position(&self, user_id: &str) -> Result<Option<PlayerPosition>, StoreError>;
}

/// In-memory [`PlayerStore`] backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    positions: DashMap<String, PlayerPosition>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn save_player_position(
        &self,
        user_id: &str,
        x: i64,
        y: i64,
        facing: Facing,
    ) -> Result<(), StoreError> {
        self.positions
            .insert(user_id.to_string(), PlayerPosition { x, y, facing });
        Ok(())
    }

    async fn load_player_position(&self, user_id: &str) -> Result<Option<PlayerPosition>, StoreError> {
        Ok(self.positions.get(user_id).map(|entry| *entry.value()))
    }
}

/// Identity established by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
    pub admin: bool,
}

/// Credential-validation collaborator.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    /// Validates a credential pair, returning the established identity on
    /// success and `None` on rejection.
    async fn validate(&self, credentials: &Credentials) -> Option<AuthenticatedUser>;
}

/// Development validator: accepts any non-empty username/password pair and
/// grants the admin flag to configured usernames.
#[derive(Debug, Default)]
pub struct BasicCredentialValidator {
    admins: HashSet<String>,
}

impl BasicCredentialValidator {
    pub fn new(admins: impl IntoIterator<Item = String>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CredentialValidator for BasicCredentialValidator {
    async fn validate(&self, credentials: &Credentials) -> Option<AuthenticatedUser> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return None;
        }
        Some(AuthenticatedUser {
            username: credentials.username.clone(),
            admin: self.admins.contains(&credentials.username),
        })
    }
}

/// Authorization collaborator consulted before privileged commands run.
pub trait AdminPolicy: Send + Sync {
    fn is_admin(&self, session: &Session) -> bool;
}

/// Default policy: trust the admin flag established at authentication time.
#[derive(Debug, Default)]
pub struct SessionFlagAdminPolicy;

impl AdminPolicy for SessionFlagAdminPolicy {
    fn is_admin(&self, session: &Session) -> bool {
        session.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_round_trips_a_position_row() {
        let store = InMemoryPlayerStore::new();
        assert_eq!(store.load_player_position("kara").await.unwrap(), None);

        store
            .save_player_position("kara", 4, -2, Facing::East)
            .await
            .unwrap();
        let row = store.load_player_position("kara").await.unwrap().unwrap();
        assert_eq!(
            row,
            PlayerPosition {
                x: 4,
                y: -2,
                facing: Facing::East
            }
        );

        // Saving again overwrites the single row for that user.
        store
            .save_player_position("kara", 5, -2, Facing::South)
            .await
            .unwrap();
        let row = store.load_player_position("kara").await.unwrap().unwrap();
        assert_eq!(row.x, 5);
        assert_eq!(row.facing, Facing::South);
    }

    #[tokio::test]
    async fn validator_rejects_empty_credentials() {
        let validator = BasicCredentialValidator::new(["root".to_string()]);

        let ok = validator
            .validate(&Credentials {
                username: "kara".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.username, "kara");
        assert!(!ok.admin);

        let admin = validator
            .validate(&Credentials {
                username: "root".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();
        assert!(admin.admin);

        assert!(validator
            .validate(&Credentials {
                username: "  ".into(),
                password: "x".into(),
            })
            .await
            .is_none());
        assert!(validator
            .validate(&Credentials {
                username: "kara".into(),
                password: "".into(),
            })
            .await
            .is_none());
    }
}
