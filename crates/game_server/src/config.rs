//! Server configuration types and defaults.
//!
//! This module contains the server configuration structure and default values
//! used to initialize and customize the game server behavior.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Configuration structure for the game server.
///
/// Contains all necessary parameters to configure server behavior including
/// network settings, connection limits, and per-session buffering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,

    /// WebSocket handshake timeout in seconds
    pub connection_timeout: u64,

    /// Capacity of each session's bounded outbound buffer, in frames.
    /// A slow client that fills its buffer loses frames individually; it
    /// never stalls delivery to other sessions.
    pub outbound_buffer: usize,

    /// Authentication-related settings
    pub auth: AuthConfig,
}

/// Authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Usernames granted the admin flag at authentication time
    pub admin_users: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().expect("Invalid default bind address"),
            max_connections: 1000,
            connection_timeout: 60,
            outbound_buffer: 256,
            auth: AuthConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_address.to_string(), "127.0.0.1:8080");
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.connection_timeout, 60);
        assert_eq!(config.outbound_buffer, 256);
        assert!(config.auth.admin_users.is_empty());
    }

    #[test]
    fn test_server_config_custom_values() {
        let config = ServerConfig {
            bind_address: "0.0.0.0:3000".parse().unwrap(),
            max_connections: 5000,
            connection_timeout: 300,
            outbound_buffer: 64,
            auth: AuthConfig {
                admin_users: vec!["root".to_string()],
            },
        };

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.max_connections, 5000);
        assert_eq!(config.connection_timeout, 300);
        assert_eq!(config.outbound_buffer, 64);
        assert_eq!(config.auth.admin_users, vec!["root".to_string()]);
    }
}
