//! Core game server implementation.
//!
//! This module contains the main `GameServer` struct and its implementation,
//! wiring the connection registry, the broadcast service, the collaborator
//! boundaries, and the dispatcher into a running accept loop.

use crate::{
    collaborators::{
        AdminPolicy, BasicCredentialValidator, CredentialValidator, InMemoryPlayerStore,
        PlayerStore, SessionFlagAdminPolicy,
    },
    config::ServerConfig,
    connection::{Broadcaster, ConnectionRegistry},
    dispatch::{Dispatcher, HandlerContext},
    error::ServerError,
    handlers::default_registry,
    server::handlers::handle_connection,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// The core game server structure.
///
/// `GameServer` owns the shared pieces every connection uses: the connection
/// registry, the broadcast service, the dispatcher with its fully populated
/// handler registry, and the shutdown channel. Game-logic effects stay behind
/// the collaborator boundaries; the core itself only moves messages.
pub struct GameServer {
    /// Server configuration settings
    config: ServerConfig,

    /// Registry of all live client sessions
    connections: Arc<ConnectionRegistry>,

    /// Dispatcher shared by every connection task
    dispatcher: Arc<Dispatcher>,

    /// Channel for coordinating server shutdown
    shutdown_sender: broadcast::Sender<()>,
}

impl std::fmt::Debug for GameServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameServer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GameServer {
    /// Creates a new game server with the specified configuration and the
    /// default in-process collaborators.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration parameters for server behavior
    ///
    /// # Returns
    ///
    /// A new `GameServer` ready to be started, or `ServerError::Configuration`
    /// if the handler registry could not be assembled.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let player_store: Arc<dyn PlayerStore> = Arc::new(InMemoryPlayerStore::new());
        let credentials: Arc<dyn CredentialValidator> = Arc::new(BasicCredentialValidator::new(
            config.auth.admin_users.iter().cloned(),
        ));
        let admin_policy: Arc<dyn AdminPolicy> = Arc::new(SessionFlagAdminPolicy);
        Self::with_collaborators(config, player_store, credentials, admin_policy)
    }

    /// Creates a game server around caller-supplied collaborator
    /// implementations. This is the seam real deployments and tests use to
    /// swap persistence, credential validation, or admin authorization.
    pub fn with_collaborators(
        config: ServerConfig,
        player_store: Arc<dyn PlayerStore>,
        credentials: Arc<dyn CredentialValidator>,
        admin_policy: Arc<dyn AdminPolicy>,
    ) -> Result<Self, ServerError> {
        // A zero-capacity channel cannot be constructed; catch it here so a
        // bad config fails at startup instead of per accepted connection.
        if config.outbound_buffer == 0 {
            return Err(ServerError::Configuration(
                "outbound_buffer must be greater than 0".to_string(),
            ));
        }

        let connections = Arc::new(ConnectionRegistry::new());
        let ctx = HandlerContext {
            broadcaster: Broadcaster::new(connections.clone()),
            connections: connections.clone(),
            player_store,
            credentials,
            admin_policy,
        };
        let dispatcher = Arc::new(Dispatcher::new(default_registry()?, ctx));
        let (shutdown_sender, _) = broadcast::channel(1);

        Ok(Self {
            config,
            connections,
            dispatcher,
            shutdown_sender,
        })
    }

    /// The shared connection registry.
    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    /// The shared dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Signals the accept loop to stop. Existing connections are not torn
    /// down forcibly; their tasks end when their transports close.
    pub fn shutdown(&self) {
        // No receiver just means start() has not been called yet.
        let _ = self.shutdown_sender.send(());
    }

    /// Starts the game server and begins accepting connections.
    ///
    /// Binds the configured address and runs the accept loop until
    /// [`shutdown`](Self::shutdown) is called. Each accepted connection gets
    /// its own task; a failed accept is logged and the loop continues.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the server started and stopped cleanly, or a `ServerError`
    /// if binding the listener failed.
    pub async fn start(&self) -> Result<(), ServerError> {
        info!("🚀 Starting game server on {}", self.config.bind_address);

        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| {
                ServerError::Network(format!(
                    "failed to bind {}: {e}",
                    self.config.bind_address
                ))
            })?;

        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_receiver.recv() => {
                    info!("🛑 Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            if self.connections.len().await >= self.config.max_connections {
                                warn!("🚧 Connection limit reached, refusing {addr}");
                                drop(stream);
                                continue;
                            }
                            let connections = self.connections.clone();
                            let dispatcher = self.dispatcher.clone();
                            let handshake_timeout = self.config.connection_timeout;
                            let outbound_buffer = self.config.outbound_buffer;
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(
                                    stream,
                                    addr,
                                    connections,
                                    dispatcher,
                                    handshake_timeout,
                                    outbound_buffer,
                                )
                                .await
                                {
                                    warn!("🔌 Connection from {addr} ended with error: {e}");
                                }
                            });
                        }
                        Err(e) => {
                            warn!("🔌 Accept failed: {e}");
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
