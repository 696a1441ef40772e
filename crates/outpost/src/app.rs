//! Main application logic and lifecycle management.
//!
//! This module contains the core `Application` struct that orchestrates
//! server startup, the run loop, and graceful shutdown.

use crate::{cli::CliArgs, config::AppConfig, logging::display_banner, signals::wait_for_shutdown_signal};
use game_server::GameServer;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Main application struct.
///
/// The `Application` struct manages the complete lifecycle of the Outpost
/// server: configuration loading with CLI overrides, server initialization,
/// and graceful shutdown handling.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Game server instance
    server: Arc<GameServer>,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// Loads configuration, applies CLI overrides, validates settings, and
    /// initializes the game server with proper error handling.
    ///
    /// # Arguments
    ///
    /// * `args` - Parsed command-line arguments
    ///
    /// # Returns
    ///
    /// A configured `Application` instance ready to run, or an error if
    /// initialization failed.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        // Apply CLI overrides
        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        }
        info!("✅ Configuration loaded and validated successfully");

        // Display banner after logging is setup
        display_banner();

        let server_config = config.to_server_config()?;
        let server = Arc::new(GameServer::new(server_config)?);

        info!(
            "📂 Config: {} | Admins: {}",
            args.config_path.display(),
            config.auth.admin_users.len()
        );

        Ok(Self { config, server })
    }

    /// Runs the application until a shutdown signal arrives.
    ///
    /// Starts the server accept loop in the background, waits for SIGINT or
    /// SIGTERM, and then drains cleanly.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the application ran and shut down successfully, or an
    /// error if there was a critical failure during execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting Outpost Game Server Application");
        self.log_configuration_summary();

        // Start server in background
        let server_handle = {
            let server = self.server.clone();
            tokio::spawn(async move {
                match server.start().await {
                    Ok(()) => {
                        info!("✅ Server completed successfully");
                    }
                    Err(e) => {
                        error!("❌ Server error: {e:?}");
                        std::process::exit(1);
                    }
                }
            })
        };

        info!("✅ Outpost Server is now running!");
        info!(
            "🎮 Ready to accept connections on {}",
            self.config.server.bind_address
        );
        info!("🛑 Press Ctrl+C to gracefully shutdown");

        // Wait for shutdown signal
        wait_for_shutdown_signal().await?;

        info!("🛑 Shutdown signal received, beginning graceful shutdown...");
        self.server.shutdown();

        // Wait for the accept loop to stop gracefully
        if tokio::time::timeout(tokio::time::Duration::from_secs(8), server_handle)
            .await
            .is_err()
        {
            warn!("⏰ Server task did not complete within timeout, proceeding with cleanup");
        } else {
            info!("✅ Server task completed gracefully");
        }

        let remaining = self.server.connections().len().await;
        if remaining > 0 {
            info!("⏳ {remaining} connection(s) still draining");
        }

        info!("✅ Outpost Game Server shutdown complete");
        info!("👋 Thank you for using Outpost!");

        Ok(())
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!("  👥 Max connections: {}", self.config.server.max_connections);
        info!(
            "  ⏱️ Handshake timeout: {}s",
            self.config.server.connection_timeout
        );
        info!(
            "  📦 Outbound buffer: {} frame(s) per session",
            self.config.server.outbound_buffer
        );
    }
}
