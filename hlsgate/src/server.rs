//! Server lifecycle management
//!
//! Runs the HTTP server and drives graceful shutdown on Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use hlsgate_api::{create_router, AppState};
use hlsgate_core::Config;
use hlsgate_livestream::FileStreamProvider;

/// How long in-flight requests get to finish after shutdown starts
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HlsGateServer {
    config: Config,
    state: AppState,
    provider: Arc<FileStreamProvider>,
    shutdown: CancellationToken,
}

impl HlsGateServer {
    pub const fn new(
        config: Config,
        state: AppState,
        provider: Arc<FileStreamProvider>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            state,
            provider,
            shutdown,
        }
    }

    /// Start the HTTP server and wait for a shutdown signal
    pub async fn start(self) -> anyhow::Result<()> {
        let http_addr: SocketAddr = self
            .config
            .http_address()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid HTTP address '{}': {e}", self.config.http_address()))?;
        let listener = tokio::net::TcpListener::bind(http_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind HTTP address {http_addr}: {e}"))?;
        info!("HTTP server listening on {}", http_addr);

        let router = create_router(self.state, &self.config.hls.route_prefix);
        let graceful = self.shutdown.clone();
        let mut http_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { graceful.cancelled().await })
            .await
            {
                error!("HTTP server error: {}", e);
            }
            info!("HTTP server shut down gracefully");
        });

        tokio::select! {
            _ = &mut http_handle => {
                error!("HTTP server stopped unexpectedly");
            }
            () = shutdown_signal() => {
                info!("Shutdown signal received, starting graceful shutdown...");
            }
        }

        // Stops accepting connections and ends playlist waits still in progress
        self.shutdown.cancel();

        if !http_handle.is_finished()
            && tokio::time::timeout(DRAIN_TIMEOUT, http_handle).await.is_err()
        {
            warn!(
                "Drain timeout of {}s reached, proceeding with shutdown",
                DRAIN_TIMEOUT.as_secs()
            );
        }

        info!("Releasing {} registered stream(s)", self.provider.len());
        self.provider.clear();

        info!("hlsgate shut down complete");
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C signal");
            }
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
