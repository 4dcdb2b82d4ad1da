mod server;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use hlsgate_api::AppState;
use hlsgate_core::{bootstrap::load_config, logging, Config};
use hlsgate_livestream::{FileLayout, FileStreamProvider, HlsDeliveryApi, StreamResolver};

use server::HlsGateServer;

#[derive(Parser, Debug)]
#[command(name = "hlsgate")]
#[command(about = "HLS playlist and segment delivery gateway", long_about = None)]
struct Args {
    /// Config file (YAML/TOML/JSON)
    #[arg(long, short)]
    config: Option<String>,

    /// HTTP listen host
    #[arg(long)]
    host: Option<String>,

    /// HTTP listen port
    #[arg(long)]
    port: Option<u16>,

    /// Directory the segmenter writes stream directories into
    #[arg(long)]
    storage_root: Option<String>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.http_port = port;
        }
        if let Some(root) = self.storage_root {
            config.storage.root = root;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration, command line wins over file and environment
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);

    // 2. Validate configuration (fail fast on misconfigurations)
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 3. Initialize logging
    logging::init_logging(&config.logging)?;
    info!("hlsgate starting...");
    info!("HTTP address: {}", config.http_address());

    // 4. Stream provider over the segmenter's output directory
    let provider = Arc::new(FileStreamProvider::new(
        &config.storage.root,
        FileLayout {
            playlist_file: config.storage.playlist_file.clone(),
            segment_extension: config.storage.segment_extension.clone(),
        },
    ));
    info!(root = %provider.root().display(), "Using file-backed stream provider");

    // 5. Delivery API and HTTP state
    let delivery = HlsDeliveryApi::new(
        StreamResolver::new(provider.clone()),
        config.hls.fragment_duration_seconds,
    );
    info!(
        fragment_duration_seconds = config.hls.fragment_duration_seconds,
        max_attempts = delivery.max_attempts(),
        "Playlist readiness wait configured"
    );
    let shutdown = CancellationToken::new();
    let state = AppState::new(delivery, &config, shutdown.clone());

    // 6. Serve until shutdown
    HlsGateServer::new(config, state, provider, shutdown).start().await
}
