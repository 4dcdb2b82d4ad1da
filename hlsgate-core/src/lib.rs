// hlsgate-core - shared configuration and logging for the HLS gateway

pub mod bootstrap;
pub mod config;
pub mod logging;

pub use config::{Config, HlsConfig, LoggingConfig, ServerConfig, StorageConfig};
