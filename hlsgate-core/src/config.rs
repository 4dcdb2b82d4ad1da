use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub hls: HlsConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// HLS delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsConfig {
    /// Target segment length in seconds. Sizes the playlist readiness wait.
    pub fragment_duration_seconds: f64,
    /// Path prefix the HLS routes are mounted under
    pub route_prefix: String,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            fragment_duration_seconds: 7.0,
            route_prefix: "/hls".to_string(),
        }
    }
}

/// Layout of the directory tree written by the external segmenter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// One sub-directory per stream path
    pub root: String,
    /// Playlist file name inside a stream directory
    pub playlist_file: String,
    /// Segment `n` lives at `<stream dir>/<n>.<segment_extension>`
    pub segment_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: "./hls_storage".to_string(),
            playlist_file: "index.m3u8".to_string(),
            segment_extension: "ts".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // HLSGATE_SERVER__HTTP_PORT, HLSGATE_HLS__FRAGMENT_DURATION_SECONDS, ...
        builder = builder.add_source(
            Environment::with_prefix("HLSGATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Get HTTP address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }

    /// Check every setting and collect all problems instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.host.is_empty() {
            errors.push("server.host must not be empty".to_string());
        }
        if self.server.http_port == 0 {
            errors.push("server.http_port must be non-zero".to_string());
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            errors.push(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{}\"",
                self.logging.format
            ));
        }

        let fragment = self.hls.fragment_duration_seconds;
        if !fragment.is_finite() || fragment <= 0.0 {
            errors.push(format!(
                "hls.fragment_duration_seconds must be a positive number, got {fragment}"
            ));
        }
        if !self.hls.route_prefix.starts_with('/') {
            errors.push(format!(
                "hls.route_prefix must start with '/', got \"{}\"",
                self.hls.route_prefix
            ));
        }

        if self.storage.root.is_empty() {
            errors.push("storage.root must not be empty".to_string());
        }
        if self.storage.playlist_file.is_empty() || self.storage.playlist_file.contains('/') {
            errors.push(format!(
                "storage.playlist_file must be a plain file name, got \"{}\"",
                self.storage.playlist_file
            ));
        }
        if self.storage.segment_extension.is_empty()
            || self.storage.segment_extension.contains(['.', '/'])
        {
            errors.push(format!(
                "storage.segment_extension must be a bare extension like \"ts\", got \"{}\"",
                self.storage.segment_extension
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
