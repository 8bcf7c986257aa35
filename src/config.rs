//! Application configuration.
//!
//! Layered from `config.toml`, `SERVER_*` environment variables, and
//! built-in defaults. Bound once at startup into an immutable value;
//! request handling only ever sees it behind [`ServerContext`].

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; CPU core count when unset.
    pub workers: Option<usize>,
}

/// Which tree is served and how files are presented.
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    /// Root directory exposed under the `/file` route.
    pub root: String,
    /// Offer image/video files for in-browser display instead of
    /// forcing a download.
    pub inline_display: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

impl Config {
    /// Load from the default `config.toml` next to the binary.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without
    /// extension), then the `SERVER_*` environment, then defaults.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("files.root", ".")?
            .set_default("files.inline_display", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Immutable per-process state handed to every request.
///
/// Constructed exactly once at startup; nothing mutates it afterwards,
/// so request handlers share it lock-free.
#[derive(Debug)]
pub struct ServerContext {
    pub config: Config,
    /// Canonicalized served root, the resolver's containment anchor.
    pub root: PathBuf,
}

impl ServerContext {
    /// Canonicalize the configured root once. Fails fast when the
    /// directory does not exist or is unreadable.
    pub fn new(config: Config) -> std::io::Result<Self> {
        let root = std::fs::canonicalize(&config.files.root)?;
        Ok(Self { config, root })
    }
}
