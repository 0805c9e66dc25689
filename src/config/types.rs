// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
///
/// Built once at startup and shared read-only across every request.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory that request paths are joined onto
    pub root: PathBuf,
    pub workers: Option<usize>,
}

/// HTTP behavior configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Freshness window in seconds for `cache-control` and `expires`
    pub cache_max_age: u64,
    /// gzip/deflate level, 0-9
    pub compression_level: u32,
    /// Paths answered through the error path without touching the filesystem
    pub rejected_paths: Vec<String>,
    pub server_name: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}
