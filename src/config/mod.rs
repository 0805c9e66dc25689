// Configuration module entry point
// Merges defaults, config file, environment, and command line into one immutable value

mod cli;
mod types;

use crate::logger::ACCESS_LOG_FORMATS;
use std::net::SocketAddr;

pub use cli::Cli;
pub use types::{Config, HttpConfig, LoggingConfig, ServerConfig};

/// Startup configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid address: {0}")]
    Address(String),

    #[error("root directory '{path}' is not usable: {reason}")]
    Root { path: String, reason: String },

    #[error("compression level must be 0-9, got {0}")]
    CompressionLevel(u32),

    #[error("unknown access log format '{0}' (expected combined, common, or json)")]
    AccessLogFormat(String),
}

impl Config {
    /// Load configuration using the command line for file location and overrides
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let cfg = Self::load_from(&cli.config, cli)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: defaults, file, `STATISERVER_*` environment, command line.
    pub fn load_from(config_path: &str, overrides: &Cli) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080_i64)?
            .set_default("server.root", ".")?
            .set_default("http.cache_max_age", 10_i64)?
            .set_default("http.compression_level", 6_i64)?
            .set_default("http.rejected_paths", vec!["/favicon.ico"])?
            .set_default("http.server_name", "statiserver")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("STATISERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option(
                "server.root",
                overrides
                    .root
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option(
                "server.workers",
                overrides.workers.and_then(|w| u64::try_from(w).ok()),
            )?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check values that deserialize fine but cannot be served
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.get_socket_addr()?;

        if self.http.compression_level > 9 {
            return Err(ConfigError::CompressionLevel(self.http.compression_level));
        }

        if !ACCESS_LOG_FORMATS.contains(&self.logging.access_log_format.as_str()) {
            return Err(ConfigError::AccessLogFormat(
                self.logging.access_log_format.clone(),
            ));
        }

        let root = &self.server.root;
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ConfigError::Root {
                path: root.display().to_string(),
                reason: "not a directory".to_string(),
            }),
            Err(e) => Err(ConfigError::Root {
                path: root.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ConfigError::Address(format!("{}:{} ({e})", self.server.host, self.server.port))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING_FILE: &str = "statiserver-test-config-that-does-not-exist";

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from(MISSING_FILE, &Cli::default()).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.http.cache_max_age, 10);
        assert_eq!(cfg.http.compression_level, 6);
        assert_eq!(cfg.http.rejected_paths, vec!["/favicon.ico".to_string()]);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            root: Some(dir.path().to_path_buf()),
            host: Some("0.0.0.0".to_string()),
            port: Some(3000),
            workers: Some(2),
            ..Cli::default()
        };
        let cfg = Config::load_from(MISSING_FILE, &cli).unwrap();
        assert_eq!(cfg.server.root, dir.path());
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.workers, Some(2));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(
            &file,
            "[http]\ncache_max_age = 60\nrejected_paths = [\"/favicon.ico\", \"/robots.txt\"]\n",
        )
        .unwrap();
        let base = dir.path().join("custom");
        let cfg = Config::load_from(base.to_str().unwrap(), &Cli::default()).unwrap();
        assert_eq!(cfg.http.cache_max_age, 60);
        assert_eq!(cfg.http.rejected_paths.len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = Config::load_from(MISSING_FILE, &Cli::default()).unwrap();
        cfg.server.root = "/definitely/not/a/real/root".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::Root { .. })));

        let dir = tempfile::tempdir().unwrap();
        cfg.server.root = dir.path().to_path_buf();
        cfg.http.compression_level = 12;
        assert!(matches!(cfg.validate(), Err(ConfigError::CompressionLevel(12))));

        cfg.http.compression_level = 6;
        cfg.logging.access_log_format = "xml".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::AccessLogFormat(_))));

        cfg.logging.access_log_format = "json".to_string();
        cfg.server.host = "not an address".to_string();
        assert!(matches!(cfg.get_socket_addr(), Err(ConfigError::Address(_))));
    }
}
