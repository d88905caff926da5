//! # API Configuration
//!
//! Configuration management for the REST server.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MARGIN_PORT=8080                                                   │
//! │     MARGIN_DATABASE_PATH=/var/lib/margin/margin.db                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path> or MARGIN_CONFIG                                   │
//! │     ~/.config/margin-ledger/margin.toml (Linux)                        │
//! │     ~/Library/Application Support/com.margin.ledger/margin.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     127.0.0.1:3001, ./margin.db                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # margin.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 3001
//!
//! [database]
//! path = "./margin.db"
//! max_connections = 5
//! connect_timeout_secs = 30
//! seed_default_platforms = true
//!
//! [log]
//! filter = "info,margin=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or parsing the config file failed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// A loaded value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ConfigLoadFailed(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Server Settings
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 127.0.0.1, local UI only).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// SQLite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file path. Created if missing.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection before a request fails.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Insert the default platforms when the table is empty at startup.
    #[serde(default = "default_seed_platforms")]
    pub seed_default_platforms: bool,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./margin.db")
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_seed_platforms() -> bool {
    true
}

impl DatabaseSettings {
    /// Pool acquire timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            seed_default_platforms: default_seed_platforms(),
        }
    }
}

// =============================================================================
// Log Settings
// =============================================================================

/// Tracing settings. `RUST_LOG` wins over `filter` when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,margin=debug,sqlx=warn".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// API Config
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub log: LogSettings,
}

impl ApiConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from the given path, `MARGIN_CONFIG`, or the platform config
    ///    dir (if the file exists)
    /// 3. Override with environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("MARGIN_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "database.path must not be empty".into(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "server.port must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidConfig(
                "database.max_connections must be at least 1".into(),
            ));
        }

        if self.database.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "database.connect_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("MARGIN_BIND_ADDR") {
            debug!(addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("MARGIN_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(value = %port, "Ignoring unparsable MARGIN_PORT"),
            }
        }

        if let Ok(path) = std::env::var("MARGIN_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(max) = std::env::var("MARGIN_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.database.max_connections = m,
                Err(_) => warn!(value = %max, "Ignoring unparsable MARGIN_DB_MAX_CONNECTIONS"),
            }
        }

        if let Ok(secs) = std::env::var("MARGIN_DB_CONNECT_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.database.connect_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring unparsable MARGIN_DB_CONNECT_TIMEOUT_SECS"),
            }
        }

        if let Ok(seed) = std::env::var("MARGIN_SEED_PLATFORMS") {
            match parse_flag(&seed) {
                Some(flag) => self.database.seed_default_platforms = flag,
                None => warn!(value = %seed, "Ignoring unparsable MARGIN_SEED_PLATFORMS"),
            }
        }

        if let Ok(filter) = std::env::var("MARGIN_LOG_FILTER") {
            self.log.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "margin", "ledger")
            .map(|dirs| dirs.config_dir().join("margin.toml"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();

        assert_eq!(config.server.bind_address(), "127.0.0.1:3001");
        assert_eq!(config.database.path, PathBuf::from("./margin.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(30));
        assert!(config.database.seed_default_platforms);
        assert_eq!(config.log.filter, "info,margin=debug,sqlx=warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [database]
            seed_default_platforms = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.database.path, PathBuf::from("./margin.db"));
        assert!(!config.database.seed_default_platforms);
        assert_eq!(config.log.filter, "info,margin=debug,sqlx=warn");
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));

        let mut config = ApiConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.database.connect_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("margin-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            [database]
            path = "/tmp/ledger.db"
            max_connections = 2
            connect_timeout_secs = 3
            "#,
        )
        .unwrap();

        let config = ApiConfig::load(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.connect_timeout(), Duration::from_secs(3));
        assert_eq!(config.database.path, PathBuf::from("/tmp/ledger.db"));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let path = std::env::temp_dir().join(format!("margin-config-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

        let result = ApiConfig::load(Some(path.clone()));
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::ConfigLoadFailed(_))));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
