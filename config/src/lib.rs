//! # Configuration Management for listhaus
//!
//! This crate provides centralized configuration structures for all listhaus components,
//! including database, cache, and signal system settings.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{CacheConfig, DatabaseConfig, SignalConfig};
//!
//! let db_config = DatabaseConfig::new("sqlite://listhaus.db".to_string(), "wp_".to_string());
//! let cache_config = CacheConfig::new(3600, 10_000);
//! let signal_config = SignalConfig::new(64);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [database]
//! url = "sqlite://listhaus.db"
//! table_prefix = "wp_"
//! min_connections = 1
//! max_connections = 5
//! connection_timeout_seconds = 30
//! idle_timeout_seconds = 600
//! max_lifetime_seconds = 3600
//!
//! [cache]
//! enabled = true
//! default_ttl = 3600
//! max_capacity = 10000
//!
//! [signal]
//! max_callbacks = 64
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from listhaus.toml (or the path in LISTHAUS_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./listhaus.toml";
const CONFIG_PATH_VAR: &str = "LISTHAUS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub signal: SignalConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection url, e.g. `sqlite://listhaus.db` or `sqlite::memory:`
    pub url: String,
    /// Prefix prepended to every table name
    pub table_prefix: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
    /// 0 keeps idle connections open forever
    pub idle_timeout_seconds: u64,
    /// 0 disables the lifetime limit
    pub max_lifetime_seconds: u64,
}

/// Query cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Default TTL for cache entries (in seconds)
    pub default_ttl: u64,
    /// Maximum number of cached entries
    pub max_capacity: u64,
}

/// Signal system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub max_callbacks: usize,
}

impl AppConfig {
    /// Load configuration from the TOML file named by `LISTHAUS_CONFIG` (read from
    /// the environment or `.env`), falling back to `./listhaus.toml`
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the variable may come from the environment
        let _ = dotenvy::dotenv();

        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Database validations
        if self.database.url.is_empty() {
            return Err(ConfigError::Invalid(
                "Database url cannot be empty".to_string(),
            ));
        }
        if !self
            .database
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Invalid(
                "Database table_prefix may only contain alphanumeric characters and underscores"
                    .to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "Database max_connections must be greater than 0".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(
                "Database min_connections cannot be greater than max_connections".to_string(),
            ));
        }
        if self.database.connection_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "Database connection_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        // Cache validations
        if self.cache.max_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Cache max_capacity must be greater than 0".to_string(),
            ));
        }

        // Signal validations
        if self.signal.max_callbacks == 0 {
            return Err(ConfigError::Invalid(
                "Signal max_callbacks must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Configuration for a private in-memory database, used by tests and demos
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseConfig::in_memory(),
            ..Self::default()
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with default pool settings
    pub fn new(url: String, table_prefix: String) -> Self {
        Self {
            url,
            table_prefix,
            ..Self::default()
        }
    }

    /// Private in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:".to_string(), "wp_".to_string())
    }

    /// Whether the url points at an in-memory database, which lives only as
    /// long as its single connection
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Build connection string
    pub fn connection_string(&self) -> &str {
        &self.url
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://listhaus.db".to_string(),
            table_prefix: "wp_".to_string(),
            min_connections: 1,
            max_connections: 5,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
            max_lifetime_seconds: 3600,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(default_ttl: u64, max_capacity: u64) -> Self {
        Self {
            enabled: true,
            default_ttl,
            max_capacity,
        }
    }

    /// Cache configuration that turns caching off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: 3600, // 1 hour
            max_capacity: 10_000,
        }
    }
}

impl SignalConfig {
    /// Create a new signal configuration
    pub fn new(max_callbacks: usize) -> Self {
        Self { max_callbacks }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self { max_callbacks: 64 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            url = "sqlite://subscribers.db"
            table_prefix = "site2_"
            min_connections = 1
            max_connections = 4
            connection_timeout_seconds = 10
            idle_timeout_seconds = 0
            max_lifetime_seconds = 0

            [cache]
            enabled = false
            default_ttl = 60
            max_capacity = 500

            [signal]
            max_callbacks = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "sqlite://subscribers.db");
        assert_eq!(config.database.table_prefix, "site2_");
        assert_eq!(config.database.max_connections, 4);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.default_ttl, 60);
        assert_eq!(config.signal.max_callbacks, 8);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = AppConfig::from_toml_str("[database]\nurl = \"sqlite::memory:\"\n").unwrap();

        assert!(config.database.is_in_memory());
        assert_eq!(config.database.table_prefix, "wp_");
        assert_eq!(config.cache.default_ttl, 3600);
        assert_eq!(config.signal.max_callbacks, 64);
    }

    #[test]
    fn rejects_invalid_values() {
        let cases = [
            "[database]\nurl = \"\"\n",
            "[database]\nmax_connections = 0\n",
            "[database]\nmin_connections = 9\nmax_connections = 2\n",
            "[database]\ntable_prefix = \"wp-; DROP\"\n",
            "[cache]\nmax_capacity = 0\n",
            "[signal]\nmax_callbacks = 0\n",
        ];

        for case in cases {
            assert!(
                matches!(AppConfig::from_toml_str(case), Err(ConfigError::Invalid(_))),
                "should reject: {}",
                case
            );
        }
    }

    #[test]
    fn reports_toml_syntax_errors() {
        assert!(matches!(
            AppConfig::from_toml_str("[database\nurl ="),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\ndefault_ttl = 120").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cache.default_ttl, 120);
        assert!(config.cache.enabled);
    }

    #[test]
    fn in_memory_defaults_validate() {
        let config = AppConfig::in_memory();
        assert!(config.validate().is_ok());
        assert!(config.database.is_in_memory());
    }
}
