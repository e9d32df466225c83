// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};

use crate::registry::{RegistryDefaults, DEFAULT_DEVELOPER_ID, DEFAULT_PRICING, DEFAULT_THUMBNAIL};

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
    /// Whether to answer cross-origin requests from the web UI
    pub enable_cors: bool,
}

/// Configuration for the model registry
#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    /// Developer id stamped on every new listing
    pub developer_id: i64,
    /// Load the sample listings at startup
    pub seed_samples: bool,
    /// Return token keys unmasked in API responses
    pub expose_token_keys: bool,
    /// Thumbnail used when a listing has none
    pub default_thumbnail: String,
    /// Pricing label used when a listing has none
    pub default_pricing: String,
}

impl RegistryConfig {
    pub fn defaults(&self) -> RegistryDefaults {
        RegistryDefaults {
            developer_id: self.developer_id,
            thumbnail_url: self.default_thumbnail.clone(),
            pricing: self.default_pricing.clone(),
        }
    }
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Directory for the rolling log files
    pub directory: PathBuf,
}

/// Configuration for the terminal browser's HTTP client
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Timeout for each request to the server, in seconds
    pub request_timeout_secs: u64,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
    pub client: ClientConfig,
}

impl Settings {
    /// Loads settings from the `config` directory under the current working
    /// directory. See [`Settings::load`].
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("Failed to get current directory: {}", e)))?
            .join("config");
        Self::load(&config_dir)
    }

    /// Loads settings from multiple sources in the following order of
    /// precedence (highest to lowest):
    /// 1. Environment variables prefixed with MODELMART__ (e.g. MODELMART__SERVER__PORT)
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml) if present
    /// 4. Built-in defaults
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let default_config = config_dir.join("default.toml");
        let local_config = config_dir.join("local.toml");

        let settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.enable_cors", true)?
            .set_default("registry.developer_id", DEFAULT_DEVELOPER_ID)?
            .set_default("registry.seed_samples", true)?
            .set_default("registry.expose_token_keys", false)?
            .set_default("registry.default_thumbnail", DEFAULT_THUMBNAIL)?
            .set_default("registry.default_pricing", DEFAULT_PRICING)?
            .set_default("logging.level", "info")?
            .set_default("logging.directory", "logs")?
            .set_default("client.request_timeout_secs", 30)?
            .add_source(File::from(default_config).required(false))
            .add_source(File::from(local_config).required(false))
            .add_source(Environment::with_prefix("MODELMART")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Base URL of the configured server
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Message("server.host must not be empty".to_string()));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Message(
                format!("Port must be between 1 and 65535, got: {}", self.server.port)
            ));
        }

        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be greater than 0".to_string()
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_files() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.registry.developer_id, 1001);
        assert!(!settings.registry.expose_token_keys);
        assert_eq!(settings.registry.default_pricing, "Free tier");
        assert_eq!(settings.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_local_overrides_default() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n\n[registry]\nseed_samples = false\n",
        )
        .unwrap();
        fs::write(dir.path().join("local.toml"), "[server]\nport = 9100\n").unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert!(!settings.registry.seed_samples);
        assert_eq!(settings.registry.defaults().developer_id, 1001);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("default.toml"), "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(Settings::load(dir.path()).is_err());

        fs::write(dir.path().join("default.toml"), "[client]\nrequest_timeout_secs = 0\n").unwrap();
        assert!(Settings::load(dir.path()).is_err());
    }
}
