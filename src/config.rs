//! Runtime configuration, read from the environment.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port for the REST API.
    pub port: u16,
    /// Path to the local database file.
    pub db_path: PathBuf,
    /// Allowed CORS origins. `["*"]` means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/tanbih.db"),
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl Config {
    /// Build a config from `TANBIH_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(port) = std::env::var("TANBIH_PORT") {
            config.port = port.parse().map_err(|e| ConfigError::InvalidValue {
                key: "TANBIH_PORT".to_string(),
                message: format!("{e}"),
            })?;
        }

        if let Ok(path) = std::env::var("TANBIH_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Ok(origins) = std::env::var("TANBIH_CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if config.cors_origins.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "TANBIH_CORS_ORIGINS".to_string(),
                    message: "expected a comma-separated list of origins".to_string(),
                });
            }
        }

        Ok(config)
    }

    /// Whether CORS should allow any origin.
    pub fn allow_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
