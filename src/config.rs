//! Server configuration: TOML file, environment, then command-line flags.

use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Runtime settings for the pool server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// SQLite database path.
    database_url: String,

    /// bcrypt work factor for stored passwords.
    bcrypt_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "pickem.db".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Applies `DATABASE_URL`, `PICKEM_HOST`, `PICKEM_PORT` and
    /// `PICKEM_BCRYPT_COST` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse.
    #[instrument(skip(self))]
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key lookup, e.g. a map in tests.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a numeric variable does not parse.
    pub fn with_vars(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            debug!(database_url = %url, "DATABASE_URL override");
            self.database_url = url;
        }
        if let Some(host) = lookup("PICKEM_HOST").filter(|v| !v.trim().is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("PICKEM_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid PICKEM_PORT '{}': {}", port, e)))?;
        }
        if let Some(cost) = lookup("PICKEM_BCRYPT_COST") {
            self.bcrypt_cost = cost.trim().parse().map_err(|e| {
                ConfigError::new(format!("Invalid PICKEM_BCRYPT_COST '{}': {}", cost, e))
            })?;
            if self.bcrypt_cost < 4 {
                warn!(cost = self.bcrypt_cost, "bcrypt cost below minimum, 4 will be used");
            }
        }
        Ok(self)
    }

    /// Address to bind, as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ServerConfig = toml::from_str("port = 8080\n").expect("valid toml");
        assert_eq!(8080, *config.port());
        assert_eq!("127.0.0.1", config.host());
        assert_eq!("pickem.db", config.database_url());
    }

    #[test]
    fn environment_overrides_file() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "/tmp/pool.db"),
            ("PICKEM_PORT", "4100"),
            ("PICKEM_HOST", "0.0.0.0"),
        ]
        .into_iter()
        .collect();
        let config = ServerConfig::default()
            .with_vars(|k| vars.get(k).map(|v| v.to_string()))
            .expect("valid overrides");
        assert_eq!("/tmp/pool.db", config.database_url());
        assert_eq!("0.0.0.0:4100", config.bind_addr());
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = ServerConfig::default()
            .with_vars(|k| (k == "PICKEM_PORT").then(|| "eighty".to_string()))
            .expect_err("non-numeric port");
        assert!(err.message.contains("PICKEM_PORT"));
    }

    #[test]
    fn setters_apply_cli_flags() {
        let config = ServerConfig::default().with_port(9000).with_host("::1".to_string());
        assert_eq!("::1:9000", config.bind_addr());
    }
}
