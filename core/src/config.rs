use serde::{Deserialize, Serialize};

use crate::errors::{self, ConfigError};

pub const CONFIG_ENV_VAR: &str = "WATCH_RELAY_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    pub upstream: UpstreamConfig,
}

/// Where payloads are forwarded to.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// No timeout when unset; the request waits for the server.
    pub timeout_ms: Option<u64>,
    /// The WatchDog server answers with bare JSON and no status line.
    pub accept_http09: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "10.0.0.4".to_string(),
            port: 3002,
            timeout_ms: None,
            accept_http09: true,
        }
    }
}

pub async fn load_config(config_path: Option<&str>) -> errors::Result<RelayConfig> {
    let config = match config_path {
        Some(path) => RelayConfig::from_file(path)?,
        None if std::env::var_os(CONFIG_ENV_VAR).is_some() => RelayConfig::from_env()?,
        None => RelayConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

impl RelayConfig {
    pub fn from_file(path: &str) -> errors::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            origin: path.to_string(),
            error: Box::new(e),
        })?;
        let config: RelayConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_env() -> errors::Result<Self> {
        let config_str = std::env::var(CONFIG_ENV_VAR).map_err(|e| ConfigError::LoadFailed {
            origin: CONFIG_ENV_VAR.to_string(),
            error: Box::new(e),
        })?;
        let config: RelayConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let upstream = &self.upstream;
        if upstream.scheme != "http" && upstream.scheme != "https" {
            return Err(ConfigError::ValidationFailed {
                reason: format!("Unsupported upstream scheme '{}'", upstream.scheme),
            });
        }
        if upstream.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "Upstream host cannot be empty".to_string(),
            });
        }
        if upstream.port == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "Upstream port cannot be 0".to_string(),
            });
        }
        if upstream.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                reason: "Upstream timeout must be positive when set".to_string(),
            });
        }
        Ok(())
    }
}
