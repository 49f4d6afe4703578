//! Remote controller client configuration
//!
//! Everything the client needs is passed once at construction; the
//! built client has no mutable shared state.

use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkApiConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Retries on transient network failures only; application error
    /// answers are never retried.
    #[serde(default = "default_retries")]
    pub number_of_retries: u32,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    1
}

impl NetworkApiConfig {
    pub fn new(url: String, username: String, password: String) -> Self {
        Self {
            url,
            username,
            password,
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            number_of_retries: default_retries(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("controller url is required");
        }
        if self.username.is_empty() {
            bail!("controller username is required");
        }
        if self.password.is_empty() {
            bail!("controller password is required");
        }
        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            bail!("controller timeouts must be positive");
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied_on_deserialize() {
        let raw = r#"{"url": "https://controller", "username": "u", "password": "p"}"#;
        let config: NetworkApiConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.read_timeout_secs, 30);
        assert_eq!(config.number_of_retries, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_missing_credentials() {
        let config = NetworkApiConfig::new(
            "https://controller".to_string(),
            String::new(),
            "p".to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeouts() {
        let mut config = NetworkApiConfig::new(
            "https://controller".to_string(),
            "u".to_string(),
            "p".to_string(),
        );
        config.read_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
