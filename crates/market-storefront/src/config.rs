//! Storefront configuration.

use std::path::Path;

use market_data::TimeoutConfig;
use market_observability::LoggingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Env var overriding the shop API URL.
pub const SHOP_API_URL_ENV: &str = "PUBLIC_SHOP_API_URL";

/// Env var overriding the listen address.
pub const LISTEN_ENV: &str = "STOREFRONT_LISTEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Storefront proxy configuration, usually `storefront.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Address to bind, e.g. `127.0.0.1:4321`.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Shop GraphQL endpoint of the commerce backend.
    #[serde(default = "default_shop_api_url")]
    pub shop_api_url: String,

    /// Upstream request timeouts.
    #[serde(default)]
    pub timeout: TimeoutConfig,

    /// Maximum requests handled at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_listen() -> String {
    "127.0.0.1:4321".to_string()
}

fn default_shop_api_url() -> String {
    "http://localhost:3000/shop-api".to_string()
}

fn default_max_concurrency() -> usize {
    256
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shop_api_url: default_shop_api_url(),
            timeout: TimeoutConfig::default(),
            max_concurrency: default_max_concurrency(),
            logging: LoggingConfig::default(),
        }
    }
}

impl StorefrontConfig {
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Load `path` if it exists, then apply env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let display = path.display().to_string();
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: display.clone(),
                source,
            })?;
            Self::from_toml_str(&content, &display)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(SHOP_API_URL_ENV).filter(|v| !v.is_empty()) {
            self.shop_api_url = url;
        }
        if let Some(listen) = lookup(LISTEN_ENV).filter(|v| !v.is_empty()) {
            self.listen = listen;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.shop_api_url.starts_with("http://") && !self.shop_api_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "shop_api_url must be an http(s) URL, got \"{}\"",
                self.shop_api_url
            )));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::Invalid("max_concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = StorefrontConfig::from_toml_str("", "storefront.toml").unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = StorefrontConfig::from_toml_str(
            r#"
            listen = "0.0.0.0:8080"
            shop_api_url = "https://shop.example.com/shop-api"

            [timeout]
            connect = 500
            total = 3000

            [logging]
            level = "debug"
            format = "json"
            "#,
            "storefront.toml",
        )
        .unwrap();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.timeout.total, Duration::from_millis(3000));
        assert_eq!(config.logging.format, market_observability::LogFormat::Json);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = StorefrontConfig::default();
        config.apply_env(|key| match key {
            SHOP_API_URL_ENV => Some("http://vendure:3000/shop-api".to_string()),
            LISTEN_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.shop_api_url, "http://vendure:3000/shop-api");
        assert_eq!(config.listen, "127.0.0.1:4321");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = StorefrontConfig {
            shop_api_url: "localhost:3000".to_string(),
            ..StorefrontConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
