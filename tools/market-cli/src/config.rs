//! CLI configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use market_data::TimeoutConfig;
use market_observability::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Config file names, searched in this order.
pub const CONFIG_NAMES: [&str; 3] = ["market.toml", ".market.toml", "market.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Backend endpoints and credentials.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging used with `--verbose`.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Admin API endpoint.
    #[serde(default = "default_admin_url")]
    pub admin_url: String,

    /// Shop API endpoint.
    #[serde(default = "default_shop_url")]
    pub shop_url: String,

    /// Bearer token for the admin API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_admin_url() -> String {
    "http://localhost:3000/admin-api".to_string()
}

fn default_shop_url() -> String {
    "http://localhost:3000/shop-api".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_url: default_admin_url(),
            shop_url: default_shop_url(),
            token: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> TimeoutConfig {
        TimeoutConfig::from_total(Duration::from_millis(self.timeout_ms))
    }
}

/// Generate a default market.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Marketplace CLI configuration

[api]
admin_url = "{admin}"
shop_url = "{shop}"
# token = "<admin bearer token>"
timeout_ms = {timeout}

[logging]
level = "info"
format = "human"
"#,
        admin = default_admin_url(),
        shop = default_shop_url(),
        timeout = default_timeout_ms(),
    )
}
