//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use market_data::GraphQlClient;

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(PathBuf::from(path))),
            None => match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Client for the admin API, authenticated when a token is configured.
    pub fn admin_client(&self) -> Result<GraphQlClient> {
        let client = GraphQlClient::new(&self.config.api.admin_url, self.config.api.timeout())
            .context("Failed to build admin API client")?;
        Ok(match &self.config.api.token {
            Some(token) => client.with_bearer(token),
            None => client,
        })
    }

    /// Client for the shop API.
    pub fn shop_client(&self) -> Result<GraphQlClient> {
        GraphQlClient::new(&self.config.api.shop_url, self.config.api.timeout())
            .context("Failed to build shop API client")
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in the directory tree, starting at `start`.
fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                if let Ok(config) = CliConfig::load(path.to_str()?) {
                    return Some((config, path));
                }
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
