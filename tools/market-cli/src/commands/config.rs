//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("[api]");
    ctx.output.kv("admin_url", &ctx.config.api.admin_url);
    ctx.output.kv("shop_url", &ctx.config.api.shop_url);
    ctx.output.kv("token", if ctx.config.api.token.is_some() { "(set)" } else { "(none)" });
    ctx.output.kv("timeout_ms", &ctx.config.api.timeout_ms.to_string());

    ctx.output.info("[logging]");
    ctx.output.kv("level", ctx.config.logging.level.as_str());
    ctx.output.kv("filter", &ctx.config.logging.filter_directives());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("market.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check(&ctx.config);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Errors and warnings for a configuration.
fn check(config: &CliConfig) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (key, url) in [("api.admin_url", &config.api.admin_url), ("api.shop_url", &config.api.shop_url)] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("{} must be an http(s) URL", key));
        }
    }

    if config.api.timeout_ms == 0 {
        errors.push("api.timeout_ms must be greater than 0".to_string());
    }

    if config.api.token.is_none() {
        warnings.push("api.token is not set; register-seller will run unauthenticated".to_string());
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults_warn_about_token() {
        let (errors, warnings) = check(&CliConfig::default());
        assert!(errors.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_check_rejects_bad_urls_and_timeout() {
        let mut config = CliConfig::default();
        config.api.shop_url = "localhost:3000/shop-api".to_string();
        config.api.timeout_ms = 0;
        config.api.token = Some("t".to_string());

        let (errors, warnings) = check(&config);
        assert_eq!(
            errors,
            vec![
                "api.shop_url must be an http(s) URL".to_string(),
                "api.timeout_ms must be greater than 0".to_string(),
            ]
        );
        assert!(warnings.is_empty());
    }
}
