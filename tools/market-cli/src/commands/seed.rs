//! Seed an in-memory marketplace.

use std::fs;

use anyhow::{Context as _, Result};
use market_api::{seed, Marketplace};

use super::SeedArgs;
use crate::context::Context;

/// Run the seed command.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    ctx.output.header("Seeding marketplace");

    let market = Marketplace::in_memory().context("Failed to start in-memory host")?;
    let host = market.host();

    let spinner = ctx.output.spinner("Creating sellers, catalog and customers...");
    let report = seed(host, &host.superadmin_context()).await;
    spinner.finish_and_clear();
    let report = report?;

    if let Some(path) = &args.snapshot {
        let path = ctx.resolve_path(path);
        let content = serde_json::to_string_pretty(&host.snapshot())?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        ctx.output.debug(&format!("Snapshot written to {}", path.display()));
    }

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    if let Some(zone) = &report.tax_zone_id {
        ctx.output.kv("Tax zone", zone.as_str());
    }
    ctx.output.kv("Products", &report.products_created.to_string());
    ctx.output.kv("Customers", &report.customers_created.to_string());

    ctx.output.header("Seller channels");
    ctx.output.table_row(&["ID", "CODE", "TOKEN"], &[4, 12, 20]);
    for channel in &report.seller_channels {
        ctx.output.table_row(
            &[channel.id.as_str(), &channel.code, &channel.token],
            &[4, 12, 20],
        );
    }

    ctx.output.success("Marketplace seeded");
    Ok(())
}
