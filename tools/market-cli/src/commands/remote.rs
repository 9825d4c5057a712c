//! Commands that call a running marketplace backend.

use anyhow::{bail, Context as _, Result};
use dialoguer::{Confirm, Password};
use market_api::{RegisterSellerInput, RegisterSellerPayload, SellerEligibleMethods};
use market_data::documents::{MUTATION_REGISTER_SELLER, QUERY_ELIGIBLE_METHODS_BY_SELLER};
use serde::Deserialize;
use serde_json::json;

use super::{EligibleArgs, RegisterSellerArgs};
use crate::context::Context;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterSellerData {
    register_seller: RegisterSellerPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EligibleData {
    eligible_methods_by_seller: Vec<SellerEligibleMethods>,
}

/// Run the register-seller command.
pub async fn register_seller(args: RegisterSellerArgs, ctx: &Context) -> Result<()> {
    if ctx.config.api.token.is_none() {
        ctx.output
            .warn("No api.token configured; the admin API will treat this call as anonymous");
    }

    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Seller admin password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?,
    };
    if password.is_empty() {
        bail!("Seller admin password must not be empty");
    }

    ctx.output.header("Register seller");
    ctx.output.kv("Name", &args.name);
    ctx.output.kv("Admin", &args.email);
    ctx.output.kv("Endpoint", &ctx.config.api.admin_url);

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt("Provision this seller?")
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Registration cancelled");
            return Ok(());
        }
    }

    let input = RegisterSellerInput {
        name: args.name,
        admin_email_address: args.email,
        admin_password: password,
    };

    let client = ctx.admin_client()?;
    let spinner = ctx.output.spinner("Provisioning seller...");
    let response = client
        .execute::<RegisterSellerData>(MUTATION_REGISTER_SELLER, json!({ "input": input }), None)
        .await;
    spinner.finish_and_clear();
    let payload = response.context("registerSeller failed")?.data.register_seller;

    if ctx.output.is_json() {
        ctx.output.json(&payload);
        return Ok(());
    }

    ctx.output.kv("Seller", payload.seller_id.as_str());
    ctx.output.kv("Channel", payload.channel_id.as_str());
    ctx.output.kv("Channel token", &payload.channel_token);
    ctx.output.success(&format!("Seller provisioned; admin {}", payload.admin_email_address));
    Ok(())
}

/// Run the eligible command.
pub async fn eligible(args: EligibleArgs, ctx: &Context) -> Result<()> {
    let mut client = ctx.shop_client()?;
    if let Some(token) = args.channel_token {
        client = client.with_channel_token(token);
    }

    ctx.output.debug(&format!("Querying {}", client.endpoint()));
    let response = client
        .execute::<EligibleData>(QUERY_ELIGIBLE_METHODS_BY_SELLER, json!({}), args.cookie.as_deref())
        .await
        .context("eligibleMethodsBySeller failed")?;
    let groups = response.data.eligible_methods_by_seller;

    if ctx.output.is_json() {
        ctx.output.json(&groups);
        return Ok(());
    }

    if groups.is_empty() {
        ctx.output.info("No active order, or the order has no seller lines.");
        return Ok(());
    }

    for group in &groups {
        let name = group.seller_name.as_deref().unwrap_or("unnamed seller");
        ctx.output
            .header(&format!("Seller {} ({})", group.seller_channel_id, name));
        if group.quotes.is_empty() {
            ctx.output.warn("No eligible shipping methods");
            continue;
        }
        for quote in &group.quotes {
            ctx.output.list_item(&format!(
                "{} [{}] {} (incl. tax {})",
                quote.name, quote.id, quote.price, quote.price_with_tax
            ));
        }
    }
    Ok(())
}
