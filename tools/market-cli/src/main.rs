//! Market CLI - Command line tool for the multi-vendor marketplace.
//!
//! Commands:
//! - `market seed` - Seed an in-memory marketplace and report what was created
//! - `market partition` - Show how an order splits per seller, with platform fees
//! - `market register-seller` - Provision a seller on a running backend
//! - `market eligible` - List eligible shipping quotes per seller for a session
//! - `market config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, EligibleArgs, PartitionArgs, RegisterSellerArgs, SeedArgs};

/// Market CLI - Seed, inspect and administer the marketplace
#[derive(Parser)]
#[command(name = "market")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed an in-memory marketplace with demo sellers
    Seed(SeedArgs),

    /// Partition an order by seller and compute platform fees
    Partition(PartitionArgs),

    /// Register a seller on the backend
    RegisterSeller(RegisterSellerArgs),

    /// List eligible shipping methods per seller
    Eligible(EligibleArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    if cli.verbose {
        if let Err(e) = market_observability::init_logging(&ctx.config.logging) {
            ctx.output.warn(&format!("Logging disabled: {}", e));
        }
    }

    let result = match cli.command {
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::Partition(args) => commands::partition::run(args, &ctx).await,
        Commands::RegisterSeller(args) => commands::remote::register_seller(args, &ctx).await,
        Commands::Eligible(args) => commands::remote::eligible(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
