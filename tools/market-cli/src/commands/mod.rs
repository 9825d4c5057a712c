//! CLI command implementations.

pub mod config;
pub mod partition;
pub mod remote;
pub mod seed;

use clap::{Args, Subcommand};

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// Write the seeded host state as JSON to this file.
    #[arg(long)]
    pub snapshot: Option<String>,
}

/// Arguments for the partition command.
#[derive(Args)]
pub struct PartitionArgs {
    /// Order JSON file; a demo order from the seeded marketplace when omitted.
    #[arg(short, long)]
    pub order: Option<String>,

    /// Id of the default channel the order file was taken from.
    #[arg(long, default_value = "1")]
    pub default_channel: String,
}

/// Arguments for the register-seller command.
#[derive(Args)]
pub struct RegisterSellerArgs {
    /// Seller name.
    pub name: String,

    /// Email address of the seller administrator.
    #[arg(short, long)]
    pub email: String,

    /// Password of the seller administrator; prompted when omitted.
    #[arg(short, long)]
    pub password: Option<String>,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the eligible command.
#[derive(Args)]
pub struct EligibleArgs {
    /// Cookie header of the shopper session.
    #[arg(long)]
    pub cookie: Option<String>,

    /// Channel token to scope the call to.
    #[arg(long)]
    pub channel_token: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
