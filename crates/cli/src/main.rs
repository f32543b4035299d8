//! VM Resize Advisor CLI
//!
//! A command-line tool for evaluating VM resize recommendations:
//! compatibility checks, batch runs, series classification, and
//! pricing lookups.

mod backends;
mod commands;
mod config;
mod output;
mod sources;

use advisor_lib::models::OsType;
use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// VM Resize Advisor CLI
#[derive(Parser)]
#[command(name = "vra")]
#[command(author, version, about = "CLI for the VM Resize Advisor", long_about = None)]
pub struct Cli {
    /// Capability service URL (can also be set via VRA_CAPABILITY_ENDPOINT)
    #[arg(long, env = "VRA_CAPABILITY_ENDPOINT")]
    pub capability_endpoint: Option<String>,

    /// Pricing service URL (can also be set via VRA_PRICING_ENDPOINT)
    #[arg(long, env = "VRA_PRICING_ENDPOINT")]
    pub pricing_endpoint: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Operating system selector
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OsArg {
    #[default]
    Linux,
    Windows,
}

impl From<OsArg> for OsType {
    fn from(value: OsArg) -> Self {
        match value {
            OsArg::Linux => OsType::Linux,
            OsArg::Windows => OsType::Windows,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one VM against a target profile
    Check(CheckArgs),

    /// Run a batch of resize jobs from a file
    Batch(BatchArgs),

    /// Classify a machine profile series
    Classify {
        /// Machine profile id (e.g. Standard_D4s_v5)
        profile_id: String,
    },

    /// Look up the price of a machine profile
    Price {
        /// Machine profile id
        profile_id: String,

        /// Region to price in
        #[arg(long, short)]
        region: String,

        /// Operating system
        #[arg(long, default_value = "linux")]
        os: OsArg,
    },
}

#[derive(Args)]
pub struct CheckArgs {
    /// Target machine profile id
    pub target: String,

    /// Region to evaluate in
    #[arg(long, short)]
    pub region: String,

    /// Current machine profile id (required unless --snapshot-file is given)
    #[arg(long, short)]
    pub current: Option<String>,

    /// Snapshot map file; the VM is looked up by --resource-id
    #[arg(long)]
    pub snapshot_file: Option<String>,

    /// Resource id of the VM under evaluation
    #[arg(long, default_value = "vm-inline")]
    pub resource_id: String,

    /// Number of attached data disks
    #[arg(long, default_value_t = 0)]
    pub data_disks: u32,

    /// VM uses premium storage
    #[arg(long)]
    pub premium: bool,

    /// VM uses accelerated networking
    #[arg(long)]
    pub accelerated_networking: bool,

    /// VM uses ultra disk
    #[arg(long)]
    pub ultra_disk: bool,

    /// VM has trusted launch enabled
    #[arg(long)]
    pub trusted_launch: bool,

    /// Availability zone the VM is pinned to
    #[arg(long)]
    pub zone: Option<u32>,

    /// Operating system
    #[arg(long, default_value = "linux")]
    pub os: OsArg,

    /// Skip pricing lookups
    #[arg(long)]
    pub no_pricing: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Jobs file (JSON array of resize rows)
    pub jobs: String,

    /// Snapshot map file (resource id to VM snapshot)
    #[arg(long, short)]
    pub snapshots: String,

    /// Process with a worker pool of N workers instead of sequentially
    #[arg(long, short)]
    pub parallel: Option<usize>,

    /// Per-record processing budget in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Write the full records as JSON to this file
    #[arg(long, short)]
    pub output: Option<String>,

    /// Skip pricing lookups
    #[arg(long)]
    pub no_pricing: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = config::CliConfig::load()?;
    if let Some(url) = cli.capability_endpoint {
        config.capability_endpoint = url;
    }
    if let Some(url) = cli.pricing_endpoint {
        config.pricing_endpoint = url;
    }

    match cli.command {
        Commands::Check(args) => {
            commands::check::run(&config, &args, cli.format).await?;
        }
        Commands::Batch(args) => {
            commands::batch::run(&config, &args, cli.format).await?;
        }
        Commands::Classify { profile_id } => {
            commands::lookup::classify(&profile_id, cli.format)?;
        }
        Commands::Price {
            profile_id,
            region,
            os,
        } => {
            commands::lookup::price(&config, &profile_id, &region, os.into(), cli.format).await?;
        }
    }

    Ok(())
}
