//! svcmap - service topology cache for node-resident telemetry agents
//!
//! Mirrors EndpointSlices from the Kubernetes API and answers which services
//! a pod belongs to and how many pods back each service.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use svcmap::cli::{self, ConfigSubcommand, OutputFormat};
use svcmap::config::ConfigLoader;

/// svcmap - service topology cache for node-resident telemetry agents
#[derive(Parser, Debug)]
#[command(name = "svcmap")]
#[command(about = "Mirror EndpointSlices into a service/pod topology cache", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    /// Namespace to mirror (overrides config; "all" for every namespace)
    #[arg(long, short = 'n', global = true)]
    namespace: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Keep the topology cache in sync and report it periodically (default)
    Run,
    /// List EndpointSlices once and print the topology
    Dump {
        /// Output format
        #[arg(long, short = 'o', value_enum, default_value = "json")]
        output: OutputFormat,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Run);

    // Commands that never touch the cluster
    let output = match command {
        Command::Config { subcommand } => {
            return cli::handle_config_command(subcommand, args.config.as_deref());
        }
        Command::Version => {
            cli::display_version();
            return Ok(());
        }
        Command::Dump { output } => Some(output),
        Command::Run => None,
    };

    let mut config =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(namespace) = args.namespace {
        config.namespace = namespace;
    }
    ConfigLoader::validate(&config).context("Invalid configuration")?;

    let log_file = cli::init_logging(args.debug, &config.logger)?;
    if let Some(ref log_path) = log_file {
        eprintln!("Logs written to: {}", log_path.display());
    }

    tracing::debug!(
        "Configuration loaded: namespace={:?}, resync={}s, watch={}",
        config.namespace,
        config.resync.interval_seconds,
        config.resync.watch
    );

    match output {
        Some(format) => cli::dump_topology(&config, format).await,
        None => cli::run_agent(&config).await,
    }
}
