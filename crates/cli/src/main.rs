//! sysreact CLI: the main entry point.
//!
//! Commands:
//! - `run`     : Diagnose the target host, one request or interactively
//! - `status`  : Gateway reachability, tools, and settings
//! - `tools`   : List the registered tools and their parameters
//! - `onboard` : Write the default configuration

use clap::{Parser, Subcommand};
use sysreact_config::{AppConfig, LoggingConfig};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

#[derive(Parser)]
#[command(
    name = "sysreact",
    about = "sysreact — a ReAct agent for Linux system diagnostics",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write ~/.sysreact/config.toml with the defaults
    Onboard {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Ask the agent to diagnose the target
    Run {
        /// Send a single request instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the configured iteration budget
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Print the full run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show gateway health, tools and configuration
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the registered tools
    Tools,
}

fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let fallback = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = AppConfig::load();
    let logging = config.as_ref().map(|c| c.logging.clone()).unwrap_or_default();
    init_tracing(cli.verbose, &logging);

    let load = || config.map_err(|e| format!("Failed to load config: {e}"));

    match cli.command {
        Commands::Onboard { force } => commands::onboard::run(force).await?,
        Commands::Run {
            message,
            max_iterations,
            json,
        } => commands::run::run(load()?, message, max_iterations, json).await?,
        Commands::Status { json } => commands::status::run(load()?, json).await?,
        Commands::Tools => commands::tools::run(load()?)?,
    }

    Ok(())
}
