//! crmctl CLI - CRM GraphQL backend and its scheduled jobs
//!
//! This is the main entry point for the crmctl command-line tool, which provides:
//! - The GraphQL HTTP server (`serve`)
//! - The job scheduler, over HTTP or in-process (`jobs`)
//! - One-off job runs (`run-job`)
//! - Demo data (`seed`)
//! - Configuration management (`config`)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crmctl_core::CrmConfig;

mod commands;
mod local;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "crmctl",
    author,
    version,
    about = "CRM backend: GraphQL API over customers, products and orders, plus scheduled jobs"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.crmctl/config.toml)
    #[arg(long, short = 'c', global = true, env = "CRMCTL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the GraphQL HTTP server
    Serve(commands::serve::ServeArgs),
    /// Run all enabled jobs on their configured cadences
    Jobs(commands::jobs::JobsArgs),
    /// Run a single job once
    RunJob(commands::jobs::RunJobArgs),
    /// Insert demo customers, a product and an order
    Seed(commands::seed::SeedArgs),
    /// Manage crmctl configuration (show, init, path)
    Config(commands::config::ConfigArgs),
}

fn load_config(path: Option<&std::path::Path>) -> Result<CrmConfig> {
    CrmConfig::load(path).context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, load_config(config_path)?).await?,
        Commands::Jobs(args) => commands::run_jobs(args, load_config(config_path)?).await?,
        Commands::RunJob(args) => commands::run_job(args, load_config(config_path)?).await?,
        Commands::Seed(args) => commands::run_seed(args, load_config(config_path)?).await?,
        Commands::Config(args) => commands::run_config(args, config_path)?,
    }

    Ok(())
}
