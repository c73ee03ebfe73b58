use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crmctl_core::CrmConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (file + environment) as TOML
    Show,
    /// Write the default configuration file
    Init(InitArgs),
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(CrmConfig::config_path);
    match args.command {
        ConfigCommands::Show => run_show(explicit),
        ConfigCommands::Init(args) => run_init(args, path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run_show(explicit: Option<&Path>) -> Result<()> {
    let config = CrmConfig::load(explicit)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn run_init(args: InitArgs, path: PathBuf) -> Result<()> {
    if path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            path
        ));
    }

    CrmConfig::default()
        .save(&path)
        .context("Failed to write default config")?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
