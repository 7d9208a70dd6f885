// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Reward Node
//!
//! Entry point for the `reward-node` binary. Loads the node configuration,
//! initializes logging, deploys a reward token contract, and replays a JSON
//! script of calls against it.
//!
//! The binary supports three subcommands:
//!
//! - `run`     - deploy and replay a script, printing a JSON report
//! - `init`    - write a default configuration file
//! - `version` - print build version information

mod cli;
mod logging;
mod script;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;

use reward_contracts::RewardToken;

use cli::{Commands, RewardNodeCli};
use logging::LogFormat;
use script::Script;
use settings::NodeConfig;

fn main() -> Result<()> {
    let cli = RewardNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_script(args),
        Commands::Init(args) => init_config(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Deploys a contract from config and replays the script against it.
fn run_script(args: cli::RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };
    logging::init_logging(&config.log_level, LogFormat::from_str_lossy(&config.log_format));

    tracing::info!(
        owner = %config.owner,
        token = %config.token.name,
        script = %args.script.display(),
        fail_fast = args.fail_fast,
        "starting reward-node"
    );

    let script = Script::load(&args.script)?;
    let mut contract =
        RewardToken::new(config.token.clone(), config.owner.clone()).context("failed to deploy contract")?;

    let report = script::run_script(&mut contract, &script, args.fail_fast);
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = &args.output {
        std::fs::write(path, &json).with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }
    println!("{json}");

    Ok(())
}

/// Writes a default configuration file.
fn init_config(args: cli::InitArgs) -> Result<()> {
    logging::init_logging(settings::DEFAULT_LOG_LEVEL, LogFormat::Pretty);

    let config = NodeConfig::write_default(&args.output)?;
    tracing::info!(path = %args.output.display(), "default configuration written");

    println!("Configuration written.");
    println!("  Path   : {}", args.output.display());
    println!("  Owner  : {}", config.owner);
    println!("  Token  : {} ({})", config.token.name, config.token.symbol);
    println!("  Supply : {}", config.token.total_supply);

    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("reward-node      {}", env!("CARGO_PKG_VERSION"));
    println!("reward-contracts {}", reward_contracts::VERSION);
}

#[cfg(test)]
mod tests {
    #[test]
    fn version_reports_both_crates() {
        // Both crates inherit the workspace version.
        assert_eq!(reward_contracts::VERSION, env!("CARGO_PKG_VERSION"));
        assert!(!reward_contracts::VERSION.is_empty());
    }
}
