//! # CLI Interface
//!
//! Defines the command-line argument structure for `reward-node` using
//! `clap` derive. Supports three subcommands: `run`, `init`, and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reward token operator node.
///
/// Deploys a fixed-supply token with a custodial reward vault from a config
/// file, replays a JSON script of contract calls against it, and reports
/// every outcome together with the final ledger state.
#[derive(Parser, Debug)]
#[command(
    name = "reward-node",
    about = "Reward token vault operator",
    version,
    propagate_version = true
)]
pub struct RewardNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the reward node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a contract and replay a script of calls against it.
    Run(RunArgs),
    /// Write a default configuration file.
    Init(InitArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the node configuration file (JSON).
    ///
    /// When omitted, built-in defaults are used.
    #[arg(long, short = 'c', env = "REWARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the JSON script of contract calls to replay.
    #[arg(long, short = 's', env = "REWARD_SCRIPT")]
    pub script: PathBuf,

    /// Stop at the first rejected step instead of continuing.
    #[arg(long)]
    pub fail_fast: bool,

    /// Also write the JSON report to this file.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the default configuration.
    #[arg(long, short = 'o', default_value = "reward-node.json")]
    pub output: PathBuf,
}
