//! # Node Configuration
//!
//! The JSON file that tells `reward-node` who deploys the contract, with
//! which token parameters, and how to log. Every field has a default, so an
//! empty object `{}` is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use reward_contracts::config::TokenConfig;
use reward_contracts::AccountId;

/// Default tracing filter when neither the config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "reward_node=info,reward_contracts=info";

/// Deployment and logging settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Identity that deploys the contract and receives the whole supply.
    pub owner: AccountId,
    /// Token parameters.
    pub token: TokenConfig,
    /// `EnvFilter` directives.
    pub log_level: String,
    /// `pretty` or `json`.
    pub log_format: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            owner: AccountId::from("owner"),
            token: TokenConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl NodeConfig {
    /// Reads and validates a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: NodeConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .token
            .validate()
            .with_context(|| format!("invalid token settings in {}", path.display()))?;
        Ok(config)
    }

    /// Writes the default config to `path`, refusing to overwrite.
    pub fn write_default(path: &Path) -> Result<Self> {
        if path.exists() {
            anyhow::bail!("refusing to overwrite existing file {}", path.display());
        }
        let config = NodeConfig::default();
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(config)
    }
}
