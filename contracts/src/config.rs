//! # Token Configuration & Constants
//!
//! Deployment parameters for the fixed-supply token. The defaults match the
//! reference deployment: 1000 units of "Custom Token" (CSTMN), all minted to
//! the owner at construction. Nothing here changes after deployment; there is
//! no mint and no burn.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default human-readable token name.
pub const DEFAULT_TOKEN_NAME: &str = "Custom Token";

/// Default ticker symbol.
pub const DEFAULT_TOKEN_SYMBOL: &str = "CSTMN";

/// Default decimal precision. 18, the ERC-20 convention.
pub const DEFAULT_DECIMALS: u8 = 18;

/// Default fixed supply, in the smallest denomination.
pub const DEFAULT_TOTAL_SUPPLY: u64 = 1_000;

/// Longest ticker symbol we accept.
pub const MAX_SYMBOL_LENGTH: usize = 11;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while validating a [`TokenConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The token name is empty or whitespace.
    #[error("token name must not be empty")]
    EmptyName,

    /// The symbol is empty, too long, or not alphanumeric.
    #[error("invalid token symbol '{0}': expected 1..={max} ASCII alphanumerics", max = MAX_SYMBOL_LENGTH)]
    InvalidSymbol(String),

    /// A fixed-supply token with nothing in it cannot fund any reward.
    #[error("total supply must be greater than zero")]
    ZeroSupply,

    /// The owner identity is empty.
    #[error("owner identity must not be empty")]
    EmptyOwner,
}

// ---------------------------------------------------------------------------
// TokenConfig
// ---------------------------------------------------------------------------

/// Static token metadata and supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Human-readable name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places used for display.
    pub decimals: u8,
    /// The entire supply, minted to the owner at construction.
    pub total_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            total_supply: DEFAULT_TOTAL_SUPPLY,
        }
    }
}

impl TokenConfig {
    /// Checks the configuration for values the token cannot be deployed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let symbol_ok = !self.symbol.is_empty()
            && self.symbol.len() <= MAX_SYMBOL_LENGTH
            && self.symbol.chars().all(|c| c.is_ascii_alphanumeric());
        if !symbol_ok {
            return Err(ConfigError::InvalidSymbol(self.symbol.clone()));
        }
        if self.total_supply == 0 {
            return Err(ConfigError::ZeroSupply);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = TokenConfig::default();
        assert_eq!(cfg.name, "Custom Token");
        assert_eq!(cfg.symbol, "CSTMN");
        assert_eq!(cfg.total_supply, 1000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_metadata() {
        let mut cfg = TokenConfig::default();
        cfg.name = "   ".into();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyName));

        let mut cfg = TokenConfig::default();
        cfg.symbol = "NOT-OK".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSymbol(_))));

        let mut cfg = TokenConfig::default();
        cfg.symbol = "ABCDEFGHIJKL".into();
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidSymbol(_))));

        let mut cfg = TokenConfig::default();
        cfg.total_supply = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroSupply));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: TokenConfig = serde_json::from_str(r#"{"total_supply": 5000}"#).unwrap();
        assert_eq!(cfg.total_supply, 5000);
        assert_eq!(cfg.symbol, DEFAULT_TOKEN_SYMBOL);
    }
}
