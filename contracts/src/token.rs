//! # Fixed-Supply Token Ledger
//!
//! A plain fungible-token ledger: balances, allowances, and transfers. The
//! entire supply is minted once, to the deploying holder, and never changes
//! afterwards. There is no mint and no burn.
//!
//! This ledger knows nothing about vaults or rewards. The reward contract
//! reuses it as-is: the vault is simply the balance entry of the contract's
//! own custodial identity.
//!
//! ## Invariant
//!
//! The sum of all balances equals `total_supply` after every operation.
//! Every debit is checked before any credit is applied, so a failed transfer
//! leaves both sides untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::TokenConfig;
use crate::identity::AccountId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during token ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The sender does not hold enough tokens.
    #[error("insufficient balance: {account} has {balance}, tried to move {amount}")]
    InsufficientBalance {
        /// Account being debited.
        account: AccountId,
        /// Its current balance.
        balance: u64,
        /// Amount the caller tried to move.
        amount: u64,
    },

    /// The spender's allowance does not cover the transfer.
    #[error("insufficient allowance: {spender} may move {allowance} from {owner}, tried {amount}")]
    InsufficientAllowance {
        /// Account whose tokens are being moved.
        owner: AccountId,
        /// Account moving them.
        spender: AccountId,
        /// Remaining allowance.
        allowance: u64,
        /// Amount the spender tried to move.
        amount: u64,
    },

    /// A credit would overflow the recipient's balance.
    #[error("balance overflow crediting {amount} to {account}")]
    Overflow {
        /// Account being credited.
        account: AccountId,
        /// Amount that caused the overflow.
        amount: u64,
    },
}

// ---------------------------------------------------------------------------
// FixedSupplyToken
// ---------------------------------------------------------------------------

/// Balances and allowances for a single fixed-supply token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedSupplyToken {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: u64,
    balances: BTreeMap<AccountId, u64>,
    /// `owner -> (spender -> remaining allowance)`.
    allowances: BTreeMap<AccountId, BTreeMap<AccountId, u64>>,
}

impl FixedSupplyToken {
    /// Creates the token and mints the whole supply to `holder`.
    pub fn new(config: &TokenConfig, holder: &AccountId) -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(holder.clone(), config.total_supply);
        Self {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            decimals: config.decimals,
            total_supply: config.total_supply,
            balances,
            allowances: BTreeMap::new(),
        }
    }

    /// Human-readable token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Decimal places.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// The fixed total supply.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Returns the balance of `account`, or 0 if it has never held tokens.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Returns how much `spender` may still move on behalf of `owner`.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|s| s.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Iterates over all non-zero balances in identity order.
    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, u64)> {
        self.balances
            .iter()
            .filter(|(_, b)| **b > 0)
            .map(|(a, b)| (a, *b))
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientBalance`] if `from` holds less than
    /// `amount`, or [`TokenError::Overflow`] if the credit would overflow.
    pub fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u64) -> Result<(), TokenError> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                account: from.clone(),
                balance: from_balance,
                amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| TokenError::Overflow {
                account: to.clone(),
                amount,
            })?;

        self.balances.insert(from.clone(), from_balance - amount);
        self.balances.insert(to.clone(), to_balance);
        Ok(())
    }

    /// Sets the allowance of `spender` over `owner`'s tokens, replacing any
    /// previous value.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: u64) {
        self.allowances
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InsufficientAllowance`] if the allowance does
    /// not cover `amount`, otherwise the errors of [`transfer`](Self::transfer).
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                allowance,
                amount,
            });
        }

        self.transfer(from, to, amount)?;
        self.approve(from, spender, allowance - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(supply: u64) -> (FixedSupplyToken, AccountId) {
        let holder = AccountId::from("holder");
        let cfg = TokenConfig {
            total_supply: supply,
            ..TokenConfig::default()
        };
        (FixedSupplyToken::new(&cfg, &holder), holder)
    }

    fn sum_of_balances(t: &FixedSupplyToken) -> u64 {
        t.balances().map(|(_, b)| b).sum()
    }

    #[test]
    fn whole_supply_minted_to_holder() {
        let (t, holder) = token(1000);
        assert_eq!(t.total_supply(), 1000);
        assert_eq!(t.balance_of(&holder), 1000);
        assert_eq!(t.name(), "Custom Token");
        assert_eq!(t.symbol(), "CSTMN");
    }

    #[test]
    fn transfer_moves_balance_and_preserves_supply() {
        let (mut t, holder) = token(1000);
        let alice = AccountId::from("alice");
        t.transfer(&holder, &alice, 250).unwrap();
        assert_eq!(t.balance_of(&holder), 750);
        assert_eq!(t.balance_of(&alice), 250);
        assert_eq!(sum_of_balances(&t), t.total_supply());
    }

    #[test]
    fn transfer_more_than_balance_rejected_without_effect() {
        let (mut t, holder) = token(100);
        let alice = AccountId::from("alice");
        let err = t.transfer(&holder, &alice, 101).unwrap_err();
        assert_eq!(
            err,
            TokenError::InsufficientBalance {
                account: holder.clone(),
                balance: 100,
                amount: 101
            }
        );
        assert_eq!(t.balance_of(&holder), 100);
        assert_eq!(t.balance_of(&alice), 0);
    }

    #[test]
    fn self_transfer_is_a_checked_noop() {
        let (mut t, holder) = token(100);
        t.transfer(&holder, &holder, 100).unwrap();
        assert_eq!(t.balance_of(&holder), 100);
        assert!(t.transfer(&holder, &holder, 101).is_err());
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let (mut t, holder) = token(1000);
        let spender = AccountId::from("spender");
        let bob = AccountId::from("bob");

        t.approve(&holder, &spender, 300);
        t.transfer_from(&spender, &holder, &bob, 200).unwrap();
        assert_eq!(t.allowance(&holder, &spender), 100);
        assert_eq!(t.balance_of(&bob), 200);

        let err = t.transfer_from(&spender, &holder, &bob, 101).unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { allowance: 100, .. }));
        assert_eq!(t.balance_of(&bob), 200);
    }

    #[test]
    fn failed_transfer_from_keeps_allowance() {
        let (mut t, holder) = token(10);
        let spender = AccountId::from("spender");
        t.approve(&holder, &spender, 50);
        assert!(t
            .transfer_from(&spender, &holder, &AccountId::from("x"), 20)
            .is_err());
        assert_eq!(t.allowance(&holder, &spender), 50);
    }
}
