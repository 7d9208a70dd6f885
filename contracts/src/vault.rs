//! # Token Vault
//!
//! The vault is the contract's own balance entry in the token ledger, keyed
//! by its derived custodial identity. There is no separate vault field: the
//! token ledger is the single source of truth, and every check reads it live.
//!
//! Only the owner moves tokens in or out directly. Beneficiaries take tokens
//! out through [`RewardToken::claim`]. Nothing is reserved for outstanding
//! rewards: [`RewardToken::emergency_withdraw`] can leave registered
//! beneficiaries unpaid, and claims re-check solvency for that reason.

use crate::contract::RewardToken;
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::identity::AccountId;

impl RewardToken {
    /// Current vault balance, read from the token ledger.
    pub fn vault_balance(&self) -> u64 {
        self.balance_of(self.address())
    }

    /// Moves `amount` from the owner's personal balance into the vault.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] if `caller` is not the owner,
    /// [`LedgerError::InsufficientFunds`] if the owner holds less than
    /// `amount`.
    pub fn deposit(&mut self, caller: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.execute(caller, "deposit", |c| {
            c.state.access.ensure_owner(caller)?;

            let available = c.balance_of(caller);
            if available < amount {
                return Err(LedgerError::InsufficientFunds {
                    available,
                    requested: amount,
                });
            }

            let vault = c.address().clone();
            c.move_tokens(caller, &vault, amount)?;
            c.emit(LedgerEvent::Deposited { amount });
            Ok(())
        })
    }

    /// Moves `amount` from the vault back to the owner.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] if `caller` is not the owner,
    /// [`LedgerError::InsufficientVaultFunds`] if the vault holds less than
    /// `amount`.
    pub fn emergency_withdraw(&mut self, caller: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.execute(caller, "emergency_withdraw", |c| {
            c.state.access.ensure_owner(caller)?;

            let available = c.vault_balance();
            if available < amount {
                return Err(LedgerError::InsufficientVaultFunds {
                    available,
                    requested: amount,
                });
            }

            let vault = c.address().clone();
            c.move_tokens(&vault, caller, amount)?;
            c.emit(LedgerEvent::EmergencyWithdrawn { amount });
            Ok(())
        })
    }
}
