//! # Owner-Only Access Control
//!
//! A single owner identity, fixed at construction, gates every
//! administrative operation. The check is always the first thing an
//! administrative call does, so an unauthorized caller learns nothing about
//! the rest of the ledger's state from the error it gets back.

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::identity::AccountId;

/// The administrative owner of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: AccountId,
}

impl Ownable {
    /// Creates the access-control state with `owner` in charge.
    pub fn new(owner: AccountId) -> Self {
        Self { owner }
    }

    /// The current owner.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Fails with [`LedgerError::Unauthorized`] unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if caller != &self.owner {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Hands ownership to `new_owner` and returns the previous owner.
    ///
    /// The caller must be the current owner. Checks against reserved
    /// identities are the contract's job, not this module's.
    pub fn transfer(&mut self, caller: &AccountId, new_owner: AccountId) -> Result<AccountId, LedgerError> {
        self.ensure_owner(caller)?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}
