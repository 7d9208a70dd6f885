//! # Thread-Safe Contract Handle
//!
//! [`SharedRewardToken`] wraps a [`RewardToken`] in `Arc<RwLock<_>>` so it can
//! be handed to many threads or tasks at once.
//!
//! - Every mutating call takes the write lock for its whole duration,
//!   including any transfer hooks it triggers. Mutations are therefore
//!   totally ordered and never interleave.
//! - Queries take the read lock. They run concurrently with each other but
//!   never observe a half-applied mutation.
//!
//! Hooks receive `&mut RewardToken` directly and must not go back through
//! the shared handle: `parking_lot` locks are not re-entrant, so doing so
//! would deadlock.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::contract::{LedgerSnapshot, RewardToken, TransferHook};
use crate::error::LedgerError;
use crate::identity::AccountId;
use crate::rewards::{BeneficiaryState, RewardRecord};

/// A cloneable, `Send + Sync` handle to one contract instance.
#[derive(Debug, Clone)]
pub struct SharedRewardToken {
    inner: Arc<RwLock<RewardToken>>,
}

impl SharedRewardToken {
    /// Takes ownership of a deployed contract.
    pub fn new(contract: RewardToken) -> Self {
        Self {
            inner: Arc::new(RwLock::new(contract)),
        }
    }

    /// Runs `f` under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&RewardToken) -> T) -> T {
        f(&self.inner.read())
    }

    /// Runs `f` under the write lock.
    pub fn write<T>(&self, f: impl FnOnce(&mut RewardToken) -> T) -> T {
        f(&mut self.inner.write())
    }

    // -- mutating calls ----------------------------------------------------

    pub fn deposit(&self, caller: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.inner.write().deposit(caller, amount)
    }

    pub fn emergency_withdraw(&self, caller: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.inner.write().emergency_withdraw(caller, amount)
    }

    pub fn add_beneficiary(&self, caller: &AccountId, beneficiary: AccountId, reward: u64) -> Result<(), LedgerError> {
        self.inner.write().add_beneficiary(caller, beneficiary, reward)
    }

    pub fn add_beneficiaries(
        &self,
        caller: &AccountId,
        beneficiaries: &[AccountId],
        rewards: &[u64],
    ) -> Result<(), LedgerError> {
        self.inner.write().add_beneficiaries(caller, beneficiaries, rewards)
    }

    pub fn decrease_reward(&self, caller: &AccountId, beneficiary: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        self.inner.write().decrease_reward(caller, beneficiary, amount)
    }

    pub fn claim(&self, caller: &AccountId) -> Result<u64, LedgerError> {
        self.inner.write().claim(caller)
    }

    pub fn lock_rewards(&self, caller: &AccountId, locked: bool) -> Result<(), LedgerError> {
        self.inner.write().lock_rewards(caller, locked)
    }

    pub fn transfer(&self, caller: &AccountId, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.inner.write().transfer(caller, to, amount)
    }

    pub fn set_transfer_hook(&self, account: AccountId, hook: impl TransferHook + 'static) -> Result<(), LedgerError> {
        self.inner.write().set_transfer_hook(account, hook)
    }

    // -- queries -----------------------------------------------------------

    pub fn vault_balance(&self) -> u64 {
        self.inner.read().vault_balance()
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.inner.read().balance_of(account)
    }

    pub fn is_locked(&self) -> bool {
        self.inner.read().is_locked()
    }

    pub fn beneficiary(&self, beneficiary: &AccountId) -> Option<RewardRecord> {
        self.inner.read().beneficiary(beneficiary)
    }

    pub fn beneficiary_state(&self, beneficiary: &AccountId) -> BeneficiaryState {
        self.inner.read().beneficiary_state(beneficiary)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner.read().snapshot()
    }
}
