//! # Reward Ledger
//!
//! Per-beneficiary entitlement bookkeeping and the claim state machine.
//!
//! ```text
//!            add_beneficiary            claim
//!   None ─────────────────────▶ Unclaimed ─────────▶ Claimed
//!                                 │    ▲
//!                                 └────┘
//!                             decrease_reward
//! ```
//!
//! `None` is the state of every identity that was never registered.
//! `Claimed` is terminal: the `withdrawn` latch never resets and the stored
//! reward is kept as history, never zeroed. Records are never deleted.
//!
//! The global lock flag gates every claim regardless of record state.
//!
//! [`RewardLedger`] is pure bookkeeping with no notion of tokens or callers;
//! the `impl RewardToken` block at the bottom wires it to access control and
//! to the vault.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::contract::RewardToken;
use crate::error::LedgerError;
use crate::events::LedgerEvent;
use crate::identity::AccountId;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The entitlement of a single beneficiary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRecord {
    /// Amount owed (or, once claimed, the amount that was paid).
    pub reward: u64,
    /// Latched to `true` by a successful claim.
    pub withdrawn: bool,
}

/// Position of an identity in the claim state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeneficiaryState {
    /// Never registered.
    None,
    /// Registered, reward not yet claimed.
    Unclaimed,
    /// Reward claimed. Terminal.
    Claimed,
}

impl std::fmt::Display for BeneficiaryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeneficiaryState::None => write!(f, "None"),
            BeneficiaryState::Unclaimed => write!(f, "Unclaimed"),
            BeneficiaryState::Claimed => write!(f, "Claimed"),
        }
    }
}

// ---------------------------------------------------------------------------
// RewardLedger
// ---------------------------------------------------------------------------

/// Reward records plus the global lock flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardLedger {
    records: BTreeMap<AccountId, RewardRecord>,
    locked: bool,
}

impl RewardLedger {
    /// Creates an empty, unlocked ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Sets the lock flag unconditionally.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn record(&self, beneficiary: &AccountId) -> Option<&RewardRecord> {
        self.records.get(beneficiary)
    }

    pub fn state(&self, beneficiary: &AccountId) -> BeneficiaryState {
        match self.records.get(beneficiary) {
            None => BeneficiaryState::None,
            Some(r) if r.withdrawn => BeneficiaryState::Claimed,
            Some(_) => BeneficiaryState::Unclaimed,
        }
    }

    /// All records in identity order.
    pub fn records(&self) -> impl Iterator<Item = (&AccountId, &RewardRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Creates the record `{reward, withdrawn: false}` for `beneficiary`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AlreadyRegistered`] if a record exists. The existing
    /// record is left untouched.
    pub fn register(&mut self, beneficiary: AccountId, reward: u64) -> Result<(), LedgerError> {
        if self.records.contains_key(&beneficiary) {
            return Err(LedgerError::AlreadyRegistered(beneficiary));
        }
        self.records.insert(
            beneficiary,
            RewardRecord {
                reward,
                withdrawn: false,
            },
        );
        Ok(())
    }

    /// Checks that a batch could be registered in full.
    ///
    /// Empty input counts as a length mismatch. A duplicate, whether against
    /// existing records or within the batch itself, is reported as
    /// [`LedgerError::AlreadyRegistered`] for the first offending identity.
    pub fn validate_batch(&self, beneficiaries: &[AccountId], rewards: &[u64]) -> Result<(), LedgerError> {
        if beneficiaries.len() != rewards.len() || beneficiaries.is_empty() {
            return Err(LedgerError::LengthMismatch {
                beneficiaries: beneficiaries.len(),
                rewards: rewards.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for beneficiary in beneficiaries {
            if self.records.contains_key(beneficiary) || !seen.insert(beneficiary) {
                return Err(LedgerError::AlreadyRegistered(beneficiary.clone()));
            }
        }
        Ok(())
    }

    /// Registers a batch positionally: `beneficiaries[i]` gets `rewards[i]`.
    ///
    /// Validates everything first, then applies everything, so either the
    /// whole batch lands or none of it does.
    pub fn register_batch(&mut self, beneficiaries: &[AccountId], rewards: &[u64]) -> Result<(), LedgerError> {
        self.validate_batch(beneficiaries, rewards)?;
        for (beneficiary, reward) in beneficiaries.iter().zip(rewards) {
            self.records.insert(
                beneficiary.clone(),
                RewardRecord {
                    reward: *reward,
                    withdrawn: false,
                },
            );
        }
        Ok(())
    }

    /// Reduces an unclaimed reward by `amount` and returns the new reward.
    ///
    /// `amount` must be strictly less than the current reward, so an
    /// unclaimed record never drops to zero this way.
    pub fn decrease(&mut self, beneficiary: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        let record = self
            .records
            .get_mut(beneficiary)
            .ok_or_else(|| LedgerError::NotRegistered(beneficiary.clone()))?;

        if record.withdrawn {
            return Err(LedgerError::AlreadyClaimed(beneficiary.clone()));
        }
        if amount >= record.reward {
            return Err(LedgerError::InvalidAmount {
                amount,
                reward: record.reward,
            });
        }

        record.reward -= amount;
        Ok(record.reward)
    }

    /// Runs every claim precondition against the live `vault_balance` and
    /// returns the amount payable. Does not modify anything.
    ///
    /// Checks, in order: lock, registration, latch, zero reward, solvency.
    pub fn check_claim(&self, beneficiary: &AccountId, vault_balance: u64) -> Result<u64, LedgerError> {
        if self.locked {
            return Err(LedgerError::Locked);
        }
        let record = self
            .records
            .get(beneficiary)
            .ok_or_else(|| LedgerError::NotRegistered(beneficiary.clone()))?;
        if record.withdrawn {
            return Err(LedgerError::AlreadyClaimed(beneficiary.clone()));
        }
        if record.reward == 0 {
            return Err(LedgerError::ZeroReward(beneficiary.clone()));
        }
        if vault_balance < record.reward {
            return Err(LedgerError::InsufficientVaultFunds {
                available: vault_balance,
                requested: record.reward,
            });
        }
        Ok(record.reward)
    }

    /// Sets the `withdrawn` latch. Callers must have passed
    /// [`check_claim`](Self::check_claim) first.
    pub fn latch(&mut self, beneficiary: &AccountId) -> Result<(), LedgerError> {
        let record = self
            .records
            .get_mut(beneficiary)
            .ok_or_else(|| LedgerError::NotRegistered(beneficiary.clone()))?;
        if record.withdrawn {
            return Err(LedgerError::AlreadyClaimed(beneficiary.clone()));
        }
        record.withdrawn = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Contract operations
// ---------------------------------------------------------------------------

impl RewardToken {
    /// Registers `beneficiary` with an entitlement of `reward`. Owner only.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`], [`LedgerError::AlreadyRegistered`],
    /// [`LedgerError::ReservedIdentity`] for the vault itself,
    /// [`LedgerError::EmptyIdentity`].
    pub fn add_beneficiary(&mut self, caller: &AccountId, beneficiary: AccountId, reward: u64) -> Result<(), LedgerError> {
        self.execute(caller, "add_beneficiary", |c| {
            c.state.access.ensure_owner(caller)?;
            c.ensure_external(&beneficiary)?;
            c.state.rewards.register(beneficiary.clone(), reward)?;
            c.emit(LedgerEvent::BeneficiaryAdded { beneficiary, reward });
            Ok(())
        })
    }

    /// Registers a batch of beneficiaries, paired by index. Owner only.
    /// All-or-nothing.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`], [`LedgerError::LengthMismatch`] (also
    /// for empty input), [`LedgerError::AlreadyRegistered`],
    /// [`LedgerError::ReservedIdentity`], [`LedgerError::EmptyIdentity`].
    pub fn add_beneficiaries(
        &mut self,
        caller: &AccountId,
        beneficiaries: &[AccountId],
        rewards: &[u64],
    ) -> Result<(), LedgerError> {
        self.execute(caller, "add_beneficiaries", |c| {
            c.state.access.ensure_owner(caller)?;
            c.state.rewards.validate_batch(beneficiaries, rewards)?;
            for beneficiary in beneficiaries {
                c.ensure_external(beneficiary)?;
            }
            c.state.rewards.register_batch(beneficiaries, rewards)?;
            for (beneficiary, reward) in beneficiaries.iter().zip(rewards) {
                c.emit(LedgerEvent::BeneficiaryAdded {
                    beneficiary: beneficiary.clone(),
                    reward: *reward,
                });
            }
            Ok(())
        })
    }

    /// Lowers an unclaimed reward by `amount` and returns the new reward.
    /// Owner only.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`], [`LedgerError::NotRegistered`],
    /// [`LedgerError::AlreadyClaimed`], [`LedgerError::InvalidAmount`].
    pub fn decrease_reward(&mut self, caller: &AccountId, beneficiary: &AccountId, amount: u64) -> Result<u64, LedgerError> {
        self.execute(caller, "decrease_reward", |c| {
            c.state.access.ensure_owner(caller)?;
            let new_reward = c.state.rewards.decrease(beneficiary, amount)?;
            c.emit(LedgerEvent::RewardDecreased {
                beneficiary: beneficiary.clone(),
                new_reward,
            });
            Ok(new_reward)
        })
    }

    /// Pays the caller's reward out of the vault and returns the amount.
    ///
    /// The latch is written before the tokens move, so any call the
    /// recipient's hook makes back into the contract already sees the reward
    /// as claimed. If the transfer or the hook fails, the latch is rolled
    /// back with everything else.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Locked`], [`LedgerError::NotRegistered`],
    /// [`LedgerError::AlreadyClaimed`], [`LedgerError::ZeroReward`],
    /// [`LedgerError::InsufficientVaultFunds`], or a transfer failure.
    pub fn claim(&mut self, caller: &AccountId) -> Result<u64, LedgerError> {
        self.execute(caller, "claim", |c| {
            let vault = c.address().clone();
            let amount = c.state.rewards.check_claim(caller, c.vault_balance())?;

            c.state.rewards.latch(caller)?;
            c.move_tokens(&vault, caller, amount)?;

            c.emit(LedgerEvent::RewardClaimed {
                beneficiary: caller.clone(),
                amount,
            });
            Ok(amount)
        })
    }

    /// Sets or clears the global claim lock. Owner only.
    pub fn lock_rewards(&mut self, caller: &AccountId, locked: bool) -> Result<(), LedgerError> {
        self.execute(caller, "lock_rewards", |c| {
            c.state.access.ensure_owner(caller)?;
            c.state.rewards.set_locked(locked);
            c.emit(LedgerEvent::LockChanged { locked });
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<AccountId> {
        names.iter().map(|n| AccountId::from(*n)).collect()
    }

    #[test]
    fn register_then_duplicate_is_rejected_unchanged() {
        let mut ledger = RewardLedger::new();
        let b = AccountId::from("b4");
        ledger.register(b.clone(), 15).unwrap();
        assert_eq!(
            ledger.register(b.clone(), 5),
            Err(LedgerError::AlreadyRegistered(b.clone()))
        );
        assert_eq!(ledger.record(&b).unwrap().reward, 15);
        assert_eq!(ledger.state(&b), BeneficiaryState::Unclaimed);
    }

    #[test]
    fn batch_length_checks() {
        let mut ledger = RewardLedger::new();
        assert_eq!(
            ledger.register_batch(&ids(&["a", "b", "c"]), &[10, 10]),
            Err(LedgerError::LengthMismatch {
                beneficiaries: 3,
                rewards: 2
            })
        );
        assert_eq!(
            ledger.register_batch(&[], &[10, 10]),
            Err(LedgerError::LengthMismatch {
                beneficiaries: 0,
                rewards: 2
            })
        );
        assert_eq!(
            ledger.register_batch(&[], &[]),
            Err(LedgerError::LengthMismatch {
                beneficiaries: 0,
                rewards: 0
            })
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn batch_with_duplicate_registers_nothing() {
        let mut ledger = RewardLedger::new();
        ledger.register("existing".into(), 1).unwrap();

        let err = ledger
            .register_batch(&ids(&["x", "y", "existing"]), &[1, 2, 3])
            .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyRegistered("existing".into()));
        assert_eq!(ledger.state(&"x".into()), BeneficiaryState::None);
        assert_eq!(ledger.state(&"y".into()), BeneficiaryState::None);

        let err = ledger.register_batch(&ids(&["p", "q", "p"]), &[1, 2, 3]).unwrap_err();
        assert_eq!(err, LedgerError::AlreadyRegistered("p".into()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn batch_pairs_by_position() {
        let mut ledger = RewardLedger::new();
        ledger.register_batch(&ids(&["b2", "b3"]), &[20, 30]).unwrap();
        assert_eq!(ledger.record(&"b2".into()).unwrap().reward, 20);
        assert_eq!(ledger.record(&"b3".into()).unwrap().reward, 30);
    }

    #[test]
    fn decrease_must_stay_positive() {
        let mut ledger = RewardLedger::new();
        let b = AccountId::from("b1");
        ledger.register(b.clone(), 10).unwrap();
        assert_eq!(ledger.decrease(&b, 2), Ok(8));
        assert_eq!(
            ledger.decrease(&b, 8),
            Err(LedgerError::InvalidAmount { amount: 8, reward: 8 })
        );
        assert!(ledger.decrease(&b, 9).is_err());
        assert_eq!(ledger.decrease(&b, 7), Ok(1));
        assert_eq!(ledger.record(&b).unwrap().reward, 1);
    }

    #[test]
    fn decrease_unknown_is_not_registered() {
        let mut ledger = RewardLedger::new();
        let ghost = AccountId::from("ghost");
        assert_eq!(
            ledger.decrease(&ghost, 3),
            Err(LedgerError::NotRegistered(ghost.clone()))
        );
        assert!(ledger.record(&ghost).is_none());
    }

    #[test]
    fn claim_checks_run_in_order() {
        let mut ledger = RewardLedger::new();
        let b = AccountId::from("b");
        let zero = AccountId::from("zero");
        ledger.register(b.clone(), 10).unwrap();
        ledger.register(zero.clone(), 0).unwrap();

        ledger.set_locked(true);
        // Lock wins over every other condition, even for unknown ids.
        assert_eq!(ledger.check_claim(&"ghost".into(), 0), Err(LedgerError::Locked));
        assert_eq!(ledger.check_claim(&b, 100), Err(LedgerError::Locked));
        ledger.set_locked(false);

        assert_eq!(
            ledger.check_claim(&"ghost".into(), 100),
            Err(LedgerError::NotRegistered("ghost".into()))
        );
        assert_eq!(ledger.check_claim(&zero, 100), Err(LedgerError::ZeroReward(zero.clone())));
        assert_eq!(
            ledger.check_claim(&b, 9),
            Err(LedgerError::InsufficientVaultFunds {
                available: 9,
                requested: 10
            })
        );
        assert_eq!(ledger.check_claim(&b, 10), Ok(10));

        ledger.latch(&b).unwrap();
        assert_eq!(ledger.check_claim(&b, 100), Err(LedgerError::AlreadyClaimed(b.clone())));
        assert_eq!(ledger.latch(&b), Err(LedgerError::AlreadyClaimed(b.clone())));
    }

    #[test]
    fn latched_record_keeps_history_and_is_frozen() {
        let mut ledger = RewardLedger::new();
        let b = AccountId::from("b");
        ledger.register(b.clone(), 8).unwrap();
        ledger.latch(&b).unwrap();

        let record = ledger.record(&b).unwrap();
        assert_eq!(record.reward, 8);
        assert!(record.withdrawn);
        assert_eq!(ledger.state(&b), BeneficiaryState::Claimed);
        assert_eq!(ledger.decrease(&b, 3), Err(LedgerError::AlreadyClaimed(b.clone())));
    }
}
