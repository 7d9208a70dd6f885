//! # Ledger Events
//!
//! Observable notifications for external monitoring. Events are never
//! authoritative: the balances and reward records are. A call that fails
//! leaves no events behind, and the events of a successful call are only
//! journaled once the outermost call commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::AccountId;

/// Something that happened to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Tokens moved between two accounts.
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: u64,
    },
    /// An allowance was set.
    Approval {
        owner: AccountId,
        spender: AccountId,
        amount: u64,
    },
    /// The owner funded the vault.
    Deposited { amount: u64 },
    /// A reward record was created.
    BeneficiaryAdded { beneficiary: AccountId, reward: u64 },
    /// An unclaimed reward was reduced.
    RewardDecreased {
        beneficiary: AccountId,
        new_reward: u64,
    },
    /// A beneficiary claimed their reward.
    RewardClaimed { beneficiary: AccountId, amount: u64 },
    /// The owner pulled tokens out of the vault.
    EmergencyWithdrawn { amount: u64 },
    /// The global claim lock was set or cleared.
    LockChanged { locked: bool },
    /// Administrative control moved to a new owner.
    OwnershipTransferred {
        previous: AccountId,
        new: AccountId,
    },
}

impl LedgerEvent {
    /// Short, stable name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::Transfer { .. } => "Transfer",
            LedgerEvent::Approval { .. } => "Approval",
            LedgerEvent::Deposited { .. } => "Deposited",
            LedgerEvent::BeneficiaryAdded { .. } => "BeneficiaryAdded",
            LedgerEvent::RewardDecreased { .. } => "RewardDecreased",
            LedgerEvent::RewardClaimed { .. } => "RewardClaimed",
            LedgerEvent::EmergencyWithdrawn { .. } => "EmergencyWithdrawn",
            LedgerEvent::LockChanged { .. } => "LockChanged",
            LedgerEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

/// A committed event with its position in the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Monotonic position in the journal, starting at 0.
    pub sequence: u64,
    /// Identifier shared by every event of one outermost call.
    pub tx_id: Uuid,
    /// The identity that made the outermost call.
    pub caller: AccountId,
    /// When the call committed.
    pub recorded_at: DateTime<Utc>,
    /// What happened.
    pub event: LedgerEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let ev = LedgerEvent::RewardClaimed {
            beneficiary: AccountId::from("b1"),
            amount: 8,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["event"], "reward_claimed");
        assert_eq!(json["beneficiary"], "b1");
        assert_eq!(json["amount"], 8);
        assert_eq!(ev.name(), "RewardClaimed");
    }
}
