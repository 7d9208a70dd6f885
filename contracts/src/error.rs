//! Error types for the reward contract.
//!
//! Every public call on [`RewardToken`](crate::contract::RewardToken) that can
//! fail returns a [`LedgerError`]. A returned error always means the call had
//! no effect: state, balances, and the event journal are exactly as they were
//! before it.

use thiserror::Error;

use crate::identity::AccountId;
use crate::token::TokenError;

/// Errors that can occur while operating the vault and reward ledger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A non-owner called an owner-only operation.
    #[error("unauthorized: {caller} is not the owner")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
    },

    /// The owner's personal balance does not cover a deposit.
    #[error("insufficient funds: owner holds {available}, deposit requires {requested}")]
    InsufficientFunds {
        /// The owner's current balance.
        available: u64,
        /// Amount the owner tried to deposit.
        requested: u64,
    },

    /// The vault balance does not cover a withdrawal or claim.
    #[error("insufficient vault funds: vault holds {available}, requested {requested}")]
    InsufficientVaultFunds {
        /// The vault's current balance.
        available: u64,
        /// Amount requested from the vault.
        requested: u64,
    },

    /// The beneficiary already has a reward record.
    #[error("beneficiary {0} is already registered")]
    AlreadyRegistered(AccountId),

    /// Batch registration received sequences of different or zero length.
    #[error("length mismatch: {beneficiaries} beneficiaries, {rewards} rewards")]
    LengthMismatch {
        /// Number of identities supplied.
        beneficiaries: usize,
        /// Number of rewards supplied.
        rewards: usize,
    },

    /// The target identity has no reward record.
    #[error("beneficiary {0} is not registered")]
    NotRegistered(AccountId),

    /// The reward has already been claimed; the record is frozen.
    #[error("reward for {0} has already been claimed")]
    AlreadyClaimed(AccountId),

    /// A decrease must be strictly less than the current reward.
    #[error("invalid amount: cannot decrease reward {reward} by {amount}")]
    InvalidAmount {
        /// The decrease that was requested.
        amount: u64,
        /// The reward currently on record.
        reward: u64,
    },

    /// The beneficiary's entitlement is zero.
    #[error("reward for {0} is zero")]
    ZeroReward(AccountId),

    /// Claims are globally locked.
    #[error("rewards are locked")]
    Locked,

    /// The contract's own custodial identity cannot act as a caller, be
    /// handed ownership, or hold a reward record.
    #[error("identity {0} is reserved for the contract vault")]
    ReservedIdentity(AccountId),

    /// An identity argument was the empty string.
    #[error("account identity must not be empty")]
    EmptyIdentity,

    /// Checked arithmetic on an amount overflowed.
    #[error("amount overflow")]
    AmountOverflow,

    /// The recipient's transfer hook refused the credit.
    #[error("transfer to {recipient} rejected by hook: {reason}")]
    TransferRejected {
        /// Account whose hook failed.
        recipient: AccountId,
        /// Reason reported by the hook.
        reason: String,
    },

    /// The underlying token ledger refused the transfer.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}
