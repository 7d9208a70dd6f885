// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Reward Vault Contracts
//!
//! A fixed-supply token with an attached reward-distribution ledger. The
//! owner deposits tokens into a custodial vault, registers beneficiaries with
//! individual entitlements, and each beneficiary claims exactly once,
//! subject to a global lock and to whatever the vault actually holds at
//! claim time.
//!
//! - **token**: Balances, allowances, and transfers for the fixed supply.
//! - **vault**: Owner deposits and emergency withdrawals.
//! - **rewards**: Beneficiary records and the claim state machine.
//! - **access**: The single-owner check in front of every admin call.
//! - **contract**: Composition, atomic execution, re-entrant transfer hooks.
//! - **shared**: `Arc<RwLock<_>>` handle for multi-threaded callers.
//!
//! ## Design Principles
//!
//! 1. A failed call changes nothing. State is snapshotted per call and
//!    restored on error, nested re-entrant calls included.
//! 2. The claim latch is written before tokens move. A recipient that calls
//!    back in mid-transfer sees its reward as already claimed.
//! 3. The vault balance is always read live from the token ledger. Nothing
//!    is reserved, so claims re-check solvency every time.
//! 4. All amounts are `u64` with checked arithmetic.

pub mod access;
pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod identity;
pub mod rewards;
pub mod shared;
pub mod token;
pub mod vault;

/// Version of the contract library, for operator tooling.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use contract::{LedgerSnapshot, RewardToken, TransferHook, TransferNotice};
pub use error::LedgerError;
pub use identity::AccountId;
pub use shared::SharedRewardToken;
