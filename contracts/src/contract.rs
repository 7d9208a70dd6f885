//! # Reward Token Contract
//!
//! Composes the fixed-supply token, the custodial vault, and the reward
//! ledger into a single contract with one owner. All state lives in a plain
//! owned value inside [`RewardToken`]; nothing is global.
//!
//! ## Execution Model
//!
//! Every public mutating call runs through [`RewardToken::execute`]:
//!
//! 1. The caller is checked against the contract's own custodial identity.
//! 2. The state is snapshotted.
//! 3. The call body runs. It may credit tokens to an account that has a
//!    [`TransferHook`], and that hook may call straight back into the
//!    contract. Such re-entrant calls go through `execute` too, and see
//!    whatever the outer call has already written (in particular, the claim
//!    latch).
//! 4. On error the snapshot is restored, undoing the outer call and every
//!    nested call it made. On success, if this is the outermost call, the
//!    buffered events are journaled under a fresh transaction id.
//!
//! `&mut self` gives us strict serialization for free; see
//! [`SharedRewardToken`](crate::shared::SharedRewardToken) for the
//! multi-threaded handle.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::access::Ownable;
use crate::config::{ConfigError, TokenConfig};
use crate::error::LedgerError;
use crate::events::{EventRecord, LedgerEvent};
use crate::identity::AccountId;
use crate::rewards::{BeneficiaryState, RewardLedger, RewardRecord};
use crate::token::FixedSupplyToken;

// ---------------------------------------------------------------------------
// Transfer hooks
// ---------------------------------------------------------------------------

/// Details of a credit, handed to the recipient's hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferNotice {
    /// Account that was debited.
    pub from: AccountId,
    /// Account that was credited (the hook's owner).
    pub to: AccountId,
    /// Amount moved.
    pub amount: u64,
}

/// Callback run whenever tokens are credited to the account it is
/// registered for.
///
/// The credit has already been applied when the hook runs. Returning an
/// error reverts the whole enclosing call, credit included.
pub trait TransferHook: Send + Sync {
    /// Reacts to an incoming transfer. May call back into `contract`.
    fn on_received(&mut self, contract: &mut RewardToken, notice: &TransferNotice) -> Result<(), LedgerError>;
}

impl<F> TransferHook for F
where
    F: FnMut(&mut RewardToken, &TransferNotice) -> Result<(), LedgerError> + Send + Sync,
{
    fn on_received(&mut self, contract: &mut RewardToken, notice: &TransferNotice) -> Result<(), LedgerError> {
        self(contract, notice)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Everything a failed call must roll back.
#[derive(Debug, Clone)]
pub(crate) struct ContractState {
    pub(crate) token: FixedSupplyToken,
    pub(crate) access: Ownable,
    pub(crate) rewards: RewardLedger,
    /// Events of the calls currently in flight.
    pending: Vec<LedgerEvent>,
}

/// A serializable view of all observable contract state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
    /// The contract's custodial identity.
    pub address: AccountId,
    pub owner: AccountId,
    pub locked: bool,
    pub vault_balance: u64,
    /// Non-zero balances, vault included.
    pub balances: BTreeMap<AccountId, u64>,
    pub beneficiaries: BTreeMap<AccountId, RewardRecord>,
    /// Number of journaled events.
    pub event_count: usize,
}

// ---------------------------------------------------------------------------
// RewardToken
// ---------------------------------------------------------------------------

/// A fixed-supply token with a custodial reward vault.
pub struct RewardToken {
    address: AccountId,
    pub(crate) state: ContractState,
    journal: Vec<EventRecord>,
    hooks: HashMap<AccountId, Box<dyn TransferHook>>,
    /// Accounts whose hook is running, and whether it was cleared meanwhile.
    running_hooks: HashMap<AccountId, bool>,
    depth: usize,
}

impl std::fmt::Debug for RewardToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardToken")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("journal_len", &self.journal.len())
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RewardToken {
    /// Deploys the contract: mints the whole supply to `owner` and derives
    /// the custodial vault identity.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the token configuration is invalid or
    /// the owner identity is empty.
    pub fn new(config: TokenConfig, owner: AccountId) -> Result<Self, ConfigError> {
        config.validate()?;
        if owner.is_empty() {
            return Err(ConfigError::EmptyOwner);
        }

        let address = AccountId::derive_contract(&owner, &config.name);
        let token = FixedSupplyToken::new(&config, &owner);
        info!(
            name = %config.name,
            symbol = %config.symbol,
            total_supply = config.total_supply,
            owner = %owner,
            address = %address,
            "reward token deployed"
        );

        Ok(Self {
            address,
            state: ContractState {
                token,
                access: Ownable::new(owner),
                rewards: RewardLedger::new(),
                pending: Vec::new(),
            },
            journal: Vec::new(),
            hooks: HashMap::new(),
            running_hooks: HashMap::new(),
            depth: 0,
        })
    }

    // -- executor ----------------------------------------------------------

    /// Runs `body` as one atomic call made by `caller`.
    pub(crate) fn execute<T>(
        &mut self,
        caller: &AccountId,
        op: &'static str,
        body: impl FnOnce(&mut Self) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        self.ensure_external(caller)?;
        debug!(op, caller = %caller, depth = self.depth, "call");

        let snapshot = self.state.clone();
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;

        match result {
            Ok(value) => {
                if self.depth == 0 {
                    self.commit(caller);
                }
                Ok(value)
            }
            Err(err) => {
                self.state = snapshot;
                warn!(op, caller = %caller, depth = self.depth, error = %err, "call rejected");
                Err(err)
            }
        }
    }

    /// Rejects the empty identity and the contract's own custodial identity
    /// wherever an outside party is expected.
    pub(crate) fn ensure_external(&self, account: &AccountId) -> Result<(), LedgerError> {
        if account.is_empty() {
            return Err(LedgerError::EmptyIdentity);
        }
        if account == &self.address {
            return Err(LedgerError::ReservedIdentity(account.clone()));
        }
        Ok(())
    }

    /// Journals the buffered events of the outermost call.
    fn commit(&mut self, caller: &AccountId) {
        let events = std::mem::take(&mut self.state.pending);
        if events.is_empty() {
            return;
        }

        let tx_id = Uuid::new_v4();
        let recorded_at = Utc::now();
        for event in events {
            let sequence = self.journal.len() as u64;
            info!(sequence, tx_id = %tx_id, event = event.name(), "event committed");
            self.journal.push(EventRecord {
                sequence,
                tx_id,
                caller: caller.clone(),
                recorded_at,
                event,
            });
        }
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.state.pending.push(event);
    }

    /// Moves tokens, emits `Transfer`, and runs the recipient's hook.
    pub(crate) fn move_tokens(&mut self, from: &AccountId, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.state.token.transfer(from, to, amount)?;
        self.emit(LedgerEvent::Transfer {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        self.notify_recipient(from, to, amount)
    }

    fn notify_recipient(&mut self, from: &AccountId, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        // Taken out while it runs, so a credit back to the same account from
        // inside the hook does not recurse into it.
        let Some(mut hook) = self.hooks.remove(to) else {
            return Ok(());
        };

        let notice = TransferNotice {
            from: from.clone(),
            to: to.clone(),
            amount,
        };
        self.running_hooks.insert(to.clone(), false);
        let result = hook.on_received(self, &notice);
        let cleared = self.running_hooks.remove(to).unwrap_or(false);
        if !cleared {
            // A hook installed from inside the running one wins.
            self.hooks.entry(to.clone()).or_insert(hook);
        }

        result.map_err(|e| LedgerError::TransferRejected {
            recipient: to.clone(),
            reason: e.to_string(),
        })
    }

    // -- hooks -------------------------------------------------------------

    /// Registers `hook` to run on every credit to `account`, replacing any
    /// previous hook.
    pub fn set_transfer_hook(&mut self, account: AccountId, hook: impl TransferHook + 'static) -> Result<(), LedgerError> {
        self.ensure_external(&account)?;
        if let Some(cleared) = self.running_hooks.get_mut(&account) {
            *cleared = false;
        }
        self.hooks.insert(account, Box::new(hook));
        Ok(())
    }

    /// Removes the hook registered for `account`, if any. A hook may clear
    /// itself while it runs; it is then dropped once it returns.
    pub fn clear_transfer_hook(&mut self, account: &AccountId) -> bool {
        let removed = self.hooks.remove(account).is_some();
        match self.running_hooks.get_mut(account) {
            Some(cleared) if !*cleared => {
                *cleared = true;
                true
            }
            _ => removed,
        }
    }

    // -- ownership ---------------------------------------------------------

    /// Hands administrative control to `new_owner`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Unauthorized`] if `caller` is not the owner,
    /// [`LedgerError::ReservedIdentity`] if `new_owner` is the vault itself,
    /// [`LedgerError::EmptyIdentity`] if it is empty.
    pub fn transfer_ownership(&mut self, caller: &AccountId, new_owner: AccountId) -> Result<(), LedgerError> {
        self.execute(caller, "transfer_ownership", |c| {
            c.state.access.ensure_owner(caller)?;
            c.ensure_external(&new_owner)?;
            let previous = c.state.access.transfer(caller, new_owner.clone())?;
            c.emit(LedgerEvent::OwnershipTransferred {
                previous,
                new: new_owner,
            });
            Ok(())
        })
    }

    // -- token surface -----------------------------------------------------

    /// Moves `amount` of the caller's own tokens to `to`.
    pub fn transfer(&mut self, caller: &AccountId, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.execute(caller, "transfer", |c| {
            if to.is_empty() {
                return Err(LedgerError::EmptyIdentity);
            }
            c.move_tokens(caller, to, amount)
        })
    }

    /// Lets `spender` move up to `amount` of the caller's tokens.
    pub fn approve(&mut self, caller: &AccountId, spender: &AccountId, amount: u64) -> Result<(), LedgerError> {
        self.execute(caller, "approve", |c| {
            if spender.is_empty() {
                return Err(LedgerError::EmptyIdentity);
            }
            c.state.token.approve(caller, spender, amount);
            c.emit(LedgerEvent::Approval {
                owner: caller.clone(),
                spender: spender.clone(),
                amount,
            });
            Ok(())
        })
    }

    /// Moves `amount` from `from` to `to` using the caller's allowance.
    pub fn transfer_from(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.execute(caller, "transfer_from", |c| {
            if from == &c.address {
                return Err(LedgerError::ReservedIdentity(from.clone()));
            }
            if to.is_empty() {
                return Err(LedgerError::EmptyIdentity);
            }
            c.state.token.transfer_from(caller, from, to, amount)?;
            c.emit(LedgerEvent::Transfer {
                from: from.clone(),
                to: to.clone(),
                amount,
            });
            c.notify_recipient(from, to, amount)
        })
    }

    // -- queries -----------------------------------------------------------

    /// The contract's custodial identity (the vault's balance key).
    pub fn address(&self) -> &AccountId {
        &self.address
    }

    /// The administrative owner.
    pub fn owner(&self) -> &AccountId {
        self.state.access.owner()
    }

    /// Whether claims are globally locked.
    pub fn is_locked(&self) -> bool {
        self.state.rewards.is_locked()
    }

    pub fn name(&self) -> &str {
        self.state.token.name()
    }

    pub fn symbol(&self) -> &str {
        self.state.token.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.state.token.decimals()
    }

    pub fn total_supply(&self) -> u64 {
        self.state.token.total_supply()
    }

    /// Token balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.state.token.balance_of(account)
    }

    /// Remaining allowance of `spender` over `owner`'s tokens.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u64 {
        self.state.token.allowance(owner, spender)
    }

    /// The reward record of `beneficiary`, if one was ever created.
    pub fn beneficiary(&self, beneficiary: &AccountId) -> Option<RewardRecord> {
        self.state.rewards.record(beneficiary).copied()
    }

    /// Where `beneficiary` sits in the claim state machine.
    pub fn beneficiary_state(&self, beneficiary: &AccountId) -> BeneficiaryState {
        self.state.rewards.state(beneficiary)
    }

    /// Number of reward records ever created.
    pub fn beneficiary_count(&self) -> usize {
        self.state.rewards.len()
    }

    /// The committed event journal, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.journal
    }

    /// Captures all observable state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let token = &self.state.token;
        LedgerSnapshot {
            name: token.name().to_string(),
            symbol: token.symbol().to_string(),
            decimals: token.decimals(),
            total_supply: token.total_supply(),
            address: self.address.clone(),
            owner: self.owner().clone(),
            locked: self.is_locked(),
            vault_balance: self.vault_balance(),
            balances: token.balances().map(|(a, b)| (a.clone(), b)).collect(),
            beneficiaries: self
                .state
                .rewards
                .records()
                .map(|(a, r)| (a.clone(), *r))
                .collect(),
            event_count: self.journal.len(),
        }
    }
}
