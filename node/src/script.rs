//! # Operation Scripts
//!
//! A script is a JSON list of contract calls, each made by a named caller:
//!
//! ```json
//! { "steps": [
//!     { "caller": "owner", "op": "deposit", "amount": 100 },
//!     { "caller": "owner", "op": "add_beneficiary", "beneficiary": "alice", "reward": 10 },
//!     { "caller": "alice", "op": "claim" }
//! ] }
//! ```
//!
//! Steps run in order against one contract. A rejected step leaves the
//! contract untouched; the run either continues or halts there
//! (`fail_fast`). The [`ScriptReport`] lists every outcome with the events
//! it committed, followed by a snapshot of the final state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use reward_contracts::events::EventRecord;
use reward_contracts::{AccountId, LedgerError, LedgerSnapshot, RewardToken};

/// One contract call, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Deposit {
        amount: u64,
    },
    EmergencyWithdraw {
        amount: u64,
    },
    AddBeneficiary {
        beneficiary: AccountId,
        reward: u64,
    },
    AddBeneficiaries {
        beneficiaries: Vec<AccountId>,
        rewards: Vec<u64>,
    },
    DecreaseReward {
        beneficiary: AccountId,
        amount: u64,
    },
    Claim,
    LockRewards {
        locked: bool,
    },
    Transfer {
        to: AccountId,
        amount: u64,
    },
    Approve {
        spender: AccountId,
        amount: u64,
    },
    TransferFrom {
        from: AccountId,
        to: AccountId,
        amount: u64,
    },
    TransferOwnership {
        new_owner: AccountId,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Deposit { .. } => "deposit",
            Operation::EmergencyWithdraw { .. } => "emergency_withdraw",
            Operation::AddBeneficiary { .. } => "add_beneficiary",
            Operation::AddBeneficiaries { .. } => "add_beneficiaries",
            Operation::DecreaseReward { .. } => "decrease_reward",
            Operation::Claim => "claim",
            Operation::LockRewards { .. } => "lock_rewards",
            Operation::Transfer { .. } => "transfer",
            Operation::Approve { .. } => "approve",
            Operation::TransferFrom { .. } => "transfer_from",
            Operation::TransferOwnership { .. } => "transfer_ownership",
        }
    }

    /// Makes the call. Returns the amount for calls that produce one
    /// (`claim` and `decrease_reward`).
    pub fn apply(&self, contract: &mut RewardToken, caller: &AccountId) -> Result<Option<u64>, LedgerError> {
        match self {
            Operation::Deposit { amount } => contract.deposit(caller, *amount).map(|_| None),
            Operation::EmergencyWithdraw { amount } => contract.emergency_withdraw(caller, *amount).map(|_| None),
            Operation::AddBeneficiary { beneficiary, reward } => contract
                .add_beneficiary(caller, beneficiary.clone(), *reward)
                .map(|_| None),
            Operation::AddBeneficiaries { beneficiaries, rewards } => contract
                .add_beneficiaries(caller, beneficiaries, rewards)
                .map(|_| None),
            Operation::DecreaseReward { beneficiary, amount } => {
                contract.decrease_reward(caller, beneficiary, *amount).map(Some)
            }
            Operation::Claim => contract.claim(caller).map(Some),
            Operation::LockRewards { locked } => contract.lock_rewards(caller, *locked).map(|_| None),
            Operation::Transfer { to, amount } => contract.transfer(caller, to, *amount).map(|_| None),
            Operation::Approve { spender, amount } => contract.approve(caller, spender, *amount).map(|_| None),
            Operation::TransferFrom { from, to, amount } => {
                contract.transfer_from(caller, from, to, *amount).map(|_| None)
            }
            Operation::TransferOwnership { new_owner } => {
                contract.transfer_ownership(caller, new_owner.clone()).map(|_| None)
            }
        }
    }
}

/// A call plus the identity making it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub caller: AccountId,
    #[serde(flatten)]
    pub op: Operation,
}

/// An ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    /// Reads a script file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse script {}", path.display()))
    }
}

/// What happened to a single step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    /// The call committed.
    Ok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<u64>,
        events: Vec<EventRecord>,
    },
    /// The call was rejected and changed nothing.
    Rejected { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    pub index: usize,
    pub caller: AccountId,
    pub op: String,
    #[serde(flatten)]
    pub result: StepResult,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.result, StepResult::Ok { .. })
    }
}

/// Full result of a script run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReport {
    pub generated_at: DateTime<Utc>,
    pub applied: usize,
    pub rejected: usize,
    /// Set when `fail_fast` stopped the run before the last step.
    pub halted: bool,
    pub outcomes: Vec<StepOutcome>,
    pub snapshot: LedgerSnapshot,
}

/// Replays `script` against `contract`.
pub fn run_script(contract: &mut RewardToken, script: &Script, fail_fast: bool) -> ScriptReport {
    let mut outcomes = Vec::with_capacity(script.steps.len());
    let mut halted = false;

    for (index, step) in script.steps.iter().enumerate() {
        let journal_len = contract.events().len();
        let result = match step.op.apply(contract, &step.caller) {
            Ok(value) => StepResult::Ok {
                value,
                events: contract.events()[journal_len..].to_vec(),
            },
            Err(err) => {
                tracing::warn!(index, op = step.op.name(), caller = %step.caller, error = %err, "step rejected");
                StepResult::Rejected { error: err.to_string() }
            }
        };

        let outcome = StepOutcome {
            index,
            caller: step.caller.clone(),
            op: step.op.name().to_string(),
            result,
        };
        let failed = !outcome.is_ok();
        outcomes.push(outcome);

        if failed && fail_fast {
            halted = index + 1 < script.steps.len();
            break;
        }
    }

    let applied = outcomes.iter().filter(|o| o.is_ok()).count();
    tracing::info!(applied, rejected = outcomes.len() - applied, halted, "script finished");

    ScriptReport {
        generated_at: Utc::now(),
        applied,
        rejected: outcomes.len() - applied,
        halted,
        outcomes,
        snapshot: contract.snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reward_contracts::config::TokenConfig;

    fn deploy() -> RewardToken {
        RewardToken::new(TokenConfig::default(), AccountId::from("owner")).unwrap()
    }

    const REFERENCE: &str = r#"{ "steps": [
        { "caller": "owner", "op": "deposit", "amount": 100 },
        { "caller": "owner", "op": "add_beneficiary", "beneficiary": "b1", "reward": 10 },
        { "caller": "owner", "op": "decrease_reward", "beneficiary": "b1", "amount": 2 },
        { "caller": "b1", "op": "claim" },
        { "caller": "b1", "op": "claim" },
        { "caller": "owner", "op": "emergency_withdraw", "amount": 30 }
    ] }"#;

    #[test]
    fn parses_every_op_shape() {
        let script: Script = serde_json::from_str(
            r#"{ "steps": [
                { "caller": "o", "op": "add_beneficiaries", "beneficiaries": ["a", "b"], "rewards": [1, 2] },
                { "caller": "o", "op": "lock_rewards", "locked": true },
                { "caller": "o", "op": "transfer_from", "from": "x", "to": "y", "amount": 3 },
                { "caller": "o", "op": "transfer_ownership", "new_owner": "p" },
                { "caller": "a", "op": "claim" }
            ] }"#,
        )
        .unwrap();

        assert_eq!(script.steps.len(), 5);
        assert_eq!(
            script.steps[0].op,
            Operation::AddBeneficiaries {
                beneficiaries: vec!["a".into(), "b".into()],
                rewards: vec![1, 2],
            }
        );
        assert_eq!(script.steps[4].op, Operation::Claim);
        assert_eq!(script.steps[4].caller, AccountId::from("a"));
    }

    #[test]
    fn unknown_op_is_a_parse_error() {
        let parsed: Result<Script, _> = serde_json::from_str(r#"{ "steps": [ { "caller": "o", "op": "mint" } ] }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn reference_script_continues_past_rejection() {
        let mut contract = deploy();
        let script: Script = serde_json::from_str(REFERENCE).unwrap();
        let report = run_script(&mut contract, &script, false);

        assert_eq!(report.applied, 5);
        assert_eq!(report.rejected, 1);
        assert!(!report.halted);

        match &report.outcomes[3].result {
            StepResult::Ok { value, events } => {
                assert_eq!(*value, Some(8));
                assert_eq!(events.len(), 2);
            }
            other => panic!("claim should succeed: {other:?}"),
        }
        match &report.outcomes[4].result {
            StepResult::Rejected { error } => assert!(error.contains("already been claimed")),
            other => panic!("second claim should fail: {other:?}"),
        }

        assert_eq!(report.snapshot.vault_balance, 62);
        assert_eq!(report.snapshot.balances[&AccountId::from("b1")], 8);
    }

    #[test]
    fn fail_fast_halts_at_first_rejection() {
        let mut contract = deploy();
        let script: Script = serde_json::from_str(REFERENCE).unwrap();
        let report = run_script(&mut contract, &script, true);

        assert_eq!(report.outcomes.len(), 5);
        assert!(report.halted);
        assert_eq!(report.snapshot.vault_balance, 92);
    }

    #[test]
    fn report_serializes_with_status_tags() {
        let mut contract = deploy();
        let script: Script = serde_json::from_str(REFERENCE).unwrap();
        let report = run_script(&mut contract, &script, false);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "ok");
        assert_eq!(json["outcomes"][0]["op"], "deposit");
        assert_eq!(json["outcomes"][4]["status"], "rejected");
        assert_eq!(json["snapshot"]["locked"], false);
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, REFERENCE).unwrap();

        let script = Script::load(&path).unwrap();
        assert_eq!(script.steps.len(), 6);
        assert!(Script::load(&dir.path().join("missing.json")).is_err());
    }
}
