//! # Account Identities
//!
//! Every balance, allowance, and reward record is keyed by an [`AccountId`].
//! The ledger treats identities as opaque: authenticating *who* is calling is
//! the transport's job, not ours. What we do care about is that the
//! contract's own custodial identity can never be impersonated, so it is
//! derived from a hash rather than chosen by a human.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain separator mixed into the custodial address derivation.
const CONTRACT_ADDRESS_DOMAIN: &[u8] = b"reward-vault";

/// Number of digest bytes kept for a derived contract address.
const CONTRACT_ADDRESS_BYTES: usize = 20;

/// An opaque account reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wraps a raw identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the custodial identity of a contract deployed by `owner`
    /// under the token `name`.
    ///
    /// The result is `0x` followed by the hex encoding of the first 20 bytes
    /// of `SHA-256(domain || owner || 0x00 || name)`. Deterministic, so the same
    /// deployment parameters always yield the same vault address.
    pub fn derive_contract(owner: &AccountId, name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(CONTRACT_ADDRESS_DOMAIN);
        hasher.update(owner.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();
        Self(format!("0x{}", hex::encode(&digest[..CONTRACT_ADDRESS_BYTES])))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identity is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
