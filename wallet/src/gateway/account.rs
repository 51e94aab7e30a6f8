//! Account state as reported by the Ledger Gateway.
//!
//! An [`AccountSnapshot`] is a point-in-time copy. It goes stale the moment
//! the account's sequence number moves on elsewhere, so nothing in this crate
//! mutates or caches one beyond the call that fetched it.

use serde::{Deserialize, Deserializer, Serialize};

/// A key allowed to sign for an account, with its voting weight.
///
/// Weight 0 means the signer has been removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub key: String,
    pub weight: u8,
}

impl Signer {
    pub fn new(key: &str, weight: u8) -> Self {
        Self {
            key: key.to_string(),
            weight,
        }
    }
}

/// Cumulative signer weight required per operation risk class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(alias = "low_threshold")]
    pub low: u8,
    #[serde(alias = "med_threshold")]
    pub medium: u8,
    #[serde(alias = "high_threshold")]
    pub high: u8,
}

impl Thresholds {
    pub fn new(low: u8, medium: u8, high: u8) -> Self {
        Self { low, medium, high }
    }
}

/// Immutable snapshot of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: String,
    /// Last consumed sequence number. The next transaction uses `sequence + 1`.
    #[serde(deserialize_with = "u64_from_str_or_number")]
    pub sequence: u64,
    pub signers: Vec<Signer>,
    pub thresholds: Thresholds,
}

impl AccountSnapshot {
    /// A plain account controlled by its master key alone (weight 1, all
    /// thresholds 0), which is what the ledger creates by default.
    pub fn single_signer(id: &str, sequence: u64) -> Self {
        Self {
            id: id.to_string(),
            sequence,
            signers: vec![Signer::new(id, 1)],
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_signers(mut self, signers: Vec<Signer>) -> Self {
        self.signers = signers;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn is_multisig(&self) -> bool {
        self.signers.len() > 1
    }

    /// Signers that still carry weight.
    pub fn active_signers(&self) -> impl Iterator<Item = &Signer> {
        self.signers.iter().filter(|s| s.weight > 0)
    }

    /// Weight of `key` on this account, `None` if it is not an active signer.
    pub fn signer_weight(&self, key: &str) -> Option<u8> {
        self.active_signers()
            .find(|s| s.key == key)
            .map(|s| s.weight)
    }
}

/// Gateways report sequence numbers as decimal strings (they overflow a
/// JavaScript number); accept either form.
pub(crate) fn u64_from_str_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(u64),
    }

    match StrOrNum::deserialize(deserializer)? {
        StrOrNum::Num(n) => Ok(n),
        StrOrNum::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
