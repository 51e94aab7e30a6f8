//! Built transactions versus transaction records.
//!
//! The wallet deals with two shapes of "a transaction": envelopes it built
//! (or received for co-signing) and records the gateway reports for
//! transactions already on the ledger. Both are wrapped in
//! [`TransactionRef`] so the rest of the code asks one accessor for the
//! source account and sequence number, whatever the shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::builder::Transaction;
use super::types::Memo;
use crate::gateway::account::u64_from_str_or_number;

/// A transaction as reported by the gateway after it hit the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub source_account: String,
    #[serde(deserialize_with = "u64_from_str_or_number")]
    pub source_account_sequence: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub successful: bool,
    #[serde(default)]
    pub operation_count: u32,
    #[serde(default)]
    pub memo: Memo,
}

/// Either a transaction envelope or a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TransactionRef {
    Built(Transaction),
    Record(TransactionRecord),
}

impl TransactionRef {
    pub fn source_account(&self) -> &str {
        match self {
            Self::Built(tx) => &tx.source,
            Self::Record(record) => &record.source_account,
        }
    }

    pub fn sequence(&self) -> u64 {
        match self {
            Self::Built(tx) => tx.sequence,
            Self::Record(record) => record.source_account_sequence,
        }
    }

    /// Identity that needs no hashing: a source account can only ever use a
    /// sequence number once.
    pub fn cheap_id(&self) -> String {
        format!("{}:{}", self.source_account(), self.sequence())
    }

    pub fn hash_hex(&self) -> String {
        match self {
            Self::Built(tx) => tx.hash_hex(),
            Self::Record(record) => record.hash.clone(),
        }
    }

    pub fn memo(&self) -> &Memo {
        match self {
            Self::Built(tx) => &tx.memo,
            Self::Record(record) => &record.memo,
        }
    }
}

impl From<Transaction> for TransactionRef {
    fn from(tx: Transaction) -> Self {
        Self::Built(tx)
    }
}

impl From<TransactionRecord> for TransactionRef {
    fn from(record: TransactionRecord) -> Self {
        Self::Record(record)
    }
}
