//! Transaction envelope and its synchronous builder.
//!
//! [`TransactionBuilder`] only assembles fields it is handed. Deciding the
//! sequence number, fee and validity window needs the gateway and lives in
//! [`super::assemble`]; signing lives in [`super::signing`]. Keeping this
//! layer pure keeps it testable without a gateway or key material.

use serde::{Deserialize, Serialize};

use super::types::{Memo, Network, Operation, OperationBody, ValidityWindow};
use crate::crypto::hash::{network_id, transaction_hash};
use crate::crypto::hint::DecoratedSignature;
use crate::error::BuildError;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A ledger transaction, unsigned or signed.
///
/// # Canonical Byte Format
///
/// [`Transaction::signable_bytes`] covers everything except `network` and
/// `signatures`: source, sequence, base fee, validity window, memo, and every
/// operation in order. The network enters through the hash instead, see
/// [`Transaction::hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Account paying the fee and consuming the sequence number.
    pub source: String,

    /// The source account's next sequence number. Consumed exactly once.
    pub sequence: u64,

    /// Fee per operation, in stroops.
    pub base_fee: u64,

    #[serde(default)]
    pub memo: Memo,

    pub validity: ValidityWindow,

    pub network: Network,

    /// Executed in this exact order.
    pub operations: Vec<Operation>,

    /// Empty for an unsigned transaction.
    #[serde(default)]
    pub signatures: Vec<DecoratedSignature>,
}

impl Transaction {
    /// Deterministic byte layout: null-terminated strings, little-endian
    /// fixed-width integers, one tag byte per enum variant.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128 + 96 * self.operations.len());

        put_str(&mut buf, &self.source);
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.base_fee.to_le_bytes());
        buf.extend_from_slice(&self.validity.min_time.to_le_bytes());
        buf.extend_from_slice(&self.validity.max_time.to_le_bytes());

        match &self.memo {
            Memo::None => buf.push(0),
            Memo::Text(text) => {
                buf.push(1);
                put_str(&mut buf, text);
            }
            Memo::Id(id) => {
                buf.push(2);
                buf.extend_from_slice(&id.to_le_bytes());
            }
            Memo::Hash(hash) => {
                buf.push(3);
                buf.extend_from_slice(hash);
            }
            Memo::Return(hash) => {
                buf.push(4);
                buf.extend_from_slice(hash);
            }
        }

        buf.extend_from_slice(&(self.operations.len() as u32).to_le_bytes());
        for op in &self.operations {
            match &op.source {
                Some(source) => {
                    buf.push(1);
                    put_str(&mut buf, source);
                }
                None => buf.push(0),
            }
            match &op.body {
                OperationBody::Payment {
                    destination,
                    asset,
                    amount,
                } => {
                    buf.push(1);
                    put_str(&mut buf, destination);
                    put_str(&mut buf, &asset.to_string());
                    buf.extend_from_slice(&amount.stroops().to_le_bytes());
                }
                OperationBody::CreateAccount {
                    destination,
                    starting_balance,
                } => {
                    buf.push(2);
                    put_str(&mut buf, destination);
                    buf.extend_from_slice(&starting_balance.stroops().to_le_bytes());
                }
                OperationBody::ManageData { name, value } => {
                    buf.push(3);
                    put_str(&mut buf, name);
                    match value {
                        Some(value) => {
                            buf.push(1);
                            put_str(&mut buf, value);
                        }
                        None => buf.push(0),
                    }
                }
            }
        }

        buf
    }

    /// `sha256(network_id || signable_bytes)`. What signatures sign.
    pub fn hash(&self) -> [u8; 32] {
        transaction_hash(&network_id(self.network.passphrase()), &self.signable_bytes())
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash())
    }

    /// Total fee charged: base fee times number of operations.
    pub fn total_fee(&self) -> u64 {
        self.base_fee
            .saturating_mul(self.operations.len() as u64)
    }

    /// Every account this transaction draws from: the transaction source
    /// first, then operation-level overrides in order, without duplicates.
    pub fn sources(&self) -> Vec<&str> {
        let mut sources = vec![self.source.as_str()];
        for source in self.operations.iter().filter_map(|op| op.source.as_deref()) {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        sources
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0x00);
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// ```rust,no_run
/// use meridian_wallet::transaction::TransactionBuilder;
/// use meridian_wallet::transaction::types::{Amount, Asset, Network, Operation, ValidityWindow};
///
/// let tx = TransactionBuilder::new("SourceAccount", 42, Network::Testnet)
///     .base_fee(100)
///     .validity(ValidityWindow::starting_at(1_700_000_000, 90))
///     .operation(Operation::payment("Dest", Asset::Native, Amount(10_000_000)))
///     .build()
///     .unwrap();
/// ```
///
/// With no validity window set, the transaction carries `0..0`, which the
/// ledger reads as "no time bounds".
pub struct TransactionBuilder {
    source: String,
    sequence: u64,
    network: Network,
    base_fee: u64,
    memo: Memo,
    validity: ValidityWindow,
    operations: Vec<Operation>,
}

impl TransactionBuilder {
    pub fn new(source: &str, sequence: u64, network: Network) -> Self {
        Self {
            source: source.to_string(),
            sequence,
            network,
            base_fee: 0,
            memo: Memo::None,
            validity: ValidityWindow {
                min_time: 0,
                max_time: 0,
            },
            operations: Vec::new(),
        }
    }

    pub fn base_fee(mut self, fee: u64) -> Self {
        self.base_fee = fee;
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = memo;
        self
    }

    pub fn validity(mut self, window: ValidityWindow) -> Self {
        self.validity = window;
        self
    }

    /// Appends one operation after those already added.
    pub fn operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    /// Appends `ops` in iteration order.
    pub fn operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(ops);
        self
    }

    pub fn build(self) -> Result<Transaction, BuildError> {
        if self.operations.is_empty() {
            return Err(BuildError::NoOperations);
        }
        Ok(Transaction {
            source: self.source,
            sequence: self.sequence,
            base_fee: self.base_fee,
            memo: self.memo,
            validity: self.validity,
            network: self.network,
            operations: self.operations,
            signatures: Vec::new(),
        })
    }
}
