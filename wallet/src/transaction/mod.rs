//! # Transactions
//!
//! - [`types`]: value types (network, asset, amount, memo, operations)
//! - [`builder`]: the envelope and its synchronous builder
//! - [`assemble`]: the async pipeline that fetches sequence, fee and time
//!   bounds from the gateway
//! - [`signing`]: attaching signatures, password-protected local accounts
//! - [`record`]: built transactions and ledger records behind one accessor

pub mod assemble;
pub mod builder;
pub mod record;
pub mod signing;
pub mod types;

pub use assemble::{create_transaction, run_branch, BranchOutcome, TxBlueprint};
pub use builder::{Transaction, TransactionBuilder};
pub use record::{TransactionRecord, TransactionRef};
pub use signing::{sign_transaction, sign_with_account, LocalAccount};
pub use types::{Amount, Asset, Memo, Network, Operation, OperationBody, ValidityWindow};
