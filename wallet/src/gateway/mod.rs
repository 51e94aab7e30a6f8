//! # Ledger Gateway
//!
//! The remote service that knows the truth about accounts, fees, and time.
//! We treat it as slow and unreliable: every call is an await point, any call
//! may fail, and retry policy (if any) belongs to the implementation, never
//! to the callers in this crate.
//!
//! [`MemoryGateway`] is an in-process ledger used by the tests and by the
//! offline CLI.

pub mod account;
pub mod memory;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use account::{AccountSnapshot, Signer, Thresholds};
pub use memory::{LedgerSnapshot, MemoryGateway};

use crate::fees::FeeStatistics;
use crate::transaction::types::ValidityWindow;

/// Failures talking to the gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network-level failure: connection refused, reset, DNS, etc.
    #[error("transport error: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status.
    #[error("gateway returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response arrived but could not be understood.
    #[error("malformed gateway response: {0}")]
    Malformed(String),
}

/// Capability set consumed from the Ledger Gateway.
///
/// One implementation instance talks to one endpoint. Implementations must
/// be shareable across tasks: the transaction builder fans out to all three
/// fetches at once.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Endpoint URL (or other identifier), for diagnostics only.
    fn endpoint(&self) -> &str;

    /// Current state of `account_id`, `None` if the account does not exist.
    async fn fetch_account_data(
        &self,
        account_id: &str,
    ) -> Result<Option<AccountSnapshot>, GatewayError>;

    /// Recent fee statistics.
    async fn fetch_fee_statistics(&self) -> Result<FeeStatistics, GatewayError>;

    /// A validity window of `duration` starting at the gateway's notion of
    /// "now". Using the gateway's clock instead of ours keeps a skewed local
    /// clock from producing already-expired transactions.
    async fn fetch_validity_window(&self, duration: Duration)
        -> Result<ValidityWindow, GatewayError>;

    async fn account_exists(&self, account_id: &str) -> Result<bool, GatewayError> {
        Ok(self.fetch_account_data(account_id).await?.is_some())
    }
}
