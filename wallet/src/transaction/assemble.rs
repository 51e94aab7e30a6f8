//! # Transaction Assembly
//!
//! Builds an unsigned transaction from operations and a blueprint. Three
//! inputs come from the gateway and are fetched concurrently:
//!
//! | Branch          | Timeout | On timeout / failure          |
//! |-----------------|---------|-------------------------------|
//! | account data    | 10 s    | fatal (`AccountFetchTimeout`) |
//! | smart fee       | 5 s     | fallback fee, logged          |
//! | validity window | 10 s    | fatal (`TimeSyncTimeout`)     |
//!
//! Each branch runs as its own task under its own timeout. A branch that
//! times out is abandoned, not cancelled: the task finishes in the
//! background and its result is dropped. Branch policy is applied only
//! after all three have settled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::builder::{Transaction, TransactionBuilder};
use super::types::{Memo, Network, Operation};
use crate::config::{BuilderConfig, MULTISIG_MINIMUM_FEE};
use crate::error::{BuildError, WalletError};
use crate::fees::{final_fee, select_fee};
use crate::gateway::{AccountSnapshot, GatewayError, LedgerGateway};
use crate::timeouts::select_timeout;

/// How one fan-out branch settled.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome<T> {
    Ready(T),
    TimedOut,
    Failed(GatewayError),
}

impl<T> BranchOutcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Spawns `fut` and waits at most `limit` for it.
///
/// Dropping the `JoinHandle` on timeout detaches the task rather than
/// aborting it.
pub async fn run_branch<T, F>(limit: Duration, fut: F) -> BranchOutcome<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, GatewayError>> + Send + 'static,
{
    let handle = tokio::spawn(fut);
    match tokio::time::timeout(limit, handle).await {
        Err(_) => BranchOutcome::TimedOut,
        Ok(Err(join_err)) => {
            BranchOutcome::Failed(GatewayError::Transport(format!("gateway task died: {join_err}")))
        }
        Ok(Ok(Ok(value))) => BranchOutcome::Ready(value),
        Ok(Ok(Err(err))) => BranchOutcome::Failed(err),
    }
}

/// Caller-supplied parts of a transaction.
#[derive(Debug, Clone)]
pub struct TxBlueprint {
    /// Snapshot of the source account. Decides the validity window; the
    /// sequence number is always fetched fresh.
    pub account: AccountSnapshot,
    pub memo: Option<Memo>,
    /// Guaranteed minimum base fee.
    pub minimum_fee: Option<u64>,
    pub network: Network,
}

impl TxBlueprint {
    /// Blueprint for `account`. Multi-signature accounts get
    /// [`MULTISIG_MINIMUM_FEE`] as the minimum base fee.
    pub fn new(account: AccountSnapshot, network: Network) -> Self {
        let minimum_fee = account.is_multisig().then_some(MULTISIG_MINIMUM_FEE);
        Self {
            account,
            memo: None,
            minimum_fee,
            network,
        }
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = Some(memo);
        self
    }

    pub fn minimum_fee(mut self, fee: Option<u64>) -> Self {
        self.minimum_fee = fee;
        self
    }
}

/// Build an unsigned transaction with `operations` in the given order.
///
/// # Errors
///
/// [`BuildError`] when the source account or the validity window cannot be
/// obtained in time. Fee lookup problems never fail the build.
pub async fn create_transaction<G>(
    gateway: Arc<G>,
    operations: Vec<Operation>,
    blueprint: TxBlueprint,
    config: &BuilderConfig,
) -> Result<Transaction, WalletError>
where
    G: LedgerGateway + ?Sized + 'static,
{
    if operations.is_empty() {
        return Err(BuildError::NoOperations.into());
    }

    let account_id = blueprint.account.id.clone();
    let window_length = select_timeout(&blueprint.account);

    let account_branch = {
        let gateway = Arc::clone(&gateway);
        let id = account_id.clone();
        run_branch(config.account_timeout(), async move {
            gateway.fetch_account_data(&id).await
        })
    };
    let fee_branch = {
        let gateway = Arc::clone(&gateway);
        run_branch(config.fee_timeout(), async move {
            gateway.fetch_fee_statistics().await
        })
    };
    let window_branch = {
        let gateway = Arc::clone(&gateway);
        run_branch(config.time_sync_timeout(), async move {
            gateway.fetch_validity_window(window_length).await
        })
    };

    let (account, fee_stats, window) = tokio::join!(account_branch, fee_branch, window_branch);

    let account = match account {
        BranchOutcome::Ready(Some(account)) => account,
        BranchOutcome::Ready(None) => {
            return Err(BuildError::AccountNotFound {
                account: account_id,
            }
            .into())
        }
        BranchOutcome::TimedOut => {
            return Err(BuildError::AccountFetchTimeout {
                account: account_id,
                timeout_ms: config.account_timeout_ms,
            }
            .into())
        }
        BranchOutcome::Failed(err) => {
            return Err(BuildError::AccountFetchFailed {
                account: account_id,
                reason: err.to_string(),
            }
            .into())
        }
    };

    let validity = match window {
        BranchOutcome::Ready(window) => window,
        BranchOutcome::TimedOut => {
            return Err(BuildError::TimeSyncTimeout {
                timeout_ms: config.time_sync_timeout_ms,
            }
            .into())
        }
        BranchOutcome::Failed(err) => {
            return Err(BuildError::TimeSyncFailed {
                reason: err.to_string(),
            }
            .into())
        }
    };

    let smart_fee = match fee_stats {
        BranchOutcome::Ready(stats) => select_fee(&stats, &config.fee_preset),
        BranchOutcome::TimedOut => {
            warn!(
                endpoint = gateway.endpoint(),
                timeout_ms = config.fee_timeout_ms,
                fallback = config.fallback_fee,
                "fee statistics lookup timed out, using fallback fee"
            );
            config.fallback_fee
        }
        BranchOutcome::Failed(err) => {
            warn!(
                endpoint = gateway.endpoint(),
                error = %err,
                fallback = config.fallback_fee,
                "fee statistics lookup failed, using fallback fee"
            );
            config.fallback_fee
        }
    };
    let base_fee = final_fee(smart_fee, blueprint.minimum_fee);

    let sequence = account
        .sequence
        .checked_add(1)
        .ok_or_else(|| BuildError::AccountFetchFailed {
            account: account.id.clone(),
            reason: "sequence number exhausted".to_string(),
        })?;

    let tx = TransactionBuilder::new(&account.id, sequence, blueprint.network)
        .base_fee(base_fee)
        .memo(blueprint.memo.unwrap_or_default())
        .validity(validity)
        .operations(operations)
        .build()?;

    info!(
        source = %tx.source,
        sequence = tx.sequence,
        base_fee = tx.base_fee,
        operations = tx.operations.len(),
        max_time = tx.validity.max_time,
        "transaction assembled"
    );
    Ok(tx)
}
