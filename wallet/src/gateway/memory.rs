//! In-process Ledger Gateway.
//!
//! Holds accounts and fee statistics in memory and answers from a fixed or
//! wall clock. Every call can be delayed or failed on demand, which is how
//! the builder's timeout and degradation paths get exercised without a
//! network. The CLI loads one from a JSON [`LedgerSnapshot`].

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{AccountSnapshot, GatewayError, LedgerGateway};
use crate::fees::FeeStatistics;
use crate::transaction::types::ValidityWindow;

/// Serializable ledger state a [`MemoryGateway`] can be loaded from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub accounts: Vec<AccountSnapshot>,
    /// Fee statistics in the gateway's wire shape. Absent means the fee
    /// lookup fails.
    #[serde(default)]
    pub fee_stats: Option<FeeStatistics>,
    /// Fixed unix time for validity windows. Absent means the wall clock.
    #[serde(default)]
    pub now: Option<u64>,
}

/// Per-capability fault injection.
#[derive(Debug, Clone, Default)]
struct Fault {
    delay: Duration,
    failure: Option<GatewayError>,
}

impl Fault {
    async fn apply(&self) -> Result<(), GatewayError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
struct Faults {
    accounts: Fault,
    fees: Fault,
    time: Fault,
}

#[derive(Debug, Default)]
struct CallCounts {
    accounts: AtomicUsize,
    fees: AtomicUsize,
    time: AtomicUsize,
}

/// Ledger Gateway backed by process memory.
#[derive(Debug)]
pub struct MemoryGateway {
    endpoint: String,
    accounts: RwLock<HashMap<String, AccountSnapshot>>,
    fee_stats: RwLock<Option<FeeStatistics>>,
    now: RwLock<Option<u64>>,
    faults: RwLock<Faults>,
    calls: CallCounts,
}

impl MemoryGateway {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            accounts: RwLock::new(HashMap::new()),
            fee_stats: RwLock::new(None),
            now: RwLock::new(None),
            faults: RwLock::new(Faults::default()),
            calls: CallCounts::default(),
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let gateway = Self::new(snapshot.endpoint.as_deref().unwrap_or("memory://ledger"));
        for account in snapshot.accounts {
            gateway.put_account(account);
        }
        gateway.set_fee_statistics(snapshot.fee_stats);
        *gateway.now.write() = snapshot.now;
        gateway
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_snapshot(serde_json::from_str(json)?))
    }

    /// Insert or replace an account.
    pub fn put_account(&self, account: AccountSnapshot) {
        self.accounts.write().insert(account.id.clone(), account);
    }

    pub fn remove_account(&self, account_id: &str) -> Option<AccountSnapshot> {
        self.accounts.write().remove(account_id)
    }

    pub fn set_fee_statistics(&self, stats: Option<FeeStatistics>) {
        *self.fee_stats.write() = stats;
    }

    /// Pin the gateway clock to `unix_secs`.
    pub fn set_now(&self, unix_secs: u64) {
        *self.now.write() = Some(unix_secs);
    }

    pub fn delay_accounts(&self, delay: Duration) {
        self.faults.write().accounts.delay = delay;
    }

    pub fn delay_fees(&self, delay: Duration) {
        self.faults.write().fees.delay = delay;
    }

    pub fn delay_time(&self, delay: Duration) {
        self.faults.write().time.delay = delay;
    }

    pub fn fail_accounts(&self, err: GatewayError) {
        self.faults.write().accounts.failure = Some(err);
    }

    pub fn fail_fees(&self, err: GatewayError) {
        self.faults.write().fees.failure = Some(err);
    }

    pub fn fail_time(&self, err: GatewayError) {
        self.faults.write().time.failure = Some(err);
    }

    /// Number of account lookups served (including failed ones).
    pub fn account_calls(&self) -> usize {
        self.calls.accounts.load(Ordering::SeqCst)
    }

    pub fn fee_calls(&self) -> usize {
        self.calls.fees.load(Ordering::SeqCst)
    }

    pub fn time_calls(&self) -> usize {
        self.calls.time.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> u64 {
        match *self.now.read() {
            Some(now) => now,
            None => u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0),
        }
    }
}

#[async_trait]
impl LedgerGateway for MemoryGateway {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_account_data(
        &self,
        account_id: &str,
    ) -> Result<Option<AccountSnapshot>, GatewayError> {
        self.calls.accounts.fetch_add(1, Ordering::SeqCst);
        // Clone out so no lock is held across the await.
        let fault = self.faults.read().accounts.clone();
        fault.apply().await?;
        let account = self.accounts.read().get(account_id).cloned();
        debug!(account = %account_id, found = account.is_some(), "memory gateway account lookup");
        Ok(account)
    }

    async fn fetch_fee_statistics(&self) -> Result<FeeStatistics, GatewayError> {
        self.calls.fees.fetch_add(1, Ordering::SeqCst);
        let fault = self.faults.read().fees.clone();
        fault.apply().await?;
        self.fee_stats
            .read()
            .clone()
            .ok_or_else(|| GatewayError::Status {
                status: 503,
                message: "fee statistics unavailable".to_string(),
            })
    }

    async fn fetch_validity_window(
        &self,
        duration: Duration,
    ) -> Result<ValidityWindow, GatewayError> {
        self.calls.time.fetch_add(1, Ordering::SeqCst);
        let fault = self.faults.read().time.clone();
        fault.apply().await?;
        Ok(ValidityWindow::starting_at(
            self.current_time(),
            duration.as_secs(),
        ))
    }
}
