//! # Constants & Builder Configuration
//!
//! Every magic number the transaction pipeline depends on lives here. The
//! fee and timeout constants are tuned against real network behaviour; the
//! comments say which knob does what, not how we got there.
//!
//! [`BuilderConfig`] bundles the tunables so callers (and tests) can swap
//! them without touching the constants.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::review::SignaturePolicy;

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// Passphrase of the public network. Hashed into every transaction hash so a
/// testnet signature can never be replayed on the public network.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Meridian Network ; September 2015";

/// Passphrase of the test network.
pub const TESTNET_PASSPHRASE: &str = "Test Meridian Network ; September 2015";

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Decimal places of every on-ledger amount. One unit = 10^7 stroops.
pub const AMOUNT_DECIMALS: u32 = 7;

/// Stroops per whole unit.
pub const STROOPS_PER_UNIT: u64 = 10_000_000;

/// Longest asset code the ledger accepts (alphanum12).
pub const MAX_ASSET_CODE_LENGTH: usize = 12;

/// Longest text memo, in bytes.
pub const MAX_MEMO_TEXT_LENGTH: usize = 28;

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Base fee per operation used whenever the smart fee cannot be determined.
pub const FALLBACK_FEE: u64 = 10_000;

/// Guaranteed minimum base fee for multi-signature transactions. Collecting
/// co-signatures can take days; the network may be busier by then.
pub const MULTISIG_MINIMUM_FEE: u64 = 10_000;

/// The single fee preset the wallet uses.
pub const HIGH_FEE_PRESET: FeePreset = FeePreset {
    capacity_trigger: 0.5,
    max_fee: 1_000_000,
    percentile: 90,
};

/// Smart fee selection parameters.
///
/// Above `capacity_trigger` ledger usage we pay the `percentile` fee; below
/// it we pay the observed minimum. Either way never more than `max_fee`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeePreset {
    /// Ledger capacity usage ratio (0..1) above which the network counts as congested.
    pub capacity_trigger: f64,
    /// Hard ceiling on the selected per-operation fee.
    pub max_fee: u64,
    /// Percentile of recently charged fees to pay under congestion.
    pub percentile: u8,
}

// ---------------------------------------------------------------------------
// Validity windows
// ---------------------------------------------------------------------------

/// Validity window for single-signer transactions. Long enough to type a
/// password and click OK, short enough to keep the replay surface small.
pub const SINGLE_SIGNER_VALIDITY: Duration = Duration::from_secs(90);

/// Validity window for multi-signature transactions: 30 days for co-signers
/// to collect and submit their signatures.
pub const MULTISIG_VALIDITY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

// ---------------------------------------------------------------------------
// Gateway timeouts
// ---------------------------------------------------------------------------

/// Budget for the fee statistics lookup. Worst case we pay the fallback fee.
pub const FEE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Budget for fetching the source account. Fatal past this.
pub const ACCOUNT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Budget for syncing time bounds with the gateway. Fatal past this.
pub const TIME_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// BuilderConfig
// ---------------------------------------------------------------------------

/// Tunables for the transaction pipeline.
///
/// `Default` gives the production values above. Timeouts serialize as
/// milliseconds so the struct can be loaded from a plain JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Preset for smart fee selection.
    pub fee_preset: FeePreset,
    /// Base fee used when fee statistics are unavailable.
    pub fallback_fee: u64,
    /// Fee statistics branch timeout, in milliseconds.
    pub fee_timeout_ms: u64,
    /// Account data branch timeout, in milliseconds.
    pub account_timeout_ms: u64,
    /// Time bounds branch timeout, in milliseconds.
    pub time_sync_timeout_ms: u64,
    /// How signatures are attributed to keys during review.
    pub signature_policy: SignaturePolicy,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            fee_preset: HIGH_FEE_PRESET,
            fallback_fee: FALLBACK_FEE,
            fee_timeout_ms: FEE_LOOKUP_TIMEOUT.as_millis() as u64,
            account_timeout_ms: ACCOUNT_FETCH_TIMEOUT.as_millis() as u64,
            time_sync_timeout_ms: TIME_SYNC_TIMEOUT.as_millis() as u64,
            signature_policy: SignaturePolicy::HintOnly,
        }
    }
}

impl BuilderConfig {
    pub fn fee_timeout(&self) -> Duration {
        Duration::from_millis(self.fee_timeout_ms)
    }

    pub fn account_timeout(&self) -> Duration {
        Duration::from_millis(self.account_timeout_ms)
    }

    pub fn time_sync_timeout(&self) -> Duration {
        Duration::from_millis(self.time_sync_timeout_ms)
    }
}
