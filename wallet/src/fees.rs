//! # Fee Estimator
//!
//! Turns the gateway's recent fee statistics into a per-operation base fee.
//!
//! Under congestion (ledger capacity usage above the preset's trigger) we
//! pay the preset percentile of recently charged fees; otherwise the floor.
//! The result never exceeds the preset's ceiling. A failed lookup is not an
//! error: it degrades to a fixed fallback fee and a warning in the logs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::gateway::{GatewayError, LedgerGateway};

pub use crate::config::FeePreset;

/// Recent fee statistics, as reported by the gateway.
///
/// Serializes in the gateway's wire shape: `ledger_capacity_usage` plus a
/// `fee_charged` map of `min`, `mode` and `pNN` entries, all numbers as
/// decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireFeeStats", into = "WireFeeStats")]
pub struct FeeStatistics {
    /// Ratio (0..1) of ledger capacity used by recent ledgers.
    pub capacity_usage: f64,
    /// Fee charged at each reported percentile, keyed by percentile.
    pub percentile_fees: BTreeMap<u8, u64>,
    pub min_fee: u64,
    pub mode_fee: u64,
}

impl FeeStatistics {
    /// Parse the gateway's JSON response body.
    pub fn from_gateway_json(body: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFeeStats {
    ledger_capacity_usage: String,
    fee_charged: BTreeMap<String, String>,
}

impl TryFrom<WireFeeStats> for FeeStatistics {
    type Error = GatewayError;

    fn try_from(wire: WireFeeStats) -> Result<Self, Self::Error> {
        let malformed = |what: &str, value: &str| {
            GatewayError::Malformed(format!("bad {what} in fee statistics: {value:?}"))
        };

        let capacity_usage: f64 = wire
            .ledger_capacity_usage
            .parse()
            .map_err(|_| malformed("ledger_capacity_usage", &wire.ledger_capacity_usage))?;
        if !capacity_usage.is_finite() || capacity_usage < 0.0 {
            return Err(malformed("ledger_capacity_usage", &wire.ledger_capacity_usage));
        }

        let fee = |key: &str| -> Result<u64, GatewayError> {
            let value = wire
                .fee_charged
                .get(key)
                .ok_or_else(|| GatewayError::Malformed(format!("fee_charged.{key} missing")))?;
            value.parse().map_err(|_| malformed(key, value))
        };
        let min_fee = fee("min")?;
        let mode_fee = fee("mode")?;

        let mut percentile_fees = BTreeMap::new();
        for (key, value) in &wire.fee_charged {
            // Other entries (`max`, ...) are ignored.
            let Some(percentile) = key.strip_prefix('p').and_then(|p| p.parse::<u8>().ok())
            else {
                continue;
            };
            if percentile > 100 {
                continue;
            }
            percentile_fees.insert(percentile, value.parse().map_err(|_| malformed(key, value))?);
        }

        Ok(Self {
            capacity_usage,
            percentile_fees,
            min_fee,
            mode_fee,
        })
    }
}

impl From<FeeStatistics> for WireFeeStats {
    fn from(stats: FeeStatistics) -> Self {
        let mut fee_charged: BTreeMap<String, String> = stats
            .percentile_fees
            .iter()
            .map(|(p, fee)| (format!("p{p}"), fee.to_string()))
            .collect();
        fee_charged.insert("min".into(), stats.min_fee.to_string());
        fee_charged.insert("mode".into(), stats.mode_fee.to_string());
        Self {
            ledger_capacity_usage: stats.capacity_usage.to_string(),
            fee_charged,
        }
    }
}

/// Pick the per-operation fee for `stats` under `preset`.
pub fn select_fee(stats: &FeeStatistics, preset: &FeePreset) -> u64 {
    let fee = if stats.capacity_usage > preset.capacity_trigger {
        stats
            .percentile_fees
            .get(&preset.percentile)
            .copied()
            .unwrap_or(stats.mode_fee)
    } else {
        stats.min_fee
    };
    fee.min(preset.max_fee)
}

/// Fetch statistics and select a fee, returning `fallback` on any failure.
pub async fn select_fee_with_fallback<G>(gateway: &G, preset: &FeePreset, fallback: u64) -> u64
where
    G: LedgerGateway + ?Sized,
{
    match gateway.fetch_fee_statistics().await {
        Ok(stats) => {
            let fee = select_fee(&stats, preset);
            debug!(
                fee,
                capacity_usage = stats.capacity_usage,
                "selected smart fee"
            );
            fee
        }
        Err(err) => {
            warn!(
                endpoint = gateway.endpoint(),
                error = %err,
                fallback,
                "fee statistics lookup failed, using fallback fee"
            );
            fallback
        }
    }
}

/// The base fee actually charged: the estimate, raised to the caller's
/// guaranteed minimum if one was given.
pub fn final_fee(estimated: u64, minimum: Option<u64>) -> u64 {
    minimum.map_or(estimated, |min| estimated.max(min))
}
