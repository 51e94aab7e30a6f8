//! Does a transaction still need signatures from someone else?

use tracing::debug;

use crate::error::{BuildError, WalletError};
use crate::gateway::{AccountSnapshot, LedgerGateway};
use crate::transaction::Transaction;

/// `true` if `local_public_key` alone cannot authorize `tx`.
///
/// A transaction drawing from more than one account always needs more
/// signatures: completeness would mean resolving every source's thresholds,
/// so we assume the worst. Otherwise the source's current signer list
/// decides.
pub async fn needs_additional_signatures<G>(
    gateway: &G,
    tx: &Transaction,
    local_public_key: &str,
) -> Result<bool, WalletError>
where
    G: LedgerGateway + ?Sized,
{
    let sources = tx.sources();
    if sources.len() > 1 {
        debug!(sources = sources.len(), "multi-source transaction needs more signatures");
        return Ok(true);
    }

    let source = tx.source.as_str();
    let account = match gateway.fetch_account_data(source).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return Err(BuildError::AccountNotFound {
                account: source.to_string(),
            }
            .into())
        }
        Err(err) => {
            return Err(BuildError::AccountFetchFailed {
                account: source.to_string(),
                reason: err.to_string(),
            }
            .into())
        }
    };

    Ok(needs_additional_signatures_for(&account, local_public_key))
}

/// Threshold check against an already fetched snapshot.
///
/// Compares against the high threshold: the wallet cannot tell which
/// threshold class every operation falls in, so it asks for the strictest.
pub fn needs_additional_signatures_for(account: &AccountSnapshot, local_public_key: &str) -> bool {
    match account.signer_weight(local_public_key) {
        Some(weight) => weight < account.thresholds.high,
        None => true,
    }
}
