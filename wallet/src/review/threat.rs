//! Threat detection for received transactions.
//!
//! A transaction fetched from a signature-collection service may name one
//! of our accounts as a funding source. If nobody we can attribute to
//! ourselves (the account's own key or one of its registered co-signers)
//! has signed it, someone else wrote it. The UI shows a warning before the
//! user gets a chance to add their signature.

use std::iter;

use tracing::warn;

use super::signatures::is_signed_by_any_of;
use super::SignaturePolicy;
use crate::gateway::AccountSnapshot;
use crate::transaction::{OperationBody, Transaction};

/// Hint-only variant of [`is_potentially_dangerous_with`].
pub fn is_potentially_dangerous(tx: &Transaction, local_accounts: &[AccountSnapshot]) -> bool {
    is_potentially_dangerous_with(tx, local_accounts, SignaturePolicy::HintOnly)
}

/// `true` if `tx` draws from a local account but carries no signature from
/// an affected account's key or any of its active co-signers.
pub fn is_potentially_dangerous_with(
    tx: &Transaction,
    local_accounts: &[AccountSnapshot],
    policy: SignaturePolicy,
) -> bool {
    let sources = tx.sources();
    let affected: Vec<&AccountSnapshot> = local_accounts
        .iter()
        .filter(|account| sources.contains(&account.id.as_str()))
        .collect();

    if affected.is_empty() {
        return false;
    }

    let trusted = affected.iter().flat_map(|&account| {
        iter::once(account.id.as_str()).chain(account.active_signers().map(|s| s.key.as_str()))
    });

    let dangerous = !is_signed_by_any_of(tx, trusted, policy);
    if dangerous {
        warn!(
            source = %tx.source,
            sequence = tx.sequence,
            affected = affected.len(),
            "transaction debits a local account without a known signature"
        );
    }
    dangerous
}

/// Web-auth challenge transactions: sequence 0 (never valid on the
/// ledger) with a leading `ManageData` named `"<domain> auth"`.
pub fn is_web_auth_transaction(tx: &Transaction) -> bool {
    if tx.sequence != 0 {
        return false;
    }
    match tx.operations.first().map(|op| &op.body) {
        Some(OperationBody::ManageData { name, .. }) => {
            name.to_ascii_lowercase().ends_with(" auth")
        }
        _ => false,
    }
}
