//! Validity window length policy.

use std::time::Duration;

use crate::config::{MULTISIG_VALIDITY, SINGLE_SIGNER_VALIDITY};
use crate::gateway::AccountSnapshot;

/// How long a transaction from `account` should stay valid.
///
/// Multi-signature accounts get 30 days so co-signers can sign
/// asynchronously; everyone else gets just enough time to enter a password.
pub fn select_timeout(account: &AccountSnapshot) -> Duration {
    if account.is_multisig() {
        MULTISIG_VALIDITY
    } else {
        SINGLE_SIGNER_VALIDITY
    }
}

pub fn select_timeout_millis(account: &AccountSnapshot) -> u64 {
    select_timeout(account).as_millis() as u64
}
