//! Error taxonomy for everything a wallet user can see fail.
//!
//! Three kinds of failure reach the user: a build that cannot proceed
//! ([`BuildError`]), a policy violation ([`WalletError::NonExistentDestination`]),
//! and a signing attempt with the wrong credentials ([`AuthorizationError`]).
//! Fee lookup failures are deliberately absent: they degrade to the fallback
//! fee and only show up in the logs.
//!
//! Every message names the account or asset involved so a support ticket can
//! be answered without digging through log files.

use thiserror::Error;

use crate::crypto::keys::KeyError;
use crate::gateway::GatewayError;
use crate::transaction::types::TypeError;

/// Fatal errors of the transaction build pipeline.
///
/// Building without a correct sequence number risks a double spend; building
/// without synced time bounds risks a transaction accepted too late. Neither
/// is ever guessed, so both abort the build.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("fetching source account {account} timed out after {timeout_ms}ms")]
    AccountFetchTimeout { account: String, timeout_ms: u64 },

    #[error("source account {account} does not exist on the ledger")]
    AccountNotFound { account: String },

    #[error("failed to query source account {account}: {reason}")]
    AccountFetchFailed { account: String, reason: String },

    #[error("syncing time bounds with the gateway timed out after {timeout_ms}ms")]
    TimeSyncTimeout { timeout_ms: u64 },

    #[error("failed to sync time bounds with the gateway: {reason}")]
    TimeSyncFailed { reason: String },

    #[error("a transaction needs at least one operation")]
    NoOperations,
}

/// Errors while attaching a local signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("wrong or missing password for account {account}")]
    WrongPassword { account: String },

    #[error("account {account} is for the {expected} network, transaction is for {actual}")]
    NetworkMismatch {
        account: String,
        expected: String,
        actual: String,
    },
}

/// Top-level error for the wallet API.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Non-native assets cannot fund a new account; only the native asset
    /// creates the destination as a side effect.
    #[error(
        "cannot pay in {asset_code}: destination {destination} does not exist yet, \
         account creations always need to be done with the native asset"
    )]
    NonExistentDestination {
        asset_code: String,
        destination: String,
    },

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error("ledger gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Invalid(#[from] TypeError),
}

impl WalletError {
    /// `true` for errors the UI must show to the user (as opposed to
    /// programming errors or transient gateway trouble worth retrying).
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Build(_)
                | Self::NonExistentDestination { .. }
                | Self::Authorization(_)
                | Self::Invalid(_)
        )
    }
}
