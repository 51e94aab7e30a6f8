//! # Transaction Review
//!
//! Everything that looks at a built or received transaction before it is
//! signed or broadcast:
//!
//! - [`signatures`]: attributing signatures to keys
//! - [`authorization`]: does this transaction need more signatures?
//! - [`threat`]: does it debit one of our accounts without our consent?
//! - [`roster`]: who has signed, and what the account's consensus rule is
//!
//! ## Signature attribution
//!
//! By default a signature counts as made by a key when its 4-byte hint
//! matches the key ([`SignaturePolicy::HintOnly`]). That is a filter, not a
//! proof: anyone can craft a key with a chosen 4-byte suffix. Callers that
//! make security decisions on untrusted transactions should opt into
//! [`SignaturePolicy::Verified`], which also checks the Ed25519 signature
//! against the transaction hash.

pub mod authorization;
pub mod roster;
pub mod signatures;
pub mod threat;

use serde::{Deserialize, Serialize};

pub use authorization::{needs_additional_signatures, needs_additional_signatures_for};
pub use roster::{collected_weight, creates_accounts, signer_statuses, Consensus, SignerStatus};
pub use signatures::{has_signed, is_signed_by_any_of, matches_public_key};
pub use threat::{is_potentially_dangerous, is_potentially_dangerous_with, is_web_auth_transaction};

/// How a signature is attributed to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePolicy {
    /// Hint match only.
    #[default]
    HintOnly,
    /// Hint match plus Ed25519 verification over the transaction hash.
    Verified,
}
