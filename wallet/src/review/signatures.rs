//! Attributing a transaction's signatures to keys.

use super::SignaturePolicy;
use crate::crypto::hint::DecoratedSignature;
use crate::crypto::keys::PublicKey;
use crate::transaction::Transaction;

/// `true` if `signature`'s hint matches `public_key` (an account id or
/// signer key in text form). A malformed key never matches.
pub fn matches_public_key(signature: &DecoratedSignature, public_key: &str) -> bool {
    PublicKey::from_base58(public_key)
        .map(|key| signature.hint_matches(&key))
        .unwrap_or(false)
}

fn attributable(
    signature: &DecoratedSignature,
    public_key: &str,
    tx_hash: &[u8; 32],
    policy: SignaturePolicy,
) -> bool {
    match policy {
        SignaturePolicy::HintOnly => matches_public_key(signature, public_key),
        SignaturePolicy::Verified => PublicKey::from_base58(public_key)
            .map(|key| signature.verifies_for(&key, tx_hash))
            .unwrap_or(false),
    }
}

/// Whether `tx` carries a signature attributable to `public_key`.
pub fn has_signed(tx: &Transaction, public_key: &str, policy: SignaturePolicy) -> bool {
    let hash = tx.hash();
    tx.signatures
        .iter()
        .any(|sig| attributable(sig, public_key, &hash, policy))
}

/// Whether `tx` carries a signature attributable to any of `keys`.
pub fn is_signed_by_any_of<'a, I>(tx: &Transaction, keys: I, policy: SignaturePolicy) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    if tx.signatures.is_empty() {
        return false;
    }
    let hash = tx.hash();
    keys.into_iter().any(|key| {
        tx.signatures
            .iter()
            .any(|sig| attributable(sig, key, &hash, policy))
    })
}
