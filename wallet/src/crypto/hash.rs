//! SHA-256 helpers for transaction hashing.
//!
//! A transaction hash commits to the network as well as the transaction:
//! `sha256(sha256(passphrase) || signable_bytes)`. Signatures are made over
//! that hash, so a signature for one network is worthless on the other.

use sha2::{Digest, Sha256};

/// Single SHA-256 over `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The 32-byte network id derived from a network passphrase.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    sha256(passphrase.as_bytes())
}

/// Hash of a transaction payload bound to a network.
pub fn transaction_hash(network_id: &[u8; 32], signable: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(network_id);
    hasher.update(signable);
    hasher.finalize().into()
}
