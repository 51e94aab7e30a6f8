//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over audited implementations: Ed25519 via
//! `ed25519-dalek`, SHA-256 via `sha2`. Nothing here is clever, and that is
//! the point.

pub mod hash;
pub mod hint;
pub mod keys;

pub use hash::{network_id, sha256, transaction_hash};
pub use hint::{hint_for, DecoratedSignature, SignatureHint};
pub use keys::{KeyError, Keypair, PublicKey, Signature};
