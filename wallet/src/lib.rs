// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Meridian Wallet: Transaction Core
//!
//! Everything a multi-signature wallet has to decide before a transaction is
//! allowed anywhere near the network lives in this crate: which operations
//! go in, what fee to pay, how long the transaction stays valid, and whether
//! a transaction someone handed us is safe to sign at all.
//!
//! The ledger itself is somebody else's problem. We talk to it through the
//! [`gateway::LedgerGateway`] trait and assume it is slow, flaky, and
//! occasionally lies about accounts that don't exist.
//!
//! ## Architecture
//!
//! - **crypto**: Ed25519 keys, hashing, and signature hints.
//! - **gateway**: The Ledger Gateway interface plus an in-memory ledger.
//! - **fees**: Smart fee selection from network fee statistics.
//! - **timeouts**: Validity window length from signer complexity.
//! - **operations**: Payment vs. implicit account creation.
//! - **transaction**: Envelope types, the async build pipeline, signing.
//! - **review**: Signature matching, authorization, threat detection.
//! - **cache**: Keyed lookup cache with in-flight deduplication.
//! - **config**: Constants and the tunable [`config::BuilderConfig`].
//! - **error**: The user-facing error taxonomy.
//!
//! ## Ground Rules
//!
//! 1. A fee lookup may fail. A sequence number or time bound lookup may not.
//! 2. Operations go into the envelope in exactly the order the caller gave.
//! 3. A signature hint is a filter, not a proof. We say so wherever we use one.

pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fees;
pub mod gateway;
pub mod operations;
pub mod review;
pub mod timeouts;
pub mod transaction;

pub use error::{AuthorizationError, BuildError, WalletError};
pub use gateway::{GatewayError, LedgerGateway, MemoryGateway};
pub use operations::create_payment_operation;
pub use review::{
    is_potentially_dangerous, matches_public_key, needs_additional_signatures, SignaturePolicy,
};
pub use transaction::{create_transaction, sign_with_account, Transaction, TxBlueprint};
