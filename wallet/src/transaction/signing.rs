//! Attaching local signatures.
//!
//! Signatures are made over [`Transaction::hash`], which binds them to the
//! network. A [`LocalAccount`] may be password protected; the wallet keeps
//! only a SHA-256 digest of the password and refuses to sign without a
//! matching one.

use tracing::{debug, warn};

use super::builder::Transaction;
use crate::crypto::hash::sha256;
use crate::crypto::hint::DecoratedSignature;
use crate::crypto::keys::{Keypair, PublicKey};
use crate::error::AuthorizationError;
use crate::transaction::types::Network;

/// Signs `tx` with `keypair`, appending a decorated signature.
///
/// Ed25519 is deterministic, so signing twice with the same key would add
/// an identical entry; that second call is a no-op.
pub fn sign_transaction<'a>(tx: &'a mut Transaction, keypair: &Keypair) -> &'a Transaction {
    let signature = DecoratedSignature::sign(keypair, &tx.hash());
    if !tx.signatures.contains(&signature) {
        tx.signatures.push(signature);
    }
    tx
}

/// A locally managed account and its key.
#[derive(Debug, Clone)]
pub struct LocalAccount {
    pub name: String,
    pub network: Network,
    pub keypair: Keypair,
    /// `sha256(password)`, `None` for accounts without a password.
    pub password_digest: Option<[u8; 32]>,
}

impl LocalAccount {
    pub fn new(name: &str, network: Network, keypair: Keypair) -> Self {
        Self {
            name: name.to_string(),
            network,
            keypair,
            password_digest: None,
        }
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password_digest = Some(sha256(password.as_bytes()));
        self
    }

    pub fn account_id(&self) -> String {
        self.keypair.account_id()
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn requires_password(&self) -> bool {
        self.password_digest.is_some()
    }

    fn password_matches(&self, password: Option<&str>) -> bool {
        match (&self.password_digest, password) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(digest), Some(password)) => *digest == sha256(password.as_bytes()),
        }
    }
}

/// Signs `tx` with a local account after checking its password and network.
pub fn sign_with_account(
    tx: &mut Transaction,
    account: &LocalAccount,
    password: Option<&str>,
) -> Result<(), AuthorizationError> {
    if account.network != tx.network {
        return Err(AuthorizationError::NetworkMismatch {
            account: account.account_id(),
            expected: account.network.to_string(),
            actual: tx.network.to_string(),
        });
    }
    if !account.password_matches(password) {
        warn!(account = %account.name, "signing refused: wrong or missing password");
        return Err(AuthorizationError::WrongPassword {
            account: account.account_id(),
        });
    }

    sign_transaction(tx, &account.keypair);
    debug!(
        account = %account.name,
        tx = %tx.hash_hex(),
        signatures = tx.signatures.len(),
        "transaction signed"
    );
    Ok(())
}
