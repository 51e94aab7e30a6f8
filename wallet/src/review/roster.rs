//! Signer roster for the review screen.

use serde::Serialize;

use super::signatures::has_signed;
use super::SignaturePolicy;
use crate::gateway::AccountSnapshot;
use crate::transaction::{OperationBody, Transaction};

/// One signer of the source account and whether it has signed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerStatus {
    pub key: String,
    pub weight: u8,
    pub has_signed: bool,
}

/// The account's signing rule, in the shape the UI explains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Consensus {
    /// One key controls the account.
    SingleSignature,
    /// Every signer weighs 1: any `threshold` of `signers` may sign.
    MOfN { threshold: u8, signers: usize },
    /// Weighted signers; no simple m-of-n reading.
    Custom,
}

impl Consensus {
    pub fn for_account(account: &AccountSnapshot) -> Self {
        let active: Vec<_> = account.active_signers().collect();
        if active.len() <= 1 {
            return Self::SingleSignature;
        }
        if active.iter().all(|s| s.weight == 1) {
            // A zero threshold still takes one signature.
            let threshold = account.thresholds.high.max(1);
            Self::MOfN {
                threshold,
                signers: active.len(),
            }
        } else {
            Self::Custom
        }
    }
}

/// Active signers of `account`, in account order, with their signing state.
pub fn signer_statuses(
    tx: &Transaction,
    account: &AccountSnapshot,
    policy: SignaturePolicy,
) -> Vec<SignerStatus> {
    account
        .active_signers()
        .map(|signer| SignerStatus {
            key: signer.key.clone(),
            weight: signer.weight,
            has_signed: has_signed(tx, &signer.key, policy),
        })
        .collect()
}

/// Sum of the weights that have signed.
pub fn collected_weight(statuses: &[SignerStatus]) -> u32 {
    statuses
        .iter()
        .filter(|s| s.has_signed)
        .map(|s| u32::from(s.weight))
        .sum()
}

/// `true` if any operation creates a new account.
pub fn creates_accounts(tx: &Transaction) -> bool {
    tx.operations
        .iter()
        .any(|op| matches!(op.body, OperationBody::CreateAccount { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;
    use crate::gateway::{Signer, Thresholds};
    use crate::transaction::types::{Amount, Asset, Network, Operation};
    use crate::transaction::{sign_transaction, TransactionBuilder};

    #[test]
    fn consensus_shapes() {
        let single = AccountSnapshot::single_signer("A", 1);
        assert_eq!(Consensus::for_account(&single), Consensus::SingleSignature);

        let two_of_three = single
            .clone()
            .with_signers(vec![
                Signer::new("A", 1),
                Signer::new("B", 1),
                Signer::new("C", 1),
            ])
            .with_thresholds(Thresholds::new(0, 0, 2));
        assert_eq!(
            Consensus::for_account(&two_of_three),
            Consensus::MOfN {
                threshold: 2,
                signers: 3
            }
        );

        let no_threshold = two_of_three.clone().with_thresholds(Thresholds::default());
        assert!(matches!(
            Consensus::for_account(&no_threshold),
            Consensus::MOfN { threshold: 1, .. }
        ));

        let weighted = single.with_signers(vec![Signer::new("A", 2), Signer::new("B", 1)]);
        assert_eq!(Consensus::for_account(&weighted), Consensus::Custom);
    }

    #[test]
    fn roster_tracks_who_signed() {
        let a = Keypair::from_seed(&[1u8; 32]);
        let b = Keypair::from_seed(&[2u8; 32]);
        let account = AccountSnapshot::single_signer(&a.account_id(), 1).with_signers(vec![
            Signer::new(&a.account_id(), 1),
            Signer::new(&b.account_id(), 2),
            Signer::new("Removed", 0),
        ]);
        let mut tx = TransactionBuilder::new(&a.account_id(), 2, Network::Testnet)
            .operation(Operation::create_account("New", Amount(10)))
            .build()
            .unwrap();
        sign_transaction(&mut tx, &b);

        let statuses = signer_statuses(&tx, &account, SignaturePolicy::Verified);
        assert_eq!(statuses.len(), 2);
        assert!(!statuses[0].has_signed);
        assert!(statuses[1].has_signed);
        assert_eq!(collected_weight(&statuses), 2);
        assert!(creates_accounts(&tx));
    }

    #[test]
    fn payments_do_not_create_accounts() {
        let tx = TransactionBuilder::new("A", 2, Network::Testnet)
            .operation(Operation::payment("B", Asset::Native, Amount(1)))
            .build()
            .unwrap();
        assert!(!creates_accounts(&tx));
    }
}
