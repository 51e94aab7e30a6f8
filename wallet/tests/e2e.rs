//! End-to-end tests for the wallet transaction core.
//!
//! Each test builds its own in-memory ledger, runs the full path from
//! operation factory to review, and checks what the user would see. The
//! timeout tests run on tokio's paused clock: the runtime jumps straight to
//! the next timer, so a "30 second" gateway stall costs nothing.

use std::sync::Arc;
use std::time::Duration;

use meridian_wallet::config::{BuilderConfig, FALLBACK_FEE, MULTISIG_MINIMUM_FEE};
use meridian_wallet::crypto::keys::Keypair;
use meridian_wallet::error::{BuildError, WalletError};
use meridian_wallet::fees::FeeStatistics;
use meridian_wallet::gateway::{AccountSnapshot, GatewayError, MemoryGateway, Signer, Thresholds};
use meridian_wallet::review::{
    is_potentially_dangerous, is_potentially_dangerous_with, needs_additional_signatures,
    signer_statuses, Consensus, SignaturePolicy,
};
use meridian_wallet::transaction::types::{Amount, Asset, Memo, Network, Operation, OperationBody};
use meridian_wallet::transaction::{
    create_transaction, sign_with_account, LocalAccount, TransactionRef, TxBlueprint,
};
use meridian_wallet::{create_payment_operation, LedgerGateway};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const NOW: u64 = 1_700_000_000;

fn congested_fees() -> FeeStatistics {
    FeeStatistics {
        capacity_usage: 0.9,
        percentile_fees: [(10, 100), (50, 200), (90, 500)].into_iter().collect(),
        min_fee: 100,
        mode_fee: 200,
    }
}

/// Ledger with one funded single-signer account for `owner`.
fn ledger(owner: &Keypair) -> Arc<MemoryGateway> {
    let gateway = MemoryGateway::new("memory://e2e");
    gateway.set_now(NOW);
    gateway.set_fee_statistics(Some(congested_fees()));
    gateway.put_account(AccountSnapshot::single_signer(&owner.account_id(), 100));
    Arc::new(gateway)
}

async fn snapshot(gateway: &MemoryGateway, id: &str) -> AccountSnapshot {
    gateway
        .fetch_account_data(id)
        .await
        .expect("gateway up")
        .expect("account exists")
}

fn payment(destination: &str) -> Operation {
    Operation::payment(destination, Asset::Native, Amount(10_000_000))
}

// ---------------------------------------------------------------------------
// Build -> sign -> review
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payment_to_new_account_end_to_end() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let newcomer = Keypair::from_seed(&[2u8; 32]).account_id();
    let gateway = ledger(&alice);

    let op = create_payment_operation(&*gateway, Amount(50_000_000), &Asset::Native, &newcomer)
        .await
        .unwrap();
    assert!(matches!(op.body, OperationBody::CreateAccount { .. }));

    let account = snapshot(&gateway, &alice.account_id()).await;
    let mut tx = create_transaction(
        Arc::clone(&gateway),
        vec![op],
        TxBlueprint::new(account.clone(), Network::Testnet).memo(Memo::text("welcome").unwrap()),
        &BuilderConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(tx.sequence, 101);
    assert_eq!(tx.base_fee, 500);
    assert_eq!(tx.total_fee(), 500);
    assert!(tx.validity.contains(NOW + 60));

    let local = LocalAccount::new("alice", Network::Testnet, alice.clone()).with_password("pw");
    sign_with_account(&mut tx, &local, Some("pw")).unwrap();

    assert!(!needs_additional_signatures(&*gateway, &tx, &alice.account_id())
        .await
        .unwrap());
    assert!(!is_potentially_dangerous_with(
        &tx,
        &[account],
        SignaturePolicy::Verified
    ));
    assert_eq!(TransactionRef::from(tx).cheap_id(), format!("{}:101", alice.account_id()));
}

#[tokio::test]
async fn operations_keep_caller_order() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    let ops = vec![
        Operation::create_account("Fresh", Amount(20_000_000)),
        Operation::payment("Fresh", Asset::Native, Amount(1)),
        Operation::manage_data("note", Some("hello")),
        payment("Other"),
    ];

    let tx = create_transaction(
        Arc::clone(&gateway),
        ops.clone(),
        TxBlueprint::new(snapshot(&gateway, &alice.account_id()).await, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(tx.operations, ops);
    assert_eq!(tx.total_fee(), 500 * 4);
}

#[tokio::test]
async fn credit_payment_to_missing_account_is_refused() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    let err = create_payment_operation(
        &*gateway,
        Amount(1),
        &Asset::credit("EURT", &alice.account_id()),
        "Nobody",
    )
    .await
    .unwrap_err();
    assert!(err.is_user_facing());
    assert!(err.to_string().contains("EURT"));
    assert!(err.to_string().contains("Nobody"));
}

#[tokio::test]
async fn multisig_account_collects_cosigner() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let bob = Keypair::from_seed(&[2u8; 32]);
    let gateway = ledger(&alice);
    gateway.put_account(
        AccountSnapshot::single_signer(&alice.account_id(), 100)
            .with_signers(vec![
                Signer::new(&alice.account_id(), 1),
                Signer::new(&bob.account_id(), 1),
            ])
            .with_thresholds(Thresholds::new(1, 2, 2)),
    );
    let account = snapshot(&gateway, &alice.account_id()).await;
    assert_eq!(
        Consensus::for_account(&account),
        Consensus::MOfN {
            threshold: 2,
            signers: 2
        }
    );

    let mut tx = create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(account.clone(), Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(tx.validity.length_secs(), 30 * 24 * 60 * 60);
    assert!(tx.base_fee >= MULTISIG_MINIMUM_FEE);

    let alice_local = LocalAccount::new("alice", Network::Testnet, alice.clone());
    sign_with_account(&mut tx, &alice_local, None).unwrap();
    assert!(needs_additional_signatures(&*gateway, &tx, &alice.account_id())
        .await
        .unwrap());

    // Bob receives the transaction from a signature-collection service.
    // Alice's signature makes it safe to sign for him.
    let bob_view = AccountSnapshot::single_signer(&bob.account_id(), 5);
    assert!(!is_potentially_dangerous(&tx, &[account.clone(), bob_view]));

    let bob_local = LocalAccount::new("bob", Network::Testnet, bob);
    sign_with_account(&mut tx, &bob_local, None).unwrap();
    let roster = signer_statuses(&tx, &account, SignaturePolicy::Verified);
    assert!(roster.iter().all(|s| s.has_signed));
}

#[tokio::test]
async fn third_party_transaction_debiting_local_account_is_flagged() {
    let x = Keypair::from_seed(&[7u8; 32]);
    let y = Keypair::from_seed(&[8u8; 32]);
    let gateway = ledger(&x);
    let local_y = AccountSnapshot::single_signer(&y.account_id(), 1);

    let mut tx = create_transaction(
        Arc::clone(&gateway),
        vec![payment(&x.account_id()).with_source(&y.account_id())],
        TxBlueprint::new(snapshot(&gateway, &x.account_id()).await, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap();
    let x_local = LocalAccount::new("x", Network::Testnet, x.clone());
    sign_with_account(&mut tx, &x_local, None).unwrap();

    assert!(is_potentially_dangerous(&tx, &[local_y]));
    assert!(needs_additional_signatures(&*gateway, &tx, &x.account_id())
        .await
        .unwrap());
}

// ---------------------------------------------------------------------------
// Timeouts and degradation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn slow_fee_lookup_falls_back_without_failing() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    gateway.delay_fees(Duration::from_secs(30));

    let start = tokio::time::Instant::now();
    let tx = create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(snapshot(&gateway, &alice.account_id()).await, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(tx.base_fee, FALLBACK_FEE);
    // Gave up on the fee at its own 5s budget, not the gateway's 30s.
    assert!(start.elapsed() < Duration::from_secs(6));
}

#[tokio::test]
async fn failed_fee_lookup_falls_back() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    gateway.fail_fees(GatewayError::Malformed("not json".into()));

    let config = BuilderConfig {
        fallback_fee: 777,
        ..BuilderConfig::default()
    };
    let tx = create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(snapshot(&gateway, &alice.account_id()).await, Network::Testnet)
            .minimum_fee(None),
        &config,
    )
    .await
    .unwrap();
    assert_eq!(tx.base_fee, 777);
}

#[tokio::test(start_paused = true)]
async fn slow_account_lookup_is_fatal() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    let account = snapshot(&gateway, &alice.account_id()).await;
    gateway.delay_accounts(Duration::from_secs(11));

    let err = create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(account, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap_err();

    match err {
        WalletError::Build(BuildError::AccountFetchTimeout {
            account,
            timeout_ms,
        }) => {
            assert_eq!(account, alice.account_id());
            assert_eq!(timeout_ms, 10_000);
        }
        other => panic!("expected account timeout, got {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn slow_time_sync_is_fatal() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    gateway.delay_time(Duration::from_secs(60));

    let err = create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(snapshot(&gateway, &alice.account_id()).await, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        WalletError::Build(BuildError::TimeSyncTimeout { timeout_ms: 10_000 })
    ));
}

#[tokio::test]
async fn time_sync_failure_is_fatal() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    gateway.fail_time(GatewayError::Transport("connection refused".into()));

    let err = create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(snapshot(&gateway, &alice.account_id()).await, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, WalletError::Build(BuildError::TimeSyncFailed { .. })));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn all_branches_run_concurrently() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    let account = snapshot(&gateway, &alice.account_id()).await;
    gateway.delay_accounts(Duration::from_secs(4));
    gateway.delay_fees(Duration::from_secs(4));
    gateway.delay_time(Duration::from_secs(4));

    let start = tokio::time::Instant::now();
    create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(account, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap();

    // Sequential fetches would take 12s.
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(gateway.fee_calls(), 1);
    assert_eq!(gateway.time_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoned_branch_finishes_in_background() {
    let alice = Keypair::from_seed(&[1u8; 32]);
    let gateway = ledger(&alice);
    let account = snapshot(&gateway, &alice.account_id()).await;
    gateway.delay_fees(Duration::from_secs(20));

    let tx = create_transaction(
        Arc::clone(&gateway),
        vec![payment("Dest")],
        TxBlueprint::new(account, Network::Testnet),
        &BuilderConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(tx.base_fee, FALLBACK_FEE);

    // The late fee result arrives after the build and changes nothing.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(gateway.fee_calls(), 1);
    assert_eq!(tx.base_fee, FALLBACK_FEE);
}
