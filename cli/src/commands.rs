//! Subcommand implementations.
//!
//! Each command returns the text to print so tests can assert on it without
//! capturing stdout.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use meridian_wallet::config::BuilderConfig;
use meridian_wallet::crypto::keys::Keypair;
use meridian_wallet::fees::select_fee_with_fallback;
use meridian_wallet::gateway::{AccountSnapshot, LedgerGateway, MemoryGateway};
use meridian_wallet::review::{
    collected_weight, creates_accounts, is_potentially_dangerous_with, is_web_auth_transaction,
    needs_additional_signatures, signer_statuses, Consensus, SignerStatus,
};
use meridian_wallet::transaction::types::{Amount, Asset, Memo, Network};
use meridian_wallet::transaction::{
    create_transaction, sign_with_account, LocalAccount, Transaction, TxBlueprint,
};
use meridian_wallet::{create_payment_operation, SignaturePolicy};

use crate::cli::{BuildArgs, FeeArgs, KeygenArgs, ReviewArgs};

/// Loads the builder configuration, defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<BuilderConfig> {
    let Some(path) = path else {
        return Ok(BuilderConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid config file {}", path.display()))
}

fn load_ledger(path: &Path) -> Result<Arc<MemoryGateway>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger snapshot {}", path.display()))?;
    let gateway = MemoryGateway::from_json(&text)
        .with_context(|| format!("invalid ledger snapshot {}", path.display()))?;
    Ok(Arc::new(gateway))
}

fn load_keypair(path: &Path) -> Result<Keypair> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    Keypair::from_hex(&text).with_context(|| format!("invalid key file {}", path.display()))
}

// ---------------------------------------------------------------------------
// keygen
// ---------------------------------------------------------------------------

pub fn keygen(args: &KeygenArgs) -> Result<String> {
    let keypair = Keypair::generate();
    let secret = hex::encode(keypair.secret_key_bytes());

    let Some(out) = &args.out else {
        return Ok(format!(
            "account id : {}\nsecret key : {}",
            keypair.account_id(),
            secret
        ));
    };

    std::fs::write(out, &secret)
        .with_context(|| format!("failed to write key file {}", out.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(out, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", out.display()))?;
    }
    tracing::info!(account = %keypair.account_id(), path = %out.display(), "keypair written");

    Ok(format!(
        "account id : {}\nkey file   : {}",
        keypair.account_id(),
        out.display()
    ))
}

// ---------------------------------------------------------------------------
// fee
// ---------------------------------------------------------------------------

pub async fn fee(args: &FeeArgs, config: &BuilderConfig) -> Result<String> {
    let gateway = load_ledger(&args.ledger)?;
    let lookup = select_fee_with_fallback(&*gateway, &config.fee_preset, config.fallback_fee);
    let base_fee = match tokio::time::timeout(config.fee_timeout(), lookup).await {
        Ok(fee) => fee,
        Err(_) => {
            tracing::warn!(
                timeout_ms = config.fee_timeout_ms,
                "fee lookup timed out, using fallback fee"
            );
            config.fallback_fee
        }
    };
    Ok(format!(
        "base fee: {} stroops ({} per operation)",
        base_fee,
        Amount(base_fee)
    ))
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

pub async fn build(args: &BuildArgs, config: &BuilderConfig) -> Result<String> {
    let gateway = load_ledger(&args.ledger)?;
    let amount: Amount = args.amount.parse()?;
    let asset: Asset = args.asset.parse()?;
    let network = Network::from_testnet_flag(args.testnet);

    let account = gateway
        .fetch_account_data(&args.from)
        .await?
        .with_context(|| format!("source account {} is not on the ledger", args.from))?;

    let op = create_payment_operation(&*gateway, amount, &asset, &args.to).await?;

    let mut blueprint = TxBlueprint::new(account, network);
    if let Some(memo) = &args.memo {
        blueprint = blueprint.memo(Memo::text(memo.as_str())?);
    }

    let mut tx = create_transaction(Arc::clone(&gateway), vec![op], blueprint, config)
        .await
        .with_context(|| format!("failed to build transaction from {}", args.from))?;

    if let Some(key_path) = &args.sign_with {
        let keypair = load_keypair(key_path)?;
        let mut local = LocalAccount::new("cli", network, keypair);
        if let Some(password) = &args.password {
            local = local.with_password(password);
        }
        sign_with_account(&mut tx, &local, args.password.as_deref())?;
    }

    Ok(serde_json::to_string_pretty(&tx)?)
}

// ---------------------------------------------------------------------------
// review
// ---------------------------------------------------------------------------

/// What `review` prints.
#[derive(Debug, Serialize)]
pub struct ReviewReport {
    pub hash: String,
    pub source: String,
    pub sequence: u64,
    pub total_fee: u64,
    pub memo_type: &'static str,
    pub dangerous: bool,
    pub web_auth: bool,
    pub creates_accounts: bool,
    /// Per local account: does it still need someone else's signature?
    pub needs_signatures: BTreeMap<String, bool>,
    /// Local accounts whose signature check could not run, with the reason.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub signature_check_errors: BTreeMap<String, String>,
    pub consensus: Option<Consensus>,
    pub signers: Vec<SignerStatus>,
    pub collected_weight: u32,
}

pub async fn review(args: &ReviewArgs, config: &BuilderConfig) -> Result<String> {
    let gateway = load_ledger(&args.ledger)?;
    let text = std::fs::read_to_string(&args.tx)
        .with_context(|| format!("failed to read transaction {}", args.tx.display()))?;
    let tx: Transaction = serde_json::from_str(&text)
        .with_context(|| format!("invalid transaction {}", args.tx.display()))?;

    let policy = if args.verified {
        SignaturePolicy::Verified
    } else {
        config.signature_policy
    };

    let report = review_transaction(&gateway, &tx, &args.local, policy).await?;
    Ok(serde_json::to_string_pretty(&report)?)
}

async fn review_transaction(
    gateway: &MemoryGateway,
    tx: &Transaction,
    local_ids: &[String],
    policy: SignaturePolicy,
) -> Result<ReviewReport> {
    let mut local_accounts = Vec::with_capacity(local_ids.len());
    for id in local_ids {
        match gateway.fetch_account_data(id).await? {
            Some(account) => local_accounts.push(account),
            None => {
                // Not funded yet: its own key is the only possible signer.
                tracing::debug!(account = %id, "local account not on ledger");
                local_accounts.push(AccountSnapshot::single_signer(id, 0));
            }
        }
    }

    let mut needs_signatures = BTreeMap::new();
    let mut signature_check_errors = BTreeMap::new();
    for id in local_ids {
        match needs_additional_signatures(gateway, tx, id).await {
            Ok(needed) => {
                needs_signatures.insert(id.clone(), needed);
            }
            Err(err) => {
                tracing::warn!(
                    account = %id,
                    source = %tx.source,
                    error = %err,
                    "signature check failed"
                );
                signature_check_errors.insert(id.clone(), err.to_string());
            }
        }
    }

    let source_account = gateway.fetch_account_data(&tx.source).await?;
    let signers = source_account
        .as_ref()
        .map(|account| signer_statuses(tx, account, policy))
        .unwrap_or_default();

    Ok(ReviewReport {
        hash: tx.hash_hex(),
        source: tx.source.clone(),
        sequence: tx.sequence,
        total_fee: tx.total_fee(),
        memo_type: tx.memo.type_label(),
        dangerous: is_potentially_dangerous_with(tx, &local_accounts, policy),
        web_auth: is_web_auth_transaction(tx),
        creates_accounts: creates_accounts(tx),
        needs_signatures,
        signature_check_errors,
        consensus: source_account.as_ref().map(Consensus::for_account),
        collected_weight: collected_weight(&signers),
        signers,
    })
}

// ---------------------------------------------------------------------------
// version
// ---------------------------------------------------------------------------

pub fn version() -> String {
    format!(
        "meridian {}\npublic  : {}\ntestnet : {}",
        env!("CARGO_PKG_VERSION"),
        Network::Public.passphrase(),
        Network::Testnet.passphrase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_wallet::transaction::{Operation, TransactionBuilder};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn alice() -> Keypair {
        Keypair::from_seed(&[1u8; 32])
    }

    fn ledger_file(extra_accounts: &[&str]) -> NamedTempFile {
        let mut accounts = vec![serde_json::json!({
            "id": alice().account_id(),
            "sequence": "100",
            "signers": [{ "key": alice().account_id(), "weight": 1 }],
            "thresholds": { "low_threshold": 0, "med_threshold": 0, "high_threshold": 0 }
        })];
        for id in extra_accounts {
            accounts.push(serde_json::json!({
                "id": id,
                "sequence": "1",
                "signers": [{ "key": id, "weight": 1 }],
                "thresholds": { "low": 0, "medium": 0, "high": 0 }
            }));
        }
        let snapshot = serde_json::json!({
            "accounts": accounts,
            "fee_stats": {
                "ledger_capacity_usage": "0.9",
                "fee_charged": { "min": "100", "mode": "150", "p90": "700" }
            },
            "now": 1_700_000_000u64
        });
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{snapshot}").unwrap();
        file
    }

    fn build_args(ledger: &Path, to: &str, asset: &str) -> BuildArgs {
        BuildArgs {
            ledger: ledger.to_path_buf(),
            from: alice().account_id(),
            to: to.to_string(),
            amount: "12.5".to_string(),
            asset: asset.to_string(),
            memo: Some("invoice 7".to_string()),
            testnet: true,
            sign_with: None,
            password: None,
        }
    }

    #[tokio::test]
    async fn build_prints_unsigned_transaction() {
        let ledger = ledger_file(&[]);
        let out = build(
            &build_args(ledger.path(), "Newcomer", "native"),
            &BuilderConfig::default(),
        )
        .await
        .unwrap();

        let tx: Transaction = serde_json::from_str(&out).unwrap();
        assert_eq!(tx.sequence, 101);
        assert_eq!(tx.base_fee, 700);
        assert_eq!(tx.network, Network::Testnet);
        assert_eq!(tx.operations[0].kind(), "create_account");
        assert!(tx.signatures.is_empty());
    }

    #[tokio::test]
    async fn build_refuses_credit_to_missing_account() {
        let ledger = ledger_file(&[]);
        let err = build(
            &build_args(ledger.path(), "Newcomer", "EURT:Issuer"),
            &BuilderConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(format!("{err:#}").contains("EURT"));
    }

    #[tokio::test]
    async fn build_signs_and_review_clears_it() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join("alice.key");
        std::fs::write(&key_path, hex::encode(alice().secret_key_bytes())).unwrap();

        let ledger = ledger_file(&["Dest"]);
        let mut args = build_args(ledger.path(), "Dest", "native");
        args.sign_with = Some(key_path);
        let out = build(&args, &BuilderConfig::default()).await.unwrap();

        let tx_path = dir.path().join("tx.json");
        std::fs::write(&tx_path, &out).unwrap();
        let report = review(
            &ReviewArgs {
                tx: tx_path,
                ledger: ledger.path().to_path_buf(),
                local: vec![alice().account_id()],
                verified: true,
            },
            &BuilderConfig::default(),
        )
        .await
        .unwrap();

        let report: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(report["dangerous"], false);
        assert_eq!(report["web_auth"], false);
        assert_eq!(report["memo_type"], "Text");
        assert_eq!(report["needs_signatures"][alice().account_id()], false);
        assert_eq!(report["signers"][0]["has_signed"], true);
        assert_eq!(report["consensus"]["type"], "single_signature");
    }

    #[tokio::test]
    async fn review_flags_unsigned_debit_of_local_account() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_file(&["Dest"]);
        let out = build(
            &build_args(ledger.path(), "Dest", "native"),
            &BuilderConfig::default(),
        )
        .await
        .unwrap();
        let tx_path = dir.path().join("tx.json");
        std::fs::write(&tx_path, &out).unwrap();

        let report = review(
            &ReviewArgs {
                tx: tx_path,
                ledger: ledger.path().to_path_buf(),
                local: vec![alice().account_id()],
                verified: false,
            },
            &BuilderConfig::default(),
        )
        .await
        .unwrap();
        let report: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(report["dangerous"], true);
    }

    #[tokio::test]
    async fn review_reports_flags_when_source_is_unfunded() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_file(&[]);
        let tx = TransactionBuilder::new("Ghost", 0, Network::Testnet)
            .operation(Operation::manage_data("example.com auth", Some("nonce")))
            .build()
            .unwrap();
        let tx_path = dir.path().join("tx.json");
        std::fs::write(&tx_path, serde_json::to_string(&tx).unwrap()).unwrap();

        let report = review(
            &ReviewArgs {
                tx: tx_path,
                ledger: ledger.path().to_path_buf(),
                local: vec![alice().account_id()],
                verified: false,
            },
            &BuilderConfig::default(),
        )
        .await
        .unwrap();
        let report: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(report["web_auth"], true);
        assert_eq!(report["dangerous"], false);
        assert!(report["needs_signatures"].as_object().unwrap().is_empty());
        let reason = report["signature_check_errors"][alice().account_id()]
            .as_str()
            .unwrap();
        assert!(reason.contains("Ghost"));
        assert!(report["consensus"].is_null());
    }

    #[tokio::test]
    async fn fee_reads_ledger_statistics() {
        let ledger = ledger_file(&[]);
        let out = fee(
            &FeeArgs {
                ledger: ledger.path().to_path_buf(),
            },
            &BuilderConfig::default(),
        )
        .await
        .unwrap();
        assert!(out.starts_with("base fee: 700 stroops"));
    }

    #[test]
    fn keygen_writes_restricted_key_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("new.key");
        let printed = keygen(&KeygenArgs {
            out: Some(out.clone()),
        })
        .unwrap();

        let secret = std::fs::read_to_string(&out).unwrap();
        let keypair = Keypair::from_hex(&secret).unwrap();
        assert!(printed.contains(&keypair.account_id()));
        assert!(!printed.contains(&secret));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&out).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "fallback_fee": 321 }}"#).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.fallback_fee, 321);
        assert_eq!(load_config(None).unwrap(), BuilderConfig::default());
        assert!(load_config(Some(Path::new("/nonexistent/meridian.json"))).is_err());
    }
}
