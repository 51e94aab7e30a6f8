//! Core value types for ledger transactions.
//!
//! These are the vocabulary of an envelope: which network, which asset, how
//! much of it, what the memo says, and which operations run. Amounts are
//! integers in stroops throughout; the 7-decimal string form exists only at
//! the edges (user input, display).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{
    AMOUNT_DECIMALS, MAX_ASSET_CODE_LENGTH, MAX_MEMO_TEXT_LENGTH, PUBLIC_NETWORK_PASSPHRASE,
    STROOPS_PER_UNIT, TESTNET_PASSPHRASE,
};

/// Textual code reported for the native asset.
pub const NATIVE_ASSET_CODE: &str = "native";

/// Malformed user input for one of the value types below.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("invalid asset {input:?}: expected `native` or `CODE:ISSUER`")]
    InvalidAsset { input: String },

    #[error("memo text is {len} bytes, at most {max} allowed")]
    MemoTooLong { len: usize, max: usize },
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// The network a transaction is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Public,
    Testnet,
}

impl Network {
    pub fn from_testnet_flag(testnet: bool) -> Self {
        if testnet {
            Self::Testnet
        } else {
            Self::Public
        }
    }

    pub fn passphrase(&self) -> &'static str {
        match self {
            Self::Public => PUBLIC_NETWORK_PASSPHRASE,
            Self::Testnet => TESTNET_PASSPHRASE,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Self::Testnet)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// An asset: the network's native currency or a credit issued by an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    Native,
    Credit { code: String, issuer: String },
}

impl Asset {
    pub fn credit(code: &str, issuer: &str) -> Self {
        Self::Credit {
            code: code.to_string(),
            issuer: issuer.to_string(),
        }
    }

    /// Only the native asset can create an account as a side effect of a transfer.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Native => NATIVE_ASSET_CODE,
            Self::Credit { code, .. } => code,
        }
    }

    pub fn issuer(&self) -> Option<&str> {
        match self {
            Self::Native => None,
            Self::Credit { issuer, .. } => Some(issuer),
        }
    }
}

impl FromStr for Asset {
    type Err = TypeError;

    /// Parses `native` or `CODE:ISSUER`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(NATIVE_ASSET_CODE) {
            return Ok(Self::Native);
        }
        let invalid = || TypeError::InvalidAsset {
            input: s.to_string(),
        };
        let (code, issuer) = s.split_once(':').ok_or_else(invalid)?;
        if code.is_empty()
            || code.len() > MAX_ASSET_CODE_LENGTH
            || !code.chars().all(|c| c.is_ascii_alphanumeric())
            || issuer.is_empty()
        {
            return Err(invalid());
        }
        Ok(Self::credit(code, issuer))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "{}", NATIVE_ASSET_CODE),
            Self::Credit { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// An amount in stroops (10^-7 of a unit).
///
/// `Amount(10_000_000)` is one unit. Parsing and display use the ledger's
/// fixed 7-decimal notation, e.g. `"1.5"` parses to `15_000_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    pub fn from_stroops(stroops: u64) -> Self {
        Self(stroops)
    }

    pub fn stroops(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Human form with all seven decimals: `15_000_000` becomes `"1.5000000"`.
    pub fn display_decimal(&self) -> String {
        format!(
            "{}.{:0>width$}",
            self.0 / STROOPS_PER_UNIT,
            self.0 % STROOPS_PER_UNIT,
            width = AMOUNT_DECIMALS as usize
        )
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TypeError::InvalidAmount {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("empty"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("only digits and a single decimal point are allowed"));
        }
        if frac.len() > AMOUNT_DECIMALS as usize {
            return Err(invalid("more than 7 decimal places"));
        }

        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("too large"))?
        };
        let frac: u64 = format!("{:0<width$}", frac, width = AMOUNT_DECIMALS as usize)
            .parse()
            .map_err(|_| invalid("bad fraction"))?;

        whole
            .checked_mul(STROOPS_PER_UNIT)
            .and_then(|w| w.checked_add(frac))
            .map(Amount)
            .ok_or_else(|| invalid("too large"))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_decimal())
    }
}

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Optional memo attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Memo {
    #[default]
    None,
    Text(String),
    Id(u64),
    Hash(#[serde(with = "hex32")] [u8; 32]),
    Return(#[serde(with = "hex32")] [u8; 32]),
}

impl Memo {
    /// A text memo, rejected if it exceeds the ledger's 28-byte limit.
    pub fn text(text: impl Into<String>) -> Result<Self, TypeError> {
        let text = text.into();
        if text.len() > MAX_MEMO_TEXT_LENGTH {
            return Err(TypeError::MemoTooLong {
                len: text.len(),
                max: MAX_MEMO_TEXT_LENGTH,
            });
        }
        Ok(Self::Text(text))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Label for display next to the memo value ("Text Memo", "Id Memo", ...).
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Text(_) => "Text",
            Self::Id(_) => "Id",
            Self::Hash(_) => "Hash",
            Self::Return(_) => "Return",
        }
    }
}

mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

// ---------------------------------------------------------------------------
// ValidityWindow
// ---------------------------------------------------------------------------

/// `[min_time, max_time]` in unix seconds during which the network accepts
/// the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub min_time: u64,
    pub max_time: u64,
}

impl ValidityWindow {
    /// Window starting at `now` and lasting `duration_secs`.
    pub fn starting_at(now: u64, duration_secs: u64) -> Self {
        Self {
            min_time: now,
            max_time: now.saturating_add(duration_secs),
        }
    }

    pub fn contains(&self, now: u64) -> bool {
        self.min_time <= now && now <= self.max_time
    }

    pub fn length_secs(&self) -> u64 {
        self.max_time.saturating_sub(self.min_time)
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// What an operation does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationBody {
    Payment {
        destination: String,
        asset: Asset,
        amount: Amount,
    },
    CreateAccount {
        destination: String,
        starting_balance: Amount,
    },
    ManageData {
        name: String,
        value: Option<String>,
    },
}

/// A single ledger operation.
///
/// `source` overrides the transaction's source account for this operation
/// only. `None` means "the transaction source".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub body: OperationBody,
}

impl Operation {
    pub fn payment(destination: &str, asset: Asset, amount: Amount) -> Self {
        Self {
            source: None,
            body: OperationBody::Payment {
                destination: destination.to_string(),
                asset,
                amount,
            },
        }
    }

    pub fn create_account(destination: &str, starting_balance: Amount) -> Self {
        Self {
            source: None,
            body: OperationBody::CreateAccount {
                destination: destination.to_string(),
                starting_balance,
            },
        }
    }

    pub fn manage_data(name: &str, value: Option<&str>) -> Self {
        Self {
            source: None,
            body: OperationBody::ManageData {
                name: name.to_string(),
                value: value.map(str::to_string),
            },
        }
    }

    /// Runs this operation on behalf of `source` instead of the transaction source.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Short name for logs and display.
    pub fn kind(&self) -> &'static str {
        match self.body {
            OperationBody::Payment { .. } => "payment",
            OperationBody::CreateAccount { .. } => "create_account",
            OperationBody::ManageData { .. } => "manage_data",
        }
    }
}
