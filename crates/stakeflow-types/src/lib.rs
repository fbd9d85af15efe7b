//! Shared types and errors for the stakeflow workspace.
//!
//! - Error taxonomy (`StakeflowError` and its per-stage sub-errors)
//! - Stake request / balance value types
//! - Unsigned transaction descriptor (see [`tx`])

use serde::Serialize;
use thiserror::Error;

pub mod tx;

pub use alloy_primitives::{Address, Bytes, TxHash, U256};
pub use tx::{IntegerString, UnsignedTransaction};

/// Chain id of the Ethereum Hoodi testnet, the default staking network.
pub const HOODI_CHAIN_ID: u64 = 560048;

/// Display name of the default staking network.
pub const HOODI_NETWORK_NAME: &str = "Ethereum Hoodi Testnet";

/// 0x-prefixed hex string (e.g. "0x1234...").
pub type Hex = String;

/// Failure to turn a remote payload into an [`UnsignedTransaction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid hex payload: {0}")]
    InvalidHex(String),

    #[error("payload is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("payload is not a JSON object: {0}")]
    InvalidFormat(String),

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl DecodeError {
    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Transport or server failure reported by the staking API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    /// HTTP status, when a response was received at all.
    pub status: Option<u16>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

/// Active network does not match the required one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("failed to switch to chain {required}: {reason}")]
    SwitchFailed { required: u64, reason: String },

    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),
}

/// Signing or broadcasting failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("transaction targets chain {actual} but chain {expected} is required")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("{message}")]
    Provider {
        message: String,
        short_message: Option<String>,
    },
}

impl SignError {
    /// Short message suitable for display; prefers the wallet-supplied summary.
    pub fn user_message(&self) -> String {
        match self {
            SignError::Rejected(reason) => reason.clone(),
            SignError::Provider {
                message,
                short_message,
            } => short_message.clone().unwrap_or_else(|| message.clone()),
            other => other.to_string(),
        }
    }
}

/// Stakeflow error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeflowError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Sign(#[from] SignError),
}

pub type Result<T> = std::result::Result<T, StakeflowError>;

/// A non-negative decimal amount, kept as the exact text the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecimalAmount(String);

impl DecimalAmount {
    /// Accepts `1`, `1.5`, `.5` and `5.`; no sign, exponent or whitespace.
    pub fn parse(text: &str) -> Result<Self> {
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        let valid = match text.split_once('.') {
            Some((int, frac)) => {
                is_digits(int) && is_digits(frac) && !(int.is_empty() && frac.is_empty())
            }
            None => !text.is_empty() && is_digits(text),
        };
        if !valid {
            return Err(StakeflowError::Validation(format!(
                "`{}` is not a non-negative decimal number",
                text
            )));
        }
        Ok(Self(text.to_string()))
    }

    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0' || b == b'.')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stake request as submitted to the build endpoint. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    wallet_address: Address,
    amount: DecimalAmount,
}

impl OperationRequest {
    /// Validate a stake request. The amount must be strictly positive.
    pub fn new(wallet_address: Address, amount: &str) -> Result<Self> {
        let amount = DecimalAmount::parse(amount)?;
        if amount.is_zero() {
            return Err(StakeflowError::Validation(
                "stake amount must be greater than zero".into(),
            ));
        }
        Ok(Self {
            wallet_address,
            amount,
        })
    }

    pub fn wallet_address(&self) -> Address {
        self.wallet_address
    }

    pub fn amount(&self) -> &DecimalAmount {
        &self.amount
    }
}

/// Stakeable balance as reported by the staking API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub wallet_address: Address,
    /// Decimal string, full precision.
    pub stakeable_balance: String,
    pub network: String,
}

/// Parse a `0x`-prefixed, 40-hex-digit address. Checksum casing is not enforced.
pub fn parse_address(text: &str) -> std::result::Result<Address, String> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| format!("`{}` is missing the 0x prefix", text))?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("`{}` is not a 20-byte hex address", text));
    }
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    Ok(Address::from_slice(&bytes))
}

/// Parse a hex string (optional 0x prefix) to bytes.
pub fn hex_to_bytes(hex_str: &str) -> std::result::Result<Vec<u8>, DecodeError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| DecodeError::InvalidHex(e.to_string()))
}

/// Convert bytes to a 0x-prefixed hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
