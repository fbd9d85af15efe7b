//! JSON-RPC wallet adapter.
//!
//! Talks to a wallet that exposes the EIP-1193 request surface over HTTP
//! JSON-RPC (e.g. Frame on http://127.0.0.1:1248). The wallet owns the keys and
//! shows its own confirmation prompts; this crate only forwards requests.
//!
//! Methods used:
//! - eth_accounts
//! - eth_chainId
//! - wallet_switchEthereumChain
//! - eth_sendTransaction

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stakeflow_chain::{NetworkSwitcher, WalletSession};
use stakeflow_signer::{SignRequest, TransactionSigner};
use stakeflow_types::{bytes_to_hex, parse_address, Address, SignError, TxHash};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED: i64 = 4001;

/// EIP-3326 "unrecognized chain id".
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// Wallet connection configuration.
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub rpc_url: String,
    /// Covers the time the user spends on the confirmation prompt.
    pub timeout_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:1248".into(),
            timeout_ms: 120_000,
        }
    }
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("wallet request failed: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("malformed wallet response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Wallet reached over HTTP JSON-RPC.
pub struct RpcWallet {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
    next_id: AtomicU64,
}

impl RpcWallet {
    pub fn new(config: &WalletConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        Self {
            url: config.rpc_url.clone(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// Issue one JSON-RPC call and decode its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        tracing::debug!(method, id = request.id, "wallet rpc call");

        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        // Some wallets pair a JSON-RPC error body with a 4xx status.
        let body: RpcResponse = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(RpcError::Transport(format!("wallet returned status {}", status)))
            }
            Err(e) => return Err(RpcError::Malformed(e.to_string())),
        };

        if let Some(err) = body.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }

        serde_json::from_value(body.result.unwrap_or(Value::Null))
            .map_err(|e| RpcError::Malformed(format!("{}: {}", method, e)))
    }

    pub async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        let raw: Vec<String> = self.call("eth_accounts", json!([])).await?;
        raw.iter()
            .map(|a| parse_address(a).map_err(RpcError::Malformed))
            .collect()
    }

    pub async fn current_chain_id(&self) -> Result<u64, RpcError> {
        let raw: String = self.call("eth_chainId", json!([])).await?;
        parse_quantity(&raw)
    }
}

#[async_trait]
impl NetworkSwitcher for RpcWallet {
    async fn switch_chain(&self, chain_id: u64) -> Result<(), String> {
        let params = json!([{ "chainId": format!("0x{:x}", chain_id) }]);
        match self.call::<Value>("wallet_switchEthereumChain", params).await {
            Ok(_) => Ok(()),
            Err(RpcError::Rpc { code, .. }) if code == UNRECOGNIZED_CHAIN => Err(format!(
                "chain {} is not configured in the wallet",
                chain_id
            )),
            Err(RpcError::Rpc { message, .. }) => Err(message),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[async_trait]
impl WalletSession for RpcWallet {
    async fn account(&self) -> Result<Option<Address>, String> {
        match self.accounts().await {
            Ok(accounts) => Ok(accounts.into_iter().next()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read wallet accounts");
                Err(e.to_string())
            }
        }
    }

    async fn chain_id(&self) -> Option<u64> {
        match self.current_chain_id().await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "could not read wallet chain id");
                None
            }
        }
    }
}

#[async_trait]
impl TransactionSigner for RpcWallet {
    async fn send_transaction(&self, request: &SignRequest) -> Result<TxHash, SignError> {
        let params = json!([{
            "from": request.from.to_checksum(None),
            "to": request.to.to_checksum(None),
            "data": bytes_to_hex(&request.data),
            "value": format!("0x{:x}", request.value),
            "gas": format!("0x{:x}", request.gas),
            "maxFeePerGas": format!("0x{:x}", request.max_fee_per_gas),
            "maxPriorityFeePerGas": format!("0x{:x}", request.max_priority_fee_per_gas),
            "chainId": format!("0x{:x}", request.chain_id),
        }]);

        let raw: String = self
            .call("eth_sendTransaction", params)
            .await
            .map_err(sign_error)?;
        TxHash::from_str(&raw).map_err(|e| SignError::Provider {
            message: format!("wallet returned an invalid transaction hash `{}`: {}", raw, e),
            short_message: None,
        })
    }
}

fn sign_error(err: RpcError) -> SignError {
    match err {
        RpcError::Rpc { code, message, .. } if code == USER_REJECTED => SignError::Rejected(message),
        RpcError::Rpc {
            code,
            message,
            data,
        } => {
            let detail = data.map(|d| format!(" ({})", d)).unwrap_or_default();
            SignError::Provider {
                message: format!("RPC error {}: {}{}", code, message, detail),
                short_message: Some(message),
            }
        }
        other => SignError::Provider {
            message: other.to_string(),
            short_message: None,
        },
    }
}

/// Parse a 0x-prefixed hex quantity.
fn parse_quantity(raw: &str) -> Result<u64, RpcError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| RpcError::Malformed(format!("`{}` is not a hex quantity", raw)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::Malformed(format!("`{}`: {}", raw, e)))
}
