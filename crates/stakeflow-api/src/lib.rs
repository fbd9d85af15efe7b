//! Staking API request/response types and client.
//!
//! - Look up the stakeable balance of an address
//! - Build a stake operation (returns an encoded unsigned transaction)
//!
//! Neither call is retried; the build call is not idempotent on the server side.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stakeflow_types::{Address, BalanceResult, Hex, OperationRequest, RemoteError};

pub mod client;

pub use client::StakingApiClient;

/// Generic message used when the balance endpoint gives no usable error.
pub const BALANCE_FAILED: &str = "Failed to check balance";

/// Generic message used when the build endpoint gives no usable error.
pub const BUILD_FAILED: &str = "Failed to create stake operation";

/// Staking API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub balance_path: String,
    pub stake_path: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            balance_path: "/api/balance".into(),
            stake_path: "/api/stake".into(),
            timeout_ms: 30_000,
        }
    }
}

/// Body of a balance request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    pub wallet_address: String,
}

/// Successful balance response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub stakeable_balance: String,
    pub network: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// Body of a build request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeRequest {
    pub wallet_address: String,
    pub amount: String,
}

impl From<&OperationRequest> for StakeRequest {
    fn from(req: &OperationRequest) -> Self {
        Self {
            wallet_address: req.wallet_address().to_checksum(None),
            amount: req.amount().to_string(),
        }
    }
}

/// One transaction of a built stake operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationTransaction {
    pub unsigned_payload: Hex,
    pub status: String,
}

/// Successful build response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltOperation {
    pub operation_id: String,
    pub stakeable_balance: String,
    /// Hex( UTF-8 JSON ) of the first transaction; see `stakeflow-payload`.
    pub unsigned_transaction: Hex,
    #[serde(default)]
    pub transactions: Vec<OperationTransaction>,
}

/// Error body returned alongside a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Remote staking service.
#[async_trait]
pub trait StakingApi: Send + Sync {
    async fn fetch_stakeable_balance(&self, address: Address) -> Result<BalanceResult, RemoteError>;

    async fn build_stake_operation(
        &self,
        request: &OperationRequest,
    ) -> Result<BuiltOperation, RemoteError>;
}
