//! HTTP client for the staking API.
//!
//! Endpoints:
//! - POST /api/balance  { walletAddress }
//! - POST /api/stake    { walletAddress, amount }

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stakeflow_types::{Address, BalanceResult, OperationRequest, RemoteError};
use std::time::Duration;

use crate::{
    ApiConfig, BalanceRequest, BalanceResponse, BuiltOperation, ErrorBody, StakeRequest,
    StakingApi, BALANCE_FAILED, BUILD_FAILED,
};

/// Staking API client over HTTP + JSON.
pub struct StakingApiClient {
    base_url: String,
    balance_path: String,
    stake_path: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl StakingApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let timeout = Duration::from_millis(config.timeout_ms);
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            balance_path: config.balance_path.clone(),
            stake_path: config.stake_path.clone(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }

    /// POST a JSON body and decode a JSON reply.
    ///
    /// Non-2xx replies use the server's `{ error }` message when present,
    /// otherwise `generic`. A 2xx reply that does not match `T` also maps to
    /// `generic`.
    async fn post<B, T>(&self, path: &str, body: &B, generic: &str) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "staking api request failed");
                RemoteError::new(format!("{}: {}", generic, e))
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            RemoteError::with_status(format!("{}: {}", generic, e), status.as_u16())
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| generic.to_string());
            tracing::warn!(url = %url, status = status.as_u16(), message = %message, "staking api returned error");
            return Err(RemoteError::with_status(message, status.as_u16()));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "malformed staking api response");
            RemoteError::with_status(generic, status.as_u16())
        })
    }
}

#[async_trait]
impl StakingApi for StakingApiClient {
    async fn fetch_stakeable_balance(&self, address: Address) -> Result<BalanceResult, RemoteError> {
        let body = BalanceRequest {
            wallet_address: address.to_checksum(None),
        };
        let resp: BalanceResponse = self.post(&self.balance_path, &body, BALANCE_FAILED).await?;

        tracing::debug!(
            address = %address,
            balance = %resp.stakeable_balance,
            network = %resp.network,
            "stakeable balance fetched"
        );
        Ok(BalanceResult {
            wallet_address: address,
            stakeable_balance: resp.stakeable_balance,
            network: resp.network,
        })
    }

    async fn build_stake_operation(
        &self,
        request: &OperationRequest,
    ) -> Result<BuiltOperation, RemoteError> {
        let body = StakeRequest::from(request);
        let op: BuiltOperation = self.post(&self.stake_path, &body, BUILD_FAILED).await?;

        tracing::info!(
            operation_id = %op.operation_id,
            transactions = op.transactions.len(),
            "stake operation built"
        );
        Ok(op)
    }
}
