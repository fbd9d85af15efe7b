//! Signer adapter: hand an unsigned transaction to an external, user-controlled
//! signer (wallet) and report the broadcast hash or the failure.
//!
//! The adapter does not hold keys. It converts the descriptor's integer
//! strings into `U256` and re-checks the chain id right before signing, since
//! the active network can change between build and sign.

use async_trait::async_trait;
use stakeflow_types::{Address, Bytes, SignError, TxHash, UnsignedTransaction, U256};
use std::sync::Arc;

/// What the signer receives. Numeric fields are in the signer's integer domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub chain_id: u64,
}

impl From<&UnsignedTransaction> for SignRequest {
    fn from(tx: &UnsignedTransaction) -> Self {
        Self {
            from: tx.from,
            to: tx.to,
            data: tx.data.clone(),
            value: tx.value.value(),
            gas: tx.gas.value(),
            max_fee_per_gas: tx.max_fee_per_gas.value(),
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas.value(),
            chain_id: tx.chain_id,
        }
    }
}

/// External signing capability: signs and broadcasts, returning the tx hash.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn send_transaction(&self, request: &SignRequest) -> Result<TxHash, SignError>;
}

/// Binds a signer to the required chain id.
#[derive(Clone)]
pub struct SignerAdapter {
    signer: Arc<dyn TransactionSigner>,
    required_chain_id: u64,
}

impl SignerAdapter {
    pub fn new(signer: Arc<dyn TransactionSigner>, required_chain_id: u64) -> Self {
        Self {
            signer,
            required_chain_id,
        }
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required_chain_id
    }

    /// Sign and broadcast `tx`. Fails fast with `WrongNetwork` without touching
    /// the signer when `tx.chain_id` is not the required chain.
    pub async fn sign(&self, tx: &UnsignedTransaction) -> Result<TxHash, SignError> {
        if tx.chain_id != self.required_chain_id {
            tracing::warn!(
                expected = self.required_chain_id,
                actual = tx.chain_id,
                "refusing to sign transaction for another chain"
            );
            return Err(SignError::WrongNetwork {
                expected: self.required_chain_id,
                actual: tx.chain_id,
            });
        }

        let request = SignRequest::from(tx);
        tracing::info!(
            to = %request.to,
            value = %request.value,
            chain_id = request.chain_id,
            "requesting signature"
        );

        match self.signer.send_transaction(&request).await {
            Ok(hash) => {
                tracing::info!(tx_hash = %hash, "transaction broadcast");
                Ok(hash)
            }
            Err(e) => {
                tracing::warn!(error = %e, "signing failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for SignerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerAdapter")
            .field("required_chain_id", &self.required_chain_id)
            .finish()
    }
}
