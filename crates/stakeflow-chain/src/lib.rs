//! Chain guard: make sure the wallet is on the required network before any
//! network-dependent step runs.
//!
//! The guard never silently changes networks; a mismatch always goes through
//! [`NetworkSwitcher::switch_chain`], which surfaces as a wallet prompt.

use async_trait::async_trait;
use stakeflow_types::{Address, NetworkError};

/// Something that can ask the user's wallet to change the active network.
#[async_trait]
pub trait NetworkSwitcher: Send + Sync {
    /// Request a switch to `chain_id`. Resolves once the wallet accepted or refused.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), String>;
}

/// The connected wallet as seen by the workflow.
#[async_trait]
pub trait WalletSession: NetworkSwitcher {
    /// Connected account. `Ok(None)` when the wallet is reachable but no account
    /// is connected; `Err` when the wallet itself could not be reached.
    async fn account(&self) -> Result<Option<Address>, String>;

    /// Active chain id, `None` when it cannot be determined.
    async fn chain_id(&self) -> Option<u64>;
}

/// Outcome of a successful guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ready {
    AlreadyActive,
    Switched { from: Option<u64> },
}

/// Compare `current` against `required`, requesting a switch on mismatch.
pub async fn ensure_network<S: NetworkSwitcher + ?Sized>(
    switcher: &S,
    current: Option<u64>,
    required: u64,
) -> Result<Ready, NetworkError> {
    if current == Some(required) {
        return Ok(Ready::AlreadyActive);
    }

    tracing::info!(current = ?current, required, "network mismatch, requesting switch");
    match switcher.switch_chain(required).await {
        Ok(()) => {
            tracing::info!(chain_id = required, "network switched");
            Ok(Ready::Switched { from: current })
        }
        Err(reason) => {
            tracing::warn!(required, reason = %reason, "network switch failed");
            Err(NetworkError::SwitchFailed { required, reason })
        }
    }
}

/// Guard bound to a fixed required chain id.
#[derive(Debug, Clone, Copy)]
pub struct ChainGuard {
    required_chain_id: u64,
}

impl ChainGuard {
    pub fn new(required_chain_id: u64) -> Self {
        Self { required_chain_id }
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required_chain_id
    }

    /// Read the session's active chain and run [`ensure_network`] against it.
    pub async fn ensure(&self, session: &dyn WalletSession) -> Result<Ready, NetworkError> {
        let current = session.chain_id().await;
        ensure_network(session, current, self.required_chain_id).await
    }

    /// `Some(mismatch)` when the session is not known to be on the required chain.
    /// An unreadable chain id counts as a mismatch, same as in [`ChainGuard::ensure`].
    pub async fn mismatch(&self, session: &dyn WalletSession) -> Option<ChainMismatch> {
        match session.chain_id().await {
            Some(current) if current == self.required_chain_id => None,
            current => Some(ChainMismatch {
                current,
                required: self.required_chain_id,
            }),
        }
    }
}

/// Active chain differs from the required one. `current` is `None` when the
/// wallet could not report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainMismatch {
    pub current: Option<u64>,
    pub required: u64,
}

impl std::fmt::Display for ChainMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.current {
            Some(current) => write!(f, "Current: {}, Expected: {}", current, self.required),
            None => write!(f, "Current: unknown, Expected: {}", self.required),
        }
    }
}
