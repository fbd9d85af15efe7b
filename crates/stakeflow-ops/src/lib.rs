//! Staking workflow orchestration: balance check, stake build, sign and broadcast.
//!
//! Coordinates the staking API, the wallet session (account and chain) and the
//! signer adapter, and keeps the observable `WorkflowState` up to date. Every
//! failure is recorded in the state before the action returns.

pub mod state;

pub use state::{
    WorkflowConfig, WorkflowEvent, WorkflowEventHandler, WorkflowPhase, WorkflowState,
    INITIAL_STATUS,
};

use stakeflow_api::StakingApi;
use stakeflow_chain::{ChainGuard, Ready, WalletSession};
use stakeflow_signer::{SignerAdapter, TransactionSigner};
use stakeflow_types::{
    Address, BalanceResult, NetworkError, OperationRequest, Result, StakeflowError, TxHash,
    UnsignedTransaction,
};
use std::sync::Arc;

pub const NOT_CONNECTED: &str = "Please connect wallet first.";
pub const NO_PENDING_TX: &str = "No unsigned transaction available to sign.";
pub const INVALID_TX_FORMAT: &str = "Invalid transaction format";
pub const WALLET_UNAVAILABLE: &str = "Wallet unavailable";

/// The workflow engine. One instance per user session; actions take `&mut self`
/// so they never overlap.
pub struct StakingWorkflow {
    config: WorkflowConfig,
    api: Arc<dyn StakingApi>,
    wallet: Arc<dyn WalletSession>,
    guard: ChainGuard,
    signer: SignerAdapter,
    state: WorkflowState,
    on_event: Option<WorkflowEventHandler>,
}

impl StakingWorkflow {
    pub fn new(
        config: WorkflowConfig,
        api: Arc<dyn StakingApi>,
        wallet: Arc<dyn WalletSession>,
        signer: Arc<dyn TransactionSigner>,
        on_event: Option<WorkflowEventHandler>,
    ) -> Self {
        let guard = ChainGuard::new(config.required_chain_id);
        let signer = SignerAdapter::new(signer, config.required_chain_id);
        Self {
            config,
            api,
            wallet,
            guard,
            signer,
            state: WorkflowState::default(),
            on_event,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Some(ref handler) = self.on_event {
            handler(event);
        }
    }

    fn set_phase(&mut self, phase: WorkflowPhase) {
        if self.state.phase != phase {
            self.state.phase = phase;
            self.emit(WorkflowEvent::PhaseChanged(phase));
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        self.state.status = status.clone();
        self.emit(WorkflowEvent::Status(status));
    }

    fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.state.error = Some(message.clone());
        self.emit(WorkflowEvent::Error(message));
    }

    /// Record a failed action: error message, status, back to Idle.
    fn fail(
        &mut self,
        status: &str,
        message: impl Into<String>,
        err: StakeflowError,
    ) -> StakeflowError {
        tracing::warn!(status, error = %err, "workflow action failed");
        self.set_error(message);
        self.set_status(status);
        self.set_phase(WorkflowPhase::Idle);
        err
    }

    async fn connected_account(&mut self) -> Result<Address> {
        match self.wallet.account().await {
            Ok(Some(address)) => Ok(address),
            Ok(None) => Err(self.fail(
                NOT_CONNECTED,
                NOT_CONNECTED,
                StakeflowError::Validation(NOT_CONNECTED.into()),
            )),
            Err(reason) => {
                let message = format!("Wallet request failed: {}", reason);
                Err(self.fail(
                    WALLET_UNAVAILABLE,
                    message,
                    NetworkError::WalletUnavailable(reason).into(),
                ))
            }
        }
    }

    async fn ensure_network(&mut self) -> Result<Ready> {
        match self.guard.ensure(self.wallet.as_ref()).await {
            Ok(ready) => Ok(ready),
            Err(e) => {
                let message = format!(
                    "Failed to switch to the required network (chain {}). Please switch manually in your wallet.",
                    self.guard.required_chain_id()
                );
                Err(self.fail("Network switch failed", message, e.into()))
            }
        }
    }

    /// Fetch the stakeable balance of the connected account.
    pub async fn check_balance(&mut self) -> Result<BalanceResult> {
        let address = self.connected_account().await?;
        self.ensure_network().await?;

        self.state.error = None;
        self.state.balance = None;
        self.set_phase(WorkflowPhase::CheckingBalance);
        self.set_status("Checking stakeable balance...");

        match self.api.fetch_stakeable_balance(address).await {
            Ok(balance) => {
                tracing::info!(
                    wallet = %address,
                    balance = %balance.stakeable_balance,
                    "stakeable balance"
                );
                self.state.balance = Some(balance.clone());
                self.set_status(format!(
                    "Stakeable balance: {} {}",
                    balance.stakeable_balance, self.config.asset_symbol
                ));
                self.set_phase(WorkflowPhase::Idle);
                Ok(balance)
            }
            Err(e) => {
                let message = e.message.clone();
                Err(self.fail("Failed to check balance", message, e.into()))
            }
        }
    }

    /// Ask the staking API for an unsigned stake transaction of `amount`.
    ///
    /// Results of any earlier build or broadcast are dropped first, so a failed
    /// build never leaves a stale transaction ready to sign.
    pub async fn build_operation(&mut self, amount: &str) -> Result<UnsignedTransaction> {
        self.state.pending_tx = None;
        self.state.operation_id = None;
        self.state.tx_hash = None;
        self.state.error = None;
        self.set_phase(WorkflowPhase::Idle);

        let address = self.connected_account().await?;
        let request = match OperationRequest::new(address, amount) {
            Ok(request) => request,
            Err(e) => {
                let message = format!("Invalid stake amount: {}", e);
                return Err(self.fail("Invalid stake amount", message, e));
            }
        };
        self.ensure_network().await?;

        self.set_phase(WorkflowPhase::BuildingOperation);
        self.set_status("Building stake operation...");

        let built = match self.api.build_stake_operation(&request).await {
            Ok(built) => built,
            Err(e) => {
                let message = e.message.clone();
                return Err(self.fail("Failed to build stake operation", message, e.into()));
            }
        };

        let tx = match stakeflow_payload::decode_hex(&built.unsigned_transaction) {
            Ok(tx) => tx,
            Err(e) => {
                return Err(self.fail(
                    "Failed to build stake operation",
                    INVALID_TX_FORMAT,
                    e.into(),
                ));
            }
        };

        if tx.chain_id != self.config.required_chain_id {
            tracing::warn!(
                chain_id = tx.chain_id,
                required = self.config.required_chain_id,
                "built transaction targets another chain"
            );
        }
        tracing::info!(
            operation_id = %built.operation_id,
            amount = %request.amount(),
            to = %tx.to,
            "stake operation built"
        );

        let network = self
            .state
            .balance
            .as_ref()
            .map(|b| b.network.clone())
            .unwrap_or_else(|| self.config.network_name.clone());
        self.state.balance = Some(BalanceResult {
            wallet_address: address,
            stakeable_balance: built.stakeable_balance,
            network,
        });
        self.state.operation_id = Some(built.operation_id);
        self.state.pending_tx = Some(tx.clone());
        self.set_status("Stake operation built successfully!");
        self.set_phase(WorkflowPhase::OperationReady);
        Ok(tx)
    }

    /// Sign and broadcast the pending transaction through the wallet.
    pub async fn sign_and_broadcast(&mut self) -> Result<TxHash> {
        let Some(tx) = self.state.pending_tx.clone() else {
            self.set_error(NO_PENDING_TX);
            return Err(StakeflowError::Validation(NO_PENDING_TX.into()));
        };

        self.state.error = None;
        self.state.tx_hash = None;
        self.set_phase(WorkflowPhase::Signing);
        self.set_status("Waiting for signature...");

        match self.signer.sign(&tx).await {
            Ok(hash) => {
                self.state.tx_hash = Some(hash);
                self.state.pending_tx = None;
                self.set_status("Transaction broadcasted successfully!");
                self.set_phase(WorkflowPhase::Idle);
                Ok(hash)
            }
            Err(e) => {
                let message = e.user_message();
                Err(self.fail("Transaction failed or was rejected.", message, e.into()))
            }
        }
    }

    /// Move the wallet to the required chain on request.
    pub async fn switch_network(&mut self) -> Result<Ready> {
        self.state.error = None;
        let ready = self.ensure_network().await?;
        let required = self.guard.required_chain_id();
        match ready {
            Ready::AlreadyActive => self.set_status(format!("Already on chain {}", required)),
            Ready::Switched { .. } => self.set_status(format!("Switched to chain {}", required)),
        }
        Ok(ready)
    }

    /// Warning text when the wallet is not known to be on the required chain.
    pub async fn network_warning(&self) -> Option<String> {
        self.guard
            .mismatch(self.wallet.as_ref())
            .await
            .map(|mismatch| format!("Wrong network. {}", mismatch))
    }
}
