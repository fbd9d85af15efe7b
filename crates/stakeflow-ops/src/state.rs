//! Observable workflow state.

use serde::Serialize;
use stakeflow_types::{BalanceResult, HOODI_CHAIN_ID, HOODI_NETWORK_NAME, TxHash, UnsignedTransaction};

pub const INITIAL_STATUS: &str = "Ready to start";

/// Workflow configuration.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub required_chain_id: u64,
    pub network_name: String,
    /// Shown after balances, e.g. "1.5 ETH".
    pub asset_symbol: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            required_chain_id: HOODI_CHAIN_ID,
            network_name: HOODI_NETWORK_NAME.into(),
            asset_symbol: "ETH".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowPhase {
    Idle,
    CheckingBalance,
    BuildingOperation,
    OperationReady,
    Signing,
}

/// Everything a front end shows. Owned by one `StakingWorkflow`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub phase: WorkflowPhase,
    pub status: String,
    pub error: Option<String>,
    pub balance: Option<BalanceResult>,
    pub pending_tx: Option<UnsignedTransaction>,
    pub operation_id: Option<String>,
    pub tx_hash: Option<TxHash>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            phase: WorkflowPhase::Idle,
            status: INITIAL_STATUS.into(),
            error: None,
            balance: None,
            pending_tx: None,
            operation_id: None,
            tx_hash: None,
        }
    }
}

/// Progress event for live reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    PhaseChanged(WorkflowPhase),
    Status(String),
    Error(String),
}

/// Callback type for workflow events.
pub type WorkflowEventHandler = Box<dyn Fn(WorkflowEvent) + Send + Sync>;
