use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::TransactionPhase;

/// Snapshot of the orchestrator's progress on its current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationState {
    pub request_id: Option<Uuid>,
    pub phase: TransactionPhase,
    pub pending_amount: Option<U256>,
    pub token_address: Option<Address>,
    pub approval_tx: Option<TxHash>,
    pub stake_tx: Option<TxHash>,
    pub failure: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for OrchestrationState {
    fn default() -> Self {
        Self {
            request_id: None,
            phase: TransactionPhase::NotStarted,
            pending_amount: None,
            token_address: None,
            approval_tx: None,
            stake_tx: None,
            failure: None,
            updated_at: Utc::now(),
        }
    }
}

impl OrchestrationState {
    pub fn is_in_flight(&self) -> bool {
        self.phase != TransactionPhase::NotStarted && !self.phase.is_terminal()
    }
}
