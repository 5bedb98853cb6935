//! Approve-then-stake orchestration.
//!
//! [`StakeOrchestrator`] owns the [`OrchestrationState`] of one user and is
//! its only writer. A submitted request first approves the farm as spender
//! of the token, and only once that approval is confirmed issues the stake
//! call with the same token and amount.
use alloy::primitives::Address;
use chrono::Utc;
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::chain::{CallHandle, ContractCall, ContractGateway};
use crate::entity::{FarmError, OrchestrationState, StakeRequest, TransactionPhase};

pub const APPROVE_LABEL: &str = "Approve ERC20 Transfer";
pub const STAKE_LABEL: &str = "Stake Tokens";

pub trait StakeInteractor: Send + Sync {
    /// Starts the approve → stake sequence and returns without waiting for
    /// it. A request still in flight is superseded.
    fn submit(&self, request: StakeRequest) -> Result<Uuid, FarmError>;

    fn state(&self) -> OrchestrationState;

    fn subscribe(&self) -> watch::Receiver<OrchestrationState>;
}

pub struct StakeOrchestrator {
    gateway: Arc<dyn ContractGateway>,
    chain_id: u64,
    token_farm: Address,
    state_tx: Arc<watch::Sender<OrchestrationState>>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl StakeOrchestrator {
    pub fn new(gateway: Arc<dyn ContractGateway>, chain_id: u64, token_farm: Address) -> Self {
        let (state_tx, _) = watch::channel(OrchestrationState::default());

        Self {
            gateway,
            chain_id,
            token_farm,
            state_tx: Arc::new(state_tx),
            driver: Mutex::new(None),
        }
    }

    async fn drive(
        gateway: Arc<dyn ContractGateway>,
        state_tx: Arc<watch::Sender<OrchestrationState>>,
        token_farm: Address,
        request_id: Uuid,
        request: StakeRequest,
        approval: CallHandle,
    ) {
        let approval_tx = match approval.settled().await {
            Ok(tx_hash) => tx_hash,
            Err(failure) => {
                transition(&state_tx, request_id, TransactionPhase::Failed, |state| {
                    state.failure = Some(FarmError::from(failure).to_string());
                });
                return;
            }
        };

        if !transition(
            &state_tx,
            request_id,
            TransactionPhase::ApprovalConfirmed,
            |state| state.approval_tx = Some(approval_tx),
        ) {
            return;
        }

        // Issued under the state lock so a superseding submit cannot slip in
        // between the check and the call.
        let mut stake = None;
        transition(&state_tx, request_id, TransactionPhase::StakePending, |_| {
            stake = Some(gateway.submit(
                STAKE_LABEL,
                ContractCall::stake_tokens(token_farm, request.token_address, request.amount),
            ));
        });
        let Some(stake) = stake else {
            return;
        };

        match stake.settled().await {
            Ok(tx_hash) => {
                transition(&state_tx, request_id, TransactionPhase::StakeConfirmed, |state| {
                    state.stake_tx = Some(tx_hash);
                });
            }
            Err(failure) => {
                transition(&state_tx, request_id, TransactionPhase::Failed, |state| {
                    state.failure = Some(FarmError::from(failure).to_string());
                });
            }
        }
    }
}

/// Moves request `request_id` to `next`, applying `apply` first. Returns
/// false without touching the state when the request has been superseded
/// or the move is not a legal step.
fn transition(
    state_tx: &watch::Sender<OrchestrationState>,
    request_id: Uuid,
    next: TransactionPhase,
    apply: impl FnOnce(&mut OrchestrationState),
) -> bool {
    state_tx.send_if_modified(|state| {
        if state.request_id != Some(request_id) {
            info!("Request {} was superseded, ignoring move to {}", request_id, next);
            return false;
        }
        if !state.phase.can_advance_to(next) {
            error!(
                "Request {}: illegal transition {} -> {}",
                request_id, state.phase, next
            );
            return false;
        }

        apply(state);
        info!("Request {}: {} -> {}", request_id, state.phase, next);
        state.phase = next;
        state.updated_at = Utc::now();
        true
    })
}

impl StakeInteractor for StakeOrchestrator {
    fn submit(&self, request: StakeRequest) -> Result<Uuid, FarmError> {
        request.validate()?;

        if self.token_farm == Address::ZERO {
            warn!(
                "Stake of {} rejected: no farm deployed on chain {}",
                request.token_address, self.chain_id
            );
            return Err(FarmError::ConfigurationMissing(self.chain_id));
        }

        let mut driver = self.driver.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = driver.take() {
            if !previous.is_finished() {
                warn!("Superseding stake request still in flight");
            }
            previous.abort();
        }

        let request_id = Uuid::new_v4();
        info!(
            "Request {}: staking {} of token {} into {}",
            request_id, request.amount, request.token_address, self.token_farm
        );

        // Replace the state and issue the approval under one lock so no
        // reader ever sees the approval without its request.
        let mut approval = None;
        self.state_tx.send_modify(|state| {
            *state = OrchestrationState {
                request_id: Some(request_id),
                phase: TransactionPhase::ApprovalPending,
                pending_amount: Some(request.amount),
                token_address: Some(request.token_address),
                ..OrchestrationState::default()
            };
            approval = Some(self.gateway.submit(
                APPROVE_LABEL,
                ContractCall::approve(request.token_address, self.token_farm, request.amount),
            ));
        });

        let Some(approval) = approval else {
            return Err(FarmError::Rpc("approval call was not issued".to_string()));
        };

        *driver = Some(tokio::spawn(Self::drive(
            self.gateway.clone(),
            self.state_tx.clone(),
            self.token_farm,
            request_id,
            request,
            approval,
        )));

        Ok(request_id)
    }

    fn state(&self) -> OrchestrationState {
        self.state_tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<OrchestrationState> {
        self.state_tx.subscribe()
    }
}
