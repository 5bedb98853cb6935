//! Pure mapping from [`OrchestrationState`] to what the chat shows.
use crate::entity::{OrchestrationState, TransactionPhase};

/// The states a stake request can be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiStatus {
    Idle,
    /// Approval confirmed; the stake still has to be confirmed by the wallet.
    AwaitingConfirmation,
    Mining,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags {
    pub status: UiStatus,
    pub is_mining: bool,
    pub show_approval_success: bool,
    pub show_stake_success: bool,
    pub show_failure: bool,
}

/// Transient messages raised as a request progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ApprovalSucceeded,
    StakeSucceeded,
    Failed(String),
}

pub fn ui_status(phase: TransactionPhase) -> UiStatus {
    match phase {
        TransactionPhase::NotStarted => UiStatus::Idle,
        TransactionPhase::ApprovalPending | TransactionPhase::StakePending => UiStatus::Mining,
        TransactionPhase::ApprovalConfirmed => UiStatus::AwaitingConfirmation,
        TransactionPhase::StakeConfirmed => UiStatus::Success,
        TransactionPhase::Failed => UiStatus::Failed,
    }
}

pub fn project(state: &OrchestrationState) -> StatusFlags {
    let status = ui_status(state.phase);

    StatusFlags {
        status,
        is_mining: status == UiStatus::Mining,
        show_approval_success: state.phase == TransactionPhase::ApprovalConfirmed,
        show_stake_success: state.phase == TransactionPhase::StakeConfirmed,
        show_failure: state.phase == TransactionPhase::Failed,
    }
}

/// Notifications owed when the shown phase moves from `seen` to the phase
/// of `state`. Subscribers may skip intermediate phases, so a confirmed
/// approval is reported even if `ApprovalConfirmed` itself was never seen.
pub fn notifications_since(seen: TransactionPhase, state: &OrchestrationState) -> Vec<Notification> {
    let mut notifications = Vec::new();

    if seen == state.phase {
        return notifications;
    }

    let approval_already_shown = matches!(
        seen,
        TransactionPhase::ApprovalConfirmed
            | TransactionPhase::StakePending
            | TransactionPhase::StakeConfirmed
    );
    if !approval_already_shown && state.approval_tx.is_some() {
        notifications.push(Notification::ApprovalSucceeded);
    }

    match state.phase {
        TransactionPhase::StakeConfirmed => notifications.push(Notification::StakeSucceeded),
        TransactionPhase::Failed => notifications.push(Notification::Failed(
            state
                .failure
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string()),
        )),
        _ => {}
    }

    notifications
}
