use serde::{Deserialize, Serialize};

/// Position of a stake request in the approve-then-stake sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPhase {
    #[default]
    NotStarted,
    ApprovalPending,
    ApprovalConfirmed,
    StakePending,
    StakeConfirmed,
    Failed,
}

impl TransactionPhase {
    /// `StakeConfirmed` and `Failed` end a request.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::StakeConfirmed | Self::Failed)
    }

    /// Whether the sequence may move from `self` to `next`.
    pub fn can_advance_to(self, next: TransactionPhase) -> bool {
        use TransactionPhase::*;

        match (self, next) {
            (NotStarted, ApprovalPending) => true,
            (ApprovalPending, ApprovalConfirmed) => true,
            (ApprovalConfirmed, StakePending) => true,
            (StakePending, StakeConfirmed) => true,
            (from, Failed) => !from.is_terminal() && from != NotStarted,
            _ => false,
        }
    }
}

impl std::fmt::Display for TransactionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionPhase::NotStarted => write!(f, "NOT_STARTED"),
            TransactionPhase::ApprovalPending => write!(f, "APPROVAL_PENDING"),
            TransactionPhase::ApprovalConfirmed => write!(f, "APPROVAL_CONFIRMED"),
            TransactionPhase::StakePending => write!(f, "STAKE_PENDING"),
            TransactionPhase::StakeConfirmed => write!(f, "STAKE_CONFIRMED"),
            TransactionPhase::Failed => write!(f, "FAILED"),
        }
    }
}
