pub mod balance_interactor;
pub mod stake_interactor;

pub use balance_interactor::{BalanceInteractor, BalanceInteractorImpl};
pub use stake_interactor::{StakeInteractor, StakeOrchestrator};
