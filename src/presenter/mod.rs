pub mod balance_presenter;
pub mod stake_presenter;
pub mod stake_status;

pub use balance_presenter::{BalancePresenter, BalancePresenterImpl};
pub use stake_presenter::{StakePresenter, StakePresenterImpl};
