pub mod balance_view;
pub mod stake_view;

pub use balance_view::{BalanceView, TelegramBalanceView};
pub use stake_view::{StakeView, TelegramStakeView};
