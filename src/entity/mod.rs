mod deployment;
mod farm_error;
mod orchestration_state;
mod phase;
mod stake_request;
mod token;
mod token_balance;

pub use deployment::Deployment;
pub use farm_error::FarmError;
pub use orchestration_state::OrchestrationState;
pub use phase::TransactionPhase;
pub use stake_request::{parse_address, StakeRequest};
pub use token::Token;
pub use token_balance::TokenBalance;
