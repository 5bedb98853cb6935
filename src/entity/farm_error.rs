/// Errors surfaced by the staking flow.
///
/// Every variant is terminal for the request it belongs to; nothing is
/// retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FarmError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transaction rejected by the wallet: {0}")]
    CallRejected(String),

    #[error("Transaction reverted: {0}")]
    CallReverted(String),

    #[error("No TokenFarm deployment configured for chain {0}")]
    ConfigurationMissing(u64),

    #[error("RPC error: {0}")]
    Rpc(String),
}
