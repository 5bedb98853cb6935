use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// An ERC20 token accepted by the farm on a given network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,  // Ticker, e.g. "NEL"
    pub name: String,    // Full token name
    pub address: Address,
    pub decimals: u8,
}
