use alloy::primitives::U256;

use super::Token;

#[derive(Debug, Clone)]
pub struct TokenBalance {
    pub token: Token,
    pub raw_amount: Option<U256>,
    pub amount: Option<String>, // Formatted with the token's decimals, None if the query failed
}
