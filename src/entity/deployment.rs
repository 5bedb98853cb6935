use alloy::primitives::Address;

use super::Token;

/// Contracts deployed on one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub chain_id: u64,
    pub network: String,
    pub token_farm: Address,
    pub tokens: Vec<Token>,
}

impl Deployment {
    /// Stand-in for chains with no configuration. Every address is zero,
    /// so no call against it is meaningful.
    pub fn placeholder(chain_id: u64) -> Self {
        Self {
            chain_id,
            network: "dev".to_string(),
            token_farm: Address::ZERO,
            tokens: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.token_farm == Address::ZERO
    }

    /// Find an accepted token by symbol (case-insensitive) or by address.
    pub fn find_token(&self, symbol_or_address: &str) -> Option<&Token> {
        let needle = symbol_or_address.trim();

        self.tokens.iter().find(|token| {
            token.symbol.eq_ignore_ascii_case(needle)
                || token.address.to_string().eq_ignore_ascii_case(needle)
        })
    }
}
