use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::FarmError;

/// A request to stake `amount` (smallest token unit) of the token at
/// `token_address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRequest {
    pub token_address: Address,
    pub amount: U256,
}

impl StakeRequest {
    pub fn new(token_address: Address, amount: U256) -> Self {
        Self {
            token_address,
            amount,
        }
    }

    /// Build a request from a token address and a positive integer amount
    /// already expressed in the token's smallest unit.
    pub fn parse(token_address: &str, amount: &str) -> Result<Self, FarmError> {
        let token_address = parse_address(token_address)?;

        let amount = amount.trim();
        if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
            return Err(FarmError::InvalidInput(format!(
                "amount must be a positive integer, got '{}'",
                amount
            )));
        }

        let amount = U256::from_str_radix(amount, 10)
            .map_err(|e| FarmError::InvalidInput(format!("amount out of range: {}", e)))?;

        let request = Self::new(token_address, amount);
        request.validate()?;
        Ok(request)
    }

    /// Build a request from a human amount such as `1.5`, expanding it with
    /// the token's `decimals`.
    pub fn from_display_amount(
        token_address: Address,
        amount: &str,
        decimals: u8,
    ) -> Result<Self, FarmError> {
        let parsed = parse_units(amount.trim(), decimals)
            .map_err(|e| FarmError::InvalidInput(format!("invalid amount '{}': {}", amount, e)))?;

        let amount = match parsed {
            ParseUnits::U256(value) => value,
            ParseUnits::I256(_) => {
                return Err(FarmError::InvalidInput(
                    "amount must not be negative".to_string(),
                ))
            }
        };

        let request = Self::new(token_address, amount);
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), FarmError> {
        if self.amount.is_zero() {
            return Err(FarmError::InvalidInput(
                "amount must be greater than zero".to_string(),
            ));
        }
        if self.token_address == Address::ZERO {
            return Err(FarmError::InvalidInput(
                "token address must not be the zero address".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn parse_address(address: &str) -> Result<Address, FarmError> {
    Address::from_str(address.trim())
        .map_err(|_| FarmError::InvalidInput(format!("invalid address '{}'", address)))
}
