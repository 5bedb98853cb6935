use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::chain::contracts::{balance_of_calldata, IERC20};

/// Access to the connected chain and the user's account.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;
    async fn account(&self) -> Result<Address>;
    async fn token_balance(&self, token: Address, account: Address) -> Result<U256>;
}

pub struct JsonRpcConnector {
    provider: DynProvider,
    account: Option<Address>,
}

impl JsonRpcConnector {
    /// `account` pins the account to use; otherwise the node's first
    /// account is taken.
    pub fn new(provider: DynProvider, account: Option<Address>) -> Self {
        Self { provider, account }
    }
}

#[async_trait]
impl WalletConnector for JsonRpcConnector {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("Failed to query chain id")
    }

    async fn account(&self) -> Result<Address> {
        if let Some(account) = self.account {
            return Ok(account);
        }

        let accounts = self
            .provider
            .get_accounts()
            .await
            .context("Failed to list node accounts")?;

        accounts
            .first()
            .copied()
            .ok_or_else(|| anyhow!("The node exposes no accounts"))
    }

    async fn token_balance(&self, token: Address, account: Address) -> Result<U256> {
        let request = TransactionRequest::default()
            .to(token)
            .input(balance_of_calldata(account).into());

        let raw = self
            .provider
            .call(request)
            .await
            .with_context(|| format!("balanceOf({}) on {} failed", account, token))?;

        IERC20::balanceOfCall::abi_decode_returns(&raw)
            .with_context(|| format!("Token {} returned no balance", token))
    }
}
