use crate::chain::utils::format_token_amount;
use crate::chain::WalletConnector;
use crate::entity::{Deployment, TokenBalance};
use alloy::primitives::Address;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use log::warn;
use std::sync::Arc;

#[async_trait]
pub trait BalanceInteractor: Send + Sync {
    /// Un-staked balance of every token the farm accepts.
    async fn get_wallet_balances(&self) -> Result<(Address, Vec<TokenBalance>)>;
}

pub struct BalanceInteractorImpl {
    connector: Arc<dyn WalletConnector>,
    deployment: Deployment,
}

impl BalanceInteractorImpl {
    pub fn new(connector: Arc<dyn WalletConnector>, deployment: Deployment) -> Self {
        Self {
            connector,
            deployment,
        }
    }
}

#[async_trait]
impl BalanceInteractor for BalanceInteractorImpl {
    async fn get_wallet_balances(&self) -> Result<(Address, Vec<TokenBalance>)> {
        let account = self.connector.account().await?;

        let queries = self.deployment.tokens.iter().map(|token| {
            let connector = self.connector.clone();
            async move {
                match connector.token_balance(token.address, account).await {
                    Ok(raw) => TokenBalance {
                        token: token.clone(),
                        raw_amount: Some(raw),
                        amount: Some(format_token_amount(raw, token.decimals)),
                    },
                    Err(e) => {
                        warn!("Failed to fetch {} balance: {:#}", token.symbol, e);
                        TokenBalance {
                            token: token.clone(),
                            raw_amount: None,
                            amount: None,
                        }
                    }
                }
            }
        });

        let balances = join_all(queries).await;

        Ok((account, balances))
    }
}
