use crate::interactor::balance_interactor::BalanceInteractor;
use crate::view::balance_view::BalanceView;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait BalancePresenter: Send + Sync {
    async fn show_balances(&self) -> Result<()>;
}

pub struct BalancePresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
    network: String,
}

impl<I, V> BalancePresenterImpl<I, V>
where
    I: BalanceInteractor,
    V: BalanceView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>, network: String) -> Self {
        Self {
            interactor,
            view,
            network,
        }
    }
}

#[async_trait]
impl<I, V> BalancePresenter for BalancePresenterImpl<I, V>
where
    I: BalanceInteractor + Send + Sync,
    V: BalanceView + Send + Sync,
{
    async fn show_balances(&self) -> Result<()> {
        let message = self.view.display_loading().await?;

        match self.interactor.get_wallet_balances().await {
            Ok((_, token_balances)) if token_balances.is_empty() => {
                self.view
                    .display_no_tokens(self.network.clone(), message)
                    .await?;
            }
            Ok((account, token_balances)) => {
                self.view
                    .display_balances(
                        account.to_string(),
                        self.network.clone(),
                        token_balances,
                        message,
                    )
                    .await?;
            }
            Err(e) => {
                self.view.display_error(format!("{:#}", e), message).await?;
            }
        }

        Ok(())
    }
}
