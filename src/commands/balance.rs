use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::CommandHandler;
use crate::di::ServiceContainer;
use crate::interactor::balance_interactor::BalanceInteractorImpl;
use crate::presenter::balance_presenter::{BalancePresenter, BalancePresenterImpl};
use crate::view::balance_view::TelegramBalanceView;

pub struct BalanceCommand;

impl CommandHandler for BalanceCommand {
    fn command_name() -> &'static str {
        "balance"
    }

    fn description() -> &'static str {
        "show your un-staked token balances"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        info!("Balance command received in chat {}", msg.chat.id);

        let deployment = services.deployment();
        let network = deployment.network.clone();

        let interactor = Arc::new(BalanceInteractorImpl::new(services.connector(), deployment));
        let view = Arc::new(TelegramBalanceView::new(bot, msg.chat.id));
        let presenter = BalancePresenterImpl::new(interactor, view, network);

        presenter.show_balances().await
    }
}
