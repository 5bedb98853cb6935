use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;

use super::CommandHandler;
use crate::di::ServiceContainer;
use crate::presenter::stake_presenter::{StakePresenter, StakePresenterImpl};
use crate::view::stake_view::TelegramStakeView;

pub struct StakeCommand;

impl CommandHandler for StakeCommand {
    fn command_name() -> &'static str {
        "stake"
    }

    fn description() -> &'static str {
        "stake tokens, e.g. /stake 1.5 NEL"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;
        info!("Stake command '{}' received in chat {}", args, chat_id);

        let interactor = services.orchestrator(chat_id.0);
        let view = Arc::new(TelegramStakeView::new(bot, chat_id));
        let presenter = StakePresenterImpl::new(interactor, view, services.deployment());

        presenter.stake(&args).await
    }
}
