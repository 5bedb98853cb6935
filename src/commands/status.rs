use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;

use super::CommandHandler;
use crate::di::ServiceContainer;
use crate::presenter::stake_presenter::{StakePresenter, StakePresenterImpl};
use crate::view::stake_view::TelegramStakeView;

pub struct StatusCommand;

impl CommandHandler for StatusCommand {
    fn command_name() -> &'static str {
        "status"
    }

    fn description() -> &'static str {
        "show the progress of your last stake"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let chat_id = msg.chat.id;

        let interactor = services.orchestrator(chat_id.0);
        let view = Arc::new(TelegramStakeView::new(bot, chat_id));
        let presenter = StakePresenterImpl::new(interactor, view, services.deployment());

        presenter.show_status().await
    }
}
