use anyhow::Result;
use log::info;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode, utils::html::escape};

use super::CommandHandler;
use crate::di::ServiceContainer;

pub struct StartCommand;

impl CommandHandler for StartCommand {
    fn command_name() -> &'static str {
        "start"
    }

    fn description() -> &'static str {
        "start the bot"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let telegram_id = msg.from.as_ref().map_or(0, |user| user.id.0 as i64);
        info!("Start command received from Telegram ID: {}", telegram_id);

        let deployment = services.deployment();
        let body = if deployment.is_placeholder() {
            format!(
                "The connected network (chain {}) has no TokenFarm deployment yet, so staking is unavailable.",
                deployment.chain_id
            )
        } else {
            format!(
                "Connected to <b>{}</b>. Stake any of {} accepted token(s) with /stake, \
                 check your balances with /balance.",
                escape(&deployment.network),
                deployment.tokens.len()
            )
        };

        bot.send_message(
            msg.chat.id,
            format!("<b>Welcome to the Token Farm!</b>\n\n{}\n\nSee /help for all commands.", body),
        )
        .parse_mode(ParseMode::Html)
        .await?;

        Ok(())
    }
}
