use anyhow::Result;
use log::warn;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode, utils::html::escape};

use super::CommandHandler;
use crate::di::ServiceContainer;

pub struct NetworkCommand;

impl CommandHandler for NetworkCommand {
    fn command_name() -> &'static str {
        "network"
    }

    fn description() -> &'static str {
        "show the connected network and account"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        let deployment = services.deployment();

        let account = match services.connector().account().await {
            Ok(account) => format!("<code>{}</code>", account),
            Err(e) => {
                warn!("Failed to resolve the active account: {:#}", e);
                "unavailable".to_string()
            }
        };

        let farm = if deployment.is_placeholder() {
            "not deployed on this network".to_string()
        } else {
            format!("<code>{}</code>", deployment.token_farm)
        };

        bot.send_message(
            msg.chat.id,
            format!(
                "<b>Network:</b> {} (chain {})\n<b>Account:</b> {}\n<b>TokenFarm:</b> {}",
                escape(&deployment.network),
                deployment.chain_id,
                account,
                farm
            ),
        )
        .parse_mode(ParseMode::Html)
        .await?;

        Ok(())
    }
}
