use async_trait::async_trait;
use std::sync::Arc;
use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::commands::{self, BotCommands, CommandHandler};
use crate::di::ServiceContainer;

// Base router trait
#[async_trait]
pub trait Router: Send + Sync {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error>;
}

// Command router implementation
pub struct TelegramRouter {
    services: Arc<ServiceContainer>,
}

impl TelegramRouter {
    pub fn new(services: Arc<ServiceContainer>) -> Self {
        Self { services }
    }
}

async fn reply_with_hint(bot: Bot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(
        msg.chat.id,
        "I only understand commands. Try /stake 1.5 NEL or see /help.",
    )
    .await?;
    Ok(())
}

#[async_trait]
impl Router for TelegramRouter {
    fn setup_handlers(&self) -> UpdateHandler<anyhow::Error> {
        use dptree::case;

        let services = self.services.clone();

        let command_handler = teloxide::filter_command::<BotCommands, _>()
            .branch(case![BotCommands::Start].endpoint({
                let services = services.clone();
                move |bot: Bot, msg: Message| {
                    let services = services.clone();
                    async move {
                        commands::start::StartCommand::execute(bot, msg, String::new(), services)
                            .await
                    }
                }
            }))
            .branch(case![BotCommands::Help].endpoint({
                let services = services.clone();
                move |bot: Bot, msg: Message| {
                    let services = services.clone();
                    async move {
                        commands::help::HelpCommand::execute(bot, msg, String::new(), services)
                            .await
                    }
                }
            }))
            .branch(case![BotCommands::Network].endpoint({
                let services = services.clone();
                move |bot: Bot, msg: Message| {
                    let services = services.clone();
                    async move {
                        commands::network::NetworkCommand::execute(
                            bot,
                            msg,
                            String::new(),
                            services,
                        )
                        .await
                    }
                }
            }))
            .branch(case![BotCommands::Tokens].endpoint({
                let services = services.clone();
                move |bot: Bot, msg: Message| {
                    let services = services.clone();
                    async move {
                        commands::tokens::TokensCommand::execute(bot, msg, String::new(), services)
                            .await
                    }
                }
            }))
            .branch(case![BotCommands::Balance].endpoint({
                let services = services.clone();
                move |bot: Bot, msg: Message| {
                    let services = services.clone();
                    async move {
                        commands::balance::BalanceCommand::execute(
                            bot,
                            msg,
                            String::new(),
                            services,
                        )
                        .await
                    }
                }
            }))
            .branch(case![BotCommands::Stake(args)].endpoint({
                let services = services.clone();
                move |bot: Bot, msg: Message, args: String| {
                    let services = services.clone();
                    async move {
                        commands::stake::StakeCommand::execute(bot, msg, args, services).await
                    }
                }
            }))
            .branch(case![BotCommands::Status].endpoint({
                let services = services.clone();
                move |bot: Bot, msg: Message| {
                    let services = services.clone();
                    async move {
                        commands::status::StatusCommand::execute(
                            bot,
                            msg,
                            String::new(),
                            services,
                        )
                        .await
                    }
                }
            }));

        Update::filter_message()
            .branch(command_handler)
            .branch(dptree::endpoint(reply_with_hint))
    }
}
