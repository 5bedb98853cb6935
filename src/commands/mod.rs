use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;

use crate::di::ServiceContainer;

pub mod balance;
pub mod help;
pub mod network;
pub mod stake;
pub mod start;
pub mod status;
pub mod tokens;

/// Trait that defines a command handler
pub trait CommandHandler {
    /// The command name in lowercase
    fn command_name() -> &'static str;

    /// The command description for help
    fn description() -> &'static str;

    /// Execute the command; `args` is the text after the command name
    async fn execute(
        bot: Bot,
        msg: Message,
        args: String,
        services: Arc<ServiceContainer>,
    ) -> Result<()>;
}

/// Register all command handlers in the command system
pub fn register_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            start::StartCommand::command_name(),
            start::StartCommand::description(),
        ),
        (
            network::NetworkCommand::command_name(),
            network::NetworkCommand::description(),
        ),
        (
            tokens::TokensCommand::command_name(),
            tokens::TokensCommand::description(),
        ),
        (
            balance::BalanceCommand::command_name(),
            balance::BalanceCommand::description(),
        ),
        (
            stake::StakeCommand::command_name(),
            stake::StakeCommand::description(),
        ),
        (
            status::StatusCommand::command_name(),
            status::StatusCommand::description(),
        ),
        (
            help::HelpCommand::command_name(),
            help::HelpCommand::description(),
        ),
    ]
}

/// Bot Commands enum for teloxide command filter
#[derive(teloxide::utils::command::BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommands {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "show the connected network and account")]
    Network,
    #[command(description = "list the tokens accepted by the farm")]
    Tokens,
    #[command(description = "show your un-staked token balances")]
    Balance,
    #[command(description = "stake tokens, e.g. /stake 1.5 NEL")]
    Stake(String),
    #[command(description = "show the progress of your last stake")]
    Status,
    #[command(description = "display this help message")]
    Help,
}
