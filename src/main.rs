//! Token Farm Bot for Telegram - Main executable
//!
//! Entry point for the Telegram bot that lets a chat stake ERC20 tokens
//! into a TokenFarm contract through an Ethereum JSON-RPC node.
use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use std::sync::Arc;
use teloxide::{prelude::*, types::BotCommand};
use token_farm_bot::commands::register_commands;
use token_farm_bot::{AppConfig, Router, ServiceContainer, TelegramRouter};

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging with default level of "info"
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!("Starting Token Farm Telegram Bot v{}", token_farm_bot::VERSION);

    let bot_token = env::var("TELEGRAM_BOT_TOKEN")
        .context("TELEGRAM_BOT_TOKEN must be set in environment variables")?;

    let config = AppConfig::load().context("Failed to load configuration")?;

    info!("Connecting to Ethereum node at {}...", config.rpc_url);
    let services = Arc::new(
        ServiceContainer::connect(&config)
            .await
            .context("Failed to initialize services")?,
    );

    let bot = Bot::new(bot_token);

    let commands: Vec<BotCommand> = register_commands()
        .into_iter()
        .map(|(name, description)| BotCommand::new(name, description))
        .collect();
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("Failed to register the command menu: {}", e);
    }

    let router = TelegramRouter::new(services.clone());
    let handler = router.setup_handlers();

    // Build dispatcher with dependency injections and control-C handling
    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![services])
        .enable_ctrlc_handler()
        .build();

    info!("Bot is running! Press Ctrl+C to stop.");
    dispatcher.dispatch().await;

    Ok(())
}
