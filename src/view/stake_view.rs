use crate::chain::utils::{format_token_amount, shorten_address};
use crate::entity::{OrchestrationState, Token, TransactionPhase};
use crate::presenter::stake_status::{Notification, StatusFlags, UiStatus};
use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use teloxide::{
    prelude::*,
    types::{MessageId, ParseMode},
    utils::html::escape,
    Bot,
};
use tokio::sync::Mutex;

#[async_trait]
pub trait StakeView: Send + Sync {
    async fn display_usage(&self) -> Result<()>;
    async fn display_unsupported_network(&self, chain_id: u64) -> Result<()>;
    async fn display_unknown_token(&self, symbol: &str, available: &[Token]) -> Result<()>;
    async fn display_invalid_amount(&self, error_message: String) -> Result<()>;
    async fn display_error(&self, error_message: String) -> Result<()>;

    /// Shows the live progress of the request; repeated calls update the
    /// same message.
    async fn display_progress(
        &self,
        token: &Token,
        state: &OrchestrationState,
        flags: StatusFlags,
    ) -> Result<()>;
    async fn display_notification(&self, token: &Token, notification: &Notification)
        -> Result<()>;
    async fn display_superseded(&self) -> Result<()>;

    async fn display_status(
        &self,
        token: &Token,
        state: &OrchestrationState,
        flags: StatusFlags,
    ) -> Result<()>;
    async fn display_no_request(&self) -> Result<()>;
}

pub struct TelegramStakeView {
    bot: Bot,
    chat_id: ChatId,
    progress_message: Mutex<Option<MessageId>>,
}

impl TelegramStakeView {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            progress_message: Mutex::new(None),
        }
    }

    async fn send_html(&self, text: String) -> Result<Message> {
        let message = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(message)
    }
}

fn step_line(label: &str, done: bool, active: bool, failed: bool, tx: Option<String>) -> String {
    let marker = if done {
        "✅"
    } else if failed {
        "❌"
    } else if active {
        "⏳"
    } else {
        "▫️"
    };

    match tx {
        Some(tx) => format!("{} {} <code>{}</code>", marker, label, tx),
        None => format!("{} {}", marker, label),
    }
}

/// Body shared by the progress message and `/status`.
pub fn format_progress(token: &Token, state: &OrchestrationState, flags: StatusFlags) -> String {
    let amount = state
        .pending_amount
        .map(|amount| format_token_amount(amount, token.decimals))
        .unwrap_or_else(|| "?".to_string());

    let approved = state.approval_tx.is_some();
    let staked = state.phase == TransactionPhase::StakeConfirmed;
    let failed = flags.show_failure;

    let approve_line = step_line(
        "Approve ERC20 transfer",
        approved,
        state.phase == TransactionPhase::ApprovalPending,
        failed && !approved,
        state.approval_tx.map(|tx| shorten_address(&tx.to_string())),
    );
    let stake_line = step_line(
        "Stake tokens",
        staked,
        matches!(
            state.phase,
            TransactionPhase::ApprovalConfirmed | TransactionPhase::StakePending
        ),
        failed && approved,
        state.stake_tx.map(|tx| shorten_address(&tx.to_string())),
    );

    let status = match flags.status {
        UiStatus::Idle => "Idle".to_string(),
        UiStatus::AwaitingConfirmation => "Approved, confirm the stake in your wallet".to_string(),
        UiStatus::Mining => "Mining...".to_string(),
        UiStatus::Success => "Tokens staked!".to_string(),
        UiStatus::Failed => format!(
            "Failed: {}",
            escape(state.failure.as_deref().unwrap_or("Unknown error"))
        ),
    };

    format!(
        "<b>Staking {} {}</b>\n\n{}\n{}\n\n<b>Status:</b> {}",
        amount,
        escape(&token.symbol),
        approve_line,
        stake_line,
        status
    )
}

#[async_trait]
impl StakeView for TelegramStakeView {
    async fn display_usage(&self) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                "Usage: /stake <amount> <token>\nExample: /stake 1.5 NEL",
            )
            .await?;
        Ok(())
    }

    async fn display_unsupported_network(&self, chain_id: u64) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "The connected network (chain {}) has no TokenFarm deployment. Staking is unavailable.",
                    chain_id
                ),
            )
            .await?;
        Ok(())
    }

    async fn display_unknown_token(&self, symbol: &str, available: &[Token]) -> Result<()> {
        let symbols = available
            .iter()
            .map(|token| token.symbol.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        self.bot
            .send_message(
                self.chat_id,
                format!(
                    "Token '{}' is not accepted by the farm. Available tokens: {}",
                    symbol, symbols
                ),
            )
            .await?;
        Ok(())
    }

    async fn display_invalid_amount(&self, error_message: String) -> Result<()> {
        self.bot
            .send_message(self.chat_id, format!("Invalid amount: {}", error_message))
            .await?;
        Ok(())
    }

    async fn display_error(&self, error_message: String) -> Result<()> {
        self.bot
            .send_message(self.chat_id, format!("❌ {}", error_message))
            .await?;
        Ok(())
    }

    async fn display_progress(
        &self,
        token: &Token,
        state: &OrchestrationState,
        flags: StatusFlags,
    ) -> Result<()> {
        let text = format_progress(token, state, flags);
        let mut progress_message = self.progress_message.lock().await;

        if let Some(message_id) = *progress_message {
            if let Err(e) = self
                .bot
                .edit_message_text(self.chat_id, message_id, text)
                .parse_mode(ParseMode::Html)
                .await
            {
                warn!("Failed to update stake progress message: {}", e);
            }
        } else {
            let message = self.send_html(text).await?;
            *progress_message = Some(message.id);
        }

        Ok(())
    }

    async fn display_notification(
        &self,
        token: &Token,
        notification: &Notification,
    ) -> Result<()> {
        let text = match notification {
            Notification::ApprovalSucceeded => format!(
                "✅ {} transfer approved! Now confirm the stake transaction.",
                token.symbol
            ),
            Notification::StakeSucceeded => format!("🎉 {} tokens staked!", token.symbol),
            Notification::Failed(reason) => format!("❌ Staking {} failed: {}", token.symbol, reason),
        };

        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn display_superseded(&self) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                "A newer stake request replaced this one; its progress is no longer tracked.",
            )
            .await?;
        Ok(())
    }

    async fn display_status(
        &self,
        token: &Token,
        state: &OrchestrationState,
        flags: StatusFlags,
    ) -> Result<()> {
        let text = format!(
            "{}\n\n<i>Last update: {}</i>",
            format_progress(token, state, flags),
            state.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        self.send_html(text).await?;
        Ok(())
    }

    async fn display_no_request(&self) -> Result<()> {
        self.bot
            .send_message(
                self.chat_id,
                "No stake request yet. Use /stake <amount> <token> to start one.",
            )
            .await?;
        Ok(())
    }
}
