use crate::entity::TokenBalance;
use anyhow::Result;
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{Message, ParseMode},
    utils::html::escape,
    Bot,
};

#[async_trait]
pub trait BalanceView: Send + Sync {
    async fn display_loading(&self) -> Result<Option<Message>>;
    async fn display_balances(
        &self,
        account: String,
        network: String,
        token_balances: Vec<TokenBalance>,
        message: Option<Message>,
    ) -> Result<()>;
    async fn display_no_tokens(&self, network: String, message: Option<Message>) -> Result<()>;
    async fn display_error(&self, error_message: String, message: Option<Message>) -> Result<()>;
}

pub struct TelegramBalanceView {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramBalanceView {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    async fn replace_or_send(&self, text: String, message: Option<Message>) -> Result<()> {
        if let Some(msg) = message {
            self.bot
                .edit_message_text(self.chat_id, msg.id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        } else {
            self.bot
                .send_message(self.chat_id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }

        Ok(())
    }
}

pub fn format_balances(account: &str, network: &str, token_balances: &[TokenBalance]) -> String {
    let mut text = format!(
        "<b>Your un-staked balances</b> · {}\n<code>{}</code>\n\n",
        escape(network),
        account
    );

    for balance in token_balances {
        match &balance.amount {
            Some(amount) => text.push_str(&format!(
                "• <b>{}</b> ({}): {}\n",
                escape(&balance.token.symbol),
                escape(&balance.token.name),
                amount
            )),
            None => text.push_str(&format!(
                "• <b>{}</b> ({}): unavailable\n",
                escape(&balance.token.symbol),
                escape(&balance.token.name)
            )),
        }
    }

    text
}

#[async_trait]
impl BalanceView for TelegramBalanceView {
    async fn display_loading(&self) -> Result<Option<Message>> {
        let message = self
            .bot
            .send_message(self.chat_id, "Fetching token balances...")
            .await?;

        Ok(Some(message))
    }

    async fn display_balances(
        &self,
        account: String,
        network: String,
        token_balances: Vec<TokenBalance>,
        message: Option<Message>,
    ) -> Result<()> {
        let text = format_balances(&account, &network, &token_balances);
        self.replace_or_send(text, message).await
    }

    async fn display_no_tokens(&self, network: String, message: Option<Message>) -> Result<()> {
        let text = format!(
            "No farm tokens are configured for <b>{}</b>, so there is nothing to show.",
            escape(&network)
        );
        self.replace_or_send(text, message).await
    }

    async fn display_error(&self, error_message: String, message: Option<Message>) -> Result<()> {
        let text = format!("❌ Error fetching balances: {}", escape(&error_message));
        self.replace_or_send(text, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Token;
    use alloy::primitives::{Address, U256};

    #[test]
    fn lists_each_token() {
        let token = |symbol: &str| Token {
            symbol: symbol.to_string(),
            name: format!("{} token", symbol),
            address: Address::repeat_byte(0x22),
            decimals: 18,
        };
        let balances = vec![
            TokenBalance {
                token: token("NEL"),
                raw_amount: Some(U256::from(1u64)),
                amount: Some("0.000000000000000001".to_string()),
            },
            TokenBalance {
                token: token("DAI"),
                raw_amount: None,
                amount: None,
            },
        ];

        let text = format_balances("0xabc", "rinkeby", &balances);

        assert!(text.contains("rinkeby"));
        assert!(text.contains("<b>NEL</b> (NEL token): 0.000000000000000001"));
        assert!(text.contains("<b>DAI</b> (DAI token): unavailable"));
    }

    #[test]
    fn configured_names_are_escaped() {
        let balances = vec![TokenBalance {
            token: Token {
                symbol: "LP<1>".to_string(),
                name: "Pool & Co".to_string(),
                address: Address::repeat_byte(0x22),
                decimals: 18,
            },
            raw_amount: None,
            amount: None,
        }];

        let text = format_balances("0xabc", "dev & test", &balances);

        assert!(text.contains("dev &amp; test"));
        assert!(text.contains("<b>LP&lt;1&gt;</b> (Pool &amp; Co): unavailable"));
    }
}
