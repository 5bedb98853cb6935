use anyhow::Result;
use std::sync::Arc;
use teloxide::{prelude::*, types::ParseMode, utils::html::escape};

use super::CommandHandler;
use crate::di::ServiceContainer;
use crate::entity::Deployment;

pub struct TokensCommand;

fn format_tokens(deployment: &Deployment) -> String {
    if deployment.tokens.is_empty() {
        return format!("No tokens are accepted on {}.", escape(&deployment.network));
    }

    let mut text = format!(
        "<b>Tokens accepted on {}</b>\n\n",
        escape(&deployment.network)
    );
    for token in &deployment.tokens {
        text.push_str(&format!(
            "• <b>{}</b> · {}\n<code>{}</code>\n",
            escape(&token.symbol),
            escape(&token.name),
            token.address
        ));
    }
    text
}

impl CommandHandler for TokensCommand {
    fn command_name() -> &'static str {
        "tokens"
    }

    fn description() -> &'static str {
        "list the tokens accepted by the farm"
    }

    async fn execute(
        bot: Bot,
        msg: Message,
        _args: String,
        services: Arc<ServiceContainer>,
    ) -> Result<()> {
        bot.send_message(msg.chat.id, format_tokens(&services.deployment()))
            .parse_mode(ParseMode::Html)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Token;
    use alloy::primitives::Address;

    #[test]
    fn lists_tokens_or_says_none() {
        let mut deployment = Deployment::placeholder(1);
        assert!(format_tokens(&deployment).starts_with("No tokens"));

        deployment.network = "rinkeby".to_string();
        deployment.tokens.push(Token {
            symbol: "NEL".to_string(),
            name: "Nellarium".to_string(),
            address: Address::repeat_byte(0x22),
            decimals: 18,
        });
        let text = format_tokens(&deployment);
        assert!(text.contains("<b>NEL</b> · Nellarium"));
    }
}
