//! Discord client setup.

use serenity::prelude::*;
use serenity::Client;

use crate::discord::handler::Handler;

/// Build the Discord client with the intents the bridge needs.
pub async fn build_client(token: &str, handler: Handler) -> anyhow::Result<Client> {
    let intents =
        GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT | GatewayIntents::GUILDS;

    let client = Client::builder(token, intents)
        .event_handler(handler)
        .await?;

    Ok(client)
}
