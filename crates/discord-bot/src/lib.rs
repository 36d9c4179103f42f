use eyre::Result;
use serenity::{prelude::GatewayIntents, Client};
use sqlx::PgPool;
use tracing::info;

pub mod commands;
pub mod config;
pub mod handlers;
pub mod locks;
pub mod reactions;

/// Gateway events the contest needs: guild membership, submission messages
/// with their attachments, and reactions.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT
}

/// Start the Discord bot with the provided configuration and database connection.
///
/// Registers the event handler and runs until the gateway connection ends or fails.
///
/// # Arguments
///
/// * `config` - The bot configuration: token, application ID and upvote emoji
/// * `db_pool` - A PostgreSQL connection pool holding guilds, periods and submissions
///
/// # Returns
///
/// * `Ok(())` if the bot shut down gracefully
/// * `Err` if the client could not be built or the connection failed
pub async fn start_bot(config: config::BotConfig, db_pool: PgPool) -> Result<()> {
    info!("Starting Discord bot");

    let handler = handlers::Handler::new(config.clone(), db_pool);

    let mut client = Client::builder(&config.token, intents())
        .application_id(config.application_id)
        .event_handler(handler)
        .await?;

    info!("Connecting to Discord...");
    client.start().await?;

    Ok(())
}
