use anyhow::{Context, Result};
use recipe_of_the_day::bot::{self, BotDeps, Command};
use recipe_of_the_day::config::AppConfig;
use recipe_of_the_day::db;
use recipe_of_the_day::errors::error_logging;
use recipe_of_the_day::localization;
use recipe_of_the_day::media::MediaLibrary;
use recipe_of_the_day::observability;
use recipe_of_the_day::repository::PgRepository;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::utils::command::BotCommands;
use tracing::info;

/// Load and validate configuration from the environment
fn load_config() -> Result<AppConfig> {
    let config = AppConfig::from_env().map_err(|e| {
        error_logging::log_config_error(&e, "environment", "load_config");
        anyhow::anyhow!("{}", e)
    })?;

    config.validate().map_err(|e| {
        error_logging::log_config_error(&e, "environment", "validate_config");
        anyhow::anyhow!("{}", e)
    })?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let config = load_config()?;

    // Logging first so everything below is traced
    let metrics_handle = observability::init_observability(&config)?;
    info!(config = %config.summary(), "Configuration loaded");

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to the database")?;

    // Initialize database schema
    db::init_database_schema(&pool).await?;

    // Wrap pool in Arc for sharing across async tasks
    let shared_pool = Arc::new(pool);

    observability::start_observability_server(
        metrics_handle,
        &config.server,
        Arc::clone(&shared_pool),
    )
    .await?;

    let localization_manager =
        localization::create_localization_manager(&config.media.default_language)?;
    let media = Arc::new(MediaLibrary::new(config.media.media_root.clone()));
    let repository = Arc::new(PgRepository::new(Arc::clone(&shared_pool)));
    let deps = BotDeps::new(repository, localization_manager, media);

    // Initialize the bot with custom client configuration for better reliability
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.bot.http_timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let bot = Bot::with_client(config.bot.token.clone(), client);

    let me = bot.get_me().await?;
    info!(username = ?me.username, "Bot authenticated");

    bot.set_my_commands(Command::bot_commands()).await?;

    let mut dispatcher = Dispatcher::builder(bot.clone(), bot::schema(deps))
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    match &config.bot.webhook_url {
        Some(webhook_url) => {
            let url = reqwest::Url::parse(webhook_url).context("WEBHOOK_URL is not a valid URL")?;
            let addr = SocketAddr::from(([0, 0, 0, 0], config.bot.webhook_port));
            info!(%addr, url = %url, "Starting dispatcher with webhook");

            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            info!("Starting dispatcher with long polling");
            dispatcher.dispatch().await;
        }
    }

    info!("Dispatcher shut down");
    Ok(())
}
