//! Tracing and logging setup module.
//!
//! This module provides:
//! - Structured logging configuration
//! - Tracing span creation utilities

use anyhow::Result;
use tracing_subscriber::prelude::*;

use crate::config::LoggingConfig;

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("recipe_of_the_day={}", config.log_level.to_lowercase()).parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("teloxide=warn".parse()?);

    // Pretty for development, JSON for everything else
    if config.use_pretty_format() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Create a span for database operations
pub fn db_span(operation: &str, table: &str) -> tracing::Span {
    tracing::info_span!(
        "db_operation",
        operation = operation,
        table = table,
        component = "database"
    )
}

/// Create a span for Telegram bot operations
pub fn telegram_span(operation: &str, telegram_id: Option<i64>) -> tracing::Span {
    tracing::info_span!(
        "telegram_operation",
        operation = operation,
        telegram_id = telegram_id,
        component = "telegram"
    )
}
