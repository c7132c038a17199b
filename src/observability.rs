//! Observability module for centralized metrics, tracing, and logging setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection and Prometheus export
//! - Health check endpoints for monitoring

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use crate::config::{AppConfig, ServerConfig};

pub mod health_checks;
pub mod metrics;
pub mod tracing_mod;

pub use health_checks::{check_database_health, perform_readiness_checks};
pub use metrics::{
    init_metrics, record_callback_action, record_db_metrics, record_error_metrics,
    record_recipe_delivery, record_registration, record_request_metrics,
    record_telegram_message, record_user_engagement_metrics, route_health_request,
    start_health_server, UserAction,
};
pub use tracing_mod::{db_span, init_tracing_with_config, telegram_span};

/// Initialize logging and the Prometheus recorder
pub fn init_observability(config: &AppConfig) -> Result<PrometheusHandle> {
    let start = Instant::now();

    init_tracing_with_config(&config.logging)?;
    let handle = init_metrics()?;

    metrics::record_startup_metrics(start.elapsed());
    tracing::info!(
        environment = %config.logging.environment,
        "Observability initialized"
    );
    Ok(handle)
}

/// Serve health and metrics endpoints, recording database health every minute
pub async fn start_observability_server(
    handle: PrometheusHandle,
    config: &ServerConfig,
    db_pool: Arc<PgPool>,
) -> Result<()> {
    start_health_server(handle, config, Some(db_pool.clone())).await?;
    health_checks::start_health_metrics_recorder(db_pool);
    Ok(())
}
