//! Health check functionality module.
//!
//! This module provides:
//! - Database connectivity checks
//! - Readiness checks used by the `/health/ready` endpoint
//! - A background task recording health metrics

use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;

/// Perform readiness checks against every configured dependency
pub async fn perform_readiness_checks(db_pool: Option<Arc<PgPool>>) -> Result<()> {
    if let Some(pool) = &db_pool {
        check_database_health(pool.as_ref()).await?;
    }
    Ok(())
}

/// Check database connectivity and basic query capability
pub async fn check_database_health(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Database health check failed: {}", e))?;

    tracing::debug!("Database health check passed");
    Ok(())
}

/// Start a background task to periodically record health check metrics
pub fn start_health_metrics_recorder(db_pool: Arc<PgPool>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));

        loop {
            interval.tick().await;

            let check_start = std::time::Instant::now();
            let db_healthy = check_database_health(db_pool.as_ref()).await.is_ok();
            super::metrics::record_health_check_metrics(
                "database",
                db_healthy,
                check_start.elapsed(),
            );
        }
    })
}
