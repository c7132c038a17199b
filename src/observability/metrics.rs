//! Metrics collection and Prometheus export module.
//!
//! This module provides:
//! - Prometheus recorder setup
//! - The HTTP server behind `/health`, `/health/ready` and `/metrics`
//! - Metrics recording functions for the bot flows

use anyhow::Result;
use hyper::server::conn::http1;
use hyper::{Method, Response, StatusCode};
use hyper_util::rt::TokioIo;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::PgPool;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

use crate::config::ServerConfig;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Initialize metrics collection with Prometheus exporter
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    tracing::info!("Metrics collection initialized");
    Ok(handle)
}

/// Build the response for one health server request
///
/// Kept apart from the connection loop so routing can be exercised without a socket.
pub async fn route_health_request(
    method: &Method,
    path: &str,
    metrics_handle: &PrometheusHandle,
    db_pool: Option<Arc<PgPool>>,
) -> Response<String> {
    match (method, path) {
        (&Method::GET, "/health") => {
            let body = serde_json::json!({
                "status": "ok",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            })
            .to_string();
            with_content_type(Response::new(body), "application/json")
        }
        (&Method::GET, "/health/ready") => {
            let check_start = Instant::now();
            let result = super::health_checks::perform_readiness_checks(db_pool).await;
            record_health_check_metrics("readiness", result.is_ok(), check_start.elapsed());

            match result {
                Ok(()) => Response::new("OK".to_string()),
                Err(e) => {
                    let mut response = Response::new(format!("NOT READY: {}", e));
                    *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
                    response
                }
            }
        }
        (&Method::GET, "/metrics") => {
            with_content_type(Response::new(metrics_handle.render()), PROMETHEUS_CONTENT_TYPE)
        }
        _ => {
            let mut response = Response::new("Not Found".to_string());
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    }
}

fn with_content_type(mut response: Response<String>, content_type: &'static str) -> Response<String> {
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static(content_type),
    );
    response
}

/// Start the health and metrics server in a background task
pub async fn start_health_server(
    metrics_handle: PrometheusHandle,
    config: &ServerConfig,
    db_pool: Option<Arc<PgPool>>,
) -> Result<()> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.health_port);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Health server listening on {}", addr);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let metrics_handle = metrics_handle.clone();
                    let db_pool = db_pool.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = hyper::service::service_fn(
                            move |req: hyper::Request<hyper::body::Incoming>| {
                                let metrics_handle = metrics_handle.clone();
                                let db_pool = db_pool.clone();
                                async move {
                                    let start = Instant::now();
                                    let response = route_health_request(
                                        req.method(),
                                        req.uri().path(),
                                        &metrics_handle,
                                        db_pool,
                                    )
                                    .await;
                                    record_request_metrics(
                                        req.method().as_str(),
                                        response.status().as_u16(),
                                        start.elapsed(),
                                    );
                                    Ok::<_, std::convert::Infallible>(response)
                                }
                            },
                        );

                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await
                        {
                            crate::errors::error_logging::log_network_error(
                                &err,
                                "serve_http_connection",
                                Some(&format!("{}:{}", peer_addr.ip(), peer_addr.port())),
                                None,
                            );
                        }
                    });
                }
                Err(e) => {
                    crate::errors::error_logging::log_network_error(
                        &e,
                        "accept_tcp_connection",
                        Some(&addr.to_string()),
                        None,
                    );
                }
            }
        }
    });

    Ok(())
}

/// Record database operation metrics
pub fn record_db_metrics(operation: &str, duration: std::time::Duration) {
    let operation = operation.to_string();
    metrics::counter!("db_operations_total", "operation" => operation).increment(1);
    metrics::histogram!("db_operation_duration_seconds").record(duration.as_secs_f64());
}

/// Record request metrics
pub fn record_request_metrics(method: &str, status: u16, duration: std::time::Duration) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("requests_total", "method" => method, "status" => status).increment(1);
    metrics::histogram!("request_duration_seconds").record(duration.as_secs_f64());
}

/// Record health check metrics
pub fn record_health_check_metrics(check_type: &str, success: bool, duration: std::time::Duration) {
    let check_type = check_type.to_string();
    metrics::counter!("health_checks_total", "type" => check_type.clone(), "result" => if success { "success" } else { "failure" }.to_string()).increment(1);
    metrics::histogram!("health_check_duration_seconds", "type" => check_type.clone())
        .record(duration.as_secs_f64());

    metrics::gauge!("health_check_status", "type" => check_type).set(if success {
        1.0
    } else {
        0.0
    });
}

/// Record error rate metrics
pub fn record_error_metrics(error_type: &str, component: &str) {
    let error_type = error_type.to_string();
    let component = component.to_string();
    metrics::counter!("errors_total", "type" => error_type, "component" => component).increment(1);
}

/// Record application startup metrics
pub fn record_startup_metrics(duration: std::time::Duration) {
    metrics::histogram!("application_startup_duration_seconds").record(duration.as_secs_f64());
    metrics::counter!("application_starts_total").increment(1);
}

/// Record Telegram message metrics
pub fn record_telegram_message(message_type: &str) {
    let message_type = message_type.to_string();
    metrics::counter!("telegram_messages_total", "type" => message_type).increment(1);
}

/// Record a pressed inline button
pub fn record_callback_action(action: &str) {
    let action = action.to_string();
    metrics::counter!("telegram_callbacks_total", "action" => action).increment(1);
}

/// Record the outcome of a finished registration dialogue
pub fn record_registration(result: &str) {
    let result = result.to_string();
    metrics::counter!("registrations_total", "result" => result).increment(1);
}

/// Record a recipe sent to a chat, `flow` is `random` or `category`
pub fn record_recipe_delivery(flow: &str, message_count: usize) {
    let flow = flow.to_string();
    metrics::counter!("recipes_delivered_total", "flow" => flow.clone()).increment(1);
    metrics::histogram!("recipe_delivery_messages", "flow" => flow).record(message_count as f64);
}

/// Record user engagement metrics
pub fn record_user_engagement_metrics(
    telegram_id: i64,
    action: UserAction,
    language_code: Option<&str>,
) {
    let action_str = action.as_str();
    metrics::counter!("user_actions_total", "action" => action_str.to_string()).increment(1);

    if let Some(lang) = language_code {
        metrics::counter!("user_language_usage_total", "language" => lang.to_string()).increment(1);
    }

    tracing::debug!(
        telegram_id = %telegram_id,
        action = %action_str,
        language_code = ?language_code,
        "User engagement recorded"
    );
}

/// User action enumeration for engagement tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// User sent /start command
    StartCommand,
    /// User sent /help command
    HelpCommand,
    /// User asked for a random recipe
    RandomRecipe,
    /// User opened the premium registration
    PremiumStart,
    /// User browsed a category
    CategoryBrowse,
}

impl UserAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::StartCommand => "start_command",
            UserAction::HelpCommand => "help_command",
            UserAction::RandomRecipe => "random_recipe",
            UserAction::PremiumStart => "premium_start",
            UserAction::CategoryBrowse => "category_browse",
        }
    }
}
