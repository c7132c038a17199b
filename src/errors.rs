//! # Application Error Types
//!
//! This module defines common error types used throughout the recipe bot.
//! Not-found conditions are modelled as `Option` by the repository and never
//! reach this type; what ends up here is a real failure scoped to one update.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Database operation errors
    Database(String),
    /// Uniqueness violations (email already registered, profile linked elsewhere)
    Conflict(String),
    /// A record that must exist is missing
    NotFound(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Database(msg) => write!(f, "[DATABASE] {}", msg),
            AppError::Conflict(msg) => write!(f, "[CONFLICT] {}", msg),
            AppError::NotFound(msg) => write!(f, "[NOT_FOUND] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Database(_) => "database",
            AppError::Conflict(_) => "conflict",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Conflict(db_err.message().to_string());
            }
        }
        AppError::Database(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::{error, warn};

    /// Log database operation errors with the chat they were made for
    pub fn log_database_error(
        error: &impl std::fmt::Display,
        operation: &str,
        telegram_id: Option<i64>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            telegram_id = ?telegram_id,
            "Database operation failed"
        );
    }

    /// Log registration failures with the collected (non-secret) context
    pub fn log_registration_error(
        error: &impl std::fmt::Display,
        telegram_id: i64,
        email: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = "create_profile",
            telegram_id = %telegram_id,
            email = ?email,
            "Registration failed"
        );
    }

    /// Log network/communication errors with connection context
    pub fn log_network_error(
        error: &impl std::fmt::Display,
        operation: &str,
        endpoint: Option<&str>,
        attempt_count: Option<u32>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            endpoint = ?endpoint,
            attempt_count = ?attempt_count,
            "Network operation failed"
        );
    }

    /// Log missing media; rendering degrades to text so this is only a warning
    pub fn log_missing_media(path: &str, recipe_id: Option<i64>, step_id: Option<i64>) {
        warn!(
            path = %path,
            recipe_id = ?recipe_id,
            step_id = ?step_id,
            "Media file missing, falling back to text"
        );
    }

    /// Log internal application errors with component context
    pub fn log_internal_error(
        error: &impl std::fmt::Display,
        component: &str,
        operation: &str,
        telegram_id: Option<i64>,
    ) {
        error!(
            error = %error,
            component = %component,
            operation = %operation,
            telegram_id = ?telegram_id,
            "Internal application error"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(
        error: &impl std::fmt::Display,
        config_key: &str,
        operation: &str,
    ) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
