//! # Recipe of the Day Telegram Bot
//!
//! A Telegram bot that sends a random recipe of the day, registers premium
//! users and lets them browse recipes by category, backed by PostgreSQL.

pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod media;
pub mod observability;
pub mod repository;
pub mod units;

// Re-export types for easier access
pub use dialogue::{RegistrationDialogue, RegistrationState};
pub use errors::{AppError, AppResult};
pub use repository::{PgRepository, RecipeRepository};
