//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `router`: The dptree schema wiring updates to handlers, built once at startup
//! - `command_handlers`: `/start` and `/help`
//! - `message_handler`: Free text and registration answers
//! - `callbacks`: Inline keyboard callback queries (organized into submodules)
//! - `dialogue_manager`: The premium registration dialogue
//! - `ui_builder`: Creates keyboards and formats messages
//! - `outgoing`: Message plans produced by handlers and the sender delivering them

pub mod callbacks;
pub mod command_handlers;
pub mod dialogue_manager;
pub mod message_handler;
pub mod outgoing;
pub mod router;
pub mod ui_builder;

use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;

use crate::dialogue::RegistrationState;
use crate::localization::{t_args_lang, t_lang, LocalizationManager};
use crate::media::MediaLibrary;
use crate::repository::RecipeRepository;

/// Shared dependencies handed to every handler
#[derive(Clone)]
pub struct BotDeps {
    pub repository: Arc<dyn RecipeRepository>,
    pub dialogues: Arc<InMemStorage<RegistrationState>>,
    pub localization: Arc<LocalizationManager>,
    pub media: Arc<MediaLibrary>,
}

impl BotDeps {
    pub fn new(
        repository: Arc<dyn RecipeRepository>,
        localization: Arc<LocalizationManager>,
        media: Arc<MediaLibrary>,
    ) -> Self {
        Self {
            repository,
            dialogues: InMemStorage::new(),
            localization,
            media,
        }
    }

    /// Borrow the dependencies for one update from a user with the given language
    pub fn context<'a>(&'a self, language_code: Option<&'a str>) -> HandlerContext<'a> {
        HandlerContext {
            repository: self.repository.as_ref(),
            media: self.media.as_ref(),
            localization: self.localization.as_ref(),
            language_code,
        }
    }
}

/// Common context for bot handlers containing shared dependencies
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub repository: &'a dyn RecipeRepository,
    pub media: &'a MediaLibrary,
    pub localization: &'a LocalizationManager,
    pub language_code: Option<&'a str>,
}

impl HandlerContext<'_> {
    /// Localized message in the user's language
    pub fn t(&self, key: &str) -> String {
        t_lang(self.localization, key, self.language_code)
    }

    /// Localized message with arguments in the user's language
    pub fn t_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        t_args_lang(self.localization, key, args, self.language_code)
    }
}

pub use callbacks::callback_handler::callback_handler;
pub use callbacks::callback_types::CallbackAction;
pub use command_handlers::Command;
pub use message_handler::message_handler;
pub use outgoing::{send_all, Outgoing};
pub use router::schema;
