//! Outgoing message plans and their delivery.
//!
//! Handlers decide *what* to send as an ordered `Vec<Outgoing>`; [`send_all`]
//! performs the Telegram calls in that order.

use std::path::PathBuf;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile};
use teloxide::RequestError;
use tracing::{debug, warn};

use super::HandlerContext;
use crate::errors::error_logging;
use crate::observability;

/// Telegram rejects photo captions longer than this many characters
pub const CAPTION_LIMIT: usize = 1024;

/// One message the bot is about to send
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Text {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Photo {
        path: PathBuf,
        caption: Option<String>,
    },
}

impl Outgoing {
    pub fn text(text: impl Into<String>) -> Self {
        Outgoing::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn text_with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Outgoing::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    /// Photo with a caption, split into a bare photo plus a text message
    /// when the caption exceeds [`CAPTION_LIMIT`]
    pub fn photo_with_caption(path: PathBuf, caption: impl Into<String>) -> Vec<Self> {
        let caption = caption.into();
        if caption.chars().count() > CAPTION_LIMIT {
            vec![
                Outgoing::Photo {
                    path,
                    caption: None,
                },
                Outgoing::text(caption),
            ]
        } else {
            vec![Outgoing::Photo {
                path,
                caption: Some(caption),
            }]
        }
    }

    pub fn is_photo(&self) -> bool {
        matches!(self, Outgoing::Photo { .. })
    }

    /// Visible text of the message, the caption for photos
    pub fn body(&self) -> Option<&str> {
        match self {
            Outgoing::Text { text, .. } => Some(text),
            Outgoing::Photo { caption, .. } => caption.as_deref(),
        }
    }
}

/// Send every planned message to the chat, in order
///
/// A photo whose file vanished after the existence check degrades to its caption.
pub async fn send_all(bot: &Bot, chat_id: ChatId, messages: Vec<Outgoing>) -> Result<()> {
    debug!(chat_id = %chat_id, count = messages.len(), "Sending planned messages");

    for message in messages {
        match message {
            Outgoing::Text { text, keyboard } => {
                let request = bot.send_message(chat_id, text);
                match keyboard {
                    Some(keyboard) => request.reply_markup(keyboard).await?,
                    None => request.await?,
                };
            }
            Outgoing::Photo { path, caption } => {
                let mut request = bot.send_photo(chat_id, InputFile::file(path.clone()));
                if let Some(caption) = caption.clone() {
                    request = request.caption(caption);
                }

                match request.await {
                    Ok(_) => {}
                    Err(RequestError::Io(e)) => {
                        warn!(path = %path.display(), error = %e, "Photo upload failed, sending text instead");
                        if let Some(caption) = caption {
                            bot.send_message(chat_id, caption).await?;
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(())
}

/// Send a handler's plan, or log its failure and send a generic error message
///
/// Errors stay scoped to the update being handled.
pub async fn deliver(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &HandlerContext<'_>,
    operation: &str,
    telegram_id: i64,
    planned: Result<Vec<Outgoing>>,
) -> Result<()> {
    match planned {
        Ok(messages) => send_all(bot, chat_id, messages).await,
        Err(e) => {
            error_logging::log_internal_error(&e, "bot", operation, Some(telegram_id));
            observability::record_error_metrics("handler", operation);
            bot.send_message(chat_id, ctx.t("error-generic")).await?;
            Ok(())
        }
    }
}
