//! Message Handler module for messages that are not commands

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{debug, Instrument};

use super::dialogue_manager::handle_registration_input;
use super::outgoing::{deliver, Outgoing};
use super::{BotDeps, HandlerContext};
use crate::dialogue::RegistrationDialogue;
use crate::observability;

/// Route a message by the chat's registration state
///
/// During a registration the message answers the current prompt; otherwise the
/// user gets a hint pointing to `/start`.
pub async fn route_message(
    ctx: &HandlerContext<'_>,
    telegram_id: i64,
    dialogue: &RegistrationDialogue,
    text: Option<&str>,
) -> Result<Vec<Outgoing>> {
    let state = dialogue.get().await?.unwrap_or_default();

    if state.is_active() {
        return handle_registration_input(ctx, telegram_id, dialogue, state, text).await;
    }

    debug!(telegram_id, has_text = text.is_some(), "Message outside of a registration");
    Ok(vec![Outgoing::text(ctx.t("unknown-input"))])
}

/// Dispatcher endpoint for messages
pub async fn message_handler(bot: Bot, msg: Message, deps: BotDeps) -> Result<()> {
    let user = msg.from.as_ref();
    let telegram_id = user.map(|u| u.id.0 as i64).unwrap_or(msg.chat.id.0);
    let language_code = user.and_then(|u| u.language_code.as_deref());
    let ctx = deps.context(language_code);
    let dialogue = RegistrationDialogue::new(deps.dialogues.clone(), msg.chat.id);

    let span = observability::telegram_span("message_handler", Some(telegram_id));
    async {
        let message_type = if msg.text().is_some() { "text" } else { "other" };
        observability::record_telegram_message(message_type);

        let planned = route_message(&ctx, telegram_id, &dialogue, msg.text()).await;
        deliver(&bot, msg.chat.id, &ctx, "message", telegram_id, planned).await
    }
    .instrument(span)
    .await
}
