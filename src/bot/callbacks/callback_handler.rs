//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::MaybeInaccessibleMessage;
use tracing::{debug, Instrument};

use super::callback_types::CallbackAction;
use super::{recipe_callbacks, workflow_callbacks};
use crate::bot::dialogue_manager;
use crate::bot::outgoing::{deliver, Outgoing};
use crate::bot::{BotDeps, HandlerContext};
use crate::dialogue::RegistrationDialogue;
use crate::observability::{self, UserAction};

/// Plan the reply to one button press
pub async fn route_callback(
    ctx: &HandlerContext<'_>,
    telegram_id: i64,
    dialogue: &RegistrationDialogue,
    data: &str,
) -> Result<Vec<Outgoing>> {
    let Some(action) = CallbackAction::parse(data) else {
        debug!(telegram_id, data = %data, "Unknown callback payload");
        return Ok(vec![Outgoing::text(ctx.t("unknown-action"))]);
    };

    observability::record_callback_action(action.name());
    match action {
        CallbackAction::RandomRecipe => {
            observability::record_user_engagement_metrics(
                telegram_id,
                UserAction::RandomRecipe,
                ctx.language_code,
            );
            recipe_callbacks::random_recipe(ctx).await
        }
        CallbackAction::Premium => {
            observability::record_user_engagement_metrics(
                telegram_id,
                UserAction::PremiumStart,
                ctx.language_code,
            );
            dialogue_manager::start_premium(ctx, telegram_id, dialogue).await
        }
        CallbackAction::PayNow => workflow_callbacks::show_categories(ctx).await,
        CallbackAction::PayLater => Ok(workflow_callbacks::pay_later(ctx)),
        CallbackAction::Category(category_id) => {
            observability::record_user_engagement_metrics(
                telegram_id,
                UserAction::CategoryBrowse,
                ctx.language_code,
            );
            recipe_callbacks::browse_category(ctx, category_id).await
        }
    }
}

/// Chat the pressed keyboard belongs to, the user's private chat as a fallback
fn callback_chat_id(q: &CallbackQuery) -> ChatId {
    match &q.message {
        Some(MaybeInaccessibleMessage::Regular(msg)) => msg.chat.id,
        Some(MaybeInaccessibleMessage::Inaccessible(msg)) => msg.chat.id,
        None => ChatId::from(q.from.id),
    }
}

/// Handle callback queries from inline keyboards
///
/// The query is answered before anything visible is sent, dismissing the
/// button's loading indicator.
pub async fn callback_handler(bot: Bot, q: CallbackQuery, deps: BotDeps) -> Result<()> {
    let telegram_id = q.from.id.0 as i64;
    let language_code = q.from.language_code.as_deref();
    let chat_id = callback_chat_id(&q);
    let ctx = deps.context(language_code);
    let dialogue = RegistrationDialogue::new(deps.dialogues.clone(), chat_id);

    let span = observability::telegram_span("callback_handler", Some(telegram_id));
    async {
        bot.answer_callback_query(q.id.clone()).await?;

        let data = q.data.as_deref().unwrap_or("");
        let planned = route_callback(&ctx, telegram_id, &dialogue, data).await;
        deliver(&bot, chat_id, &ctx, "callback", telegram_id, planned).await
    }
    .instrument(span)
    .await
}
