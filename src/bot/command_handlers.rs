//! Command Handlers module for processing bot commands

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, Instrument};

use super::outgoing::{deliver, Outgoing};
use super::ui_builder::{create_main_menu_keyboard, format_welcome_message};
use super::{BotDeps, HandlerContext};
use crate::dialogue::RegistrationDialogue;
use crate::observability::{self, UserAction};

/// Commands shown in the Telegram menu button
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "открыть главное меню")]
    Start,
    #[command(description = "показать справку")]
    Help,
}

/// Greeting with the free / premium menu; abandons any registration in progress
pub async fn start_menu(
    ctx: &HandlerContext<'_>,
    dialogue: &RegistrationDialogue,
) -> Result<Vec<Outgoing>> {
    if dialogue.get().await?.is_some() {
        debug!(chat_id = %dialogue.chat_id(), "Clearing registration on /start");
        dialogue.exit().await?;
    }

    Ok(vec![Outgoing::text_with_keyboard(
        format_welcome_message(ctx),
        create_main_menu_keyboard(ctx),
    )])
}

pub fn help_message(ctx: &HandlerContext<'_>) -> Vec<Outgoing> {
    vec![Outgoing::text(ctx.t("help-message"))]
}

/// Dispatcher endpoint for parsed commands
pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, deps: BotDeps) -> Result<()> {
    let user = msg.from.as_ref();
    let telegram_id = user.map(|u| u.id.0 as i64).unwrap_or(msg.chat.id.0);
    let language_code = user.and_then(|u| u.language_code.as_deref());
    let ctx = deps.context(language_code);
    let dialogue = RegistrationDialogue::new(deps.dialogues.clone(), msg.chat.id);

    let span = observability::telegram_span("command_handler", Some(telegram_id));
    async {
        observability::record_telegram_message("command");
        let (action, planned) = match cmd {
            Command::Start => (UserAction::StartCommand, start_menu(&ctx, &dialogue).await),
            Command::Help => (UserAction::HelpCommand, Ok(help_message(&ctx))),
        };
        observability::record_user_engagement_metrics(telegram_id, action, language_code);

        deliver(&bot, msg.chat.id, &ctx, action.as_str(), telegram_id, planned).await
    }
    .instrument(span)
    .await
}
