//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use super::callbacks::callback_handler::callback_handler;
use super::command_handlers::{command_handler, Command};
use super::message_handler::message_handler;
use super::BotDeps;

/// Creates the dispatcher schema for the bot.
///
/// Commands are matched before plain messages, so `/start` always opens the
/// menu even in the middle of a registration. Built once at startup.
pub fn schema(deps: BotDeps) -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(command_branch(deps.clone()))
        .branch(message_branch(deps.clone()))
        .branch(callback_branch(deps))
}

fn command_branch(deps: BotDeps) -> UpdateHandler<anyhow::Error> {
    Update::filter_message().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move { command_handler(bot, msg, cmd, deps).await }
        },
    )
}

fn message_branch(deps: BotDeps) -> UpdateHandler<anyhow::Error> {
    Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let deps = deps.clone();
        async move { message_handler(bot, msg, deps).await }
    })
}

fn callback_branch(deps: BotDeps) -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move { callback_handler(bot, q, deps).await }
    })
}
