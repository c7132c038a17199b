//! Dialogue Manager module for the premium registration dialogue

use anyhow::Result;
use tracing::{debug, info, warn};

use super::outgoing::Outgoing;
use super::ui_builder::create_payment_keyboard;
use super::HandlerContext;
use crate::db::Profile;
use crate::dialogue::{RegistrationDialogue, RegistrationState, RegistrationStep};
use crate::errors::{error_logging, AppError};
use crate::observability;

fn welcome_back(ctx: &HandlerContext<'_>, profile: &Profile) -> Outgoing {
    Outgoing::text_with_keyboard(
        ctx.t_args("welcome-back", &[("name", profile.display_name())]),
        create_payment_keyboard(ctx),
    )
}

/// The registration ends on any persistence outcome, even when clearing fails
async fn leave_registration(dialogue: &RegistrationDialogue, telegram_id: i64) {
    if let Err(e) = dialogue.exit().await {
        warn!(telegram_id, error = %e, "Failed to clear registration state");
    }
}

fn registration_failed(
    ctx: &HandlerContext<'_>,
    telegram_id: i64,
    email: &str,
    error: &AppError,
) -> Outgoing {
    error_logging::log_registration_error(error, telegram_id, Some(email));
    observability::record_registration("failure");
    observability::record_error_metrics(error.kind(), "registration");
    Outgoing::text(ctx.t_args("registration-failed", &[("error", &error.to_string())]))
}

/// Premium selected: greet a known user, otherwise start collecting their details
pub async fn start_premium(
    ctx: &HandlerContext<'_>,
    telegram_id: i64,
    dialogue: &RegistrationDialogue,
) -> Result<Vec<Outgoing>> {
    if let Some(profile) = ctx.repository.find_profile_by_telegram_id(telegram_id).await? {
        debug!(telegram_id, profile_id = profile.id, "Known user selected premium");
        return Ok(vec![welcome_back(ctx, &profile)]);
    }

    dialogue.update(RegistrationState::AwaitingFirstName).await?;
    info!(telegram_id, "Registration started");
    Ok(vec![Outgoing::text(ctx.t("prompt-first-name"))])
}

/// Consume one answer of an active registration
///
/// `text` is `None` for non-text messages, which re-send the current prompt.
pub async fn handle_registration_input(
    ctx: &HandlerContext<'_>,
    telegram_id: i64,
    dialogue: &RegistrationDialogue,
    state: RegistrationState,
    text: Option<&str>,
) -> Result<Vec<Outgoing>> {
    let Some(text) = text else {
        let mut messages = vec![Outgoing::text(ctx.t("prompt-text-required"))];
        if let Some(key) = state.prompt_key() {
            messages.push(Outgoing::text(ctx.t(key)));
        }
        return Ok(messages);
    };

    // Another update may have registered this chat while the dialogue was open
    if matches!(state, RegistrationState::AwaitingEmail { .. }) {
        match ctx.repository.find_profile_by_telegram_id(telegram_id).await {
            Ok(Some(profile)) => {
                dialogue.exit().await?;
                info!(telegram_id, "Registration aborted, profile already exists");
                return Ok(vec![welcome_back(ctx, &profile)]);
            }
            Ok(None) => {}
            Err(e) => {
                leave_registration(dialogue, telegram_id).await;
                return Ok(vec![registration_failed(ctx, telegram_id, text.trim(), &e)]);
            }
        }
    }

    match state.accept(text) {
        None => Ok(vec![Outgoing::text(ctx.t("unknown-input"))]),
        Some(RegistrationStep::Prompt(next)) => {
            let prompt = next.prompt_key().map(|key| ctx.t(key));
            dialogue.update(next).await?;
            Ok(prompt.into_iter().map(Outgoing::text).collect())
        }
        Some(RegistrationStep::Submit(registration)) => {
            let result = ctx
                .repository
                .create_profile(telegram_id, &registration)
                .await;

            leave_registration(dialogue, telegram_id).await;

            match result {
                Ok(profile) => {
                    info!(telegram_id, profile_id = profile.id, "Registration completed");
                    observability::record_registration("success");
                    Ok(vec![Outgoing::text_with_keyboard(
                        ctx.t("registration-complete"),
                        create_payment_keyboard(ctx),
                    )])
                }
                Err(e) => Ok(vec![registration_failed(
                    ctx,
                    telegram_id,
                    &registration.email,
                    &e,
                )]),
            }
        }
    }
}
