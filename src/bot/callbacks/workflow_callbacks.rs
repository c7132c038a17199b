//! Workflow callback handlers module
//!
//! Handles the pay now / pay later choice offered after registration. Payment
//! itself is not processed: "pay now" goes straight to the category listing.

use anyhow::Result;

use super::super::outgoing::Outgoing;
use super::super::ui_builder::create_categories_keyboard;
use super::super::HandlerContext;

/// Announce the categories, then list one button per category
pub async fn show_categories(ctx: &HandlerContext<'_>) -> Result<Vec<Outgoing>> {
    let categories = ctx.repository.list_categories().await?;

    let mut messages = vec![Outgoing::text(ctx.t("categories-intro"))];
    if categories.is_empty() {
        messages.push(Outgoing::text(ctx.t("categories-empty")));
    } else {
        messages.push(Outgoing::text_with_keyboard(
            ctx.t("categories-choose"),
            create_categories_keyboard(&categories),
        ));
    }
    Ok(messages)
}

/// Static acknowledgment for postponed payment
pub fn pay_later(ctx: &HandlerContext<'_>) -> Vec<Outgoing> {
    vec![Outgoing::text(ctx.t("pay-later"))]
}
