//! Recipe callback handlers module
//!
//! Renders recipes for the free version (one random recipe of the day) and for
//! premium category browsing. Both flows are stateless and only plan messages;
//! sending happens in the caller.

use anyhow::Result;
use tracing::debug;

use super::super::outgoing::Outgoing;
use super::super::ui_builder::{
    format_recipe_caption, format_recipe_of_the_day_caption, format_step, format_total_cost,
};
use super::super::HandlerContext;
use crate::db::Recipe;
use crate::errors::error_logging;
use crate::observability;

/// Maximum number of recipes shown for one category
pub const CATEGORY_RECIPE_LIMIT: i64 = 3;

/// Plan the recipe of the day: caption with ingredients, photo when the image
/// exists, one message per step, then the total cost
pub async fn random_recipe(ctx: &HandlerContext<'_>) -> Result<Vec<Outgoing>> {
    let Some(recipe) = ctx.repository.random_recipe().await? else {
        debug!("No recipes available for the recipe of the day");
        return Ok(vec![Outgoing::text(ctx.t("recipes-unavailable"))]);
    };
    debug!(recipe_id = recipe.id, title = %recipe.title, "Picked recipe of the day");

    let ingredients = ctx.repository.ingredients_for_recipe(recipe.id).await?;
    let caption = format_recipe_of_the_day_caption(ctx, &recipe, &ingredients);

    let mut messages = recipe_header(ctx, &recipe, caption).await;
    messages.extend(recipe_steps(ctx, &recipe).await?);
    messages.push(Outgoing::text(format_total_cost(ctx, &recipe)));

    observability::record_recipe_delivery("random", messages.len());
    Ok(messages)
}

/// Plan up to [`CATEGORY_RECIPE_LIMIT`] distinct recipes of a category, each
/// followed by its steps
pub async fn browse_category(ctx: &HandlerContext<'_>, category_id: i64) -> Result<Vec<Outgoing>> {
    let recipes = ctx
        .repository
        .list_recipes_by_category(category_id, CATEGORY_RECIPE_LIMIT)
        .await?;

    if recipes.is_empty() {
        debug!(category_id, "Category has no recipes");
        return Ok(vec![Outgoing::text(ctx.t("category-empty"))]);
    }

    let mut messages = Vec::new();
    for recipe in &recipes {
        let caption = format_recipe_caption(ctx, recipe);
        messages.extend(recipe_header(ctx, recipe, caption).await);
        messages.extend(recipe_steps(ctx, recipe).await?);
    }

    debug!(category_id, recipe_count = recipes.len(), "Planned category recipes");
    observability::record_recipe_delivery("category", messages.len());
    Ok(messages)
}

/// Photo with caption when the recipe image is on disk, caption-only text otherwise
async fn recipe_header(ctx: &HandlerContext<'_>, recipe: &Recipe, caption: String) -> Vec<Outgoing> {
    match ctx.media.existing_file(recipe.image.as_deref()).await {
        Some(path) => Outgoing::photo_with_caption(path, caption),
        None => {
            if let Some(image) = recipe.image.as_deref() {
                error_logging::log_missing_media(image, Some(recipe.id), None);
            }
            vec![Outgoing::text(caption)]
        }
    }
}

async fn recipe_steps(ctx: &HandlerContext<'_>, recipe: &Recipe) -> Result<Vec<Outgoing>> {
    let steps = ctx.repository.steps_for_recipe(recipe.id).await?;

    let mut messages = Vec::with_capacity(steps.len());
    for step in &steps {
        let text = format_step(step);
        match ctx.media.existing_file(step.image.as_deref()).await {
            Some(path) => messages.extend(Outgoing::photo_with_caption(path, text)),
            None => {
                if let Some(image) = step.image.as_deref() {
                    error_logging::log_missing_media(image, Some(recipe.id), Some(step.id));
                }
                messages.push(Outgoing::text(text));
            }
        }
    }
    Ok(messages)
}
