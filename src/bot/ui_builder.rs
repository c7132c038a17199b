//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::callbacks::callback_types::CallbackAction;
use super::HandlerContext;
use crate::db::{Category, Recipe, RecipeIngredient, Step};
use crate::units::{format_quantity, unit_display};

fn callback_button(label: String, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.payload())
}

/// Create the top-level menu: free recipe or premium
pub fn create_main_menu_keyboard(ctx: &HandlerContext<'_>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![callback_button(
            ctx.t("button-free"),
            CallbackAction::RandomRecipe,
        )],
        vec![callback_button(
            ctx.t("button-premium"),
            CallbackAction::Premium,
        )],
    ])
}

/// Create the pay now / pay later keyboard shown after registration
pub fn create_payment_keyboard(ctx: &HandlerContext<'_>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![callback_button(ctx.t("button-pay-now"), CallbackAction::PayNow)],
        vec![callback_button(
            ctx.t("button-pay-later"),
            CallbackAction::PayLater,
        )],
    ])
}

/// Create one button per category, in the given order
pub fn create_categories_keyboard(categories: &[Category]) -> InlineKeyboardMarkup {
    let rows = categories
        .iter()
        .map(|category| {
            vec![callback_button(
                category.name.clone(),
                CallbackAction::Category(category.id),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

/// Format the /start greeting
pub fn format_welcome_message(ctx: &HandlerContext<'_>) -> String {
    format!(
        "{}\n{}\n\n{}\n{}\n{}\n\n{}",
        ctx.t("welcome-title"),
        ctx.t("welcome-description"),
        ctx.t("welcome-feature-recipe"),
        ctx.t("welcome-feature-shopping"),
        ctx.t("welcome-feature-preferences"),
        ctx.t("welcome-choose")
    )
}

/// Format `• name - amount unit` lines, one per ingredient
pub fn format_ingredient_lines(ctx: &HandlerContext<'_>, ingredients: &[RecipeIngredient]) -> String {
    ingredients
        .iter()
        .map(|ingredient| {
            format!(
                "• {} - {} {}",
                ingredient.name,
                format_quantity(ingredient.amount),
                unit_display(&ingredient.unit, ctx.localization, ctx.language_code)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Caption of a recipe of the day: title, cost and ingredient list
pub fn format_recipe_of_the_day_caption(
    ctx: &HandlerContext<'_>,
    recipe: &Recipe,
    ingredients: &[RecipeIngredient],
) -> String {
    let mut caption = format!(
        "{}\n{}",
        ctx.t_args("recipe-of-the-day", &[("title", &recipe.title)]),
        format_cost_line(ctx, recipe)
    );

    let ingredient_lines = format_ingredient_lines(ctx, ingredients);
    if !ingredient_lines.is_empty() {
        caption.push_str("\n\n");
        caption.push_str(&ingredient_lines);
    }
    caption
}

/// Caption of a recipe in a category listing: title and cost
pub fn format_recipe_caption(ctx: &HandlerContext<'_>, recipe: &Recipe) -> String {
    format!(
        "{}\n{}",
        ctx.t_args("recipe-title", &[("title", &recipe.title)]),
        format_cost_line(ctx, recipe)
    )
}

fn format_cost_line(ctx: &HandlerContext<'_>, recipe: &Recipe) -> String {
    ctx.t_args(
        "recipe-cost",
        &[("cost", &format_quantity(recipe.estimated_cost))],
    )
}

/// Final cost summary sent after the steps of a random recipe
pub fn format_total_cost(ctx: &HandlerContext<'_>, recipe: &Recipe) -> String {
    ctx.t_args(
        "recipe-total-cost",
        &[("cost", &format_quantity(recipe.estimated_cost))],
    )
}

/// `N. text`, numbered by the step's order index
pub fn format_step(step: &Step) -> String {
    format!("{}. {}", step.order, step.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::LocalizationManager;
    use crate::media::MediaLibrary;
    use teloxide::types::InlineKeyboardButtonKind;

    fn payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_categories_keyboard_payloads() {
        let keyboard = create_categories_keyboard(&[
            Category {
                id: 1,
                name: "Супы".to_string(),
            },
            Category {
                id: 7,
                name: "Десерты".to_string(),
            },
        ]);
        assert_eq!(payloads(&keyboard), vec!["category_1", "category_7"]);
        assert_eq!(keyboard.inline_keyboard[1][0].text, "Десерты");
    }

    #[test]
    fn test_step_numbering_uses_order_index() {
        let step = Step {
            id: 10,
            recipe_id: 1,
            order: 3,
            text: "Simmer".to_string(),
            image: None,
        };
        assert_eq!(format_step(&step), "3. Simmer");
    }

    #[tokio::test]
    async fn test_ingredient_lines_use_unit_labels() {
        let localization = LocalizationManager::new().unwrap();
        let media = MediaLibrary::new("media");
        let repository = crate::repository::PgRepository::new(std::sync::Arc::new(
            sqlx::postgres::PgPoolOptions::new()
                .connect_lazy("postgres://localhost/unused")
                .unwrap(),
        ));
        let ctx = HandlerContext {
            repository: &repository,
            media: &media,
            localization: &localization,
            language_code: Some("ru"),
        };

        let lines = format_ingredient_lines(
            &ctx,
            &[
                RecipeIngredient {
                    name: "Сахар".to_string(),
                    amount: 2.0,
                    unit: "tbsp".to_string(),
                },
                RecipeIngredient {
                    name: "Соль".to_string(),
                    amount: 0.5,
                    unit: "pinch".to_string(),
                },
            ],
        );
        assert_eq!(lines, "• Сахар - 2 ст. л.\n• Соль - 0.5 pinch");

        let keyboard = create_main_menu_keyboard(&ctx);
        assert_eq!(payloads(&keyboard), vec!["recipe", "premium"]);
        assert_eq!(
            payloads(&create_payment_keyboard(&ctx)),
            vec!["pay_now", "pay_later"]
        );
    }
}
