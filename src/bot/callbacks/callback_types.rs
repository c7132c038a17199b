//! Shared types for callback handlers

/// Prefix of the payload carrying a category identifier
const CATEGORY_PREFIX: &str = "category_";

/// Action selected by an inline button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Free version: one random recipe
    RandomRecipe,
    /// Premium version: registration or welcome back
    Premium,
    PayNow,
    PayLater,
    /// Browse the recipes of a category
    Category(i64),
}

impl CallbackAction {
    /// Parse a callback payload, `None` for anything unrecognized
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "recipe" => Some(CallbackAction::RandomRecipe),
            "premium" => Some(CallbackAction::Premium),
            "pay_now" => Some(CallbackAction::PayNow),
            "pay_later" => Some(CallbackAction::PayLater),
            _ => data
                .strip_prefix(CATEGORY_PREFIX)?
                .parse::<i64>()
                .ok()
                .map(CallbackAction::Category),
        }
    }

    /// Payload carried by the button for this action
    pub fn payload(&self) -> String {
        match self {
            CallbackAction::RandomRecipe => "recipe".to_string(),
            CallbackAction::Premium => "premium".to_string(),
            CallbackAction::PayNow => "pay_now".to_string(),
            CallbackAction::PayLater => "pay_later".to_string(),
            CallbackAction::Category(id) => format!("{}{}", CATEGORY_PREFIX, id),
        }
    }

    /// Metrics label
    pub fn name(&self) -> &'static str {
        match self {
            CallbackAction::RandomRecipe => "recipe",
            CallbackAction::Premium => "premium",
            CallbackAction::PayNow => "pay_now",
            CallbackAction::PayLater => "pay_later",
            CallbackAction::Category(_) => "category",
        }
    }
}
