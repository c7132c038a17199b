//! Measurement units used by recipe ingredient entries.
//!
//! Units are stored as short codes (`"tbsp"`, `"g"`); the bot shows the
//! localized label. Codes outside the fixed table are shown as stored.

use crate::localization::t_lang;
use crate::localization::LocalizationManager;

/// Units a recipe ingredient amount can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementUnit {
    Piece,
    Gram,
    Kilogram,
    Teaspoon,
    Tablespoon,
    Cup,
}

impl MeasurementUnit {
    pub const ALL: [MeasurementUnit; 6] = [
        MeasurementUnit::Piece,
        MeasurementUnit::Gram,
        MeasurementUnit::Kilogram,
        MeasurementUnit::Teaspoon,
        MeasurementUnit::Tablespoon,
        MeasurementUnit::Cup,
    ];

    /// Look up a unit by its stored code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.code() == code)
    }

    /// Code stored in the database
    pub fn code(self) -> &'static str {
        match self {
            MeasurementUnit::Piece => "pcs",
            MeasurementUnit::Gram => "g",
            MeasurementUnit::Kilogram => "kg",
            MeasurementUnit::Teaspoon => "tsp",
            MeasurementUnit::Tablespoon => "tbsp",
            MeasurementUnit::Cup => "cup",
        }
    }

    fn message_key(self) -> &'static str {
        match self {
            MeasurementUnit::Piece => "unit-pcs",
            MeasurementUnit::Gram => "unit-g",
            MeasurementUnit::Kilogram => "unit-kg",
            MeasurementUnit::Teaspoon => "unit-tsp",
            MeasurementUnit::Tablespoon => "unit-tbsp",
            MeasurementUnit::Cup => "unit-cup",
        }
    }

    /// Localized display label
    pub fn label(self, localization: &LocalizationManager, language_code: Option<&str>) -> String {
        t_lang(localization, self.message_key(), language_code)
    }
}

/// Display label for a stored unit code; unknown codes pass through unchanged
pub fn unit_display(
    code: &str,
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> String {
    match MeasurementUnit::from_code(code) {
        Some(unit) => unit.label(localization, language_code),
        None => code.to_string(),
    }
}

/// Format an amount or a price without trailing zeros ("200", "0.5", "1.25")
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let formatted = format!("{:.3}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
