use anyhow::{Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use std::collections::HashMap;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Languages with a bundled message catalogue
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["en", "ru"];

const EN_RESOURCE: &str = include_str!("../locales/en/main.ftl");
const RU_RESOURCE: &str = include_str!("../locales/ru/main.ftl");

/// Localization manager for the recipe bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_language: String,
}

impl std::fmt::Debug for LocalizationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationManager")
            .field("languages", &self.bundles.keys().collect::<Vec<_>>())
            .field("default_language", &self.default_language)
            .finish()
    }
}

impl LocalizationManager {
    /// Create a new localization manager falling back to Russian
    pub fn new() -> Result<Self> {
        Self::with_default_language("ru")
    }

    /// Create a new localization manager with an explicit fallback language
    pub fn with_default_language(default_language: &str) -> Result<Self> {
        let mut bundles = HashMap::new();

        for (locale_str, source) in [("en", EN_RESOURCE), ("ru", RU_RESOURCE)] {
            let locale: LanguageIdentifier = locale_str.parse()?;
            let bundle = Self::create_bundle(locale, source)
                .with_context(|| format!("Failed to load '{}' message catalogue", locale_str))?;
            bundles.insert(locale_str.to_string(), bundle);
        }

        if !bundles.contains_key(default_language) {
            anyhow::bail!("Unsupported default language: {}", default_language);
        }

        Ok(Self {
            bundles,
            default_language: default_language.to_string(),
        })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Telegram renders the Unicode isolation marks literally
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid FTL resource: {:?}", errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Duplicate FTL messages: {:?}", errors))?;

        Ok(bundle)
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(&self.default_language))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {}", key),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, value.to_string());
            }
            fluent_args
        });

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned()
    }

    /// Get a localized message with arguments in a specific language
    pub fn get_message_with_args_in_language(
        &self,
        key: &str,
        language: &str,
        args: &[(&str, &str)],
    ) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Language used when the user's language is unknown or unsupported
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Detect the appropriate language based on user's Telegram language code
    pub fn detect_language(&self, language_code: Option<&str>) -> String {
        if let Some(code) = language_code {
            // "ru-RU" -> "ru"
            let lang = code.split(['-', '_']).next().unwrap_or(code).to_lowercase();
            if self.is_language_supported(&lang) {
                return lang;
            }
        }
        self.default_language.clone()
    }
}

/// Create a shared localization manager
pub fn create_localization_manager(default_language: &str) -> Result<Arc<LocalizationManager>> {
    Ok(Arc::new(LocalizationManager::with_default_language(
        default_language,
    )?))
}

/// Get a localized message in the user's language
pub fn t_lang(localization: &LocalizationManager, key: &str, language_code: Option<&str>) -> String {
    let language = localization.detect_language(language_code);
    localization.get_message_in_language(key, &language, None)
}

/// Get a localized message with arguments in the user's language
pub fn t_args_lang(
    localization: &LocalizationManager,
    key: &str,
    args: &[(&str, &str)],
    language_code: Option<&str>,
) -> String {
    let language = localization.detect_language(language_code);
    localization.get_message_with_args_in_language(key, &language, args)
}
