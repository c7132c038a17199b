//! # Test Helper Library
//!
//! Common setup for the integration tests: an in-memory [`RecipeRepository`],
//! a temporary media directory and handler context construction.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use recipe_of_the_day::bot::{HandlerContext, Outgoing};
use recipe_of_the_day::db::{Account, Category, Profile, Recipe, RecipeIngredient, Registration, Step};
use recipe_of_the_day::dialogue::{RegistrationDialogue, RegistrationState};
use recipe_of_the_day::errors::{AppError, AppResult};
use recipe_of_the_day::localization::LocalizationManager;
use recipe_of_the_day::media::MediaLibrary;
use recipe_of_the_day::repository::RecipeRepository;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::types::{ChatId, InlineKeyboardButtonKind, InlineKeyboardMarkup};
use tempfile::TempDir;

#[derive(Default)]
struct FakeState {
    next_id: i64,
    accounts: Vec<Account>,
    profiles: Vec<(i64, Option<i64>, i64)>,
    categories: Vec<Category>,
    recipes: Vec<Recipe>,
    recipe_categories: Vec<(i64, i64)>,
    steps: Vec<Step>,
    ingredients: Vec<(i64, RecipeIngredient)>,
    fail_create_profile: Option<String>,
    fail_find_profile: Option<String>,
    create_profile_calls: usize,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn profile(&self, profile_id: i64) -> Option<Profile> {
        let (id, telegram_id, account_id) = *self.profiles.iter().find(|p| p.0 == profile_id)?;
        let account = self.accounts.iter().find(|a| a.id == account_id)?.clone();
        Some(Profile {
            id,
            telegram_id,
            account,
        })
    }

    fn profile_id_for_telegram(&self, telegram_id: i64) -> Option<i64> {
        self.profiles
            .iter()
            .find(|p| p.1 == Some(telegram_id))
            .map(|p| p.0)
    }
}

/// In-memory repository mirroring the PostgreSQL semantics
#[derive(Default)]
pub struct FakeRepository {
    state: Mutex<FakeState>,
}

impl FakeRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_category(&self, name: &str) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_recipe(&self, title: &str, estimated_cost: f64, image: Option<&str>) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.recipes.push(Recipe {
            id,
            title: title.to_string(),
            estimated_cost,
            image: image.map(str::to_string),
        });
        id
    }

    pub fn link_category(&self, recipe_id: i64, category_id: i64) {
        self.state.lock().recipe_categories.push((recipe_id, category_id));
    }

    pub fn add_step(&self, recipe_id: i64, order: i32, text: &str, image: Option<&str>) -> i64 {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.steps.push(Step {
            id,
            recipe_id,
            order,
            text: text.to_string(),
            image: image.map(str::to_string),
        });
        id
    }

    pub fn add_ingredient(&self, recipe_id: i64, name: &str, amount: f64, unit: &str) {
        self.state.lock().ingredients.push((
            recipe_id,
            RecipeIngredient {
                name: name.to_string(),
                amount,
                unit: unit.to_string(),
            },
        ));
    }

    /// Register a profile directly, as another update or the web site would
    pub fn insert_profile(&self, telegram_id: Option<i64>, first_name: &str, email: &str) -> i64 {
        let mut state = self.state.lock();
        let account_id = state.next_id();
        state.accounts.push(Account {
            id: account_id,
            username: email.to_string(),
            first_name: first_name.to_string(),
            last_name: String::new(),
            email: email.to_string(),
            date_joined: Utc::now(),
        });
        let profile_id = state.next_id();
        state.profiles.push((profile_id, telegram_id, account_id));
        profile_id
    }

    /// Make every following `create_profile` call fail with a database error
    pub fn fail_create_profile(&self, message: &str) {
        self.state.lock().fail_create_profile = Some(message.to_string());
    }

    pub fn fail_find_profile(&self, message: &str) {
        self.state.lock().fail_find_profile = Some(message.to_string());
    }

    pub fn create_profile_calls(&self) -> usize {
        self.state.lock().create_profile_calls
    }

    pub fn profile_count(&self) -> usize {
        self.state.lock().profiles.len()
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().accounts.len()
    }
}

#[async_trait]
impl RecipeRepository for FakeRepository {
    async fn find_profile_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<Profile>> {
        let state = self.state.lock();
        if let Some(message) = state.fail_find_profile.clone() {
            return Err(AppError::Database(message));
        }
        Ok(state
            .profile_id_for_telegram(telegram_id)
            .and_then(|id| state.profile(id)))
    }

    async fn create_profile(
        &self,
        telegram_id: i64,
        registration: &Registration,
    ) -> AppResult<Profile> {
        let mut state = self.state.lock();
        state.create_profile_calls += 1;

        if let Some(message) = state.fail_create_profile.clone() {
            return Err(AppError::Database(message));
        }

        if let Some(id) = state.profile_id_for_telegram(telegram_id) {
            return state
                .profile(id)
                .ok_or_else(|| AppError::Internal("dangling profile".to_string()));
        }

        let existing_account = state
            .accounts
            .iter()
            .find(|a| {
                a.username == registration.email
                    && a.first_name == registration.first_name
                    && a.last_name == registration.last_name
                    && a.email == registration.email
            })
            .map(|a| a.id);

        let account_id = match existing_account {
            Some(id) => id,
            None => {
                if state.accounts.iter().any(|a| a.username == registration.email) {
                    return Err(AppError::Conflict(format!(
                        "duplicate key value violates unique constraint on username {}",
                        registration.email
                    )));
                }
                let id = state.next_id();
                state.accounts.push(Account {
                    id,
                    username: registration.email.clone(),
                    first_name: registration.first_name.clone(),
                    last_name: registration.last_name.clone(),
                    email: registration.email.clone(),
                    date_joined: Utc::now(),
                });
                id
            }
        };

        let existing_profile = state.profiles.iter().position(|p| p.2 == account_id);

        let profile_id = match existing_profile {
            Some(index) => {
                let (id, linked, _) = state.profiles[index];
                match linked {
                    None => {
                        state.profiles[index].1 = Some(telegram_id);
                        id
                    }
                    Some(other) if other != telegram_id => {
                        return Err(AppError::Conflict(format!(
                            "account {} is already linked to another Telegram user",
                            registration.email
                        )));
                    }
                    Some(_) => id,
                }
            }
            None => {
                let id = state.next_id();
                state.profiles.push((id, Some(telegram_id), account_id));
                id
            }
        };

        state
            .profile(profile_id)
            .ok_or_else(|| AppError::Internal("dangling profile".to_string()))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories = self.state.lock().categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn list_recipes_by_category(
        &self,
        category_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Recipe>> {
        let state = self.state.lock();
        let mut recipes: Vec<Recipe> = state
            .recipes
            .iter()
            .filter(|r| {
                state
                    .recipe_categories
                    .iter()
                    .any(|(recipe_id, cat)| *recipe_id == r.id && *cat == category_id)
            })
            .cloned()
            .collect();
        recipes.sort_by_key(|r| r.id);
        recipes.truncate(limit as usize);
        Ok(recipes)
    }

    async fn random_recipe(&self) -> AppResult<Option<Recipe>> {
        let state = self.state.lock();
        if state.recipes.is_empty() {
            return Ok(None);
        }
        let index = rand::rng().random_range(0..state.recipes.len());
        Ok(state.recipes.get(index).cloned())
    }

    async fn steps_for_recipe(&self, recipe_id: i64) -> AppResult<Vec<Step>> {
        let mut steps: Vec<Step> = self
            .state
            .lock()
            .steps
            .iter()
            .filter(|s| s.recipe_id == recipe_id)
            .cloned()
            .collect();
        steps.sort_by_key(|s| (s.order, s.id));
        Ok(steps)
    }

    async fn ingredients_for_recipe(&self, recipe_id: i64) -> AppResult<Vec<RecipeIngredient>> {
        Ok(self
            .state
            .lock()
            .ingredients
            .iter()
            .filter(|(id, _)| *id == recipe_id)
            .map(|(_, ingredient)| ingredient.clone())
            .collect())
    }
}

/// Everything a handler needs, backed by fakes and a temporary media root
pub struct TestEnv {
    pub repository: Arc<FakeRepository>,
    pub localization: LocalizationManager,
    pub media: MediaLibrary,
    pub storage: Arc<InMemStorage<RegistrationState>>,
    media_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let media_dir = TempDir::new().expect("Failed to create media dir");
        Self {
            repository: FakeRepository::new(),
            localization: LocalizationManager::new().expect("Failed to load catalogues"),
            media: MediaLibrary::new(media_dir.path()),
            storage: InMemStorage::new(),
            media_dir,
        }
    }

    /// Context for a Russian-speaking user
    pub fn ctx(&self) -> HandlerContext<'_> {
        self.ctx_for(Some("ru"))
    }

    pub fn ctx_for<'a>(&'a self, language_code: Option<&'a str>) -> HandlerContext<'a> {
        HandlerContext {
            repository: self.repository.as_ref(),
            media: &self.media,
            localization: &self.localization,
            language_code,
        }
    }

    pub fn dialogue(&self, chat_id: i64) -> RegistrationDialogue {
        RegistrationDialogue::new(self.storage.clone(), ChatId(chat_id))
    }

    /// Create an image file under the media root, returning its stored path
    pub fn add_image(&self, relative: &str) -> String {
        let path = self.media_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create media subdir");
        }
        std::fs::write(&path, b"\xFF\xD8\xFF").expect("Failed to write image");
        relative.to_string()
    }

    pub fn media_path(&self, relative: &str) -> PathBuf {
        self.media_dir.path().join(relative)
    }

    pub fn t(&self, key: &str) -> String {
        self.ctx().t(key)
    }
}

/// Visible text of every message, captions for photos, `<photo>` when bare
pub fn bodies(messages: &[Outgoing]) -> Vec<String> {
    messages
        .iter()
        .map(|m| m.body().unwrap_or("<photo>").to_string())
        .collect()
}

pub fn keyboard_of(message: &Outgoing) -> Option<&InlineKeyboardMarkup> {
    match message {
        Outgoing::Text { keyboard, .. } => keyboard.as_ref(),
        Outgoing::Photo { .. } => None,
    }
}

pub fn callback_payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
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

pub fn registration(first_name: &str, last_name: &str, email: &str) -> Registration {
    Registration {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
    }
}
