//! Persistence gateway used by the bot flows.
//!
//! Handlers only talk to [`RecipeRepository`], so they can run against
//! PostgreSQL in production and an in-memory fake in tests.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use std::sync::Arc;

use crate::db::{self, Category, Profile, Recipe, RecipeIngredient, Registration, Step};
use crate::errors::error_logging::log_database_error;
use crate::errors::AppResult;

/// Lookup and creation operations over profiles, categories and recipes
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Profile linked to a Telegram chat identifier, if any
    async fn find_profile_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<Profile>>;

    /// Find-or-create the account and profile for a finished registration
    async fn create_profile(
        &self,
        telegram_id: i64,
        registration: &Registration,
    ) -> AppResult<Profile>;

    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    /// At most `limit` distinct recipes of a category
    async fn list_recipes_by_category(&self, category_id: i64, limit: i64)
        -> AppResult<Vec<Recipe>>;

    /// One recipe chosen uniformly at random, `None` when there are none
    async fn random_recipe(&self) -> AppResult<Option<Recipe>>;

    /// Steps in ascending order
    async fn steps_for_recipe(&self, recipe_id: i64) -> AppResult<Vec<Step>>;

    async fn ingredients_for_recipe(&self, recipe_id: i64) -> AppResult<Vec<RecipeIngredient>>;
}

/// PostgreSQL-backed repository
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: Arc<PgPool>,
}

impl PgRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeRepository for PgRepository {
    async fn find_profile_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<Profile>> {
        db::get_profile_by_telegram_id(&self.pool, telegram_id)
            .await
            .inspect_err(|e| log_database_error(e, "find_profile_by_telegram_id", Some(telegram_id)))
    }

    async fn create_profile(
        &self,
        telegram_id: i64,
        registration: &Registration,
    ) -> AppResult<Profile> {
        db::create_profile(&self.pool, telegram_id, registration)
            .await
            .inspect_err(|e| log_database_error(e, "create_profile", Some(telegram_id)))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        db::list_categories(&self.pool)
            .await
            .inspect_err(|e| log_database_error(e, "list_categories", None))
    }

    async fn list_recipes_by_category(
        &self,
        category_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Recipe>> {
        db::list_recipes_by_category(&self.pool, category_id, limit)
            .await
            .inspect_err(|e| log_database_error(e, "list_recipes_by_category", None))
    }

    async fn random_recipe(&self) -> AppResult<Option<Recipe>> {
        db::get_random_recipe(&self.pool)
            .await
            .inspect_err(|e| log_database_error(e, "get_random_recipe", None))
    }

    async fn steps_for_recipe(&self, recipe_id: i64) -> AppResult<Vec<Step>> {
        db::get_recipe_steps(&self.pool, recipe_id)
            .await
            .inspect_err(|e| log_database_error(e, "get_recipe_steps", None))
    }

    async fn ingredients_for_recipe(&self, recipe_id: i64) -> AppResult<Vec<RecipeIngredient>> {
        db::get_recipe_ingredients(&self.pool, recipe_id)
            .await
            .inspect_err(|e| log_database_error(e, "get_recipe_ingredients", None))
    }
}
