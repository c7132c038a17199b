//! # Database Module
//!
//! Data model for accounts, profiles, categories, recipes, steps and
//! ingredients, the schema bootstrap and the sqlx queries behind
//! [`crate::repository::PgRepository`]. Every query runs inside a `db_span`
//! and records `db_operations_total`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::{debug, info, Instrument};

use crate::errors::{AppError, AppResult};
use crate::observability::{db_span, record_db_metrics};

/// Represents a login account in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    /// Unique login key; the registration email is used here
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

/// Bot-side user record linking a Telegram chat identifier to an account
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub telegram_id: Option<i64>,
    pub account: Account,
}

impl Profile {
    /// Name used when greeting the user: first name, or the username if blank
    pub fn display_name(&self) -> &str {
        if self.account.first_name.trim().is_empty() {
            &self.account.username
        } else {
            &self.account.first_name
        }
    }
}

/// Fields collected by the registration dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A named grouping of recipes
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Represents a recipe in the database
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub estimated_cost: f64,
    /// Image path relative to the media root
    pub image: Option<String>,
}

/// One step of a recipe
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: i64,
    pub recipe_id: i64,
    pub order: i32,
    pub text: String,
    /// Image path relative to the media root
    pub image: Option<String>,
}

/// An ingredient entry of a recipe with its amount and unit code
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeIngredient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema");

    let statements = [
        (
            "accounts",
            "CREATE TABLE IF NOT EXISTS accounts (
                id BIGSERIAL PRIMARY KEY,
                username VARCHAR(150) UNIQUE NOT NULL,
                first_name VARCHAR(150) NOT NULL DEFAULT '',
                last_name VARCHAR(150) NOT NULL DEFAULT '',
                email VARCHAR(254) NOT NULL DEFAULT '',
                date_joined TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        ),
        (
            "profiles",
            "CREATE TABLE IF NOT EXISTS profiles (
                id BIGSERIAL PRIMARY KEY,
                account_id BIGINT UNIQUE NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                telegram_id BIGINT UNIQUE
            )",
        ),
        (
            "categories",
            "CREATE TABLE IF NOT EXISTS categories (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) NOT NULL
            )",
        ),
        (
            "recipes",
            "CREATE TABLE IF NOT EXISTS recipes (
                id BIGSERIAL PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                estimated_cost NUMERIC(10,2) NOT NULL DEFAULT 0,
                image VARCHAR(255)
            )",
        ),
        (
            "recipe_categories",
            "CREATE TABLE IF NOT EXISTS recipe_categories (
                recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                category_id BIGINT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
                PRIMARY KEY (recipe_id, category_id)
            )",
        ),
        (
            "steps",
            "CREATE TABLE IF NOT EXISTS steps (
                id BIGSERIAL PRIMARY KEY,
                recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                step_order INTEGER NOT NULL,
                text TEXT NOT NULL,
                image VARCHAR(255)
            )",
        ),
        (
            "ingredients",
            "CREATE TABLE IF NOT EXISTS ingredients (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(100) UNIQUE NOT NULL
            )",
        ),
        (
            "recipe_ingredients",
            "CREATE TABLE IF NOT EXISTS recipe_ingredients (
                id BIGSERIAL PRIMARY KEY,
                recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
                ingredient_id BIGINT NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
                amount NUMERIC(10,2) NOT NULL,
                unit VARCHAR(10) NOT NULL
            )",
        ),
        (
            "steps_recipe_id_idx",
            "CREATE INDEX IF NOT EXISTS steps_recipe_id_idx ON steps(recipe_id, step_order)",
        ),
        (
            "recipe_categories_category_id_idx",
            "CREATE INDEX IF NOT EXISTS recipe_categories_category_id_idx ON recipe_categories(category_id)",
        ),
        (
            "recipe_ingredients_recipe_id_idx",
            "CREATE INDEX IF NOT EXISTS recipe_ingredients_recipe_id_idx ON recipe_ingredients(recipe_id)",
        ),
    ];

    for (name, statement) in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create {}", name))?;
    }

    info!("Database schema initialized successfully");
    Ok(())
}

const PROFILE_COLUMNS: &str = "p.id, p.telegram_id, a.id, a.username, a.first_name, a.last_name, a.email, a.date_joined";

fn profile_from_row(row: &PgRow) -> Profile {
    Profile {
        id: row.get(0),
        telegram_id: row.get(1),
        account: Account {
            id: row.get(2),
            username: row.get(3),
            first_name: row.get(4),
            last_name: row.get(5),
            email: row.get(6),
            date_joined: row.get(7),
        },
    }
}

fn recipe_from_row(row: &PgRow) -> Recipe {
    Recipe {
        id: row.get(0),
        title: row.get(1),
        estimated_cost: row.get(2),
        image: row.get(3),
    }
}

/// Get a profile by Telegram chat identifier
pub async fn get_profile_by_telegram_id(
    pool: &PgPool,
    telegram_id: i64,
) -> AppResult<Option<Profile>> {
    let start = std::time::Instant::now();
    let row = sqlx::query(&format!(
        "SELECT {} FROM profiles p JOIN accounts a ON a.id = p.account_id WHERE p.telegram_id = $1",
        PROFILE_COLUMNS
    ))
    .bind(telegram_id)
    .fetch_optional(pool)
    .instrument(db_span("get_profile_by_telegram_id", "profiles"))
    .await?;
    record_db_metrics("get_profile_by_telegram_id", start.elapsed());

    match row {
        Some(row) => {
            let profile = profile_from_row(&row);
            debug!(telegram_id = %telegram_id, profile_id = %profile.id, "Profile found");
            Ok(Some(profile))
        }
        None => {
            debug!(telegram_id = %telegram_id, "No profile found");
            Ok(None)
        }
    }
}

async fn get_profile_by_id_tx(
    tx: &mut Transaction<'_, Postgres>,
    profile_id: i64,
) -> AppResult<Profile> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM profiles p JOIN accounts a ON a.id = p.account_id WHERE p.id = $1",
        PROFILE_COLUMNS
    ))
    .bind(profile_id)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(|row| profile_from_row(&row))
        .ok_or_else(|| AppError::NotFound(format!("profile {}", profile_id)))
}

/// Find-or-create the account and profile for a completed registration.
///
/// Runs in one transaction. A profile already linked to `telegram_id` is
/// returned as is. The account is looked up by all registration fields and
/// created otherwise, so an email registered under different names fails
/// with a uniqueness conflict. A profile without a Telegram identifier gets
/// it backfilled; one linked to another chat is a conflict.
pub async fn create_profile(
    pool: &PgPool,
    telegram_id: i64,
    registration: &Registration,
) -> AppResult<Profile> {
    let start = std::time::Instant::now();
    let span = db_span("create_profile", "profiles");
    let result = create_profile_inner(pool, telegram_id, registration)
        .instrument(span)
        .await;
    record_db_metrics("create_profile", start.elapsed());
    result
}

async fn create_profile_inner(
    pool: &PgPool,
    telegram_id: i64,
    registration: &Registration,
) -> AppResult<Profile> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query("SELECT id FROM profiles WHERE telegram_id = $1")
        .bind(telegram_id)
        .fetch_optional(&mut *tx)
        .await?;
    if let Some(row) = existing {
        let profile = get_profile_by_id_tx(&mut tx, row.get(0)).await?;
        tx.commit().await?;
        debug!(telegram_id = %telegram_id, "Profile already registered");
        return Ok(profile);
    }

    let account_row = sqlx::query(
        "SELECT id FROM accounts WHERE username = $1 AND first_name = $2 AND last_name = $3 AND email = $4",
    )
    .bind(&registration.email)
    .bind(&registration.first_name)
    .bind(&registration.last_name)
    .bind(&registration.email)
    .fetch_optional(&mut *tx)
    .await?;

    let account_id: i64 = match account_row {
        Some(row) => row.get(0),
        None => {
            let row = sqlx::query(
                "INSERT INTO accounts (username, first_name, last_name, email) VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(&registration.email)
            .bind(&registration.first_name)
            .bind(&registration.last_name)
            .bind(&registration.email)
            .fetch_one(&mut *tx)
            .await?;
            let id: i64 = row.get(0);
            info!(account_id = %id, "Account created");
            id
        }
    };

    let profile_row =
        sqlx::query("SELECT id, telegram_id FROM profiles WHERE account_id = $1 FOR UPDATE")
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await?;

    let profile_id: i64 = match profile_row {
        Some(row) => {
            let profile_id: i64 = row.get(0);
            let linked: Option<i64> = row.get(1);
            match linked {
                None => {
                    sqlx::query("UPDATE profiles SET telegram_id = $1 WHERE id = $2")
                        .bind(telegram_id)
                        .bind(profile_id)
                        .execute(&mut *tx)
                        .await?;
                    debug!(profile_id = %profile_id, "Backfilled telegram_id on existing profile");
                }
                Some(other) if other != telegram_id => {
                    return Err(AppError::Conflict(format!(
                        "account {} is already linked to another Telegram user",
                        registration.email
                    )));
                }
                Some(_) => {}
            }
            profile_id
        }
        None => {
            let row = sqlx::query(
                "INSERT INTO profiles (account_id, telegram_id) VALUES ($1, $2) RETURNING id",
            )
            .bind(account_id)
            .bind(telegram_id)
            .fetch_one(&mut *tx)
            .await?;
            row.get(0)
        }
    };

    let profile = get_profile_by_id_tx(&mut tx, profile_id).await?;
    tx.commit().await?;

    info!(telegram_id = %telegram_id, profile_id = %profile.id, "Profile registered");
    Ok(profile)
}

/// List all categories
pub async fn list_categories(pool: &PgPool) -> AppResult<Vec<Category>> {
    let start = std::time::Instant::now();
    let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id")
        .fetch_all(pool)
        .instrument(db_span("list_categories", "categories"))
        .await?;
    record_db_metrics("list_categories", start.elapsed());

    Ok(rows
        .into_iter()
        .map(|row| Category {
            id: row.get(0),
            name: row.get(1),
        })
        .collect())
}

/// List distinct recipes of a category, stable by recipe id
pub async fn list_recipes_by_category(
    pool: &PgPool,
    category_id: i64,
    limit: i64,
) -> AppResult<Vec<Recipe>> {
    let start = std::time::Instant::now();
    let rows = sqlx::query(
        "SELECT DISTINCT r.id, r.title, r.estimated_cost::FLOAT8, r.image
         FROM recipes r
         JOIN recipe_categories rc ON rc.recipe_id = r.id
         WHERE rc.category_id = $1
         ORDER BY r.id
         LIMIT $2",
    )
    .bind(category_id)
    .bind(limit)
    .fetch_all(pool)
    .instrument(db_span("list_recipes_by_category", "recipes"))
    .await?;
    record_db_metrics("list_recipes_by_category", start.elapsed());

    let recipes: Vec<Recipe> = rows.iter().map(recipe_from_row).collect();
    debug!(category_id = %category_id, count = recipes.len(), "Recipes listed for category");
    Ok(recipes)
}

/// Count all recipes
pub async fn count_recipes(pool: &PgPool) -> AppResult<i64> {
    let row = sqlx::query("SELECT COUNT(*) FROM recipes")
        .fetch_one(pool)
        .await?;
    Ok(row.get(0))
}

/// Get the recipe at a position of the id-ordered recipe list
pub async fn get_recipe_at_offset(pool: &PgPool, offset: i64) -> AppResult<Option<Recipe>> {
    let row = sqlx::query(
        "SELECT id, title, estimated_cost::FLOAT8, image FROM recipes ORDER BY id OFFSET $1 LIMIT 1",
    )
    .bind(offset)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(recipe_from_row))
}

/// Pick one recipe uniformly at random
pub async fn get_random_recipe(pool: &PgPool) -> AppResult<Option<Recipe>> {
    let start = std::time::Instant::now();
    let span = db_span("get_random_recipe", "recipes");
    let result = async {
        let count = count_recipes(pool).await?;
        if count == 0 {
            debug!("No recipes available");
            return Ok(None);
        }
        let offset = {
            use rand::Rng;
            rand::rng().random_range(0..count)
        };
        get_recipe_at_offset(pool, offset).await
    }
    .instrument(span)
    .await;
    record_db_metrics("get_random_recipe", start.elapsed());
    result
}

/// Steps of a recipe in ascending order
pub async fn get_recipe_steps(pool: &PgPool, recipe_id: i64) -> AppResult<Vec<Step>> {
    let start = std::time::Instant::now();
    let rows = sqlx::query(
        "SELECT id, recipe_id, step_order, text, image FROM steps WHERE recipe_id = $1 ORDER BY step_order, id",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .instrument(db_span("get_recipe_steps", "steps"))
    .await?;
    record_db_metrics("get_recipe_steps", start.elapsed());

    Ok(rows
        .into_iter()
        .map(|row| Step {
            id: row.get(0),
            recipe_id: row.get(1),
            order: row.get(2),
            text: row.get(3),
            image: row.get(4),
        })
        .collect())
}

/// Ingredient entries of a recipe
pub async fn get_recipe_ingredients(
    pool: &PgPool,
    recipe_id: i64,
) -> AppResult<Vec<RecipeIngredient>> {
    let start = std::time::Instant::now();
    let rows = sqlx::query(
        "SELECT i.name, ri.amount::FLOAT8, ri.unit
         FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = $1
         ORDER BY ri.id",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .instrument(db_span("get_recipe_ingredients", "recipe_ingredients"))
    .await?;
    record_db_metrics("get_recipe_ingredients", start.elapsed());

    Ok(rows
        .into_iter()
        .map(|row| RecipeIngredient {
            name: row.get(0),
            amount: row.get(1),
            unit: row.get(2),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first_name: &str) -> Profile {
        Profile {
            id: 1,
            telegram_id: Some(42),
            account: Account {
                id: 7,
                username: "cook@example.com".to_string(),
                first_name: first_name.to_string(),
                last_name: "Petrova".to_string(),
                email: "cook@example.com".to_string(),
                date_joined: Utc::now(),
            },
        }
    }

    #[test]
    fn test_display_name_prefers_first_name() {
        assert_eq!(profile("Anna").display_name(), "Anna");
        assert_eq!(profile("  ").display_name(), "cook@example.com");
    }
}
