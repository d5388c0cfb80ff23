//! Shared test fixtures: an in-memory SQLite database and a concrete
//! category/category-translation pair implementing the generic
//! contracts.
//!
//! The schema deliberately omits a UNIQUE(category_id, locale) index so
//! duplicate-locale rows can be seeded; enforcing that invariant is the
//! deploying application's concern.

#![allow(dead_code)]

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

use translatable::core::traits::SqliteQuery;
use translatable::{
    CrudRepository, NamedTranslation, Persistable, Translatable, TranslatableRepository,
    Translation, TranslationRepository,
};

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub position: i64,
    #[sqlx(skip)]
    pub translations: Vec<CategoryTranslation>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CategoryTranslation {
    pub id: String,
    pub category_id: String,
    pub locale: String,
    pub name: String,
    pub description: Option<String>,
}

impl Translatable for Category {
    type Id = String;
    type Translation = CategoryTranslation;

    const TABLE: &'static str = "categories";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn translations(&self) -> &[CategoryTranslation] {
        &self.translations
    }

    fn set_translations(&mut self, translations: Vec<CategoryTranslation>) {
        self.translations = translations;
    }
}

impl Persistable for Category {
    const COLUMNS: &'static [&'static str] = &["id", "slug", "position"];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query.bind(&self.id).bind(&self.slug).bind(self.position)
    }
}

impl Translation for CategoryTranslation {
    type Id = String;
    type OwnerId = String;

    const TABLE: &'static str = "category_translations";
    const OWNER_ID_COLUMN: &'static str = "category_id";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn owner_id(&self) -> String {
        self.category_id.clone()
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}

impl NamedTranslation for CategoryTranslation {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Persistable for CategoryTranslation {
    const COLUMNS: &'static [&'static str] =
        &["id", "category_id", "locale", "name", "description"];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.id)
            .bind(&self.category_id)
            .bind(&self.locale)
            .bind(&self.name)
            .bind(&self.description)
    }
}

/// In-memory SQLite pool with foreign key enforcement on
pub async fn setup_test_db() -> SqlitePool {
    init_tracing();

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse SQLite URL")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create connection pool");

    sqlx::query(
        r#"
        CREATE TABLE categories (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create categories table");

    sqlx::query(
        r#"
        CREATE TABLE category_translations (
            id TEXT PRIMARY KEY,
            category_id TEXT NOT NULL REFERENCES categories (id) ON DELETE CASCADE,
            locale TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create category_translations table");

    pool
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn category(id: &str, slug: &str) -> Category {
    Category {
        id: id.to_string(),
        slug: slug.to_string(),
        position: 0,
        translations: Vec::new(),
    }
}

pub fn translation(id: &str, category_id: &str, locale: &str, name: &str) -> CategoryTranslation {
    CategoryTranslation {
        id: id.to_string(),
        category_id: category_id.to_string(),
        locale: locale.to_string(),
        name: name.to_string(),
        description: None,
    }
}

/// Standard fixture: "drinks" with en+tr translations, "food" with en
/// only, "empty" with none.
pub async fn seed_categories(pool: &SqlitePool) {
    let categories = TranslatableRepository::<Category>::new(pool.clone());
    let translations = TranslationRepository::<CategoryTranslation>::new(pool.clone());

    for entity in [
        category("drinks", "drinks"),
        category("food", "food"),
        category("empty", "empty"),
    ] {
        categories
            .save(&entity)
            .await
            .expect("Failed to seed category");
    }

    for row in [
        translation("tr-drinks-en", "drinks", "en", "Drinks"),
        translation("tr-drinks-tr", "drinks", "tr", "Icecekler"),
        translation("tr-food-en", "food", "en", "Food"),
    ] {
        translations
            .save(&row)
            .await
            .expect("Failed to seed translation");
    }
}
