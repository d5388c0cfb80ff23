use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection, SqlitePool};
use std::marker::PhantomData;

use crate::core::error::Result;
use crate::core::page::{Page, PageRequest};
use crate::core::traits::repository::build_upsert_sql;
use crate::core::traits::{CrudRepository, IdType, Persistable, Translatable, Translation};

/// Generic store for owning entities with locale-scoped lookups
///
/// Join targets (the translation table and its columns) come from the
/// entity's `Translation` associated type.
pub struct TranslatableRepository<T> {
    pool: SqlitePool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TranslatableRepository<T>
where
    T: Translatable + Persistable + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
    T::Id: IdType,
    T::Translation: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
{
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the database connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// True if the entity exists and has a translation with the locale
    pub async fn exists_by_id_and_locale(&self, id: &T::Id, locale: &str) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(\
                 SELECT 1 FROM {entity_table} e \
                 JOIN {tr_table} t ON t.{owner_col} = e.{id_col} \
                 WHERE e.{id_col} = ? AND t.{locale_col} = ?\
             )",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            locale_col = <T::Translation as Translation>::LOCALE_COLUMN,
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(id.clone())
            .bind(locale)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// The entity, with its translations attached, if it has a
    /// translation with the locale
    pub async fn find_by_id_and_locale(&self, id: &T::Id, locale: &str) -> Result<Option<T>> {
        let sql = format!(
            "SELECT e.* FROM {entity_table} e \
             JOIN {tr_table} t ON t.{owner_col} = e.{id_col} \
             WHERE e.{id_col} = ? AND t.{locale_col} = ? LIMIT 1",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            locale_col = <T::Translation as Translation>::LOCALE_COLUMN,
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id.clone())
            .bind(locale)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(mut entity) => {
                let translations = self.fetch_translations(&self.pool, id).await?;
                entity.set_translations(translations);
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    /// Every entity that has a translation with the locale
    ///
    /// One row per entity regardless of how many translation rows match.
    pub async fn find_all_by_locale(&self, locale: &str) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT * FROM {entity_table} \
             WHERE {id_col} IN (SELECT {owner_col} FROM {tr_table} WHERE {locale_col} = ?) \
             ORDER BY {id_col}",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            locale_col = <T::Translation as Translation>::LOCALE_COLUMN,
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(locale)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One page of `find_all_by_locale` plus the total entity count
    pub async fn find_all_by_locale_paged(
        &self,
        locale: &str,
        request: PageRequest,
    ) -> Result<Page<T>> {
        let count_sql = format!(
            "SELECT COUNT(*) FROM {entity_table} \
             WHERE {id_col} IN (SELECT {owner_col} FROM {tr_table} WHERE {locale_col} = ?)",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            locale_col = <T::Translation as Translation>::LOCALE_COLUMN,
        );
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(locale)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM {entity_table} \
             WHERE {id_col} IN (SELECT {owner_col} FROM {tr_table} WHERE {locale_col} = ?) \
             ORDER BY {id_col} LIMIT ? OFFSET ?",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            locale_col = <T::Translation as Translation>::LOCALE_COLUMN,
        );
        let items = sqlx::query_as::<_, T>(&sql)
            .bind(locale)
            .bind(i64::from(request.size()))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, request, total as u64))
    }

    /// All translations for one entity, any locale
    pub async fn find_translations_by_id(&self, id: &T::Id) -> Result<Vec<T::Translation>> {
        self.fetch_translations(&self.pool, id).await
    }

    /// One page of an entity's translations plus the total row count
    pub async fn find_translations_by_id_paged(
        &self,
        id: &T::Id,
        request: PageRequest,
    ) -> Result<Page<T::Translation>> {
        let count_sql = format!(
            "SELECT COUNT(*) FROM {tr_table} WHERE {owner_col} = ?",
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
        );
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(id.clone())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM {tr_table} WHERE {owner_col} = ? ORDER BY {tr_id_col} LIMIT ? OFFSET ?",
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            tr_id_col = <T::Translation as Translation>::ID_COLUMN,
        );
        let items = sqlx::query_as::<_, T::Translation>(&sql)
            .bind(id.clone())
            .bind(i64::from(request.size()))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, request, total as u64))
    }

    /// Delete every ENTITY that has a translation with the locale
    ///
    /// This removes the owner rows, not just the matching translation
    /// rows; sibling translations in other locales go with the parent
    /// through the schema's ON DELETE CASCADE foreign key. Returns the
    /// number of entities deleted.
    pub async fn delete_by_locale(&self, locale: &str) -> Result<u64> {
        self.delete_by_locale_with_tx(&self.pool, locale).await
    }

    /// `delete_by_locale` against an explicit executor
    pub async fn delete_by_locale_with_tx<'a, E>(&self, executor: E, locale: &str) -> Result<u64>
    where
        E: Executor<'a, Database = Sqlite>,
    {
        let sql = format!(
            "DELETE FROM {entity_table} WHERE EXISTS (\
                 SELECT 1 FROM {tr_table} t \
                 WHERE t.{owner_col} = {entity_table}.{id_col} AND t.{locale_col} = ?\
             )",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            locale_col = <T::Translation as Translation>::LOCALE_COLUMN,
        );
        let result = sqlx::query(&sql).bind(locale).execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Delete the entity by id only if it has a translation with the
    /// locale, returning 0 or 1
    pub async fn delete_by_id_and_locale(&self, id: &T::Id, locale: &str) -> Result<u64> {
        self.delete_by_id_and_locale_with_tx(&self.pool, id, locale)
            .await
    }

    /// `delete_by_id_and_locale` against an explicit executor
    pub async fn delete_by_id_and_locale_with_tx<'a, E>(
        &self,
        executor: E,
        id: &T::Id,
        locale: &str,
    ) -> Result<u64>
    where
        E: Executor<'a, Database = Sqlite>,
    {
        let sql = format!(
            "DELETE FROM {entity_table} WHERE {id_col} = ? AND EXISTS (\
                 SELECT 1 FROM {tr_table} t \
                 WHERE t.{owner_col} = {entity_table}.{id_col} AND t.{locale_col} = ?\
             )",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            locale_col = <T::Translation as Translation>::LOCALE_COLUMN,
        );
        let result = sqlx::query(&sql)
            .bind(id.clone())
            .bind(locale)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Insert or update the entity on a specific connection, then
    /// re-read the persisted row with its translations attached
    pub async fn save_with_tx(&self, conn: &mut SqliteConnection, entity: &T) -> Result<T> {
        let sql = build_upsert_sql(T::TABLE, T::ID_COLUMN, T::COLUMNS);
        entity
            .bind_columns(sqlx::query(&sql))
            .execute(&mut *conn)
            .await?;

        let fetch_sql = format!(
            "SELECT * FROM {entity_table} WHERE {id_col} = ?",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
        );
        let mut saved = sqlx::query_as::<_, T>(&fetch_sql)
            .bind(entity.id())
            .fetch_one(&mut *conn)
            .await?;

        let translations = self.fetch_translations(&mut *conn, &entity.id()).await?;
        saved.set_translations(translations);
        Ok(saved)
    }

    async fn fetch_translations<'a, E>(&self, executor: E, id: &T::Id) -> Result<Vec<T::Translation>>
    where
        E: Executor<'a, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT * FROM {tr_table} WHERE {owner_col} = ? ORDER BY {tr_id_col}",
            tr_table = <T::Translation as Translation>::TABLE,
            owner_col = <T::Translation as Translation>::OWNER_ID_COLUMN,
            tr_id_col = <T::Translation as Translation>::ID_COLUMN,
        );
        let rows = sqlx::query_as::<_, T::Translation>(&sql)
            .bind(id.clone())
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl<T> CrudRepository<T, T::Id> for TranslatableRepository<T>
where
    T: Translatable + Persistable + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
    T::Id: IdType,
    T::Translation: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
{
    async fn save(&self, entity: &T) -> Result<T> {
        let mut conn = self.pool.acquire().await?;
        self.save_with_tx(&mut conn, entity).await
    }

    async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>> {
        let sql = format!(
            "SELECT * FROM {entity_table} WHERE {id_col} = ?",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
        );
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id.clone())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(mut entity) => {
                let translations = self.fetch_translations(&self.pool, id).await?;
                entity.set_translations(translations);
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    async fn exists_by_id(&self, id: &T::Id) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {entity_table} WHERE {id_col} = ?)",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(id.clone())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Bare entity rows, without translations attached
    async fn find_all(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT * FROM {entity_table} ORDER BY {id_col} LIMIT ? OFFSET ?",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
        );
        // LIMIT -1 means "no limit" to SQLite
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(limit.map_or(-1_i64, i64::from))
            .bind(offset.map_or(0_i64, i64::from))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {entity_table}", entity_table = T::TABLE);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }

    async fn delete_by_id(&self, id: &T::Id) -> Result<u64> {
        let sql = format!(
            "DELETE FROM {entity_table} WHERE {id_col} = ?",
            entity_table = T::TABLE,
            id_col = T::ID_COLUMN,
        );
        let result = sqlx::query(&sql)
            .bind(id.clone())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
