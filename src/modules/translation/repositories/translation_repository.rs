use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, FromRow, Sqlite, SqliteConnection, SqlitePool};
use std::marker::PhantomData;

use crate::core::error::Result;
use crate::core::page::{Page, PageRequest};
use crate::core::traits::repository::build_upsert_sql;
use crate::core::traits::{CrudRepository, IdType, NamedTranslation, Persistable, Translation};

/// Generic store for translation rows
///
/// Table and column names come from the `Translation` impl of `TR`, so
/// one repository serves every concrete translation type.
pub struct TranslationRepository<TR> {
    pool: SqlitePool,
    _marker: PhantomData<fn() -> TR>,
}

impl<TR> TranslationRepository<TR>
where
    TR: Translation + Persistable + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
    TR::Id: IdType,
    TR::OwnerId: IdType,
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

    /// True if at least one translation with the locale exists, across all owners
    pub async fn exists_by_locale(&self, locale: &str) -> Result<bool> {
        self.exists_by_locale_with_tx(&self.pool, locale).await
    }

    /// `exists_by_locale` against an explicit executor
    pub async fn exists_by_locale_with_tx<'a, E>(&self, executor: E, locale: &str) -> Result<bool>
    where
        E: Executor<'a, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {locale_col} = ?)",
            table = TR::TABLE,
            locale_col = TR::LOCALE_COLUMN,
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(locale)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    /// True if the owner has at least one translation in any locale
    pub async fn exists_by_owner_id(&self, owner_id: &TR::OwnerId) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {owner_col} = ?)",
            table = TR::TABLE,
            owner_col = TR::OWNER_ID_COLUMN,
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(owner_id.clone())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// True if the owner has a translation with the given locale
    pub async fn exists_by_owner_id_and_locale(
        &self,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {owner_col} = ? AND {locale_col} = ?)",
            table = TR::TABLE,
            owner_col = TR::OWNER_ID_COLUMN,
            locale_col = TR::LOCALE_COLUMN,
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(owner_id.clone())
            .bind(locale)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// All translations for one owner, ordered by primary key
    pub async fn find_by_owner_id(&self, owner_id: &TR::OwnerId) -> Result<Vec<TR>> {
        let sql = format!(
            "SELECT * FROM {table} WHERE {owner_col} = ? ORDER BY {id_col}",
            table = TR::TABLE,
            owner_col = TR::OWNER_ID_COLUMN,
            id_col = TR::ID_COLUMN,
        );
        let rows = sqlx::query_as::<_, TR>(&sql)
            .bind(owner_id.clone())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One page of an owner's translations plus the total row count
    pub async fn find_by_owner_id_paged(
        &self,
        owner_id: &TR::OwnerId,
        request: PageRequest,
    ) -> Result<Page<TR>> {
        let count_sql = format!(
            "SELECT COUNT(*) FROM {table} WHERE {owner_col} = ?",
            table = TR::TABLE,
            owner_col = TR::OWNER_ID_COLUMN,
        );
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(owner_id.clone())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT * FROM {table} WHERE {owner_col} = ? ORDER BY {id_col} LIMIT ? OFFSET ?",
            table = TR::TABLE,
            owner_col = TR::OWNER_ID_COLUMN,
            id_col = TR::ID_COLUMN,
        );
        let items = sqlx::query_as::<_, TR>(&sql)
            .bind(owner_id.clone())
            .bind(i64::from(request.size()))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, request, total as u64))
    }

    /// The owner's translation for one locale
    ///
    /// At most one row exists per owner and locale when the backing
    /// schema enforces the uniqueness index. If it does not, the row
    /// with the lowest primary key wins.
    pub async fn find_by_owner_id_and_locale(
        &self,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<Option<TR>> {
        self.find_by_owner_id_and_locale_with_tx(&self.pool, owner_id, locale)
            .await
    }

    /// `find_by_owner_id_and_locale` against an explicit executor
    pub async fn find_by_owner_id_and_locale_with_tx<'a, E>(
        &self,
        executor: E,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<Option<TR>>
    where
        E: Executor<'a, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT * FROM {table} WHERE {owner_col} = ? AND {locale_col} = ? \
             ORDER BY {id_col} LIMIT 1",
            table = TR::TABLE,
            owner_col = TR::OWNER_ID_COLUMN,
            locale_col = TR::LOCALE_COLUMN,
            id_col = TR::ID_COLUMN,
        );
        let row = sqlx::query_as::<_, TR>(&sql)
            .bind(owner_id.clone())
            .bind(locale)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Remove every translation with the locale, across all owners
    pub async fn delete_by_locale(&self, locale: &str) -> Result<u64> {
        self.delete_by_locale_with_tx(&self.pool, locale).await
    }

    /// `delete_by_locale` against an explicit executor
    pub async fn delete_by_locale_with_tx<'a, E>(&self, executor: E, locale: &str) -> Result<u64>
    where
        E: Executor<'a, Database = Sqlite>,
    {
        let sql = format!(
            "DELETE FROM {table} WHERE {locale_col} = ?",
            table = TR::TABLE,
            locale_col = TR::LOCALE_COLUMN,
        );
        let result = sqlx::query(&sql).bind(locale).execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Remove the owner's translation for one locale, returning 0 or 1
    pub async fn delete_by_owner_id_and_locale(
        &self,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<u64> {
        self.delete_by_owner_id_and_locale_with_tx(&self.pool, owner_id, locale)
            .await
    }

    /// `delete_by_owner_id_and_locale` against an explicit executor
    pub async fn delete_by_owner_id_and_locale_with_tx<'a, E>(
        &self,
        executor: E,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<u64>
    where
        E: Executor<'a, Database = Sqlite>,
    {
        let sql = format!(
            "DELETE FROM {table} WHERE {owner_col} = ? AND {locale_col} = ?",
            table = TR::TABLE,
            owner_col = TR::OWNER_ID_COLUMN,
            locale_col = TR::LOCALE_COLUMN,
        );
        let result = sqlx::query(&sql)
            .bind(owner_id.clone())
            .bind(locale)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Insert or update the translation on a specific connection,
    /// then re-read the persisted row
    pub async fn save_with_tx(
        &self,
        conn: &mut SqliteConnection,
        translation: &TR,
    ) -> Result<TR> {
        let sql = build_upsert_sql(TR::TABLE, TR::ID_COLUMN, TR::COLUMNS);
        translation
            .bind_columns(sqlx::query(&sql))
            .execute(&mut *conn)
            .await?;

        let fetch_sql = format!(
            "SELECT * FROM {table} WHERE {id_col} = ?",
            table = TR::TABLE,
            id_col = TR::ID_COLUMN,
        );
        let row = sqlx::query_as::<_, TR>(&fetch_sql)
            .bind(translation.id())
            .fetch_one(&mut *conn)
            .await?;
        Ok(row)
    }
}

impl<TR> TranslationRepository<TR>
where
    TR: NamedTranslation
        + Persistable
        + for<'r> FromRow<'r, SqliteRow>
        + Send
        + Sync
        + Unpin
        + 'static,
    TR::Id: IdType,
    TR::OwnerId: IdType,
{
    /// All translations matching a localized name
    ///
    /// Only available for translation types that declare a name column.
    pub async fn find_by_name_and_locale(&self, name: &str, locale: &str) -> Result<Vec<TR>> {
        let sql = format!(
            "SELECT * FROM {table} WHERE {name_col} = ? AND {locale_col} = ? ORDER BY {id_col}",
            table = TR::TABLE,
            name_col = TR::NAME_COLUMN,
            locale_col = TR::LOCALE_COLUMN,
            id_col = TR::ID_COLUMN,
        );
        let rows = sqlx::query_as::<_, TR>(&sql)
            .bind(name)
            .bind(locale)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl<TR> CrudRepository<TR, TR::Id> for TranslationRepository<TR>
where
    TR: Translation + Persistable + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
    TR::Id: IdType,
    TR::OwnerId: IdType,
{
    async fn save(&self, entity: &TR) -> Result<TR> {
        let mut conn = self.pool.acquire().await?;
        self.save_with_tx(&mut conn, entity).await
    }

    async fn find_by_id(&self, id: &TR::Id) -> Result<Option<TR>> {
        let sql = format!(
            "SELECT * FROM {table} WHERE {id_col} = ?",
            table = TR::TABLE,
            id_col = TR::ID_COLUMN,
        );
        let row = sqlx::query_as::<_, TR>(&sql)
            .bind(id.clone())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists_by_id(&self, id: &TR::Id) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {id_col} = ?)",
            table = TR::TABLE,
            id_col = TR::ID_COLUMN,
        );
        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(id.clone())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_all(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<TR>> {
        let sql = format!(
            "SELECT * FROM {table} ORDER BY {id_col} LIMIT ? OFFSET ?",
            table = TR::TABLE,
            id_col = TR::ID_COLUMN,
        );
        // LIMIT -1 means "no limit" to SQLite
        let rows = sqlx::query_as::<_, TR>(&sql)
            .bind(limit.map_or(-1_i64, i64::from))
            .bind(offset.map_or(0_i64, i64::from))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {table}", table = TR::TABLE);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }

    async fn delete_by_id(&self, id: &TR::Id) -> Result<u64> {
        let sql = format!(
            "DELETE FROM {table} WHERE {id_col} = ?",
            table = TR::TABLE,
            id_col = TR::ID_COLUMN,
        );
        let result = sqlx::query(&sql)
            .bind(id.clone())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
