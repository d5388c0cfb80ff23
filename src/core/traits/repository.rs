use async_trait::async_trait;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Encode, Sqlite, Type};

use crate::core::error::Result;

/// A prepared SQLite statement under construction.
pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Marker for identifier types that can be bound to SQLite queries.
///
/// Blanket-implemented; concrete pairs pick any identifier type that
/// SQLite can store (`i64`, `String`, ...).
pub trait IdType:
    for<'q> Encode<'q, Sqlite> + Type<Sqlite> + Clone + std::fmt::Debug + Send + Sync + Unpin + 'static
{
}

impl<T> IdType for T where
    T: for<'q> Encode<'q, Sqlite>
        + Type<Sqlite>
        + Clone
        + std::fmt::Debug
        + Send
        + Sync
        + Unpin
        + 'static
{
}

/// Column mapping used by generic `save`.
///
/// `COLUMNS` lists every column written on insert, primary key
/// included; `bind_columns` pushes the field values in the same order.
pub trait Persistable {
    const COLUMNS: &'static [&'static str];

    fn bind_columns<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

/// Base repository trait for CRUD operations
/// All repositories should implement this trait for consistency
#[async_trait]
pub trait CrudRepository<T, Id>: Send + Sync {
    /// Insert the entity, or update the existing row on primary key conflict
    async fn save(&self, entity: &T) -> Result<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: &Id) -> Result<Option<T>>;

    /// Check whether a row with the given ID exists
    async fn exists_by_id(&self, id: &Id) -> Result<bool>;

    /// List all entities (with optional pagination), ordered by ID
    async fn find_all(&self, limit: Option<u32>, offset: Option<u32>) -> Result<Vec<T>>;

    /// Count all rows
    async fn count(&self) -> Result<u64>;

    /// Delete an entity by ID, returning the number of rows removed
    async fn delete_by_id(&self, id: &Id) -> Result<u64>;
}

/// Builds the insert-or-update statement `save` executes.
pub(crate) fn build_upsert_sql(table: &str, id_column: &str, columns: &[&str]) -> String {
    let column_list = columns.join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    let assignments: Vec<String> = columns
        .iter()
        .filter(|column| **column != id_column)
        .map(|column| format!("{column} = excluded.{column}"))
        .collect();

    if assignments.is_empty() {
        format!(
            "INSERT INTO {table} ({column_list}) VALUES ({placeholders}) \
             ON CONFLICT({id_column}) DO NOTHING"
        )
    } else {
        format!(
            "INSERT INTO {table} ({column_list}) VALUES ({placeholders}) \
             ON CONFLICT({id_column}) DO UPDATE SET {assignments}",
            assignments = assignments.join(", ")
        )
    }
}
