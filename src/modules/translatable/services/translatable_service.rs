use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::core::error::Result;
use crate::core::page::{Page, PageRequest};
use crate::core::traits::{IdType, Persistable, Translatable};
use crate::modules::translatable::repositories::TranslatableRepository;

/// Business-facing wrapper around `TranslatableRepository`
///
/// Reads forward 1:1; mutations run inside their own database
/// transaction. Deletes report "nothing matched" through a zero count,
/// never through an error.
pub struct TranslatableService<T> {
    repository: TranslatableRepository<T>,
}

impl<T> TranslatableService<T>
where
    T: Translatable + Persistable + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
    T::Id: IdType,
    T::Translation: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
{
    pub fn new(repository: TranslatableRepository<T>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &TranslatableRepository<T> {
        &self.repository
    }

    pub async fn exists_by_id_and_locale(&self, id: &T::Id, locale: &str) -> Result<bool> {
        self.repository.exists_by_id_and_locale(id, locale).await
    }

    pub async fn find_by_id_and_locale(&self, id: &T::Id, locale: &str) -> Result<Option<T>> {
        self.repository.find_by_id_and_locale(id, locale).await
    }

    pub async fn find_all_by_locale(&self, locale: &str) -> Result<Vec<T>> {
        self.repository.find_all_by_locale(locale).await
    }

    pub async fn find_all_by_locale_paged(
        &self,
        locale: &str,
        request: PageRequest,
    ) -> Result<Page<T>> {
        self.repository.find_all_by_locale_paged(locale, request).await
    }

    pub async fn find_translations_by_id(&self, id: &T::Id) -> Result<Vec<T::Translation>> {
        self.repository.find_translations_by_id(id).await
    }

    pub async fn find_translations_by_id_paged(
        &self,
        id: &T::Id,
        request: PageRequest,
    ) -> Result<Page<T::Translation>> {
        self.repository
            .find_translations_by_id_paged(id, request)
            .await
    }

    /// Save an entity inside a transaction and return the persisted row
    pub async fn save(&self, entity: &T) -> Result<T> {
        let mut tx = self.repository.pool().begin().await?;
        let saved = self.repository.save_with_tx(&mut tx, entity).await?;
        tx.commit().await?;
        tracing::info!(table = T::TABLE, "saved translatable entity");
        Ok(saved)
    }

    /// Delete every entity that has a translation with the locale
    ///
    /// Removes the owner rows themselves; sibling translations cascade
    /// with them. Returns 0 when nothing matched.
    pub async fn delete_by_locale(&self, locale: &str) -> Result<u64> {
        let mut tx = self.repository.pool().begin().await?;
        let deleted = self
            .repository
            .delete_by_locale_with_tx(&mut *tx, locale)
            .await?;
        tx.commit().await?;

        tracing::info!(locale, deleted, "deleted translatable entities by locale");
        Ok(deleted)
    }

    /// Delete the entity by id only if it has a translation with the
    /// locale. Returns 0 when nothing matched.
    pub async fn delete_by_id_and_locale(&self, id: &T::Id, locale: &str) -> Result<u64> {
        let mut tx = self.repository.pool().begin().await?;
        let deleted = self
            .repository
            .delete_by_id_and_locale_with_tx(&mut *tx, id, locale)
            .await?;
        tx.commit().await?;

        tracing::info!(id = ?id, locale, deleted, "deleted translatable entity by id and locale");
        Ok(deleted)
    }
}
