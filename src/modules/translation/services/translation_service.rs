use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

use crate::core::error::{AppError, Result};
use crate::core::page::{Page, PageRequest};
use crate::core::traits::{IdType, NamedTranslation, Persistable, Translation};
use crate::modules::translation::repositories::TranslationRepository;

/// Business-facing wrapper around `TranslationRepository`
///
/// Reads forward 1:1. Mutations run inside their own database
/// transaction, and the delete operations guard first: deleting a
/// translation that does not exist is an error here, unlike the
/// silent-zero policy of the translatable service.
pub struct TranslationService<TR> {
    repository: TranslationRepository<TR>,
}

impl<TR> TranslationService<TR>
where
    TR: Translation + Persistable + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static,
    TR::Id: IdType,
    TR::OwnerId: IdType,
{
    pub fn new(repository: TranslationRepository<TR>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &TranslationRepository<TR> {
        &self.repository
    }

    pub async fn exists_by_locale(&self, locale: &str) -> Result<bool> {
        self.repository.exists_by_locale(locale).await
    }

    pub async fn exists_by_owner_id(&self, owner_id: &TR::OwnerId) -> Result<bool> {
        self.repository.exists_by_owner_id(owner_id).await
    }

    pub async fn exists_by_owner_id_and_locale(
        &self,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<bool> {
        self.repository
            .exists_by_owner_id_and_locale(owner_id, locale)
            .await
    }

    pub async fn find_by_owner_id(&self, owner_id: &TR::OwnerId) -> Result<Vec<TR>> {
        self.repository.find_by_owner_id(owner_id).await
    }

    pub async fn find_by_owner_id_paged(
        &self,
        owner_id: &TR::OwnerId,
        request: PageRequest,
    ) -> Result<Page<TR>> {
        self.repository
            .find_by_owner_id_paged(owner_id, request)
            .await
    }

    pub async fn find_by_owner_id_and_locale(
        &self,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<Option<TR>> {
        self.repository
            .find_by_owner_id_and_locale(owner_id, locale)
            .await
    }

    /// Save a translation inside a transaction and return the
    /// persisted row
    pub async fn save(&self, translation: &TR) -> Result<TR> {
        let mut tx = self.repository.pool().begin().await?;
        let saved = self.repository.save_with_tx(&mut tx, translation).await?;
        tx.commit().await?;
        tracing::info!(table = TR::TABLE, locale = saved.locale(), "saved translation");
        Ok(saved)
    }

    /// Delete the owner's translation for one locale
    ///
    /// Fails with `NotFound` when no matching translation exists; the
    /// transaction is dropped and nothing is mutated.
    pub async fn delete_by_owner_id_and_locale(
        &self,
        owner_id: &TR::OwnerId,
        locale: &str,
    ) -> Result<u64> {
        let mut tx = self.repository.pool().begin().await?;

        let existing = self
            .repository
            .find_by_owner_id_and_locale_with_tx(&mut *tx, owner_id, locale)
            .await?;
        if existing.is_none() {
            tracing::warn!(owner_id = ?owner_id, locale, "delete rejected, translation missing");
            return Err(AppError::not_found(format!(
                "translation for owner id {owner_id:?} and locale {locale} not found"
            )));
        }

        let deleted = self
            .repository
            .delete_by_owner_id_and_locale_with_tx(&mut *tx, owner_id, locale)
            .await?;
        tx.commit().await?;

        tracing::info!(owner_id = ?owner_id, locale, deleted, "deleted translation");
        Ok(deleted)
    }

    /// Delete every translation with the locale, across all owners
    ///
    /// Fails with `Validation` when the locale has no rows at all.
    pub async fn delete_by_locale(&self, locale: &str) -> Result<u64> {
        let mut tx = self.repository.pool().begin().await?;

        if !self
            .repository
            .exists_by_locale_with_tx(&mut *tx, locale)
            .await?
        {
            tracing::warn!(locale, "delete rejected, no translations for locale");
            return Err(AppError::validation(format!(
                "no translations found for locale {locale}"
            )));
        }

        let deleted = self
            .repository
            .delete_by_locale_with_tx(&mut *tx, locale)
            .await?;
        tx.commit().await?;

        tracing::info!(locale, deleted, "deleted translations by locale");
        Ok(deleted)
    }
}

impl<TR> TranslationService<TR>
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
    pub async fn find_by_name_and_locale(&self, name: &str, locale: &str) -> Result<Vec<TR>> {
        self.repository.find_by_name_and_locale(name, locale).await
    }
}
