//! Contracts implemented by concrete translatable/translation pairs.
//!
//! The physical mapping (table and column names) travels with the
//! entity type as associated consts, so a single generic repository
//! implementation serves every concrete pair.

/// A locale-specific variant record tied to exactly one owning entity.
///
/// The owner is referenced by its identifier; the relationship itself
/// lives in the backing store as a foreign key.
pub trait Translation: Send + Sync {
    /// Identifier type of the translation row.
    type Id;
    /// Identifier type of the owning entity.
    type OwnerId;

    /// Table the translation rows live in.
    const TABLE: &'static str;
    /// Primary key column.
    const ID_COLUMN: &'static str = "id";
    /// Foreign key column referencing the owner's primary key.
    const OWNER_ID_COLUMN: &'static str;
    /// Column holding the locale string (e.g. "en", "tr").
    const LOCALE_COLUMN: &'static str = "locale";

    fn id(&self) -> Self::Id;

    fn owner_id(&self) -> Self::OwnerId;

    fn locale(&self) -> &str;
}

/// An owning entity with zero or more translations attached.
///
/// At most one translation per locale is expected per entity. That
/// uniqueness is not enforced here; it belongs to the backing schema.
pub trait Translatable: Send + Sync {
    /// Identifier type of the entity.
    type Id;
    /// The translation type owned by this entity.
    type Translation: Translation<OwnerId = Self::Id>;

    /// Table the entity rows live in.
    const TABLE: &'static str;
    /// Primary key column.
    const ID_COLUMN: &'static str = "id";

    fn id(&self) -> Self::Id;

    /// Translations currently attached in memory. Repositories populate
    /// this on single-entity loads; collection loads return bare rows.
    fn translations(&self) -> &[Self::Translation];

    /// Replaces the in-memory translation collection.
    fn set_translations(&mut self, translations: Vec<Self::Translation>);
}

/// Extension contract for translation types carrying a localized name.
///
/// The base contract makes no assumption about payload fields;
/// name-scoped queries exist only for types that opt in here.
pub trait NamedTranslation: Translation {
    /// Column holding the localized name.
    const NAME_COLUMN: &'static str = "name";

    fn name(&self) -> &str;
}
