//! Translatable Entity Persistence Library
//!
//! Generic scaffolding for persisting domain objects that carry
//! locale-specific translation records: entity contracts, sqlx-backed
//! generic repositories, and transactional service wrappers.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use self::config::DatabaseConfig;
pub use self::core::error::{AppError, Result};
pub use self::core::page::{Page, PageRequest};
pub use self::core::traits::{
    CrudRepository, IdType, NamedTranslation, Persistable, Translatable, Translation,
};
pub use self::modules::translatable::{TranslatableRepository, TranslatableService};
pub use self::modules::translation::{TranslationRepository, TranslationService};
