pub mod entity;
pub mod repository;

pub use entity::{NamedTranslation, Translatable, Translation};
pub use repository::{CrudRepository, IdType, Persistable, SqliteQuery};
