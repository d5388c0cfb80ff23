// Translatable entities module

pub mod repositories;
pub mod services;

pub use repositories::TranslatableRepository;
pub use services::TranslatableService;
