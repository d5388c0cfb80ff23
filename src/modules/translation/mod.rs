// Translation records module

pub mod repositories;
pub mod services;

pub use repositories::TranslationRepository;
pub use services::TranslationService;
