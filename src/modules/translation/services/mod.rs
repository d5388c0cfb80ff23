mod translation_service;

pub use translation_service::TranslationService;
