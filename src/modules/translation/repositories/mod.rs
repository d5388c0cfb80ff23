mod translation_repository;

pub use translation_repository::TranslationRepository;
