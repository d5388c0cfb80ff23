mod translatable_repository;

pub use translatable_repository::TranslatableRepository;
