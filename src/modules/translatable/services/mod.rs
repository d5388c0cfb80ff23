mod translatable_service;

pub use translatable_service::TranslatableService;
