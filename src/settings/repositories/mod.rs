pub mod dev_settings_json_repository;
pub mod dev_settings_repository;

pub use dev_settings_json_repository::DevSettingsJsonRepository;
pub use dev_settings_repository::{DevSettingsRepository, InMemoryDevSettingsRepository};
