pub mod dev_settings;

pub use dev_settings::{DevSettingsModel, ResponseLength};
