use std::sync::Arc;

use parking_lot::Mutex;

use crate::obryn::repositories::{BoxFuture, RepositoryResult};
use crate::settings::models::DevSettingsModel;

pub trait DevSettingsRepository: Send + Sync + 'static {
    /// Load developer settings from storage
    fn load(&self) -> BoxFuture<'static, RepositoryResult<DevSettingsModel>>;

    /// Save developer settings to storage
    fn save(&self, settings: DevSettingsModel) -> BoxFuture<'static, RepositoryResult<()>>;
}

/// In-memory settings repository, useful for testing and development.
#[derive(Clone, Default)]
pub struct InMemoryDevSettingsRepository {
    settings: Arc<Mutex<DevSettingsModel>>,
}

impl InMemoryDevSettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DevSettingsRepository for InMemoryDevSettingsRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<DevSettingsModel>> {
        let settings = self.settings.clone();
        Box::pin(async move { Ok(settings.lock().clone()) })
    }

    fn save(&self, new_settings: DevSettingsModel) -> BoxFuture<'static, RepositoryResult<()>> {
        let settings = self.settings.clone();
        Box::pin(async move {
            *settings.lock() = new_settings;
            Ok(())
        })
    }
}
