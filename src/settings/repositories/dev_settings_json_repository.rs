use std::path::PathBuf;

use tracing::warn;

use super::dev_settings_repository::DevSettingsRepository;
use crate::obryn::repositories::{BoxFuture, RepositoryError, RepositoryResult};
use crate::settings::models::DevSettingsModel;

/// JSON file-based repository for developer settings.
/// Stores one document at ~/.config/obryn/dev_settings.json.
pub struct DevSettingsJsonRepository {
    file_path: PathBuf,
}

impl DevSettingsJsonRepository {
    /// Create repository with XDG-compliant path
    pub fn new() -> RepositoryResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepositoryError::InitializationError {
            message: "Could not determine config directory".to_string(),
        })?;

        Ok(Self {
            file_path: config_dir.join("obryn").join("dev_settings.json"),
        })
    }

    /// Create repository with custom path (for testing)
    pub fn with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

impl DevSettingsRepository for DevSettingsJsonRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<DevSettingsModel>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            // First run: defaults
            if !path.exists() {
                return Ok(DevSettingsModel::default());
            }

            let contents = tokio::fs::read_to_string(&path).await?;

            match serde_json::from_str::<DevSettingsModel>(&contents) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Discarding unreadable settings");
                    Ok(DevSettingsModel::default())
                }
            }
        })
    }

    fn save(&self, settings: DevSettingsModel) -> BoxFuture<'static, RepositoryResult<()>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let json = serde_json::to_string_pretty(&settings)?;

            // Write atomically using temp file + rename
            let temp_path = path.with_extension("json.tmp");
            tokio::fs::write(&temp_path, json).await?;
            tokio::fs::rename(&temp_path, &path).await?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::models::ResponseLength;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DevSettingsJsonRepository::with_path(dir.path().join("dev_settings.json"));

        let settings = repo.load().await.unwrap();
        assert_eq!(settings, DevSettingsModel::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DevSettingsJsonRepository::with_path(dir.path().join("dev_settings.json"));

        let settings = DevSettingsModel {
            custom_system_prompt: "Answer in haiku.".to_string(),
            response_length: ResponseLength::Long,
            no_restrictions: false,
            site_password: "secret".to_string(),
        };

        repo.save(settings.clone()).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), settings);
    }
}
