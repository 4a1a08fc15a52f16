use std::path::PathBuf;

use tracing::warn;

use super::error::{RepositoryError, RepositoryResult};
use super::snapshot_repository::{BoxFuture, SnapshotRepository, StoreSnapshot};

/// JSON file-based repository for the conversation snapshot.
/// Stores one document at ~/.config/obryn/conversations.json.
pub struct JsonSnapshotRepository {
    file_path: PathBuf,
}

impl JsonSnapshotRepository {
    /// Create repository with XDG-compliant path
    pub fn new() -> RepositoryResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepositoryError::InitializationError {
            message: "Could not determine config directory".to_string(),
        })?;

        Ok(Self {
            file_path: config_dir.join("obryn").join("conversations.json"),
        })
    }

    /// Create repository with custom path (for testing)
    pub fn with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn storage_path(&self) -> &PathBuf {
        &self.file_path
    }
}

impl SnapshotRepository for JsonSnapshotRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<StoreSnapshot>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            // First run: no file yet
            if !path.exists() {
                return Ok(StoreSnapshot::default());
            }

            let contents = tokio::fs::read_to_string(&path).await?;

            // A corrupt snapshot is "no data", never fatal
            match serde_json::from_str::<StoreSnapshot>(&contents) {
                Ok(snapshot) => Ok(snapshot),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Discarding unreadable snapshot");
                    Ok(StoreSnapshot::default())
                }
            }
        })
    }

    fn save(&self, snapshot: StoreSnapshot) -> BoxFuture<'static, RepositoryResult<()>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let json = serde_json::to_string_pretty(&snapshot)?;

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
    use crate::obryn::models::Conversation;

    fn repo_in(dir: &tempfile::TempDir) -> JsonSnapshotRepository {
        JsonSnapshotRepository::with_path(dir.path().join("conversations.json"))
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);

        let snapshot = repo.load().await.unwrap();
        assert!(snapshot.conversations.is_empty());
        assert!(snapshot.active_id.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        std::fs::write(&path, "{ not json").unwrap();

        let repo = JsonSnapshotRepository::with_path(path);
        let snapshot = repo.load().await.unwrap();
        assert!(snapshot.conversations.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);

        let mut conversation = Conversation::new_chat();
        conversation.record_user_message("hello there");
        conversation.record_assistant_message("hi!");

        let snapshot = StoreSnapshot {
            active_id: Some(conversation.id().to_string()),
            conversations: vec![conversation],
        };

        repo.save(snapshot.clone()).await.unwrap();
        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(&dir);

        let first = StoreSnapshot {
            conversations: vec![Conversation::new_chat()],
            active_id: None,
        };
        repo.save(first).await.unwrap();

        let second = StoreSnapshot::default();
        repo.save(second.clone()).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), second);
        // No leftover temp file from the atomic write
        assert!(!dir.path().join("conversations.json.tmp").exists());
    }
}
