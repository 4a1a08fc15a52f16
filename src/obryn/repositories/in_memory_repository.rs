use std::sync::Arc;

use parking_lot::Mutex;

use super::error::RepositoryResult;
use super::snapshot_repository::{BoxFuture, SnapshotRepository, StoreSnapshot};

/// In-memory repository for the conversation snapshot.
/// Useful for testing and development.
#[derive(Clone, Default)]
pub struct InMemorySnapshotRepository {
    snapshot: Arc<Mutex<StoreSnapshot>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek at the last saved snapshot without going through `load`.
    pub fn saved(&self) -> StoreSnapshot {
        self.snapshot.lock().clone()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn load(&self) -> BoxFuture<'static, RepositoryResult<StoreSnapshot>> {
        let snapshot = self.snapshot.clone();
        Box::pin(async move { Ok(snapshot.lock().clone()) })
    }

    fn save(&self, new_snapshot: StoreSnapshot) -> BoxFuture<'static, RepositoryResult<()>> {
        let snapshot = self.snapshot.clone();
        Box::pin(async move {
            *snapshot.lock() = new_snapshot;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obryn::models::Conversation;

    #[tokio::test]
    async fn save_and_load() {
        let repo = InMemorySnapshotRepository::new();

        let conversation = Conversation::new_chat();
        let snapshot = StoreSnapshot {
            active_id: Some(conversation.id().to_string()),
            conversations: vec![conversation],
        };

        repo.save(snapshot.clone()).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn starts_empty() {
        let repo = InMemorySnapshotRepository::new();
        let loaded = repo.load().await.unwrap();
        assert!(loaded.conversations.is_empty());
        assert!(loaded.active_id.is_none());
    }
}
