use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::error::RepositoryResult;
use crate::obryn::models::Conversation;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The whole persisted state: every conversation plus the last-active id.
/// Written as one document so a snapshot is always internally consistent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub active_id: Option<String>,
}

/// Repository trait for conversation-list persistence
pub trait SnapshotRepository: Send + Sync + 'static {
    /// Load the snapshot from storage. A missing or unreadable snapshot is
    /// treated as empty state, never an error the caller must handle
    /// specially.
    fn load(&self) -> BoxFuture<'static, RepositoryResult<StoreSnapshot>>;

    /// Save the snapshot to storage, replacing the previous one atomically.
    fn save(&self, snapshot: StoreSnapshot) -> BoxFuture<'static, RepositoryResult<()>>;
}
