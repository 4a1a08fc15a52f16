pub mod error;
pub mod in_memory_repository;
pub mod json_snapshot_repository;
pub mod snapshot_repository;

pub use error::{RepositoryError, RepositoryResult};
pub use in_memory_repository::InMemorySnapshotRepository;
pub use json_snapshot_repository::JsonSnapshotRepository;
pub use snapshot_repository::{BoxFuture, SnapshotRepository, StoreSnapshot};
