pub mod replay_storage;

pub use replay_storage::{ReplayStore, StorageError, StoredReplay};
