// storage/src/lib.rs

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use async_trait::async_trait;
use models::{Account, IdentityKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// An insert collided with an existing value on a unique field.
    #[error("an account with this {0} already exists")]
    UniquenessConflict(IdentityKey),
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),
    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage task failed to join: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Persistence contract for account records.
///
/// The lookups are pure reads and never mutate the store. `insert` is the
/// sole write path and the sole arbiter of write ordering: it enforces the
/// username and email uniqueness constraints at write time, so two requests
/// racing past the pre-insert lookups still cannot both commit.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StorageError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError>;
    async fn insert(&self, account: Account) -> Result<Account, StorageError>;
}
