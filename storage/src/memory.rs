// storage/src/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use models::{Account, IdentityKey};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AccountStore, StorageError};

#[derive(Default)]
struct Inner {
    accounts: HashMap<Uuid, Account>,
    by_username: HashMap<String, Uuid>,
    by_email: HashMap<String, Uuid>,
}

/// In-memory account store. Uniqueness checks and the insert happen under
/// one write lock, so an insert-time conflict is reported exactly like a
/// constraint violation from a real backend would be.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_username
            .get(username)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, StorageError> {
        let mut inner = self.inner.write().await;
        if inner.by_username.contains_key(&account.username) {
            return Err(StorageError::UniquenessConflict(IdentityKey::Username));
        }
        if inner.by_email.contains_key(&account.email) {
            return Err(StorageError::UniquenessConflict(IdentityKey::Email));
        }
        inner
            .by_username
            .insert(account.username.clone(), account.id);
        inner.by_email.insert(account.email.clone(), account.id);
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }
}
