// storage/src/sled_store.rs

use std::path::Path;

use async_trait::async_trait;
use models::{Account, IdentityKey};
use sled::{Db, Tree};

use crate::{AccountStore, StorageError};

const ACCOUNTS_TREE: &str = "accounts";
const USERNAME_INDEX_TREE: &str = "accounts_by_username";
const EMAIL_INDEX_TREE: &str = "accounts_by_email";

/// sled-backed account store. Records live in one tree keyed by account id
/// (JSON values); two index trees map username and email to the id. The
/// index entries are claimed with `compare_and_swap`, so a duplicate insert
/// loses the race at the index tree and surfaces as a uniqueness conflict.
pub struct SledStore {
    accounts: Tree,
    by_username: Tree,
    by_email: Tree,
    _db: Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(SledStore {
            accounts: db.open_tree(ACCOUNTS_TREE)?,
            by_username: db.open_tree(USERNAME_INDEX_TREE)?,
            by_email: db.open_tree(EMAIL_INDEX_TREE)?,
            _db: db,
        })
    }
}

fn find_in(index: &Tree, accounts: &Tree, key: &str) -> Result<Option<Account>, StorageError> {
    let Some(id) = index.get(key.as_bytes())? else {
        return Ok(None);
    };
    match accounts.get(&id)? {
        Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
        None => Ok(None),
    }
}

fn insert_in(
    accounts: &Tree,
    by_username: &Tree,
    by_email: &Tree,
    account: Account,
) -> Result<Account, StorageError> {
    let id = account.id.as_bytes().to_vec();
    let raw = serde_json::to_vec(&account)?;

    // Claim the username index entry first; only the winner proceeds.
    let claimed = by_username.compare_and_swap(
        account.username.as_bytes(),
        None::<&[u8]>,
        Some(id.as_slice()),
    )?;
    if claimed.is_err() {
        return Err(StorageError::UniquenessConflict(IdentityKey::Username));
    }

    let claimed = by_email.compare_and_swap(
        account.email.as_bytes(),
        None::<&[u8]>,
        Some(id.as_slice()),
    )?;
    if claimed.is_err() {
        // Release the username claim so the record stays absent as a whole.
        by_username.remove(account.username.as_bytes())?;
        return Err(StorageError::UniquenessConflict(IdentityKey::Email));
    }

    accounts.insert(id, raw)?;
    Ok(account)
}

#[async_trait]
impl AccountStore for SledStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StorageError> {
        let index = self.by_username.clone();
        let accounts = self.accounts.clone();
        let username = username.to_string();
        tokio::task::spawn_blocking(move || find_in(&index, &accounts, &username)).await?
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let index = self.by_email.clone();
        let accounts = self.accounts.clone();
        let email = email.to_string();
        tokio::task::spawn_blocking(move || find_in(&index, &accounts, &email)).await?
    }

    async fn insert(&self, account: Account) -> Result<Account, StorageError> {
        let accounts = self.accounts.clone();
        let by_username = self.by_username.clone();
        let by_email = self.by_email.clone();
        tokio::task::spawn_blocking(move || insert_in(&accounts, &by_username, &by_email, account))
            .await?
    }
}
