// rest_api/src/provision.rs
//
// The registration pipeline. Stages run strictly in order and every failure
// maps to one `RegistrationError` variant; nothing else escapes this module.

use serde_json::Value;
use thiserror::Error;

use models::{validate_registration, Account, FieldViolation, IdentityKey, PublicAccount};
use storage::{AccountStore, StorageError};

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("registration input failed schema validation")]
    InvalidInput(Vec<FieldViolation>),
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("email address is already registered")]
    DuplicateEmail,
    #[error("credential hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("storage failure: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for RegistrationError {
    fn from(err: StorageError) -> Self {
        // Two requests can both pass the pre-insert lookups; the store then
        // rejects the loser at insert time. That conflict is a duplicate
        // identity to the caller, not an internal failure.
        match err {
            StorageError::UniquenessConflict(IdentityKey::Username) => {
                RegistrationError::DuplicateUsername
            }
            StorageError::UniquenessConflict(IdentityKey::Email) => {
                RegistrationError::DuplicateEmail
            }
            other => RegistrationError::Storage(other),
        }
    }
}

/// Runs the full registration pipeline against `store`:
/// validate, check username, check email, hash, insert, redact.
///
/// Exactly one account is created on success; no store write happens on any
/// failure path, and the returned view carries no credential in any form.
pub async fn register_account(
    store: &dyn AccountStore,
    input: Value,
) -> Result<PublicAccount, RegistrationError> {
    let request = validate_registration(input).map_err(RegistrationError::InvalidInput)?;

    if store.find_by_username(&request.username).await?.is_some() {
        return Err(RegistrationError::DuplicateUsername);
    }
    if store.find_by_email(&request.email).await?.is_some() {
        return Err(RegistrationError::DuplicateEmail);
    }

    let account = Account::from_registration(request)?;
    let persisted = store.insert(account).await?;
    Ok(PublicAccount::from(persisted))
}

#[cfg(test)]
mod tests {
    use super::{register_account, RegistrationError};
    use async_trait::async_trait;
    use models::{Account, IdentityKey};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::{AccountStore, MemoryStore, StorageError};

    fn alice() -> Value {
        json!({
            "username": "alice",
            "password": "secret1",
            "email": "alice@example.com",
            "firstName": "Alice",
            "lastName": "Smith"
        })
    }

    /// Wraps a store and counts every operation reaching it.
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
        writes: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            CountingStore {
                inner: MemoryStore::new(),
                reads: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AccountStore for CountingStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StorageError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_username(username).await
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_email(email).await
        }

        async fn insert(&self, account: Account) -> Result<Account, StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(account).await
        }
    }

    /// A store whose lookups see nothing but whose insert always loses a
    /// uniqueness race, standing in for a concurrent writer.
    struct RacingStore {
        conflict_on: IdentityKey,
    }

    #[async_trait]
    impl AccountStore for RacingStore {
        async fn find_by_username(&self, _username: &str) -> Result<Option<Account>, StorageError> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, StorageError> {
            Ok(None)
        }

        async fn insert(&self, _account: Account) -> Result<Account, StorageError> {
            Err(StorageError::UniquenessConflict(self.conflict_on))
        }
    }

    #[tokio::test]
    async fn should_provision_account_with_defaulted_role() {
        let store = MemoryStore::new();
        let public = register_account(&store, alice()).await.unwrap();

        assert_eq!(public.username, "alice");
        assert_eq!(public.role, "patient");
        assert_eq!(store.len().await, 1);

        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret1");
        assert!(Account::verify_password("secret1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn should_not_touch_store_on_invalid_input() {
        let store = CountingStore::new();
        let err = register_account(&store, json!({ "username": "ab" }))
            .await
            .unwrap_err();

        let RegistrationError::InvalidInput(violations) = err else {
            panic!("expected InvalidInput");
        };
        assert!(!violations.is_empty());
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_report_duplicate_username_before_email() {
        let store = CountingStore::new();
        register_account(&store, alice()).await.unwrap();

        // Same username AND same email: the username check gates first.
        let err = register_account(&store, alice()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateUsername));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_report_duplicate_email_for_novel_username() {
        let store = CountingStore::new();
        register_account(&store, alice()).await.unwrap();

        let err = register_account(
            &store,
            json!({
                "username": "bob",
                "password": "secret1",
                "email": "alice@example.com",
                "firstName": "Bob",
                "lastName": "Stone"
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateEmail));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_remap_insert_race_to_duplicate_username() {
        let store = RacingStore {
            conflict_on: IdentityKey::Username,
        };
        let err = register_account(&store, alice()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateUsername));
    }

    #[tokio::test]
    async fn should_remap_insert_race_to_duplicate_email() {
        let store = RacingStore {
            conflict_on: IdentityKey::Email,
        };
        let err = register_account(&store, alice()).await.unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateEmail));
    }
}
