// models/src/account.rs

use bcrypt::BcryptError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned when a registration omits one.
pub const DEFAULT_ROLE: &str = "patient";

/// bcrypt work factor for credential hashing. Fixed rather than adaptive;
/// high enough that offline brute force stays expensive.
pub const HASH_COST: u32 = 10;

// --- Validated registration input ---
// Produced only by `validation::validate_registration`; holds the plaintext
// password until the provisioner hashes it, and is dropped afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub preferred_contact_method: Option<String>,
}

// --- Stored account record ---
// This is what the store persists. It carries the password hash, never the
// plaintext password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub preferred_contact_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Hashes a plaintext password with a per-call random salt.
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        bcrypt::hash(password, HASH_COST)
    }

    /// Verifies a plaintext password against a stored hash.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
        bcrypt::verify(password, hash)
    }

    /// Builds a persistable `Account` from a validated request, hashing the
    /// password and assigning the id and creation timestamp.
    pub fn from_registration(request: RegistrationRequest) -> Result<Self, BcryptError> {
        let password_hash = Self::hash_password(&request.password)?;

        Ok(Account {
            id: Uuid::new_v4(),
            username: request.username,
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
            profile_picture: request.profile_picture,
            phone: request.phone,
            preferred_contact_method: request.preferred_contact_method,
            created_at: Utc::now(),
        })
    }
}

// --- Outward-facing view ---
// Structurally has no password field, so the hash cannot reach a response
// by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub phone: Option<String>,
    pub preferred_contact_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for PublicAccount {
    fn from(account: Account) -> Self {
        PublicAccount {
            id: account.id,
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            profile_picture: account.profile_picture,
            phone: account.phone,
            preferred_contact_method: account.preferred_contact_method,
            created_at: account.created_at,
        }
    }
}
