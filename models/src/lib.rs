// models/src/lib.rs

pub mod account;
pub mod validation;

pub use account::{Account, PublicAccount, RegistrationRequest, DEFAULT_ROLE, HASH_COST};
pub use validation::{validate_registration, FieldViolation, RegistrationPayload};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A field whose value must be unique across all accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityKey {
    Username,
    Email,
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Username => write!(f, "username"),
            IdentityKey::Email => write!(f, "email"),
        }
    }
}
