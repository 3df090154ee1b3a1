//! Credential verification.
//!
//! # Design Decisions
//! - Verification sits behind a trait so the login action stays testable
//!   without a database; production wiring uses the `User` collection
//! - Unknown user and wrong password are distinct outcomes: only the
//!   latter carries a uid the login log can record

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::Collection;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::storage::Storage;

/// Result of checking a username/password pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Success { uid: i64 },
    WrongPassword { uid: i64 },
    UnknownUser,
}

/// Credential check used by the login action. `username` is expected in
/// canonical form.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<AuthOutcome, AppError>;
}

/// Salted password digest as stored in user records.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Authenticator backed by the `User` collection. Records carry `uid`,
/// the canonical `user` name, `salt` and the salted `hash`.
pub struct MongoAuthenticator {
    collection: Collection<Document>,
}

impl MongoAuthenticator {
    pub fn new(storage: &Storage) -> Self {
        Self {
            collection: storage.collection("User"),
        }
    }
}

#[async_trait]
impl Authenticator for MongoAuthenticator {
    async fn verify(&self, username: &str, password: &str) -> Result<AuthOutcome, AppError> {
        let found = self.collection.find_one(doc! { "user": username }).await?;
        let Some(record) = found else {
            return Ok(AuthOutcome::UnknownUser);
        };

        let uid = record
            .get_i64("uid")
            .map_err(|_| AppError::internal("user record missing uid"))?;
        let salt = record
            .get_str("salt")
            .map_err(|_| AppError::internal("user record missing salt"))?;
        let stored = record
            .get_str("hash")
            .map_err(|_| AppError::internal("user record missing hash"))?;

        if hash_password(salt, password) == stored {
            Ok(AuthOutcome::Success { uid })
        } else {
            Ok(AuthOutcome::WrongPassword { uid })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_deterministic() {
        let digest = hash_password("salt", "secret");
        assert_eq!(digest, hash_password("salt", "secret"));
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_hash_password_salted() {
        assert_ne!(
            hash_password("salt-a", "secret"),
            hash_password("salt-b", "secret")
        );
    }
}
