// src/core/identity/mod.rs

//! The user-credential service: registration and login verification.

mod password;
mod store;

pub use password::{hash_password, is_strong, verify_password};
pub use store::{FsUserStore, UserRecord, UserStore};

use crate::core::CadenzaError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task;

/// In-memory directory of registered users, write-through to the store.
///
/// Hashing and verification are CPU-bound and run on the blocking pool so a
/// registration burst cannot stall connection handling.
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    users: RwLock<HashMap<String, String>>,
}

impl UserDirectory {
    pub async fn load(store: Arc<dyn UserStore>) -> Result<Self, CadenzaError> {
        let records = store.load().await?;
        let users = records
            .into_iter()
            .map(|r| (r.email, r.credential))
            .collect();
        Ok(Self {
            store,
            users: RwLock::new(users),
        })
    }

    pub fn exists(&self, email: &str) -> bool {
        self.users.read().contains_key(email)
    }

    /// Registers a new user. A duplicate email fails before the password is
    /// even looked at and performs no persistence write.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), CadenzaError> {
        if self.exists(email) {
            return Err(CadenzaError::UserAlreadyExists(email.to_string()));
        }
        if !is_strong(password) {
            return Err(CadenzaError::WeakPassword);
        }

        let password = password.to_string();
        let credential = task::spawn_blocking(move || hash_password(&password)).await??;

        let record = UserRecord {
            email: email.to_string(),
            credential: credential.clone(),
        };
        self.store.append(&record).await?;
        self.users.write().insert(email.to_string(), credential);
        Ok(())
    }

    /// Verifies a login attempt. The two failure modes are deliberately
    /// distinct replies: unknown email and wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), CadenzaError> {
        let stored = self
            .users
            .read()
            .get(email)
            .cloned()
            .ok_or_else(|| CadenzaError::UserNotFound(email.to_string()))?;

        let password = password.to_string();
        let verified =
            task::spawn_blocking(move || verify_password(&password, &stored)).await??;
        if !verified {
            return Err(CadenzaError::WrongPassword);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}
