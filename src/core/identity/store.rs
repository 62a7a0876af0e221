// src/core/identity/store.rs

//! Flat-file persistence for user records.

use crate::core::CadenzaError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// One registered user: an email and the stored credential string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub email: String,
    pub credential: String,
}

/// Storage backend for user records. The filesystem implementation is the
/// production one; tests inject in-memory implementations.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn load(&self) -> Result<Vec<UserRecord>, CadenzaError>;
    async fn append(&self, record: &UserRecord) -> Result<(), CadenzaError>;
}

/// User persistence over one line-oriented file: `<email> <credential>`.
pub struct FsUserStore {
    users_file: PathBuf,
}

impl FsUserStore {
    pub fn new(users_file: PathBuf) -> Self {
        Self { users_file }
    }
}

#[async_trait]
impl UserStore for FsUserStore {
    async fn load(&self) -> Result<Vec<UserRecord>, CadenzaError> {
        let contents = fs::read_to_string(&self.users_file).await?;
        let mut records = Vec::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            let (email, credential) = line.split_once(' ').ok_or_else(|| {
                CadenzaError::Persistence(format!("Malformed user record: {line:?}"))
            })?;
            records.push(UserRecord {
                email: email.to_string(),
                credential: credential.to_string(),
            });
        }
        Ok(records)
    }

    async fn append(&self, record: &UserRecord) -> Result<(), CadenzaError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.users_file)
            .await?;
        let line = format!("{} {}\n", record.email, record.credential);
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
