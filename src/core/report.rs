// src/core/report.rs

//! The error-reporting collaborator: every dispatcher failure is recorded in
//! an append-only file keyed by the identity it happened for, in addition to
//! the structured log. Clients only ever see the translated reply text.

use crate::core::CadenzaError;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Identity used for failures on connections with no authenticated user.
pub const UNKNOWN_USER: &str = "UNKNOWN USER";

pub struct ErrorReporter {
    errors_file: PathBuf,
    // Serializes appends so concurrent reports don't interleave lines.
    write_lock: Mutex<()>,
}

impl ErrorReporter {
    pub fn new(errors_file: PathBuf) -> Self {
        Self {
            errors_file,
            write_lock: Mutex::new(()),
        }
    }

    /// Records a failure. Reporting itself must never fail a command, so a
    /// broken errors file only degrades to a log warning.
    pub async fn report(&self, identity: &str, failure: &CadenzaError) {
        error!(user = identity, "Command failed: {failure}");

        let line = format!(
            "{} User: {identity} Error: {failure}\n",
            Utc::now().to_rfc3339()
        );
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.append(&line).await {
            warn!("Failed to write error report: {e}");
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.errors_file)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
