//! Append-only audit log of oracle traffic.
//!
//! One entry per prompt sent and one per response or error received. Writes
//! never fail a generation call: errors are reported through `tracing` and
//! dropped.

use crate::error::AuditError;
use crate::types::Batch;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditKind {
    Prompt,
    Response,
    Error,
}

impl AuditKind {
    fn heading(&self) -> &'static str {
        match self {
            AuditKind::Prompt => "Prompt sent to oracle",
            AuditKind::Response => "Response from oracle",
            AuditKind::Error => "Oracle error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    pub run_id: String,
    pub batch_span: String,
    pub kind: AuditKind,
    pub body: String,
}

impl AuditEntry {
    pub fn new(run_id: &str, batch: &Batch, kind: AuditKind, body: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            run_id: run_id.to_string(),
            batch_span: batch.span(),
            kind,
            body: body.into(),
        }
    }

    /// Text block appended to the log file. Always ends with a blank line.
    pub fn render(&self) -> String {
        format!(
            "[{}] {} (run {}, dates {}):\n{}\n\n",
            self.at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.kind.heading(),
            self.run_id,
            self.batch_span,
            self.body.trim_end()
        )
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Append `entry`, logging and discarding any write failure.
pub async fn record(sink: &dyn AuditSink, entry: AuditEntry) {
    if let Err(e) = sink.append(&entry).await {
        warn!(
            error = %e,
            run_id = %entry.run_id,
            kind = ?entry.kind,
            "Failed to write audit log entry"
        );
    }
}

/// Audit log backed by a plain text file opened in append mode.
///
/// Each entry is rendered into one buffer and written with a single
/// append-mode write, so concurrent runs never rewrite earlier entries.
#[derive(Debug, Clone)]
pub struct FileAuditLog {
    path: PathBuf,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn append_blocking(path: &Path, bytes: &[u8]) -> Result<(), AuditError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(bytes)?;
    Ok(())
}

#[async_trait]
impl AuditSink for FileAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let path = self.path.clone();
        let bytes = entry.render().into_bytes();
        tokio::task::spawn_blocking(move || append_blocking(&path, &bytes))
            .await
            .map_err(|e| {
                AuditError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
            })??;
        debug!(path = %self.path.display(), kind = ?entry.kind, "Audit entry written");
        Ok(())
    }
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditLog;

#[async_trait]
impl AuditSink for NullAuditLog {
    async fn append(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
        Ok(())
    }
}

/// Keeps entries in memory; handy for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Audit section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Relative paths resolve against the workspace root.
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("contentcal_audit.log")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_audit_path(),
        }
    }
}

impl AuditConfig {
    pub fn resolved_path(&self, workspace_root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            workspace_root.join(&self.path)
        }
    }

    pub fn open(&self, workspace_root: &Path) -> Arc<dyn AuditSink> {
        if self.enabled {
            Arc::new(FileAuditLog::new(self.resolved_path(workspace_root)))
        } else {
            Arc::new(NullAuditLog)
        }
    }
}
