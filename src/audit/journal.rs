//! Audit Journal
//!
//! Append-only JSONL persistence for finalized audit entries, one JSON
//! document per line, flushed on every append.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::audit::entry::AuditEntry;
use crate::audit::verify::load_entries_from_file;
use crate::error::AuditError;

pub struct AuditJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditJournal {
    /// Open (or create) the journal, creating parent directories on
    /// demand. The file is only ever appended to.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::StorageError(format!(
                    "Failed to create journal directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AuditError::StorageError(format!(
                    "Failed to open journal {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Append one finalized entry as a JSON line and flush.
    pub fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let json = serde_json::to_string(entry)?;

        let mut file = self
            .file
            .lock()
            .map_err(|_| AuditError::StorageError("Journal lock poisoned".to_string()))?;
        writeln!(file, "{}", json).map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to write journal {}: {}",
                self.path.display(),
                e
            ))
        })?;
        file.flush().map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to flush journal {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Journaled audit entry {}", entry.id);
        Ok(())
    }

    /// Reload all persisted entries, e.g. for offline verification.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        load_entries_from_file(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
