//! Hash-Chain Audit Logger
//!
//! Appends signed, hash-chained audit entries. Each entry's integrity
//! block carries the SHA-256 of its canonical content, the hash of its
//! predecessor, and an RSA-PSS signature binding the two together.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::audit::entry::{
    AuditEntry, EntryPayload, IntegrityBlock, GENESIS_HASH, SIGNATURE_ALGORITHM,
};
use crate::crypto::keys::KeyMaterial;
use crate::crypto::signer::EntrySigner;
use crate::error::AuditError;

/// Append-only audit logger holding the chain cursor.
///
/// `append` is the only critical section in the system: the cursor mutex
/// serializes concurrent callers so chain order matches call-completion
/// order. The evidence store and `sweep_expired` need no coordination.
pub struct HashChainLogger {
    signer: EntrySigner,
    previous_hash: Mutex<String>,
    state_path: Option<PathBuf>,
}

impl HashChainLogger {
    /// Create a logger whose cursor survives restarts: the chain head is
    /// reloaded from `state_path` when present, and rewritten after every
    /// successful append.
    pub fn new(keys: &KeyMaterial, state_path: impl Into<PathBuf>) -> Result<Self, AuditError> {
        let state_path = state_path.into();
        let previous_hash = if state_path.exists() {
            let head = load_chain_head(&state_path)?;
            info!("Resuming audit chain at head {}", head);
            head
        } else {
            GENESIS_HASH.to_string()
        };

        Ok(Self {
            signer: keys.signer(),
            previous_hash: Mutex::new(previous_hash),
            state_path: Some(state_path),
        })
    }

    /// Create a logger with a process-lifetime chain rooted at genesis.
    /// A restarted process starts a fresh, disconnected chain.
    pub fn ephemeral(keys: &KeyMaterial) -> Self {
        Self {
            signer: keys.signer(),
            previous_hash: Mutex::new(GENESIS_HASH.to_string()),
            state_path: None,
        }
    }

    /// Append a payload to the chain, returning the finalized entry.
    ///
    /// The cursor advances only after signing and head persistence have
    /// both succeeded; a failed append leaves the chain unmoved.
    pub fn append(&self, payload: EntryPayload) -> Result<AuditEntry, AuditError> {
        let log_hash = payload.log_hash()?;

        let mut cursor = self
            .previous_hash
            .lock()
            .map_err(|_| AuditError::CryptoError("Chain cursor lock poisoned".to_string()))?;
        let previous_hash = cursor.clone();

        let signature = self
            .signer
            .sign(&format!("{}:{}", log_hash, previous_hash))?;

        if let Some(state_path) = &self.state_path {
            persist_chain_head(state_path, &log_hash)?;
        }

        *cursor = log_hash.clone();
        drop(cursor);

        debug!("Appended audit entry {} -> {}", previous_hash, log_hash);

        Ok(AuditEntry::from_payload(
            payload,
            IntegrityBlock {
                log_hash,
                previous_hash,
                signature,
                signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
            },
        ))
    }

    /// Verify an entry's signature over its stored `log_hash` and
    /// `previous_hash`. Returns `false` on any failure, never errors.
    ///
    /// This proves the signed pair was produced by the key holder; it does
    /// not recompute `log_hash` from the entry content. Use `verify_full`
    /// to also bind the hash to the content.
    pub fn verify(&self, entry: &AuditEntry) -> bool {
        self.signer.verify(
            &entry.integrity.signature_payload(),
            &entry.integrity.signature,
        )
    }

    /// Strict verification: the stored `log_hash` must match a fresh
    /// recomputation from the entry's canonical content, and the
    /// signature must validate.
    pub fn verify_full(&self, entry: &AuditEntry) -> bool {
        entry.content_hash_matches() && self.verify(entry)
    }

    /// Current chain head (the `previous_hash` the next entry will carry).
    pub fn head(&self) -> String {
        self.previous_hash
            .lock()
            .map(|cursor| cursor.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

fn load_chain_head(path: &Path) -> Result<String, AuditError> {
    let head = fs::read_to_string(path)
        .map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to read chain state {}: {}",
                path.display(),
                e
            ))
        })?
        .trim()
        .to_string();

    if head.len() != 64 || !head.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AuditError::IntegrityError(format!(
            "Chain state {} is not a valid hash",
            path.display()
        )));
    }

    Ok(head)
}

fn persist_chain_head(path: &Path, head: &str) -> Result<(), AuditError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to create chain state directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    fs::write(path, head).map_err(|e| {
        AuditError::StorageError(format!(
            "Failed to persist chain state {}: {}",
            path.display(),
            e
        ))
    })
}
