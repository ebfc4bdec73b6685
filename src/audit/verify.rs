//! Audit Chain Verification
//!
//! External verification over finalized entries using only the public
//! key: per-entry signature checks, full content-hash recomputation, and
//! whole-chain linkage back to the genesis value.

use rsa::RsaPublicKey;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::audit::entry::{AuditEntry, GENESIS_HASH};
use crate::crypto::signer::verify_with_key;
use crate::error::AuditError;

/// Signature-only check over the stored `log_hash`/`previous_hash` pair.
pub fn verify_signature(public_key: &RsaPublicKey, entry: &AuditEntry) -> bool {
    verify_with_key(
        public_key,
        &entry.integrity.signature_payload(),
        &entry.integrity.signature,
    )
}

/// Full check: the stored `log_hash` must match a fresh recomputation
/// from the entry's canonical content, and the signature must validate.
/// An entry whose content and hash were rewritten consistently passes the
/// signature-only check but fails here.
pub fn verify_entry(public_key: &RsaPublicKey, entry: &AuditEntry) -> bool {
    entry.content_hash_matches() && verify_signature(public_key, entry)
}

/// Verify a complete chain: every entry's content hash and signature,
/// and every link (entry i's `previous_hash` equals entry i-1's
/// `log_hash`, entry 0's equals the genesis value).
pub fn verify_chain(
    public_key: &RsaPublicKey,
    entries: &[AuditEntry],
) -> Result<ChainVerification, AuditError> {
    if entries.is_empty() {
        return Err(AuditError::ValidationError("Empty audit chain".to_string()));
    }

    let mut result = ChainVerification {
        is_valid: true,
        entry_count: entries.len(),
        hash_chain_valid: true,
        signatures_valid: true,
        error_message: None,
    };

    if entries[0].integrity.previous_hash != GENESIS_HASH {
        result.hash_chain_valid = false;
        result.error_message = Some(format!(
            "First entry does not start at genesis: {}",
            entries[0].integrity.previous_hash
        ));
    }

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 && entry.integrity.previous_hash != entries[i - 1].integrity.log_hash {
            result.hash_chain_valid = false;
            if result.error_message.is_none() {
                result.error_message = Some(format!(
                    "Hash chain broken at entry {}: expected {}, got {}",
                    i,
                    entries[i - 1].integrity.log_hash,
                    entry.integrity.previous_hash
                ));
            }
            break;
        }

        if !entry.content_hash_matches() {
            result.hash_chain_valid = false;
            if result.error_message.is_none() {
                result.error_message = Some(format!("Content hash mismatch in entry {}", i));
            }
            break;
        }

        if !verify_signature(public_key, entry) {
            result.signatures_valid = false;
            if result.error_message.is_none() {
                result.error_message = Some(format!("Invalid signature in entry {}", i));
            }
            break;
        }
    }

    result.is_valid = result.hash_chain_valid && result.signatures_valid;
    if result.is_valid {
        info!("Audit chain verified: {} entries", result.entry_count);
    }
    Ok(result)
}

/// Load entries from a JSONL journal file.
pub fn load_entries_from_file(path: &Path) -> Result<Vec<AuditEntry>, AuditError> {
    let file = File::open(path).map_err(|e| {
        AuditError::StorageError(format!("Failed to open audit log {}: {}", path.display(), e))
    })?;

    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            AuditError::StorageError(format!("Failed to read line {}: {}", line_num + 1, e))
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| {
            AuditError::ValidationError(format!(
                "Failed to parse entry at line {}: {}",
                line_num + 1,
                e
            ))
        })?;
        entries.push(entry);
    }

    debug!("Loaded {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Load and verify a persisted audit log file.
pub fn verify_log_file(
    path: &Path,
    public_key: &RsaPublicKey,
) -> Result<ChainVerification, AuditError> {
    let entries = load_entries_from_file(path)?;
    verify_chain(public_key, &entries)
}

/// Detailed chain verification outcome.
#[derive(Debug, Clone)]
pub struct ChainVerification {
    pub is_valid: bool,
    pub entry_count: usize,
    pub hash_chain_valid: bool,
    pub signatures_valid: bool,
    pub error_message: Option<String>,
}

impl ChainVerification {
    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        if self.is_valid {
            format!("Audit chain is valid ({} entries)", self.entry_count)
        } else {
            format!(
                "Audit chain is invalid ({} entries): {}",
                self.entry_count,
                self.error_message.as_deref().unwrap_or("Unknown error")
            )
        }
    }
}
