//! Encrypted Evidence Store
//!
//! Stores binary attachments encrypted with AES-256-GCM at paths derived
//! from the SHA-256 of their plaintext. On-disk artifact layout:
//! `nonce(12) || tag(16) || ciphertext`, at `{root}/{hash[0..8]}/{hash}.enc`.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::crypto::keys::{KeyMaterial, SYMMETRIC_KEY_BYTES};
use crate::error::AuditError;
use crate::evidence::record::{EvidenceRecord, EVIDENCE_TTL_DAYS};

pub const NONCE_BYTES: usize = 12;
pub const TAG_BYTES: usize = 16;

const HASH_CHUNK_BYTES: usize = 8192;

/// Content-addressed encrypted store. Safe to share across threads:
/// distinct contents never collide on a path, and identical contents are
/// idempotent byte-identical overwrites.
pub struct EvidenceStore {
    root: PathBuf,
    key: [u8; SYMMETRIC_KEY_BYTES],
}

impl EvidenceStore {
    pub fn new(root: impl Into<PathBuf>, keys: &KeyMaterial) -> Result<Self, AuditError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to create evidence store root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self {
            root,
            key: *keys.symmetric_key(),
        })
    }

    /// Encrypt and store a byte buffer, returning its evidence record.
    /// Storing identical content twice yields the same path; the second
    /// write is a benign overwrite with identical plaintext.
    pub fn store(&self, content: &[u8]) -> Result<EvidenceRecord, AuditError> {
        let content_hash = sha256_hex_stream(content)?;
        self.store_hashed(content, content_hash)
    }

    /// Stream a file's SHA-256 in bounded-memory chunks, then encrypt and
    /// store its contents.
    pub fn store_file(&self, path: &Path) -> Result<EvidenceRecord, AuditError> {
        let file = File::open(path).map_err(|e| {
            AuditError::StorageError(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let content_hash = sha256_hex_stream(file)?;

        let content = fs::read(path).map_err(|e| {
            AuditError::StorageError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.store_hashed(&content, content_hash)
    }

    fn store_hashed(
        &self,
        content: &[u8],
        content_hash: String,
    ) -> Result<EvidenceRecord, AuditError> {
        let storage_path = self.artifact_path(&content_hash);
        if let Some(parent) = storage_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AuditError::StorageError(format!(
                    "Failed to create shard directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let artifact = self.encrypt(content)?;
        fs::write(&storage_path, &artifact).map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to write artifact {}: {}",
                storage_path.display(),
                e
            ))
        })?;

        debug!(
            "Stored evidence artifact: {} ({} bytes plaintext)",
            storage_path.display(),
            content.len()
        );
        Ok(EvidenceRecord::new(content_hash, storage_path, Utc::now()))
    }

    /// Decrypt and authenticate a stored artifact, returning the original
    /// plaintext. Fails with an integrity error if the ciphertext has been
    /// tampered with or the record does not match the artifact.
    pub fn retrieve(&self, record: &EvidenceRecord) -> Result<Vec<u8>, AuditError> {
        let artifact = fs::read(&record.storage_path).map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to read artifact {}: {}",
                record.storage_path.display(),
                e
            ))
        })?;

        if artifact.len() < NONCE_BYTES + TAG_BYTES {
            return Err(AuditError::IntegrityError(format!(
                "Artifact {} is truncated ({} bytes)",
                record.storage_path.display(),
                artifact.len()
            )));
        }

        let (nonce, rest) = artifact.split_at(NONCE_BYTES);
        let (tag, ciphertext) = rest.split_at(TAG_BYTES);

        // aes-gcm expects ciphertext || tag
        let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_BYTES);
        sealed.extend_from_slice(ciphertext);
        sealed.extend_from_slice(tag);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), sealed.as_ref())
            .map_err(|_| {
                AuditError::IntegrityError(format!(
                    "Authentication failed for artifact {}",
                    record.storage_path.display()
                ))
            })?;

        let plaintext_hash = sha256_hex_stream(plaintext.as_slice())?;
        if plaintext_hash != record.content_hash {
            return Err(AuditError::IntegrityError(format!(
                "Content hash mismatch for artifact {}",
                record.storage_path.display()
            )));
        }

        Ok(plaintext)
    }

    /// Delete every artifact whose whole-day age at `now` has reached the
    /// retention limit. Deletion is best-effort per file: individual
    /// failures are reported and skipped, never aborting the sweep.
    /// Returns the number of artifacts deleted.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, AuditError> {
        let mut deleted = 0;

        let shards = fs::read_dir(&self.root).map_err(|e| {
            AuditError::StorageError(format!(
                "Failed to scan evidence store {}: {}",
                self.root.display(),
                e
            ))
        })?;

        for shard in shards.flatten() {
            if !shard.path().is_dir() {
                continue;
            }

            let artifacts = match fs::read_dir(shard.path()) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Failed to scan shard {}: {}", shard.path().display(), e);
                    continue;
                }
            };

            for artifact in artifacts.flatten() {
                let path = artifact.path();
                if path.extension().map(|ext| ext != "enc").unwrap_or(true) {
                    continue;
                }

                match artifact_age_days(&path, now) {
                    Ok(age_days) if age_days >= EVIDENCE_TTL_DAYS => {
                        match fs::remove_file(&path) {
                            Ok(()) => {
                                deleted += 1;
                                debug!("Deleted expired artifact: {}", path.display());
                            }
                            // The file may already be gone if a concurrent
                            // sweep got there first; both are no-ops.
                            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                            Err(e) => {
                                warn!("Failed to delete {}: {}", path.display(), e);
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Failed to stat {}: {}", path.display(), e),
                }
            }
        }

        info!("Evidence sweep complete: {} artifacts deleted", deleted);
        Ok(deleted)
    }

    fn artifact_path(&self, content_hash: &str) -> PathBuf {
        self.root
            .join(&content_hash[..8])
            .join(format!("{}.enc", content_hash))
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, AuditError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        // Fresh nonce per call; reuse under the same key is never allowed.
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let sealed = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| AuditError::CryptoError("Evidence encryption failed".to_string()))?;

        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_BYTES);
        let mut artifact = Vec::with_capacity(NONCE_BYTES + sealed.len());
        artifact.extend_from_slice(&nonce);
        artifact.extend_from_slice(tag);
        artifact.extend_from_slice(ciphertext);
        Ok(artifact)
    }
}

/// SHA-256 of a reader's contents, hashed in fixed-size chunks so
/// arbitrarily large inputs never require full buffering.
fn sha256_hex_stream<R: Read>(mut reader: R) -> Result<String, AuditError> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_BYTES];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

fn artifact_age_days(path: &Path, now: DateTime<Utc>) -> Result<i64, std::io::Error> {
    let modified = fs::metadata(path)?.modified()?;
    let modified: DateTime<Utc> = modified.into();
    Ok((now - modified).num_days())
}
