use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Retention window for stored evidence artifacts, in whole days.
pub const EVIDENCE_TTL_DAYS: i64 = 7;

/// Fixed encryption descriptor for evidence artifacts.
pub const ENCRYPTION_ALGORITHM: &str = "AES-256-GCM";

/// Metadata for one encrypted attachment. Write-once: records are never
/// mutated after creation; the artifact itself is destroyed by the sweep
/// once its age exceeds the retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// Hex SHA-256 of the original plaintext.
    pub content_hash: String,
    /// On-disk location, derived deterministically from `content_hash`.
    pub storage_path: PathBuf,
    pub encryption_algorithm: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl EvidenceRecord {
    pub fn new(content_hash: String, storage_path: PathBuf, created_at: DateTime<Utc>) -> Self {
        let expires_at = created_at + Duration::days(EVIDENCE_TTL_DAYS);
        Self {
            content_hash,
            storage_path,
            encryption_algorithm: ENCRYPTION_ALGORITHM.to_string(),
            created_at,
            expires_at,
        }
    }

    /// Whether the artifact is eligible for deletion at `now`. Age is
    /// truncated to whole days, so eligibility starts only once a full
    /// 7x24h has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.created_at).num_days() >= EVIDENCE_TTL_DAYS
    }
}
