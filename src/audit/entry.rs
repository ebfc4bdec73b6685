//! Audit Entry
//!
//! Defines the append-only audit entry shape with its integrity block,
//! and the canonical serialization its hash is computed over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::AuditError;
use crate::evidence::record::EvidenceRecord;

/// Fixed previous-hash sentinel for the first entry of a chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Fixed descriptor recorded in every integrity block.
pub const SIGNATURE_ALGORITHM: &str = "RSA-SHA256";

/// Request-side metadata. Content itself is never retained; only its
/// hash and the PII-detection summary produced by the upstream detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub method: String,
    /// Hex SHA-256 of the request body.
    pub body_hash: String,
    /// Detector output, embedded verbatim.
    pub pii_detection: Value,
}

/// Response-side metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub status: u16,
    /// Hex SHA-256 of the response content.
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tokens: Option<u64>,
}

/// The canonical payload consumed by the hash-chain logger: everything an
/// entry carries except its integrity block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPayload {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub request: RequestMetadata,
    pub response: ResponseMetadata,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub evidence: Option<EvidenceRecord>,
}

impl EntryPayload {
    /// Canonical serialization: JSON with keys sorted at every level, so
    /// identical logical content always hashes identically.
    pub fn canonical_json(&self) -> Result<String, AuditError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string(&value)?)
    }

    /// Hex SHA-256 over the canonical serialization.
    pub fn log_hash(&self) -> Result<String, AuditError> {
        let canonical = self.canonical_json()?;
        Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
    }
}

/// Integrity block linking an entry into the signed hash chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityBlock {
    pub log_hash: String,
    pub previous_hash: String,
    /// Hex RSA-PSS signature over `log_hash || ":" || previous_hash`.
    pub signature: String,
    pub signature_algorithm: String,
}

impl IntegrityBlock {
    /// The exact byte string the signature covers.
    pub fn signature_payload(&self) -> String {
        format!("{}:{}", self.log_hash, self.previous_hash)
    }
}

/// A finalized, signed audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub request: RequestMetadata,
    pub response: ResponseMetadata,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub evidence: Option<EvidenceRecord>,
    pub integrity: IntegrityBlock,
}

impl AuditEntry {
    pub fn from_payload(payload: EntryPayload, integrity: IntegrityBlock) -> Self {
        Self {
            id: payload.id,
            timestamp: payload.timestamp,
            request: payload.request,
            response: payload.response,
            evidence: payload.evidence,
            integrity,
        }
    }

    /// Recompute the hash of this entry's content, excluding the
    /// integrity block. Matches `EntryPayload::log_hash` for the payload
    /// the entry was built from.
    pub fn recompute_log_hash(&self) -> Result<String, AuditError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(map) = value.as_object_mut() {
            map.remove("integrity");
        }
        let canonical = serde_json::to_string(&value)?;
        Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
    }

    /// Whether the stored `log_hash` matches the entry's own content.
    pub fn content_hash_matches(&self) -> bool {
        self.recompute_log_hash()
            .map(|hash| hash == self.integrity.log_hash)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> EntryPayload {
        EntryPayload {
            id: "550e8400-e29b-41d4-a716-446655440000:2025-11-20T03:47:14Z".to_string(),
            timestamp: Utc::now(),
            request: RequestMetadata {
                method: "POST".to_string(),
                body_hash: hex::encode(Sha256::digest(b"request body")),
                pii_detection: json!({"score": 0.3, "status": "PASS"}),
            },
            response: ResponseMetadata {
                status: 200,
                content_hash: hex::encode(Sha256::digest(b"response body")),
                tokens: Some(1500),
            },
            evidence: None,
        }
    }

    #[test]
    fn test_log_hash_is_deterministic() {
        let payload = sample_payload();
        assert_eq!(payload.log_hash().unwrap(), payload.log_hash().unwrap());
        assert_eq!(payload.log_hash().unwrap().len(), 64);
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let payload = sample_payload();
        let canonical = payload.canonical_json().unwrap();

        let id_pos = canonical.find("\"id\"").unwrap();
        let request_pos = canonical.find("\"request\"").unwrap();
        let response_pos = canonical.find("\"response\"").unwrap();
        let timestamp_pos = canonical.find("\"timestamp\"").unwrap();
        assert!(id_pos < request_pos);
        assert!(request_pos < response_pos);
        assert!(response_pos < timestamp_pos);
    }

    #[test]
    fn test_recomputed_hash_matches_payload_hash() {
        let payload = sample_payload();
        let log_hash = payload.log_hash().unwrap();

        let entry = AuditEntry::from_payload(
            payload,
            IntegrityBlock {
                log_hash: log_hash.clone(),
                previous_hash: GENESIS_HASH.to_string(),
                signature: "00".to_string(),
                signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
            },
        );

        assert_eq!(entry.recompute_log_hash().unwrap(), log_hash);
        assert!(entry.content_hash_matches());
    }

    #[test]
    fn test_content_edit_changes_hash() {
        let payload = sample_payload();
        let log_hash = payload.log_hash().unwrap();

        let mut entry = AuditEntry::from_payload(
            payload,
            IntegrityBlock {
                log_hash,
                previous_hash: GENESIS_HASH.to_string(),
                signature: "00".to_string(),
                signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
            },
        );
        entry.response.status = 500;

        assert!(!entry.content_hash_matches());
    }

    #[test]
    fn test_entry_roundtrips_through_json() {
        let payload = sample_payload();
        let log_hash = payload.log_hash().unwrap();
        let entry = AuditEntry::from_payload(
            payload,
            IntegrityBlock {
                log_hash,
                previous_hash: GENESIS_HASH.to_string(),
                signature: "ab".to_string(),
                signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
            },
        );

        let json = serde_json::to_string(&entry).unwrap();
        let reloaded: AuditEntry = serde_json::from_str(&json).unwrap();

        assert!(reloaded.content_hash_matches());
        assert_eq!(reloaded.integrity.log_hash, entry.integrity.log_hash);
    }
}
