//! Evidence store round-trip, tamper detection, idempotence and sweep
//! timing properties.

use std::fs;

use audit_trail::evidence::store::{NONCE_BYTES, TAG_BYTES};
use audit_trail::{AuditError, EvidenceStore};
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

mod common;
use common::shared_keys;

#[test]
fn test_store_then_retrieve_roundtrips_exact_bytes() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let payloads: [&[u8]; 3] = [b"hello-evidence", &[0u8; 1024], b""];
    for content in payloads {
        let record = store.store(content).unwrap();
        assert_eq!(record.content_hash, hex::encode(Sha256::digest(content)));
        assert_eq!(store.retrieve(&record).unwrap(), content);
    }
}

#[test]
fn test_tampered_ciphertext_fails_authentication() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let record = store.store(b"sensitive attachment").unwrap();

    let mut artifact = fs::read(&record.storage_path).unwrap();
    let last = artifact.len() - 1;
    artifact[last] ^= 0x01;
    fs::write(&record.storage_path, &artifact).unwrap();

    let result = store.retrieve(&record);
    assert!(matches!(result, Err(AuditError::IntegrityError(_))));
}

#[test]
fn test_tampered_nonce_fails_authentication() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let record = store.store(b"sensitive attachment").unwrap();

    let mut artifact = fs::read(&record.storage_path).unwrap();
    artifact[0] ^= 0x01;
    fs::write(&record.storage_path, &artifact).unwrap();

    assert!(store.retrieve(&record).is_err());
}

#[test]
fn test_truncated_artifact_is_an_integrity_error() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let record = store.store(b"sensitive attachment").unwrap();
    fs::write(&record.storage_path, [0u8; NONCE_BYTES + TAG_BYTES - 1]).unwrap();

    let result = store.retrieve(&record);
    assert!(matches!(result, Err(AuditError::IntegrityError(_))));
}

#[test]
fn test_identical_content_is_idempotent() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let first = store.store(b"hello-evidence").unwrap();
    let second = store.store(b"hello-evidence").unwrap();

    assert_eq!(first.content_hash, second.content_hash);
    assert_eq!(first.storage_path, second.storage_path);

    // One file, overwritten rather than duplicated.
    let shard_dir = first.storage_path.parent().unwrap();
    let artifact_count = fs::read_dir(shard_dir).unwrap().count();
    assert_eq!(artifact_count, 1);

    assert_eq!(store.retrieve(&second).unwrap(), b"hello-evidence");
}

#[test]
fn test_storage_path_is_sharded_by_hash_prefix() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let record = store.store(b"hello-evidence").unwrap();

    let shard = record
        .storage_path
        .parent()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .to_string();
    assert_eq!(shard, record.content_hash[..8]);
    assert_eq!(
        record.storage_path.file_name().unwrap().to_string_lossy(),
        format!("{}.enc", record.content_hash)
    );
}

#[test]
fn test_sweep_deletes_only_expired_artifacts() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let record = store.store(b"stored at T0").unwrap();
    let now = Utc::now();

    // Under the 7-day window (whole-day truncation): nothing goes.
    assert_eq!(store.sweep_expired(now + Duration::days(6)).unwrap(), 0);
    assert_eq!(
        store
            .sweep_expired(now + Duration::days(7) - Duration::hours(1))
            .unwrap(),
        0
    );
    assert!(record.storage_path.exists());

    // Past the window: exactly this artifact goes.
    assert_eq!(
        store
            .sweep_expired(now + Duration::days(7) + Duration::hours(1))
            .unwrap(),
        1
    );
    assert!(!record.storage_path.exists());

    // Sweeping again is a benign no-op.
    assert_eq!(
        store
            .sweep_expired(now + Duration::days(7) + Duration::hours(1))
            .unwrap(),
        0
    );
}

#[test]
fn test_sweep_spares_fresh_artifacts() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path(), shared_keys()).unwrap();

    let first = store.store(b"one artifact").unwrap();
    let second = store.store(b"another artifact").unwrap();

    // Both artifacts are inside the retention window right now.
    assert_eq!(store.sweep_expired(Utc::now()).unwrap(), 0);
    assert!(first.storage_path.exists());
    assert!(second.storage_path.exists());

    assert_eq!(store.sweep_expired(Utc::now() + Duration::days(8)).unwrap(), 2);
}

#[test]
fn test_store_file_streams_large_input() {
    let temp_dir = tempdir().unwrap();
    let store = EvidenceStore::new(temp_dir.path().join("evidence"), shared_keys()).unwrap();

    let file_path = temp_dir.path().join("large.bin");
    let content = vec![0xa5u8; 1 << 20];
    fs::write(&file_path, &content).unwrap();

    let record = store.store_file(&file_path).unwrap();
    assert_eq!(record.content_hash, hex::encode(Sha256::digest(&content)));
    assert_eq!(store.retrieve(&record).unwrap(), content);
}
