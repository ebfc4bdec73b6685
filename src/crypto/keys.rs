//! Key Material Manager
//!
//! Loads or generates the persistent key material for the audit system:
//! a 256-bit symmetric key for evidence encryption (raw file) and an
//! RSA-2048 key pair for entry signing (PEM files). Persisted material is
//! always loaded verbatim; generation happens only when a file is absent.

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::crypto::signer::EntrySigner;
use crate::error::AuditError;

/// Raw 256-bit symmetric key for evidence encryption
pub const SYMMETRIC_KEY_FILE: &str = "evidence_key.bin";
/// PKCS#8 PEM private signing key
pub const PRIVATE_KEY_FILE: &str = "audit_private_key.pem";
/// SPKI PEM public verification key
pub const PUBLIC_KEY_FILE: &str = "audit_public_key.pem";

pub const SYMMETRIC_KEY_BYTES: usize = 32;
pub const RSA_KEY_BITS: usize = 2048;

/// Process-lifetime key material, loaded once at startup and passed
/// explicitly to the components that need it. Never serialized.
pub struct KeyMaterial {
    symmetric_key: [u8; SYMMETRIC_KEY_BYTES],
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl KeyMaterial {
    /// Load persisted key material from `key_dir`, generating and
    /// persisting fresh material for any artifact that does not exist.
    /// Idempotent across process restarts.
    pub fn load_or_generate(key_dir: &Path) -> Result<Self, AuditError> {
        fs::create_dir_all(key_dir).map_err(|e| {
            AuditError::KeyStorageError(format!(
                "Failed to create key directory {}: {}",
                key_dir.display(),
                e
            ))
        })?;

        let symmetric_key = Self::load_or_generate_symmetric(key_dir)?;
        let (private_key, public_key) = Self::load_or_generate_keypair(key_dir)?;

        Ok(Self {
            symmetric_key,
            private_key,
            public_key,
        })
    }

    /// The 256-bit evidence encryption key.
    pub fn symmetric_key(&self) -> &[u8; SYMMETRIC_KEY_BYTES] {
        &self.symmetric_key
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Build an entry signer over this key pair.
    pub fn signer(&self) -> EntrySigner {
        EntrySigner::new(self.private_key.clone(), self.public_key.clone())
    }

    fn load_or_generate_symmetric(
        key_dir: &Path,
    ) -> Result<[u8; SYMMETRIC_KEY_BYTES], AuditError> {
        let key_path = key_dir.join(SYMMETRIC_KEY_FILE);

        if key_path.exists() {
            let bytes = fs::read(&key_path).map_err(|e| {
                AuditError::KeyStorageError(format!(
                    "Failed to read symmetric key {}: {}",
                    key_path.display(),
                    e
                ))
            })?;
            let key: [u8; SYMMETRIC_KEY_BYTES] = bytes.as_slice().try_into().map_err(|_| {
                AuditError::KeyFormatError(format!(
                    "Symmetric key {} has {} bytes, expected {}",
                    key_path.display(),
                    bytes.len(),
                    SYMMETRIC_KEY_BYTES
                ))
            })?;
            return Ok(key);
        }

        let mut key = [0u8; SYMMETRIC_KEY_BYTES];
        OsRng.fill_bytes(&mut key);
        fs::write(&key_path, key).map_err(|e| {
            AuditError::KeyStorageError(format!(
                "Failed to persist symmetric key {}: {}",
                key_path.display(),
                e
            ))
        })?;

        info!("Generated symmetric evidence key: {}", key_path.display());
        Ok(key)
    }

    fn load_or_generate_keypair(
        key_dir: &Path,
    ) -> Result<(RsaPrivateKey, RsaPublicKey), AuditError> {
        let private_path = key_dir.join(PRIVATE_KEY_FILE);
        let public_path = key_dir.join(PUBLIC_KEY_FILE);

        if private_path.exists() {
            let private_pem = fs::read_to_string(&private_path).map_err(|e| {
                AuditError::KeyStorageError(format!(
                    "Failed to read private key {}: {}",
                    private_path.display(),
                    e
                ))
            })?;
            let private_key = RsaPrivateKey::from_pkcs8_pem(&private_pem).map_err(|e| {
                AuditError::KeyFormatError(format!(
                    "Failed to parse private key {}: {}",
                    private_path.display(),
                    e
                ))
            })?;

            let public_pem = fs::read_to_string(&public_path).map_err(|e| {
                AuditError::KeyStorageError(format!(
                    "Failed to read public key {}: {}",
                    public_path.display(),
                    e
                ))
            })?;
            let public_key = RsaPublicKey::from_public_key_pem(&public_pem).map_err(|e| {
                AuditError::KeyFormatError(format!(
                    "Failed to parse public key {}: {}",
                    public_path.display(),
                    e
                ))
            })?;

            return Ok((private_key, public_key));
        }

        let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| AuditError::CryptoError(format!("RSA key generation failed: {}", e)))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).map_err(|e| {
            AuditError::CryptoError(format!("Failed to encode private key: {}", e))
        })?;
        fs::write(&private_path, private_pem.as_bytes()).map_err(|e| {
            AuditError::KeyStorageError(format!(
                "Failed to persist private key {}: {}",
                private_path.display(),
                e
            ))
        })?;

        let public_pem = public_key.to_public_key_pem(LineEnding::LF).map_err(|e| {
            AuditError::CryptoError(format!("Failed to encode public key: {}", e))
        })?;
        fs::write(&public_path, public_pem.as_bytes()).map_err(|e| {
            AuditError::KeyStorageError(format!(
                "Failed to persist public key {}: {}",
                public_path.display(),
                e
            ))
        })?;

        info!("Generated RSA-{} signing pair: {}", RSA_KEY_BITS, key_dir.display());
        Ok((private_key, public_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generation_creates_all_artifacts() {
        let temp_dir = tempdir().unwrap();
        let _keys = KeyMaterial::load_or_generate(temp_dir.path()).unwrap();

        assert!(temp_dir.path().join(SYMMETRIC_KEY_FILE).exists());
        assert!(temp_dir.path().join(PRIVATE_KEY_FILE).exists());
        assert!(temp_dir.path().join(PUBLIC_KEY_FILE).exists());
    }

    #[test]
    fn test_reload_returns_identical_material() {
        let temp_dir = tempdir().unwrap();
        let first = KeyMaterial::load_or_generate(temp_dir.path()).unwrap();
        let second = KeyMaterial::load_or_generate(temp_dir.path()).unwrap();

        assert_eq!(first.symmetric_key(), second.symmetric_key());
        assert_eq!(first.private_key(), second.private_key());
        assert_eq!(first.public_key(), second.public_key());
    }

    #[test]
    fn test_truncated_symmetric_key_is_a_format_error() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join(SYMMETRIC_KEY_FILE), [0u8; 16]).unwrap();

        let result = KeyMaterial::load_or_generate(temp_dir.path());
        assert!(matches!(result, Err(AuditError::KeyFormatError(_))));
    }
}
