use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::AuditError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub evidence_dir: PathBuf,
    pub key_dir: PathBuf,
    pub chain_state_path: PathBuf,
}

impl AuditConfig {
    pub fn load() -> Result<Self, AuditError> {
        let evidence_dir = env::var("AUDIT_EVIDENCE_DIR")
            .unwrap_or_else(|_| "./logs/evidence".to_string());

        let key_dir = env::var("AUDIT_KEY_DIR").unwrap_or_else(|_| "./keys".to_string());

        let chain_state_path = env::var("AUDIT_CHAIN_STATE_PATH")
            .unwrap_or_else(|_| "./logs/chain.head".to_string());

        Ok(AuditConfig {
            evidence_dir: PathBuf::from(evidence_dir),
            key_dir: PathBuf::from(key_dir),
            chain_state_path: PathBuf::from(chain_state_path),
        })
    }

    pub fn new(evidence_dir: impl Into<PathBuf>, key_dir: impl Into<PathBuf>) -> Self {
        let key_dir = key_dir.into();
        let chain_state_path = key_dir.join("chain.head");
        Self {
            evidence_dir: evidence_dir.into(),
            key_dir,
            chain_state_path,
        }
    }

    /// Create the evidence and key directories if they do not exist yet.
    pub fn ensure_directories(&self) -> Result<(), AuditError> {
        std::fs::create_dir_all(&self.evidence_dir).map_err(|e| {
            AuditError::ConfigError(format!("Failed to create evidence directory: {}", e))
        })?;
        std::fs::create_dir_all(&self.key_dir).map_err(|e| {
            AuditError::ConfigError(format!("Failed to create key directory: {}", e))
        })?;
        if let Some(parent) = self.chain_state_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::ConfigError(format!("Failed to create chain state directory: {}", e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_derives_chain_state_path() {
        let config = AuditConfig::new("/tmp/evidence", "/tmp/keys");
        assert_eq!(config.evidence_dir, PathBuf::from("/tmp/evidence"));
        assert_eq!(config.key_dir, PathBuf::from("/tmp/keys"));
        assert_eq!(config.chain_state_path, PathBuf::from("/tmp/keys/chain.head"));
    }
}
