use thiserror::Error;

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::CryptoError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(format!("I/O error: {}", err))
    }
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Key storage error: {0}")]
    KeyStorageError(String),

    #[error("Key format error: {0}")]
    KeyFormatError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Integrity error: {0}")]
    IntegrityError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(String),
}

impl AuditError {
    pub fn missing_field(field: &str) -> Self {
        Self::ValidationError(format!("Missing required field: {}", field))
    }

    pub fn malformed_trace_id(trace_id: &str) -> Self {
        Self::ValidationError(format!(
            "Malformed trace id: {} (expected \"<uuid-v4>:<ISO8601-UTC-Z>\")",
            trace_id
        ))
    }
}
