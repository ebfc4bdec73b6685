//! PII Detection Boundary
//!
//! Interface to the upstream PII detector. Detection itself (regex or
//! ML-assisted classification) lives outside this crate; the audit core
//! only embeds the detector's metadata verbatim under
//! `request.pii_detection`.

use serde_json::Value;

use crate::error::AuditError;

/// Output of one detection pass over a text.
#[derive(Debug, Clone)]
pub struct PiiDetection {
    /// The input with detected spans replaced by mask tokens.
    pub masked_text: String,
    /// Detector-specific summary, embedded verbatim in the audit entry.
    pub metadata: Value,
}

/// A PII detector consumed at the audit boundary.
pub trait PiiDetector {
    fn detect(&self, text: &str, language: &str) -> Result<PiiDetection, AuditError>;
}
