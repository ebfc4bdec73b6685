//! Audit Entry Assembler
//!
//! Pure merge of request/response metadata, PII-detection output and an
//! optional evidence reference into the canonical payload shape consumed
//! by the hash-chain logger. No network or disk access.

use chrono::Utc;

use crate::audit::entry::{EntryPayload, RequestMetadata, ResponseMetadata};
use crate::error::AuditError;
use crate::evidence::record::EvidenceRecord;
use crate::trace;

/// Merge the parts of one audited interaction into an `EntryPayload`,
/// stamping the entry timestamp. Fails only on malformed inputs.
pub fn assemble(
    trace_id: &str,
    request: RequestMetadata,
    response: ResponseMetadata,
    evidence: Option<EvidenceRecord>,
) -> Result<EntryPayload, AuditError> {
    if !trace::is_valid_trace_id(trace_id) {
        return Err(AuditError::malformed_trace_id(trace_id));
    }
    if request.method.is_empty() {
        return Err(AuditError::missing_field("request.method"));
    }
    if request.body_hash.is_empty() {
        return Err(AuditError::missing_field("request.body_hash"));
    }
    if response.content_hash.is_empty() {
        return Err(AuditError::missing_field("response.content_hash"));
    }

    Ok(EntryPayload {
        id: trace_id.to_string(),
        timestamp: Utc::now(),
        request,
        response,
        evidence,
    })
}
