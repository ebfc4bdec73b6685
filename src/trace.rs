//! Trace Identifiers
//!
//! Correlation identifiers of the form `<uuid-v4>:<ISO8601-UTC-Z>`,
//! e.g. `550e8400-e29b-41d4-a716-446655440000:2025-11-20T03:47:14Z`.

use chrono::Utc;
use uuid::Uuid;

/// Generate a fresh trace identifier for one interaction.
pub fn generate_trace_id() -> String {
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!("{}:{}", Uuid::new_v4(), timestamp)
}

/// Validate the trace-identifier shape: a 36-character UUID, then a
/// UTC timestamp containing `T` and ending in `Z`.
pub fn is_valid_trace_id(trace_id: &str) -> bool {
    let Some((uuid_part, timestamp_part)) = trace_id.split_once(':') else {
        return false;
    };

    uuid_part.len() == 36
        && Uuid::parse_str(uuid_part).is_ok()
        && timestamp_part.contains('T')
        && timestamp_part.ends_with('Z')
}
