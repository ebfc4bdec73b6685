//! Audit Log System
//!
//! Tamper-evident audit entries: assembly of the canonical payload,
//! hash-chained and signed append, journal persistence, and chain
//! verification.

pub mod assembler;
pub mod entry;
pub mod journal;
pub mod logger;
pub mod verify;

pub use assembler::assemble;
pub use entry::{
    AuditEntry, EntryPayload, IntegrityBlock, RequestMetadata, ResponseMetadata, GENESIS_HASH,
    SIGNATURE_ALGORITHM,
};
pub use journal::AuditJournal;
pub use logger::HashChainLogger;
pub use verify::{verify_chain, verify_entry, verify_log_file, ChainVerification};
