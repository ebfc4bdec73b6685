pub mod audit;
pub mod config;
pub mod crypto;
pub mod error;
pub mod evidence;
pub mod pii;
pub mod trace;

pub use audit::{assemble, AuditEntry, AuditJournal, EntryPayload, HashChainLogger};
pub use config::AuditConfig;
pub use crypto::KeyMaterial;
pub use error::AuditError;
pub use evidence::{EvidenceRecord, EvidenceStore};
