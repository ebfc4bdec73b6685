//! Cryptographic Key Material and Signing
//!
//! Loads or generates the persistent key material (AES-256 evidence key,
//! RSA-2048 signing pair) and provides the RSA-PSS signing primitives
//! used by the hash-chain audit logger.

pub mod keys;
pub mod signer;

pub use keys::KeyMaterial;
pub use signer::{verify_with_key, EntrySigner};
