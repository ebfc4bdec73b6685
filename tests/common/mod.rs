//! Shared test setup: tracing initialization and a process-wide key
//! fixture so each test binary pays for RSA key generation only once.

use std::sync::OnceLock;

use audit_trail::KeyMaterial;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "audit_trail=debug".into()),
            )
            .try_init();
    });
}

#[allow(dead_code)]
pub fn shared_keys() -> &'static KeyMaterial {
    static KEYS: OnceLock<(TempDir, KeyMaterial)> = OnceLock::new();
    let (_dir, keys) = KEYS.get_or_init(|| {
        let dir = tempfile::tempdir().expect("create key fixture dir");
        let keys = KeyMaterial::load_or_generate(dir.path()).expect("generate key fixture");
        (dir, keys)
    });
    keys
}
