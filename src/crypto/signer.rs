use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::AuditError;

/// RSA-PSS signer for audit entry integrity blocks.
///
/// Signatures are produced over the UTF-8 bytes of the message with a
/// SHA-256 digest and the salt length maximized for the key modulus.
pub struct EntrySigner {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl EntrySigner {
    pub fn new(private_key: RsaPrivateKey, public_key: RsaPublicKey) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    /// Sign a message, returning the hex-encoded signature.
    pub fn sign(&self, message: &str) -> Result<String, AuditError> {
        let digest = Sha256::digest(message.as_bytes());
        let signature = self
            .private_key
            .sign_with_rng(&mut OsRng, pss_padding(self.private_key.size()), &digest)
            .map_err(|e| AuditError::CryptoError(format!("Signature creation failed: {}", e)))?;
        Ok(hex::encode(signature))
    }

    /// Verify a hex-encoded signature over a message. Returns `false` on
    /// any failure, including malformed signature encodings.
    pub fn verify(&self, message: &str, signature_hex: &str) -> bool {
        verify_with_key(&self.public_key, message, signature_hex)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

/// Verify a hex-encoded RSA-PSS signature using only the public key.
pub fn verify_with_key(public_key: &RsaPublicKey, message: &str, signature_hex: &str) -> bool {
    let signature = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let digest = Sha256::digest(message.as_bytes());
    public_key
        .verify(pss_padding(public_key.size()), &digest, &signature)
        .is_ok()
}

// Maximized salt: emLen - hLen - 2 for a SHA-256 digest.
fn pss_padding(modulus_bytes: usize) -> Pss {
    let salt_len = modulus_bytes - Sha256::output_size() - 2;
    Pss::new_with_salt::<Sha256>(salt_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn test_signer() -> EntrySigner {
        static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
        let (private_key, public_key) = KEYS.get_or_init(|| {
            let private_key =
                RsaPrivateKey::new(&mut OsRng, crate::crypto::keys::RSA_KEY_BITS).unwrap();
            let public_key = RsaPublicKey::from(&private_key);
            (private_key, public_key)
        });
        EntrySigner::new(private_key.clone(), public_key.clone())
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = test_signer();
        let message = "abc123:000000";

        let signature = signer.sign(message).unwrap();
        assert!(signer.verify(message, &signature));
        assert!(!signer.verify("abc123:ffffff", &signature));
    }

    #[test]
    fn test_signatures_are_probabilistic() {
        let signer = test_signer();
        let message = "same message";

        let first = signer.sign(message).unwrap();
        let second = signer.sign(message).unwrap();

        // PSS salts are random, so two signatures over the same message differ.
        assert_ne!(first, second);
        assert!(signer.verify(message, &first));
        assert!(signer.verify(message, &second));
    }

    #[test]
    fn test_malformed_signature_is_rejected() {
        let signer = test_signer();
        assert!(!signer.verify("message", "not-hex"));
        assert!(!signer.verify("message", "deadbeef"));
    }
}
