//! AES-256-GCM provider: 96-bit nonces, 128-bit tags, framed as
//! `nonce || ciphertext || tag`.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use ring::rand::{SecureRandom, SystemRandom};

use apack_domain::error::ArchiveError;
use apack_domain::services::EncryptionProvider;
use apack_domain::value_objects::{EncryptionId, SecretKey};

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

pub struct Aes256GcmProvider {
    rng: SystemRandom,
}

impl Default for Aes256GcmProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Aes256GcmProvider {
    pub fn new() -> Self {
        Aes256GcmProvider { rng: SystemRandom::new() }
    }
}

impl EncryptionProvider for Aes256GcmProvider {
    fn id(&self) -> EncryptionId {
        EncryptionId::Aes256Gcm
    }

    fn key_length_bytes(&self) -> usize {
        KEY_LEN
    }

    fn generate_key(&self) -> SecretKey {
        let mut key = vec![0u8; KEY_LEN];
        // SystemRandom::fill only fails on OS entropy exhaustion, which this
        // crate treats as unrecoverable rather than a reportable error.
        self.rng.fill(&mut key).expect("system RNG failed to fill key material");
        SecretKey::new(key)
    }

    fn encrypt(&self, plaintext: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError> {
        if key.len() != KEY_LEN {
            return Err(ArchiveError::decryption(format!(
                "AES-256-GCM key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| ArchiveError::decryption("failed to generate a nonce"))?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, Payload { msg: plaintext, aad: &[] })
            .map_err(|e| ArchiveError::decryption(format!("AES-256-GCM encryption failed: {e}")))?;

        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);
        Ok(framed)
    }

    fn decrypt(&self, framed_bytes: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError> {
        if key.len() != KEY_LEN {
            return Err(ArchiveError::decryption(format!(
                "AES-256-GCM key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        if framed_bytes.len() < NONCE_LEN {
            return Err(ArchiveError::decryption("Decryption failed: framed bytes shorter than a nonce"));
        }
        let (nonce_bytes, ciphertext) = framed_bytes.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        let nonce = Nonce::from_slice(nonce_bytes);
        cipher
            .decrypt(nonce, Payload { msg: ciphertext, aad: &[] })
            .map_err(|_| ArchiveError::decryption("Decryption failed: authentication tag mismatch"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips() {
        let provider = Aes256GcmProvider::new();
        let key = provider.generate_key();
        let plaintext = b"a savegame's worth of bytes";
        let framed = provider.encrypt(plaintext, &key).unwrap();
        assert_eq!(provider.decrypt(&framed, &key).unwrap(), plaintext);
    }

    #[test]
    fn wrong_key_fails_with_decryption_failed() {
        let provider = Aes256GcmProvider::new();
        let k1 = provider.generate_key();
        let k2 = provider.generate_key();
        let framed = provider.encrypt(b"secret", &k1).unwrap();
        let err = provider.decrypt(&framed, &k2).unwrap_err();
        assert!(err.to_string().contains("Decryption failed"));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let provider = Aes256GcmProvider::new();
        let key = provider.generate_key();
        let mut framed = provider.encrypt(b"secret payload", &key).unwrap();
        let last = framed.len() - 1;
        framed[last] ^= 0xFF;
        assert!(provider.decrypt(&framed, &key).is_err());
    }

    #[test]
    fn nonces_differ_between_calls() {
        let provider = Aes256GcmProvider::new();
        let key = provider.generate_key();
        let a = provider.encrypt(b"same plaintext", &key).unwrap();
        let b = provider.encrypt(b"same plaintext", &key).unwrap();
        assert_ne!(&a[..NONCE_LEN], &b[..NONCE_LEN]);
    }
}
