//! ChaCha20-Poly1305 provider: 96-bit nonces, 128-bit tags, same framing as
//! the AES-256-GCM provider so the Chunk Processor treats both uniformly.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use ring::rand::{SecureRandom, SystemRandom};

use apack_domain::error::ArchiveError;
use apack_domain::services::EncryptionProvider;
use apack_domain::value_objects::{EncryptionId, SecretKey};

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

pub struct ChaCha20Poly1305Provider {
    rng: SystemRandom,
}

impl Default for ChaCha20Poly1305Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChaCha20Poly1305Provider {
    pub fn new() -> Self {
        ChaCha20Poly1305Provider { rng: SystemRandom::new() }
    }
}

impl EncryptionProvider for ChaCha20Poly1305Provider {
    fn id(&self) -> EncryptionId {
        EncryptionId::ChaCha20Poly1305
    }

    fn key_length_bytes(&self) -> usize {
        KEY_LEN
    }

    fn generate_key(&self) -> SecretKey {
        let mut key = vec![0u8; KEY_LEN];
        self.rng.fill(&mut key).expect("system RNG failed to fill key material");
        SecretKey::new(key)
    }

    fn encrypt(&self, plaintext: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError> {
        if key.len() != KEY_LEN {
            return Err(ArchiveError::decryption(format!(
                "ChaCha20-Poly1305 key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| ArchiveError::decryption("failed to generate a nonce"))?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, Payload { msg: plaintext, aad: &[] })
            .map_err(|e| ArchiveError::decryption(format!("ChaCha20-Poly1305 encryption failed: {e}")))?;

        let mut framed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&ciphertext);
        Ok(framed)
    }

    fn decrypt(&self, framed_bytes: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError> {
        if key.len() != KEY_LEN {
            return Err(ArchiveError::decryption(format!(
                "ChaCha20-Poly1305 key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        if framed_bytes.len() < NONCE_LEN {
            return Err(ArchiveError::decryption("Decryption failed: framed bytes shorter than a nonce"));
        }
        let (nonce_bytes, ciphertext) = framed_bytes.split_at(NONCE_LEN);
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
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
        let provider = ChaCha20Poly1305Provider::new();
        let key = provider.generate_key();
        let plaintext = b"a savegame's worth of bytes";
        let framed = provider.encrypt(plaintext, &key).unwrap();
        assert_eq!(provider.decrypt(&framed, &key).unwrap(), plaintext);
    }

    #[test]
    fn wrong_key_fails_with_decryption_failed() {
        let provider = ChaCha20Poly1305Provider::new();
        let k1 = provider.generate_key();
        let k2 = provider.generate_key();
        let framed = provider.encrypt(b"secret", &k1).unwrap();
        let err = provider.decrypt(&framed, &k2).unwrap_err();
        assert!(err.to_string().contains("Decryption failed"));
    }
}
