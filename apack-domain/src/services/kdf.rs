//! Key derivation and key wrapping.
//!
//! Two orthogonal contracts: a `KeyDerivation` provider turns a password
//! into key material, and the free `wrap`/`unwrap` functions use any
//! `EncryptionProvider` as the AEAD that protects a content key under a
//! password-derived wrapping key.

use rand::RngCore;

use crate::error::ArchiveError;
use crate::services::encryption::EncryptionProvider;
use crate::value_objects::{EncryptionId, SecretKey};

pub const SALT_LEN: usize = 16;

pub trait KeyDerivation: Send + Sync {
    /// `(password, salt, params)` always yields the same key — this is a
    /// deterministic function of its inputs, not a random one.
    fn derive(&self, password: &[u8], salt: &[u8], desired_key_length: usize) -> Result<SecretKey, ArchiveError>;
}

pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Wraps a content key under an already-available wrapping key.
pub fn wrap(content_key: &SecretKey, wrapping_key: &SecretKey, provider: &dyn EncryptionProvider) -> Result<Vec<u8>, ArchiveError> {
    provider.encrypt(content_key.as_bytes(), wrapping_key)
}

/// Unwraps a content key, refusing to proceed if `provider` is not the
/// algorithm the wrapped bytes claim to have been produced with.
pub fn unwrap(
    wrapped_bytes: &[u8],
    wrapping_key: &SecretKey,
    expected_algorithm: EncryptionId,
    provider: &dyn EncryptionProvider,
) -> Result<SecretKey, ArchiveError> {
    if provider.id() != expected_algorithm {
        return Err(ArchiveError::format(format!(
            "wrapped key claims algorithm {:?} but provider is {:?}",
            expected_algorithm,
            provider.id()
        )));
    }
    let bytes = provider.decrypt(wrapped_bytes, wrapping_key)?;
    Ok(SecretKey::new(bytes))
}

pub fn wrap_with_password(
    content_key: &SecretKey,
    password: &[u8],
    salt: &[u8],
    kdf: &dyn KeyDerivation,
    provider: &dyn EncryptionProvider,
) -> Result<Vec<u8>, ArchiveError> {
    let wrapping_key = kdf.derive(password, salt, provider.key_length_bytes())?;
    wrap(content_key, &wrapping_key, provider)
}

pub fn unwrap_with_password(
    wrapped: &[u8],
    password: &[u8],
    salt: &[u8],
    kdf: &dyn KeyDerivation,
    expected_algorithm: EncryptionId,
    provider: &dyn EncryptionProvider,
) -> Result<SecretKey, ArchiveError> {
    let wrapping_key = kdf.derive(password, salt, provider.key_length_bytes())?;
    unwrap(wrapped, &wrapping_key, expected_algorithm, provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::checksum::crc32;

    #[test]
    fn salts_are_sixteen_bytes_and_differ() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), SALT_LEN);
        assert_ne!(a, b);
    }

    /// A minimal AEAD-shaped stand-in: XOR keystream plus a CRC32 tag over
    /// the plaintext, just enough to exercise `wrap`/`unwrap`'s own logic
    /// without pulling a real cipher crate into the domain layer.
    struct XorProvider {
        id: EncryptionId,
    }

    fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
        data.iter().zip(key.iter().cycle()).map(|(b, k)| b ^ k).collect()
    }

    impl EncryptionProvider for XorProvider {
        fn id(&self) -> EncryptionId {
            self.id
        }

        fn key_length_bytes(&self) -> usize {
            8
        }

        fn generate_key(&self) -> SecretKey {
            SecretKey::new(vec![0x5A; 8])
        }

        fn encrypt(&self, plaintext: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError> {
            let mut out = xor(plaintext, key.as_bytes());
            out.extend_from_slice(&crc32(plaintext).to_le_bytes());
            Ok(out)
        }

        fn decrypt(&self, framed_bytes: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError> {
            if framed_bytes.len() < 4 {
                return Err(ArchiveError::decryption("Decryption failed: truncated ciphertext"));
            }
            let (ciphertext, tag) = framed_bytes.split_at(framed_bytes.len() - 4);
            let plaintext = xor(ciphertext, key.as_bytes());
            let expected_tag = u32::from_le_bytes(tag.try_into().unwrap());
            if crc32(&plaintext) != expected_tag {
                return Err(ArchiveError::decryption("Decryption failed: tag mismatch"));
            }
            Ok(plaintext)
        }
    }

    /// Deterministic stand-in KDF: same (password, salt, length) always
    /// derives the same bytes, different inputs derive different bytes.
    struct FixedKdf;

    impl KeyDerivation for FixedKdf {
        fn derive(&self, password: &[u8], salt: &[u8], desired_key_length: usize) -> Result<SecretKey, ArchiveError> {
            let bytes = (0..desired_key_length)
                .map(|i| {
                    let p = password[i % password.len()];
                    let s = salt[i % salt.len()];
                    p ^ s
                })
                .collect();
            Ok(SecretKey::new(bytes))
        }
    }

    #[test]
    fn wrap_then_unwrap_recovers_the_content_key() {
        let provider = XorProvider { id: EncryptionId::Aes256Gcm };
        let content_key = SecretKey::new(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let wrapping_key = provider.generate_key();

        let wrapped = wrap(&content_key, &wrapping_key, &provider).unwrap();
        let recovered = unwrap(&wrapped, &wrapping_key, EncryptionId::Aes256Gcm, &provider).unwrap();
        assert_eq!(recovered, content_key);
    }

    #[test]
    fn unwrap_rejects_algorithm_mismatch() {
        let provider = XorProvider { id: EncryptionId::Aes256Gcm };
        let content_key = SecretKey::new(vec![9; 8]);
        let wrapping_key = provider.generate_key();
        let wrapped = wrap(&content_key, &wrapping_key, &provider).unwrap();

        let err = unwrap(&wrapped, &wrapping_key, EncryptionId::ChaCha20Poly1305, &provider).unwrap_err();
        assert!(matches!(err, ArchiveError::Format(_)));
    }

    #[test]
    fn wrap_with_password_then_unwrap_with_password_recovers_the_content_key() {
        let provider = XorProvider { id: EncryptionId::Aes256Gcm };
        let kdf = FixedKdf;
        let content_key = SecretKey::new(vec![7; 8]);
        let salt = generate_salt();
        let password = b"correct horse battery staple";

        let wrapped = wrap_with_password(&content_key, password, &salt, &kdf, &provider).unwrap();
        let recovered = unwrap_with_password(&wrapped, password, &salt, &kdf, EncryptionId::Aes256Gcm, &provider).unwrap();
        assert_eq!(recovered, content_key);
    }

    #[test]
    fn unwrap_with_password_fails_with_wrong_password() {
        let provider = XorProvider { id: EncryptionId::Aes256Gcm };
        let kdf = FixedKdf;
        let content_key = SecretKey::new(vec![3; 8]);
        let salt = generate_salt();

        let wrapped = wrap_with_password(&content_key, b"right-password-1", &salt, &kdf, &provider).unwrap();
        let err = unwrap_with_password(&wrapped, b"wrong-password-2", &salt, &kdf, EncryptionId::Aes256Gcm, &provider).unwrap_err();
        assert!(matches!(err, ArchiveError::Decryption(_)));
    }
}
