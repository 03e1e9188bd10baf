//! Pluggable authenticated-encryption contract.
//!
//! Every provider self-frames its output as `nonce || ciphertext || tag` so
//! a caller holding only the key and the framed bytes can decrypt without
//! out-of-band parameters.

use crate::error::ArchiveError;
use crate::value_objects::{EncryptionId, SecretKey};

pub trait EncryptionProvider: Send + Sync {
    fn id(&self) -> EncryptionId;

    fn key_length_bytes(&self) -> usize;

    fn generate_key(&self) -> SecretKey;

    /// Draws a fresh nonce internally; reuse of a nonce with the same key
    /// across calls is a provider bug, never the caller's responsibility.
    fn encrypt(&self, plaintext: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError>;

    /// Fails on any tamper of nonce, ciphertext, or tag, and on any wrong
    /// key. The error message contains "Decryption failed".
    fn decrypt(&self, framed_bytes: &[u8], key: &SecretKey) -> Result<Vec<u8>, ArchiveError>;
}
