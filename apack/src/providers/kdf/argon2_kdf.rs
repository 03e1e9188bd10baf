//! Argon2id key derivation.
//!
//! Uses `Argon2::hash_password_into` with an explicit `Params`, the crate's
//! raw-key-derivation entry point. The teacher's own encryption adapter
//! instead calls `Argon2::hash_password` and slices bytes off the resulting
//! PHC string — that string is base64 text, not the raw KDF output, so
//! slicing it wastes most of the derivation's memory-hard work and does not
//! actually derive `desired_key_length` bytes of key material. This provider
//! avoids that mistake.

use argon2::{Algorithm, Argon2, Params, Version};

use apack_domain::error::ArchiveError;
use apack_domain::services::KeyDerivation;
use apack_domain::value_objects::SecretKey;

#[derive(Debug, Clone, Copy)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        // 19 MiB / 2 passes / 1 lane is the RFC 9106 "low-memory" Argon2id
        // recommendation; callers processing savegames on constrained
        // hardware can supply a lighter profile.
        Argon2Params { memory_kib: 19 * 1024, iterations: 2, parallelism: 1 }
    }
}

pub struct Argon2Kdf {
    params: Argon2Params,
}

impl Default for Argon2Kdf {
    fn default() -> Self {
        Self::new(Argon2Params::default())
    }
}

impl Argon2Kdf {
    pub fn new(params: Argon2Params) -> Self {
        Argon2Kdf { params }
    }
}

impl KeyDerivation for Argon2Kdf {
    fn derive(&self, password: &[u8], salt: &[u8], desired_key_length: usize) -> Result<SecretKey, ArchiveError> {
        let params = Params::new(self.params.memory_kib, self.params.iterations, self.params.parallelism, Some(desired_key_length))
            .map_err(|e| ArchiveError::format(format!("invalid Argon2 parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut output = vec![0u8; desired_key_length];
        argon2
            .hash_password_into(password, salt, &mut output)
            .map_err(|e| ArchiveError::format(format!("Argon2id derivation failed: {e}")))?;
        Ok(SecretKey::new(output))
    }
}
