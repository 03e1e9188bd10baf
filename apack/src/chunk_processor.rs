//! The chunk processor: the single place that touches compression and
//! encryption code. Compress-then-encrypt on write; decrypt-then-decompress
//! on read. This ordering means authentication covers the compressed
//! payload, so a single bit flip anywhere in the stored bytes is caught by
//! the AEAD before the decompressor ever sees it.

use std::sync::Arc;

use apack_domain::constants::MAX_CHUNK_SIZE;
use apack_domain::error::ArchiveError;
use apack_domain::services::{CompressionProvider, EncryptionProvider};
use apack_domain::value_objects::{ProcessedChunk, SecretKey};

#[derive(Clone)]
pub struct CompressionSetting {
    pub provider: Arc<dyn CompressionProvider>,
    pub level: i32,
}

#[derive(Clone)]
pub struct EncryptionSetting {
    pub provider: Arc<dyn EncryptionProvider>,
    pub key: SecretKey,
}

/// Applies and reverses the per-chunk pipeline. Holds at most one
/// compressor and one encryptor — never dispatches on an algorithm id
/// itself, it only calls through whichever providers it was built with.
#[derive(Clone, Default)]
pub struct ChunkProcessor {
    compression: Option<CompressionSetting>,
    encryption: Option<EncryptionSetting>,
}

impl ChunkProcessor {
    pub fn new(compression: Option<CompressionSetting>, encryption: Option<EncryptionSetting>) -> Self {
        ChunkProcessor { compression, encryption }
    }

    pub fn pass_through() -> Self {
        ChunkProcessor::default()
    }

    pub fn compression_id(&self) -> u8 {
        self.compression.as_ref().map(|c| c.provider.id().as_u8()).unwrap_or(0)
    }

    pub fn encryption_id(&self) -> u8 {
        self.encryption.as_ref().map(|e| e.provider.id().as_u8()).unwrap_or(0)
    }

    pub fn process_for_write(&self, plaintext: &[u8]) -> Result<ProcessedChunk, ArchiveError> {
        let original_size = plaintext.len() as u32;
        let mut data = plaintext.to_vec();
        let mut compressed = false;

        if let Some(setting) = &self.compression {
            let candidate = setting.provider.compress(&data, setting.level)?;
            if candidate.len() < data.len() {
                data = candidate;
                compressed = true;
            }
        }

        let mut encrypted = false;
        if let Some(setting) = &self.encryption {
            data = setting.provider.encrypt(&data, &setting.key)?;
            encrypted = true;
        }

        Ok(ProcessedChunk {
            stored_size: data.len() as u32,
            data,
            original_size,
            compressed,
            encrypted,
        })
    }

    pub fn process_for_read(
        &self,
        stored_bytes: &[u8],
        original_size: u32,
        compressed_flag: bool,
        encrypted_flag: bool,
    ) -> Result<Vec<u8>, ArchiveError> {
        let mut data = stored_bytes.to_vec();

        if encrypted_flag {
            let setting = self
                .encryption
                .as_ref()
                .ok_or_else(|| ArchiveError::decryption("no encryption key provided"))?;
            data = setting.provider.decrypt(&data, &setting.key)?;
        }

        if compressed_flag {
            let setting = self
                .compression
                .as_ref()
                .ok_or_else(|| ArchiveError::decompression("no compression provider configured"))?;
            let bound = (original_size as usize).min(MAX_CHUNK_SIZE as usize);
            data = setting.provider.decompress(&data, bound)?;
            if data.len() != original_size as usize {
                return Err(ArchiveError::decompression(format!(
                    "decompression size mismatch: expected {original_size}, got {}",
                    data.len()
                )));
            }
        }

        Ok(data)
    }
}
