//! Algorithm id bytes carried in chunk headers and TOC records so the
//! archive is self-describing: a reader can tell which provider produced a
//! chunk without any out-of-band configuration.

use crate::error::ArchiveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionId {
    None,
    Zstd,
    Lz4,
}

impl CompressionId {
    pub fn as_u8(self) -> u8 {
        match self {
            CompressionId::None => 0,
            CompressionId::Zstd => 1,
            CompressionId::Lz4 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, ArchiveError> {
        match value {
            0 => Ok(CompressionId::None),
            1 => Ok(CompressionId::Zstd),
            2 => Ok(CompressionId::Lz4),
            other => Err(ArchiveError::format(format!("unknown compression id {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionId {
    None,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl EncryptionId {
    pub fn as_u8(self) -> u8 {
        match self {
            EncryptionId::None => 0,
            EncryptionId::Aes256Gcm => 1,
            EncryptionId::ChaCha20Poly1305 => 2,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, ArchiveError> {
        match value {
            0 => Ok(EncryptionId::None),
            1 => Ok(EncryptionId::Aes256Gcm),
            2 => Ok(EncryptionId::ChaCha20Poly1305),
            other => Err(ArchiveError::format(format!("unknown encryption id {other}"))),
        }
    }
}

/// Format v1 has exactly one checksum algorithm; the byte is reserved for a
/// future v2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Crc32,
}

impl ChecksumAlgorithm {
    pub fn as_u8(self) -> u8 {
        match self {
            ChecksumAlgorithm::Crc32 => 1,
        }
    }

    pub fn from_u8(value: u8) -> Result<Self, ArchiveError> {
        match value {
            1 => Ok(ChecksumAlgorithm::Crc32),
            other => Err(ArchiveError::format(format!("unknown checksum algorithm id {other}"))),
        }
    }
}
