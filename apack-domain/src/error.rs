//! Error taxonomy for the archive format.
//!
//! One enum, one place, matching the taxonomy every component in this crate
//! reports through: chunk decode, trailer parsing, header validation, and the
//! provider traits all return `ArchiveError`.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("bad magic: {0}")]
    BadMagic(String),

    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),

    #[error("header checksum mismatch: {0}")]
    HeaderChecksumMismatch(String),

    #[error("checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("bounds violation: {0}")]
    BoundsViolation(String),

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(String),

    #[error("too many entries: {0}")]
    TooManyEntries(String),

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("null argument: {0}")]
    NullArgument(String),

    #[error("decompression error: {0}")]
    Decompression(String),

    #[error("decryption error: {0}")]
    Decryption(String),

    #[error("already closed: {0}")]
    AlreadyClosed(String),

    #[error("format error: {0}")]
    Format(String),
}

impl ArchiveError {
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn bad_magic(msg: impl Into<String>) -> Self {
        Self::BadMagic(msg.into())
    }

    pub fn header_checksum_mismatch(msg: impl Into<String>) -> Self {
        Self::HeaderChecksumMismatch(msg.into())
    }

    pub fn checksum_mismatch(msg: impl Into<String>) -> Self {
        Self::ChecksumMismatch(msg.into())
    }

    pub fn bounds_violation(msg: impl Into<String>) -> Self {
        Self::BoundsViolation(msg.into())
    }

    pub fn invalid_chunk_size(msg: impl Into<String>) -> Self {
        Self::InvalidChunkSize(msg.into())
    }

    pub fn too_many_entries(msg: impl Into<String>) -> Self {
        Self::TooManyEntries(msg.into())
    }

    pub fn duplicate_name(msg: impl Into<String>) -> Self {
        Self::DuplicateName(msg.into())
    }

    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    pub fn null_argument(msg: impl Into<String>) -> Self {
        Self::NullArgument(msg.into())
    }

    /// Decryption failures must mention "Decryption failed" or "no encryption
    /// key provided" per the AEAD provider contract.
    pub fn decryption(msg: impl Into<String>) -> Self {
        Self::Decryption(msg.into())
    }

    pub fn decompression(msg: impl Into<String>) -> Self {
        Self::Decompression(msg.into())
    }

    pub fn already_closed(msg: impl Into<String>) -> Self {
        Self::AlreadyClosed(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Transient conditions a caller might retry. Integrity and format
    /// failures never are.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ArchiveError::Io(_))
    }

    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            ArchiveError::ChecksumMismatch(_)
                | ArchiveError::HeaderChecksumMismatch(_)
                | ArchiveError::Decryption(_)
        )
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        ArchiveError::Io(e.to_string())
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
