//! Chunk size value object.
//!
//! Mirrors the bounds fixed by format version 1 (see `constants`): a chunk
//! size below the minimum defeats the point of chunking, one above the
//! maximum risks the bounded-allocation guarantee the Reader promises.

use crate::constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::error::ArchiveError;

/// A validated chunk-slicing granularity, in `[MIN_SIZE, MAX_SIZE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkSize {
    bytes: u32,
}

impl ChunkSize {
    pub const MIN_SIZE: u32 = MIN_CHUNK_SIZE;
    pub const MAX_SIZE: u32 = MAX_CHUNK_SIZE;
    pub const DEFAULT_SIZE: u32 = DEFAULT_CHUNK_SIZE;

    pub fn new(bytes: u32) -> Result<Self, ArchiveError> {
        if bytes < Self::MIN_SIZE {
            return Err(ArchiveError::invalid_chunk_size(format!(
                "chunk size {bytes} is below minimum of {} bytes",
                Self::MIN_SIZE
            )));
        }
        if bytes > Self::MAX_SIZE {
            return Err(ArchiveError::invalid_chunk_size(format!(
                "chunk size {bytes} exceeds maximum of {} bytes",
                Self::MAX_SIZE
            )));
        }
        Ok(ChunkSize { bytes })
    }

    pub fn from_kb(kb: u32) -> Result<Self, ArchiveError> {
        Self::new(kb.saturating_mul(1024))
    }

    pub fn from_mb(mb: u32) -> Result<Self, ArchiveError> {
        Self::new(mb.saturating_mul(1024 * 1024))
    }

    pub fn bytes(&self) -> u32 {
        self.bytes
    }

    pub fn as_usize(&self) -> usize {
        self.bytes as usize
    }

    /// Validates a size already read from a file header, without
    /// constructing a new value from a trusted literal.
    pub fn from_header_field(bytes: u32) -> Result<Self, ArchiveError> {
        Self::new(bytes)
    }

    pub fn chunks_needed_for(&self, payload_size: u64) -> u64 {
        if payload_size == 0 {
            return 0;
        }
        payload_size.div_ceil(self.bytes as u64)
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize { bytes: Self::DEFAULT_SIZE }
    }
}
