//! CRC32 checksum engine.
//!
//! Used for the header checksum, every chunk's stored-data checksum, and the
//! trailer's checksum over the TOC bytes. One algorithm, one byte id
//! (`CHECKSUM_ALGO_CRC32`), fixed for format v1.

use crc32fast::Hasher;

/// Computes the CRC32 of a byte slice in one call.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Verifies `data` against an expected checksum, returning `true` on match.
pub fn verify(data: &[u8], expected: u32) -> bool {
    crc32(data) == expected
}

/// Incremental checksum state for streaming input of unknown total length
/// (the Writer's `add` with a sequential byte source feeds chunks to this as
/// they are read, one `update` per chunk, rather than buffering the whole
/// entry to checksum it in one call).
#[derive(Default)]
pub struct ChecksumEngine {
    hasher: Hasher,
}

impl ChecksumEngine {
    pub fn new() -> Self {
        ChecksumEngine { hasher: Hasher::new() }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}
