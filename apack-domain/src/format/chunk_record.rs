//! Chunk record: a 24-byte header immediately followed by `stored_size` data
//! bytes. One record per processed segment of one entry's payload.

use crate::constants::{CHUNK_FLAG_COMPRESSED, CHUNK_FLAG_ENCRYPTED, CHUNK_HEADER_SIZE, CHUNK_MAGIC, MAX_CHUNK_SIZE};
use crate::error::ArchiveError;

#[derive(Debug, Clone, Copy)]
pub struct ChunkHeader {
    pub chunk_index: u32,
    pub original_size: u32,
    pub stored_size: u32,
    pub checksum: u32,
    pub compressed: bool,
    pub encrypted: bool,
    pub compression_id: u8,
    pub encryption_id: u8,
}

impl ChunkHeader {
    pub fn encode(&self) -> [u8; CHUNK_HEADER_SIZE] {
        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&CHUNK_MAGIC);
        buf[4..8].copy_from_slice(&self.chunk_index.to_le_bytes());
        buf[8..12].copy_from_slice(&self.original_size.to_le_bytes());
        buf[12..16].copy_from_slice(&self.stored_size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        let mut flags = 0u8;
        if self.compressed {
            flags |= CHUNK_FLAG_COMPRESSED;
        }
        if self.encrypted {
            flags |= CHUNK_FLAG_ENCRYPTED;
        }
        buf[20] = flags;
        buf[21] = self.compression_id;
        buf[22] = self.encryption_id;
        // buf[23] reserved, zero.
        buf
    }

    pub fn decode(buf: &[u8; CHUNK_HEADER_SIZE]) -> Result<Self, ArchiveError> {
        if buf[0..4] != CHUNK_MAGIC {
            return Err(ArchiveError::bad_magic("chunk header magic mismatch"));
        }
        let chunk_index = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        let original_size = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        let stored_size = u32::from_le_bytes(buf[12..16].try_into().unwrap());
        let checksum = u32::from_le_bytes(buf[16..20].try_into().unwrap());
        let flags = buf[20];
        let compression_id = buf[21];
        let encryption_id = buf[22];

        if original_size > MAX_CHUNK_SIZE || stored_size > MAX_CHUNK_SIZE {
            return Err(ArchiveError::bounds_violation(format!(
                "chunk {chunk_index} claims a size over the {MAX_CHUNK_SIZE}-byte maximum \
                 (original={original_size}, stored={stored_size})"
            )));
        }

        Ok(ChunkHeader {
            chunk_index,
            original_size,
            stored_size,
            checksum,
            compressed: flags & CHUNK_FLAG_COMPRESSED != 0,
            encrypted: flags & CHUNK_FLAG_ENCRYPTED != 0,
            compression_id,
            encryption_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChunkHeader {
        ChunkHeader {
            chunk_index: 2,
            original_size: 1024,
            stored_size: 900,
            checksum: 0xDEADBEEF,
            compressed: true,
            encrypted: false,
            compression_id: 1,
            encryption_id: 0,
        }
    }

    #[test]
    fn roundtrips() {
        let h = sample();
        let decoded = ChunkHeader::decode(&h.encode()).unwrap();
        assert_eq!(decoded.chunk_index, 2);
        assert_eq!(decoded.stored_size, 900);
        assert!(decoded.compressed);
        assert!(!decoded.encrypted);
    }

    #[test]
    fn rejects_oversized_claims() {
        let mut h = sample();
        h.original_size = MAX_CHUNK_SIZE + 1;
        assert!(matches!(ChunkHeader::decode(&h.encode()), Err(ArchiveError::BoundsViolation(_))));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = sample().encode();
        buf[0] = b'X';
        assert!(matches!(ChunkHeader::decode(&buf), Err(ArchiveError::BadMagic(_))));
    }
}
