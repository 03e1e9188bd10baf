//! File header: the 64 fixed bytes at offset 0.
//!
//! This is the only region of an archive at a fixed, trusted offset; every
//! other structure is reached through a field validated here.

use crate::constants::{
    COMPAT_LEVEL, FILE_HEADER_SIZE, FILE_MAGIC, FLAG_COMPRESSED, FLAG_ECC, FLAG_ENCRYPTED, FLAG_RANDOM_ACCESS,
    MAX_ENTRIES, VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH,
};
use crate::error::ArchiveError;
use crate::format::checksum::crc32;
use crate::value_objects::ChunkSize;

#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    pub version_major: u16,
    pub version_minor: u16,
    pub version_patch: u16,
    pub compat_level: u16,
    pub mode_flags: u8,
    pub checksum_algo: u8,
    pub chunk_size: ChunkSize,
    pub entry_count: u64,
    pub trailer_offset: u64,
    pub creation_timestamp: u64,
}

impl FileHeader {
    pub fn new(chunk_size: ChunkSize, entry_count: u64, trailer_offset: u64, creation_timestamp: u64, mode_flags: u8) -> Self {
        FileHeader {
            version_major: VERSION_MAJOR,
            version_minor: VERSION_MINOR,
            version_patch: VERSION_PATCH,
            compat_level: COMPAT_LEVEL,
            mode_flags: mode_flags | FLAG_RANDOM_ACCESS,
            checksum_algo: crate::constants::CHECKSUM_ALGO_CRC32,
            chunk_size,
            entry_count,
            trailer_offset,
            creation_timestamp,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.mode_flags & FLAG_COMPRESSED != 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.mode_flags & FLAG_ENCRYPTED != 0
    }

    pub fn is_ecc(&self) -> bool {
        self.mode_flags & FLAG_ECC != 0
    }

    /// Serializes to the final 64-byte on-disk form, computing the header
    /// checksum over the bytes with the checksum field zeroed.
    pub fn encode(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];
        buf[0..6].copy_from_slice(&FILE_MAGIC);
        buf[6..8].copy_from_slice(&self.version_major.to_le_bytes());
        buf[8..10].copy_from_slice(&self.version_minor.to_le_bytes());
        buf[10..12].copy_from_slice(&self.version_patch.to_le_bytes());
        buf[12..14].copy_from_slice(&self.compat_level.to_le_bytes());
        buf[14] = self.mode_flags;
        buf[15] = self.checksum_algo;
        buf[16..20].copy_from_slice(&self.chunk_size.bytes().to_le_bytes());
        // buf[20..24] (header_checksum) stays zero during the checksum pass.
        buf[24..32].copy_from_slice(&self.entry_count.to_le_bytes());
        buf[32..40].copy_from_slice(&self.trailer_offset.to_le_bytes());
        buf[40..48].copy_from_slice(&self.creation_timestamp.to_le_bytes());
        // buf[48..64] reserved, already zero.

        let checksum = crc32(&buf);
        buf[20..24].copy_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Parses and validates a 64-byte buffer read from offset 0.
    pub fn decode(buf: &[u8; FILE_HEADER_SIZE]) -> Result<Self, ArchiveError> {
        if buf[0..6] != FILE_MAGIC {
            return Err(ArchiveError::bad_magic("file header magic mismatch"));
        }

        let mut checked = *buf;
        checked[20..24].copy_from_slice(&[0, 0, 0, 0]);
        let expected_checksum = crc32(&checked);
        let stored_checksum = u32::from_le_bytes(buf[20..24].try_into().unwrap());
        if expected_checksum != stored_checksum {
            return Err(ArchiveError::header_checksum_mismatch(format!(
                "header checksum mismatch: expected {expected_checksum:#x}, found {stored_checksum:#x}"
            )));
        }

        let version_major = u16::from_le_bytes(buf[6..8].try_into().unwrap());
        let version_minor = u16::from_le_bytes(buf[8..10].try_into().unwrap());
        let version_patch = u16::from_le_bytes(buf[10..12].try_into().unwrap());
        let compat_level = u16::from_le_bytes(buf[12..14].try_into().unwrap());
        let mode_flags = buf[14];
        let checksum_algo = buf[15];
        let chunk_size_raw = u32::from_le_bytes(buf[16..20].try_into().unwrap());
        let entry_count = u64::from_le_bytes(buf[24..32].try_into().unwrap());
        let trailer_offset = u64::from_le_bytes(buf[32..40].try_into().unwrap());
        let creation_timestamp = u64::from_le_bytes(buf[40..48].try_into().unwrap());

        if version_major > VERSION_MAJOR {
            tracing::warn!(
                found_major = version_major,
                supported_major = VERSION_MAJOR,
                "archive was written by a newer format major version; reading leniently"
            );
        }

        let chunk_size = ChunkSize::from_header_field(chunk_size_raw)?;

        if entry_count > MAX_ENTRIES {
            return Err(ArchiveError::too_many_entries(format!(
                "entry_count {entry_count} exceeds maximum of {MAX_ENTRIES}"
            )));
        }

        Ok(FileHeader {
            version_major,
            version_minor,
            version_patch,
            compat_level,
            mode_flags,
            checksum_algo,
            chunk_size,
            entry_count,
            trailer_offset,
            creation_timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips() {
        let h = FileHeader::new(ChunkSize::default(), 3, 128, 1_700_000_000, FLAG_COMPRESSED);
        let encoded = h.encode();
        let decoded = FileHeader::decode(&encoded).unwrap();
        assert_eq!(decoded.entry_count, 3);
        assert_eq!(decoded.trailer_offset, 128);
        assert_eq!(decoded.creation_timestamp, 1_700_000_000);
        assert!(decoded.is_compressed());
        assert!(!decoded.is_encrypted());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut encoded = FileHeader::new(ChunkSize::default(), 0, 64, 0, 0).encode();
        encoded[0] = b'X';
        assert!(matches!(FileHeader::decode(&encoded), Err(ArchiveError::BadMagic(_))));
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let mut encoded = FileHeader::new(ChunkSize::default(), 0, 64, 0, 0).encode();
        encoded[41] ^= 0xFF;
        assert!(matches!(FileHeader::decode(&encoded), Err(ArchiveError::HeaderChecksumMismatch(_))));
    }

    #[test]
    fn rejects_entry_count_over_max() {
        let mut encoded = FileHeader::new(ChunkSize::default(), 0, 64, 0, 0).encode();
        encoded[24..32].copy_from_slice(&(MAX_ENTRIES + 1).to_le_bytes());
        let checksum_cleared_recomputed = {
            let mut b = encoded;
            b[20..24].copy_from_slice(&[0, 0, 0, 0]);
            crc32(&b)
        };
        encoded[20..24].copy_from_slice(&checksum_cleared_recomputed.to_le_bytes());
        assert!(matches!(FileHeader::decode(&encoded), Err(ArchiveError::TooManyEntries(_))));
    }
}
