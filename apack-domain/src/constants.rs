//! Magic bytes, flag bits, algorithm ids, and size bounds fixed by format
//! version 1. Nothing here is configurable at runtime.

/// File header magic: `"APACK"` followed by a NUL.
pub const FILE_MAGIC: [u8; 6] = *b"APACK\0";
/// Chunk record magic.
pub const CHUNK_MAGIC: [u8; 4] = *b"CHNK";
/// Per-entry metadata block magic.
pub const ENTRY_MAGIC: [u8; 4] = *b"ENTR";
/// Trailer magic.
pub const TRAILER_MAGIC: [u8; 4] = *b"ATRL";

pub const FILE_HEADER_SIZE: usize = 64;
pub const CHUNK_HEADER_SIZE: usize = 24;
/// Fixed prefix of one TOC record, before the variable name/mime/attribute
/// bytes that follow it: entry_id, entry_offset, original_size, stored_size
/// (u64 x4) + first_chunk_index, chunk_count (u32 x2) + name_len, mime_len,
/// attr_count (u16 x3) + entry_flags, checksum_algo, compression_id,
/// encryption_id (u8 x4) + reserved (u16).
pub const TOC_RECORD_FIXED_SIZE: usize = 52;
/// Size of one attribute record's fixed prefix: key_len (u16), type_tag
/// (u8), reserved (u8), value_len (u32).
pub const ATTR_RECORD_FIXED_SIZE: usize = 8;
/// Trailer prefix: magic (4) + toc_count (8) + toc_checksum (4).
pub const TRAILER_PREFIX_SIZE: usize = 16;

pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
pub const VERSION_PATCH: u16 = 0;
pub const COMPAT_LEVEL: u16 = 0;

pub const FLAG_COMPRESSED: u8 = 0x01;
pub const FLAG_ENCRYPTED: u8 = 0x02;
pub const FLAG_ECC: u8 = 0x04;
pub const FLAG_RANDOM_ACCESS: u8 = 0x08;

pub const CHUNK_FLAG_COMPRESSED: u8 = 0x01;
pub const CHUNK_FLAG_ENCRYPTED: u8 = 0x02;

pub const CHECKSUM_ALGO_CRC32: u8 = 1;

pub const MIN_CHUNK_SIZE: u32 = 4 * 1024;
pub const DEFAULT_CHUNK_SIZE: u32 = 256 * 1024;
pub const MAX_CHUNK_SIZE: u32 = 64 * 1024 * 1024;
pub const MAX_ENTRIES: u64 = 1_000_000;

pub const MAX_NAME_LEN: usize = 65_535;

/// Attribute value type tags in the trailer's attribute records.
pub const ATTR_TYPE_STRING: u8 = 1;
pub const ATTR_TYPE_LONG: u8 = 2;
pub const ATTR_TYPE_BOOL: u8 = 3;
