//! A named unit of user data within an archive.

use crate::value_objects::{Attribute, ChecksumAlgorithm, CompressionId, EncryptionId, EntryId};

#[derive(Debug, Clone)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub mime: Option<String>,
    pub attributes: Vec<Attribute>,
    pub original_size: u64,
    pub stored_size: u64,
    pub first_chunk_index: u32,
    pub chunk_count: u32,
    pub entry_offset: u64,
    pub checksum_algo: ChecksumAlgorithm,
    pub compression_id: CompressionId,
    pub encryption_id: EncryptionId,
}

impl Entry {
    pub fn mime_or_empty(&self) -> &str {
        self.mime.as_deref().unwrap_or("")
    }

    pub fn attribute(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_count == 0
    }
}
