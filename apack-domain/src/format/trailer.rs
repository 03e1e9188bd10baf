//! Trailer: `ATRL` magic, a checksum-protected TOC, and one variable-length
//! record per entry (this implementation folds the fixed TOC prefix and the
//! per-entry metadata block into a single inline record per entry, which
//! spec §9's entry-record-consolidation note permits as long as `open` can
//! parse it without seeking outside the trailer region — it can, since every
//! record's length is self-describing from its own fixed prefix).

use crate::constants::{ATTR_RECORD_FIXED_SIZE, MAX_NAME_LEN, TOC_RECORD_FIXED_SIZE, TRAILER_MAGIC, TRAILER_PREFIX_SIZE};
use crate::error::ArchiveError;
use crate::format::checksum::crc32;
use crate::value_objects::{Attribute, AttributeValue};

#[derive(Debug, Clone)]
pub struct TocRecord {
    pub entry_id: u64,
    pub entry_offset: u64,
    pub original_size: u64,
    pub stored_size: u64,
    pub first_chunk_index: u32,
    pub chunk_count: u32,
    pub entry_flags: u8,
    pub checksum_algo: u8,
    pub compression_id: u8,
    pub encryption_id: u8,
    pub name: String,
    pub mime: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl TocRecord {
    fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), ArchiveError> {
        if self.name.is_empty() {
            return Err(ArchiveError::invalid_name("entry name must not be empty"));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(ArchiveError::invalid_name(format!(
                "entry name is {} bytes, exceeding the {MAX_NAME_LEN}-byte limit",
                self.name.len()
            )));
        }
        let mime_bytes = self.mime.as_deref().unwrap_or("").as_bytes();

        out.extend_from_slice(&self.entry_id.to_le_bytes());
        out.extend_from_slice(&self.entry_offset.to_le_bytes());
        out.extend_from_slice(&self.original_size.to_le_bytes());
        out.extend_from_slice(&self.stored_size.to_le_bytes());
        out.extend_from_slice(&self.first_chunk_index.to_le_bytes());
        out.extend_from_slice(&self.chunk_count.to_le_bytes());
        out.extend_from_slice(&(self.name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(mime_bytes.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.attributes.len() as u16).to_le_bytes());
        out.push(self.entry_flags);
        out.push(self.checksum_algo);
        out.push(self.compression_id);
        out.push(self.encryption_id);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(mime_bytes);
        for attr in &self.attributes {
            let value_bytes = attr.value.to_bytes();
            out.extend_from_slice(&(attr.key.len() as u16).to_le_bytes());
            out.push(attr.value.type_tag());
            out.push(0);
            out.extend_from_slice(&(value_bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(attr.key.as_bytes());
            out.extend_from_slice(&value_bytes);
        }
        Ok(())
    }

    /// Decodes one record starting at `buf[*offset]`, advancing `*offset`
    /// past it. Every length is validated against `buf.len()` before use.
    fn decode_from(buf: &[u8], offset: &mut usize) -> Result<Self, ArchiveError> {
        let need = |o: usize, n: usize| -> Result<(), ArchiveError> {
            if o.checked_add(n).is_none_or(|end| end > buf.len()) {
                return Err(ArchiveError::bounds_violation("TOC record runs past the trailer region"));
            }
            Ok(())
        };

        need(*offset, TOC_RECORD_FIXED_SIZE)?;
        let b = &buf[*offset..*offset + TOC_RECORD_FIXED_SIZE];
        let entry_id = u64::from_le_bytes(b[0..8].try_into().unwrap());
        let entry_offset = u64::from_le_bytes(b[8..16].try_into().unwrap());
        let original_size = u64::from_le_bytes(b[16..24].try_into().unwrap());
        let stored_size = u64::from_le_bytes(b[24..32].try_into().unwrap());
        let first_chunk_index = u32::from_le_bytes(b[32..36].try_into().unwrap());
        let chunk_count = u32::from_le_bytes(b[36..40].try_into().unwrap());
        let name_len = u16::from_le_bytes(b[40..42].try_into().unwrap()) as usize;
        let mime_len = u16::from_le_bytes(b[42..44].try_into().unwrap()) as usize;
        let attr_count = u16::from_le_bytes(b[44..46].try_into().unwrap()) as usize;
        let entry_flags = b[46];
        let checksum_algo = b[47];
        let compression_id = b[48];
        let encryption_id = b[49];
        *offset += TOC_RECORD_FIXED_SIZE;

        need(*offset, name_len)?;
        let name = String::from_utf8(buf[*offset..*offset + name_len].to_vec())
            .map_err(|e| ArchiveError::invalid_name(format!("entry name is not valid UTF-8: {e}")))?;
        if name.is_empty() {
            return Err(ArchiveError::invalid_name("entry name must not be empty"));
        }
        *offset += name_len;

        need(*offset, mime_len)?;
        let mime = if mime_len == 0 {
            None
        } else {
            Some(
                String::from_utf8(buf[*offset..*offset + mime_len].to_vec())
                    .map_err(|e| ArchiveError::format(format!("mime type is not valid UTF-8: {e}")))?,
            )
        };
        *offset += mime_len;

        let mut attributes = Vec::with_capacity(attr_count);
        for _ in 0..attr_count {
            need(*offset, ATTR_RECORD_FIXED_SIZE)?;
            let ab = &buf[*offset..*offset + ATTR_RECORD_FIXED_SIZE];
            let key_len = u16::from_le_bytes(ab[0..2].try_into().unwrap()) as usize;
            let type_tag = ab[2];
            let value_len = u32::from_le_bytes(ab[4..8].try_into().unwrap()) as usize;
            *offset += ATTR_RECORD_FIXED_SIZE;

            need(*offset, key_len)?;
            let key = String::from_utf8(buf[*offset..*offset + key_len].to_vec())
                .map_err(|e| ArchiveError::format(format!("attribute key is not valid UTF-8: {e}")))?;
            *offset += key_len;

            need(*offset, value_len)?;
            let value = AttributeValue::from_tag_and_bytes(type_tag, &buf[*offset..*offset + value_len])?;
            *offset += value_len;

            attributes.push(Attribute::new(key, value));
        }

        Ok(TocRecord {
            entry_id,
            entry_offset,
            original_size,
            stored_size,
            first_chunk_index,
            chunk_count,
            entry_flags,
            checksum_algo,
            compression_id,
            encryption_id,
            name,
            mime,
            attributes,
        })
    }
}

/// Encodes the full trailer (magic, TOC metadata, and every record) ready to
/// append to the chunk stream.
pub fn encode_trailer(records: &[TocRecord]) -> Result<Vec<u8>, ArchiveError> {
    let mut toc_bytes = Vec::new();
    for record in records {
        record.encode_into(&mut toc_bytes)?;
    }
    let toc_checksum = crc32(&toc_bytes);

    let mut out = Vec::with_capacity(TRAILER_PREFIX_SIZE + toc_bytes.len());
    out.extend_from_slice(&TRAILER_MAGIC);
    out.extend_from_slice(&(records.len() as u64).to_le_bytes());
    out.extend_from_slice(&toc_checksum.to_le_bytes());
    out.extend_from_slice(&toc_bytes);
    Ok(out)
}

/// Parses a trailer that starts at `buf[0]` (the caller has already sliced
/// the file from `trailer_offset` to end-of-file, trailing garbage and all).
/// `expected_entry_count` is the file header's `entry_count`, cross-checked
/// against the trailer's own `toc_count`.
pub fn decode_trailer(buf: &[u8], expected_entry_count: u64) -> Result<Vec<TocRecord>, ArchiveError> {
    if buf.len() < TRAILER_PREFIX_SIZE {
        return Err(ArchiveError::bounds_violation("trailer region is shorter than the trailer prefix"));
    }
    if buf[0..4] != TRAILER_MAGIC {
        return Err(ArchiveError::bad_magic("trailer magic mismatch"));
    }
    let toc_count = u64::from_le_bytes(buf[4..12].try_into().unwrap());
    let toc_checksum = u32::from_le_bytes(buf[12..16].try_into().unwrap());

    if toc_count != expected_entry_count {
        return Err(ArchiveError::format(format!(
            "trailer toc_count {toc_count} does not match header entry_count {expected_entry_count}"
        )));
    }

    let remaining = buf.len() - TRAILER_PREFIX_SIZE;
    let fits = usize::try_from(toc_count)
        .ok()
        .and_then(|count| count.checked_mul(TOC_RECORD_FIXED_SIZE))
        .is_some_and(|claimed_min_bytes| claimed_min_bytes <= remaining);
    if !fits {
        return Err(ArchiveError::bounds_violation(format!(
            "trailer claims {toc_count} records, which cannot fit in the {remaining} bytes remaining"
        )));
    }

    let mut offset = TRAILER_PREFIX_SIZE;
    let mut records = Vec::with_capacity(toc_count as usize);
    for _ in 0..toc_count {
        records.push(TocRecord::decode_from(buf, &mut offset)?);
    }

    let toc_bytes = &buf[TRAILER_PREFIX_SIZE..offset];
    let actual_checksum = crc32(toc_bytes);
    if actual_checksum != toc_checksum {
        return Err(ArchiveError::checksum_mismatch(format!(
            "trailer checksum mismatch: expected {toc_checksum:#x}, found {actual_checksum:#x}"
        )));
    }

    let mut seen_names = std::collections::HashSet::with_capacity(records.len());
    for record in &records {
        if !seen_names.insert(record.name.as_str()) {
            return Err(ArchiveError::duplicate_name(format!(
                "duplicate entry name in TOC: {:?}",
                record.name
            )));
        }
    }

    Ok(records)
}
