//! The archive Reader: validates the header and trailer up front, then
//! retrieves entries by name or id, decoding only the chunks it is asked
//! for.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use apack_domain::constants::{CHUNK_HEADER_SIZE, FILE_HEADER_SIZE, TRAILER_PREFIX_SIZE};
use apack_domain::entities::Entry;
use apack_domain::error::ArchiveError;
use apack_domain::format::checksum::crc32;
use apack_domain::format::{decode_trailer, ChunkHeader, FileHeader, TocRecord};
use apack_domain::value_objects::{ChecksumAlgorithm, CompressionId, EncryptionId, EntryId};

use crate::chunk_processor::{ChunkProcessor, CompressionSetting, EncryptionSetting};
use crate::config::ReaderLimits;

pub struct Reader<R> {
    source: R,
    header: FileHeader,
    records: Vec<TocRecord>,
    entries: Vec<Entry>,
    limits: ReaderLimits,
    closed: AtomicBool,
}

impl Reader<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        Reader::open_with_limits(path, ReaderLimits::default())
    }

    pub fn open_with_limits(path: impl AsRef<Path>, limits: ReaderLimits) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        Reader::new(file, limits)
    }
}

impl<R: Read + Seek> Reader<R> {
    pub fn new(mut source: R, limits: ReaderLimits) -> Result<Self, ArchiveError> {
        let mut header_buf = [0u8; FILE_HEADER_SIZE];
        source.seek(SeekFrom::Start(0))?;
        source.read_exact(&mut header_buf)?;
        let header = FileHeader::decode(&header_buf)?;

        if header.trailer_offset < FILE_HEADER_SIZE as u64 {
            return Err(ArchiveError::bounds_violation("trailer_offset falls inside the file header"));
        }
        let file_len = source.seek(SeekFrom::End(0))?;
        if header.trailer_offset > file_len.saturating_sub(TRAILER_PREFIX_SIZE as u64) {
            return Err(ArchiveError::bounds_violation("trailer_offset leaves no room for the trailer prefix"));
        }

        source.seek(SeekFrom::Start(header.trailer_offset))?;
        let mut trailer_buf = Vec::new();
        source.read_to_end(&mut trailer_buf)?;
        let records = decode_trailer(&trailer_buf, header.entry_count)?;

        for record in &records {
            // A zero-chunk (empty) entry writes no bytes, so its offset may
            // legitimately land exactly at the trailer when it is the last
            // entry written.
            let offset_in_bounds = record.entry_offset >= FILE_HEADER_SIZE as u64
                && (record.entry_offset < header.trailer_offset || (record.chunk_count == 0 && record.entry_offset == header.trailer_offset));
            if !offset_in_bounds {
                return Err(ArchiveError::bounds_violation(format!(
                    "entry {:?} offset {} falls outside [{FILE_HEADER_SIZE}, {}]",
                    record.name, record.entry_offset, header.trailer_offset
                )));
            }
            if record.stored_size > header.trailer_offset - record.entry_offset {
                return Err(ArchiveError::bounds_violation(format!(
                    "entry {:?} stored_size {} runs past the trailer",
                    record.name, record.stored_size
                )));
            }
        }

        let entries = records.iter().map(record_to_entry).collect::<Result<Vec<_>, _>>()?;

        Ok(Reader { source, header, records, entries, limits, closed: AtomicBool::new(false) })
    }

    pub fn entry_count(&self) -> u64 {
        self.header.entry_count
    }

    pub fn is_compressed(&self) -> bool {
        self.header.is_compressed()
    }

    pub fn is_encrypted(&self) -> bool {
        self.header.is_encrypted()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get_by_id(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Reads and decodes an entry's full payload in one call.
    pub fn read_all(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        self.ensure_open()?;
        let record = self
            .records
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| ArchiveError::format(format!("no such entry: {name:?}")))?;
        self.read_record(&record)
    }

    pub fn read_by_id(&mut self, id: EntryId) -> Result<Vec<u8>, ArchiveError> {
        self.ensure_open()?;
        let record = self
            .records
            .iter()
            .find(|r| r.entry_id == id.value())
            .cloned()
            .ok_or_else(|| ArchiveError::format(format!("no such entry id: {id}")))?;
        self.read_record(&record)
    }

    /// Hands back a `Read` over an entry's payload that decodes one chunk at
    /// a time as the caller reads, instead of materializing the whole entry
    /// up front.
    pub fn input_stream(&mut self, name: &str) -> Result<EntryReader<'_, R>, ArchiveError> {
        self.ensure_open()?;
        let record = self
            .records
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| ArchiveError::format(format!("no such entry: {name:?}")))?;
        Ok(EntryReader { reader: self, record, chunks_read: 0, pending: Vec::new(), pending_pos: 0, started: false })
    }

    /// Returns a cursor over the TOC in order that decodes one entry's
    /// chunks per `next()` call, not the whole archive up front. A fresh
    /// call to `stream()` always starts a new cursor from the beginning.
    pub fn stream(&mut self) -> Result<EntryIter<'_, R>, ArchiveError> {
        self.ensure_open()?;
        Ok(EntryIter { reader: self, index: 0 })
    }

    pub fn close(&mut self) -> Result<(), ArchiveError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(ArchiveError::already_closed("reader already closed"));
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), ArchiveError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ArchiveError::already_closed("reader already closed"));
        }
        Ok(())
    }

    fn read_record(&mut self, record: &TocRecord) -> Result<Vec<u8>, ArchiveError> {
        self.source.seek(SeekFrom::Start(record.entry_offset))?;
        let mut out = Vec::new();
        for _ in 0..record.chunk_count {
            let payload = self.decode_next_chunk(record)?;
            out.extend_from_slice(&payload);
        }
        Ok(out)
    }

    /// Decodes the chunk at the source's current position, which must
    /// already sit on a chunk header boundary for `record`. Callers step
    /// through an entry's chunks one at a time by calling this repeatedly.
    fn decode_next_chunk(&mut self, record: &TocRecord) -> Result<Vec<u8>, ArchiveError> {
        let mut header_buf = [0u8; CHUNK_HEADER_SIZE];
        self.source.read_exact(&mut header_buf)?;
        let chunk_header = ChunkHeader::decode(&header_buf)?;

        let pos = self.source.stream_position()?;
        if pos.checked_add(chunk_header.stored_size as u64).is_none_or(|end| end > self.header.trailer_offset) {
            return Err(ArchiveError::bounds_violation(format!(
                "chunk {} of entry {:?} claims {} stored bytes, which runs past the trailer",
                chunk_header.chunk_index, record.name, chunk_header.stored_size
            )));
        }

        let mut stored = vec![0u8; chunk_header.stored_size as usize];
        self.source.read_exact(&mut stored)?;

        let actual_checksum = crc32(&stored);
        if actual_checksum != chunk_header.checksum {
            return Err(ArchiveError::checksum_mismatch(format!(
                "chunk {} of entry {:?}: expected checksum {:#x}, found {:#x}",
                chunk_header.chunk_index, record.name, chunk_header.checksum, actual_checksum
            )));
        }

        self.decode_chunk_payload(&chunk_header, &stored)
    }

    fn decode_chunk_payload(&self, header: &ChunkHeader, stored: &[u8]) -> Result<Vec<u8>, ArchiveError> {
        let compression = if header.compressed {
            let provider = self
                .limits
                .registry
                .compression(header.compression_id)
                .ok_or_else(|| ArchiveError::decompression(format!("no compression provider registered for id {}", header.compression_id)))?;
            Some(CompressionSetting { provider, level: 0 })
        } else {
            None
        };

        let encryption = if header.encrypted {
            let key = self
                .limits
                .encryption_key
                .clone()
                .ok_or_else(|| ArchiveError::decryption("no encryption key provided"))?;
            let provider = self
                .limits
                .registry
                .encryption(header.encryption_id)
                .ok_or_else(|| ArchiveError::decryption(format!("no encryption provider registered for id {}", header.encryption_id)))?;
            Some(EncryptionSetting { provider, key })
        } else {
            None
        };

        let processor = ChunkProcessor::new(compression, encryption);
        processor.process_for_read(stored, header.original_size, header.compressed, header.encrypted)
    }
}

/// A restartable cursor over an archive's TOC in order. Each [`Iterator::next`]
/// call decodes exactly one entry's chunks; nothing is decoded ahead of the
/// caller. Calling [`Reader::stream`] again at any time starts a fresh cursor
/// from the first entry.
pub struct EntryIter<'r, R> {
    reader: &'r mut Reader<R>,
    index: usize,
}

impl<R: Read + Seek> Iterator for EntryIter<'_, R> {
    type Item = Result<(Entry, Vec<u8>), ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.reader.records.get(self.index)?.clone();
        let entry = self.reader.entries[self.index].clone();
        self.index += 1;
        Some(self.reader.read_record(&record).map(|bytes| (entry, bytes)))
    }
}

/// A `Read` over one entry's payload that decodes its next chunk only once
/// the bytes already decoded have been fully consumed by the caller.
pub struct EntryReader<'r, R> {
    reader: &'r mut Reader<R>,
    record: TocRecord,
    chunks_read: u32,
    pending: Vec<u8>,
    pending_pos: usize,
    started: bool,
}

impl<R: Read + Seek> Read for EntryReader<'_, R> {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        loop {
            if self.pending_pos < self.pending.len() {
                let n = (self.pending.len() - self.pending_pos).min(out.len());
                out[..n].copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
                self.pending_pos += n;
                return Ok(n);
            }
            if self.chunks_read >= self.record.chunk_count {
                return Ok(0);
            }
            if !self.started {
                self.reader.source.seek(SeekFrom::Start(self.record.entry_offset))?;
                self.started = true;
            }
            self.pending = self.reader.decode_next_chunk(&self.record).map_err(std::io::Error::other)?;
            self.pending_pos = 0;
            self.chunks_read += 1;
        }
    }
}

fn record_to_entry(record: &TocRecord) -> Result<Entry, ArchiveError> {
    Ok(Entry {
        id: EntryId::new(record.entry_id),
        name: record.name.clone(),
        mime: record.mime.clone(),
        attributes: record.attributes.clone(),
        original_size: record.original_size,
        stored_size: record.stored_size,
        first_chunk_index: record.first_chunk_index,
        chunk_count: record.chunk_count,
        entry_offset: record.entry_offset,
        checksum_algo: ChecksumAlgorithm::from_u8(record.checksum_algo)?,
        compression_id: CompressionId::from_u8(record.compression_id)?,
        encryption_id: EncryptionId::from_u8(record.encryption_id)?,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor as IoCursor;
    use std::sync::Arc;

    use apack_domain::services::EncryptionProvider;
    use apack_domain::value_objects::ChunkSize;

    use super::*;
    use crate::config::{CompressionChoice, EncryptionChoice, ProviderRegistry, WriterConfig};
    use crate::providers::compression::ZstdProvider;
    use crate::providers::encryption::Aes256GcmProvider;
    use crate::writer::Writer;

    fn build_plain_archive() -> Vec<u8> {
        let mut writer = Writer::new(IoCursor::new(Vec::new()), WriterConfig::new()).unwrap();
        writer.add("hello.txt", b"Hello, World!").unwrap();
        writer.add("empty.bin", b"").unwrap();
        writer.close().unwrap();
        writer.into_inner().into_inner()
    }

    #[test]
    fn roundtrips_plain_entries() {
        let bytes = build_plain_archive();
        let mut reader = Reader::new(IoCursor::new(bytes), ReaderLimits::default()).unwrap();
        assert_eq!(reader.entry_count(), 2);
        assert!(reader.has("hello.txt"));
        assert_eq!(reader.read_all("hello.txt").unwrap(), b"Hello, World!");
        assert_eq!(reader.get("empty.bin").unwrap().chunk_count, 0);
        assert_eq!(reader.read_all("empty.bin").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn missing_entry_is_none() {
        let bytes = build_plain_archive();
        let reader = Reader::new(IoCursor::new(bytes), ReaderLimits::default()).unwrap();
        assert!(reader.get("nope.bin").is_none());
    }

    #[test]
    fn roundtrips_compressed_and_encrypted_entry() {
        let compressor = Arc::new(ZstdProvider::new());
        let encryptor = Arc::new(Aes256GcmProvider::new());
        let key = encryptor.generate_key();
        let config = WriterConfig::new()
            .with_chunk_size(ChunkSize::new(4096).unwrap())
            .with_compression(CompressionChoice::new(compressor, 3))
            .with_encryption(EncryptionChoice::new(encryptor, key.clone()));

        let mut writer = Writer::new(IoCursor::new(Vec::new()), config).unwrap();
        let payload = "the quick brown fox ".repeat(500);
        writer.add("doc.txt", payload.as_bytes()).unwrap();
        writer.close().unwrap();
        let bytes = writer.into_inner().into_inner();

        let limits = ReaderLimits::new().with_encryption_key(key);
        let mut reader = Reader::new(IoCursor::new(bytes), limits).unwrap();
        assert_eq!(reader.read_all("doc.txt").unwrap(), payload.as_bytes());
    }

    #[test]
    fn wrong_key_fails_with_decryption_error() {
        let encryptor = Arc::new(Aes256GcmProvider::new());
        let key = encryptor.generate_key();
        let config = WriterConfig::new().with_encryption(EncryptionChoice::new(encryptor.clone(), key));

        let mut writer = Writer::new(IoCursor::new(Vec::new()), config).unwrap();
        writer.add("secret.bin", b"top secret payload").unwrap();
        writer.close().unwrap();
        let bytes = writer.into_inner().into_inner();

        let wrong_key = encryptor.generate_key();
        let limits = ReaderLimits::new().with_encryption_key(wrong_key);
        let mut reader = Reader::new(IoCursor::new(bytes), limits).unwrap();
        let err = reader.read_all("secret.bin").unwrap_err();
        assert!(err.to_string().contains("Decryption failed"));
    }

    #[test]
    fn operations_after_close_fail() {
        let bytes = build_plain_archive();
        let mut reader = Reader::new(IoCursor::new(bytes), ReaderLimits::default()).unwrap();
        reader.close().unwrap();
        assert!(matches!(reader.read_all("hello.txt"), Err(ArchiveError::AlreadyClosed(_))));
        assert!(matches!(reader.close(), Err(ArchiveError::AlreadyClosed(_))));
    }

    #[test]
    fn tampered_chunk_bytes_fail_checksum() {
        let mut bytes = build_plain_archive();
        // Flip a byte inside the first chunk's payload, well past the header.
        let flip_at = apack_domain::constants::FILE_HEADER_SIZE + CHUNK_HEADER_SIZE + 2;
        bytes[flip_at] ^= 0xFF;
        let mut reader = Reader::new(IoCursor::new(bytes), ReaderLimits::default()).unwrap();
        assert!(matches!(reader.read_all("hello.txt"), Err(ArchiveError::ChecksumMismatch(_))));
    }

    #[test]
    fn unregistered_provider_registry_still_finds_reference_providers() {
        let registry = ProviderRegistry::new();
        assert!(registry.compression(CompressionId::Zstd.as_u8()).is_some());
        assert!(registry.encryption(EncryptionId::Aes256Gcm.as_u8()).is_some());
    }
}
