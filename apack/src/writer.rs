//! The archive Writer: buffers entry bytes, slices into chunks, runs each
//! chunk through the Chunk Processor, and finalizes the TOC, trailer, and
//! file header — the header last, since it is the only region that must
//! reference an offset unknown at the first byte written.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rayon::prelude::*;

use apack_domain::constants::{FLAG_COMPRESSED, FLAG_ENCRYPTED};
use apack_domain::constants::{CHECKSUM_ALGO_CRC32, FILE_HEADER_SIZE};
use apack_domain::error::ArchiveError;
use apack_domain::format::{checksum::crc32, encode_trailer, ChunkHeader, FileHeader, TocRecord};
use apack_domain::value_objects::{Attribute, EntryId};

use crate::chunk_processor::ChunkProcessor;
use crate::config::WriterConfig;

#[derive(Debug, Clone, Default)]
pub struct EntryMetadata {
    pub name: String,
    pub mime: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl EntryMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        EntryMetadata { name: name.into(), mime: None, attributes: Vec::new() }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

pub struct Writer<W> {
    sink: W,
    config: WriterConfig,
    processor: ChunkProcessor,
    next_entry_id: u64,
    next_chunk_index: u32,
    records: Vec<TocRecord>,
    closed: AtomicBool,
}

impl Writer<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let file = File::create(path)?;
        Writer::new(file, WriterConfig::default())
    }

    pub fn create_with_config(path: impl AsRef<Path>, config: WriterConfig) -> Result<Self, ArchiveError> {
        let file = File::create(path)?;
        Writer::new(file, config)
    }
}

impl<W: Write + Seek> Writer<W> {
    pub fn new(mut sink: W, config: WriterConfig) -> Result<Self, ArchiveError> {
        // Reserve the 64-byte header region; it is rewritten in `close`
        // once the trailer offset is known.
        sink.write_all(&[0u8; FILE_HEADER_SIZE])?;

        let processor = ChunkProcessor::new(
            config.compression.as_ref().map(|c| crate::chunk_processor::CompressionSetting {
                provider: c.provider.clone(),
                level: c.level,
            }),
            config.encryption.as_ref().map(|e| crate::chunk_processor::EncryptionSetting {
                provider: e.provider.clone(),
                key: e.key.clone(),
            }),
        );

        Ok(Writer {
            sink,
            config,
            processor,
            next_entry_id: 1,
            next_chunk_index: 0,
            records: Vec::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn add(&mut self, name: impl Into<String>, bytes: &[u8]) -> Result<EntryId, ArchiveError> {
        self.add_with_metadata(EntryMetadata::new(name), bytes)
    }

    pub fn add_file(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<EntryId, ArchiveError> {
        let file = File::open(path)?;
        self.add_with_metadata(EntryMetadata::new(name), file)
    }

    pub fn add_with_metadata<R: Read>(&mut self, metadata: EntryMetadata, mut reader: R) -> Result<EntryId, ArchiveError> {
        self.ensure_open()?;
        validate_name(&metadata.name)?;
        if self.records.iter().any(|r| r.name == metadata.name) {
            return Err(ArchiveError::duplicate_name(format!("entry {:?} already exists", metadata.name)));
        }

        let entry_id = EntryId::new(self.next_entry_id);
        self.next_entry_id += 1;
        let entry_offset = self.sink.stream_position()?;
        let first_chunk_index = self.next_chunk_index;

        let chunk_size = self.config.chunk_size.as_usize();
        let mut raw_chunks: Vec<Vec<u8>> = Vec::new();
        loop {
            let mut buffer = vec![0u8; chunk_size];
            let n = read_full(&mut reader, &mut buffer)?;
            if n == 0 {
                break;
            }
            let short_read = n < chunk_size;
            buffer.truncate(n);
            raw_chunks.push(buffer);
            if short_read {
                break;
            }
        }

        // Compression and encryption are independent per chunk, so rayon
        // fans the pending chunks of this entry out across the pool; chunks
        // are reassembled in original order before anything is written, so
        // on-disk chunk order and every downstream offset are unaffected.
        let processed = raw_chunks
            .par_iter()
            .map(|buf| self.processor.process_for_write(buf))
            .collect::<Result<Vec<_>, _>>()?;

        let mut chunk_index_in_entry: u32 = 0;
        let mut original_total: u64 = 0;
        let mut stored_total: u64 = 0;
        let mut entry_flags = 0u8;

        for chunk in &processed {
            let header = ChunkHeader {
                chunk_index: chunk_index_in_entry,
                original_size: chunk.original_size,
                stored_size: chunk.stored_size,
                checksum: crc32(&chunk.data),
                compressed: chunk.compressed,
                encrypted: chunk.encrypted,
                compression_id: if chunk.compressed { self.processor.compression_id() } else { 0 },
                encryption_id: if chunk.encrypted { self.processor.encryption_id() } else { 0 },
            };
            self.sink.write_all(&header.encode())?;
            self.sink.write_all(&chunk.data)?;

            if chunk.compressed {
                entry_flags |= FLAG_COMPRESSED;
            }
            if chunk.encrypted {
                entry_flags |= FLAG_ENCRYPTED;
            }

            original_total += chunk.original_size as u64;
            stored_total += chunk.stored_size as u64;
            chunk_index_in_entry += 1;
            self.next_chunk_index += 1;
        }

        self.records.push(TocRecord {
            entry_id: entry_id.value(),
            entry_offset,
            original_size: original_total,
            stored_size: stored_total,
            first_chunk_index,
            chunk_count: chunk_index_in_entry,
            entry_flags,
            checksum_algo: CHECKSUM_ALGO_CRC32,
            compression_id: self.processor.compression_id(),
            encryption_id: self.processor.encryption_id(),
            name: metadata.name,
            mime: metadata.mime,
            attributes: metadata.attributes,
        });

        tracing::debug!(entry_id = entry_id.value(), chunks = chunk_index_in_entry, "entry written");
        Ok(entry_id)
    }

    pub fn close(&mut self) -> Result<(), ArchiveError> {
        self.finalize()
    }

    /// Unwraps the Writer, returning the underlying sink. Typically called
    /// after `close()` to retrieve an in-memory buffer; doing so before
    /// `close()` yields a sink with no trailer or final header written.
    pub fn into_inner(self) -> W {
        let this = std::mem::ManuallyDrop::new(self);
        unsafe { std::ptr::read(&this.sink) }
    }

    fn ensure_open(&self) -> Result<(), ArchiveError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ArchiveError::already_closed("writer already closed"));
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), ArchiveError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(ArchiveError::already_closed("writer already closed"));
        }

        let trailer_offset = self.sink.stream_position()?;
        let trailer_bytes = encode_trailer(&self.records)?;
        self.sink.write_all(&trailer_bytes)?;

        // Reflects what the written chunks actually ended up doing, not
        // what was configured — a configured-but-never-effective compressor
        // (every chunk incompressible) must not claim `compressed` in the
        // header.
        let mode_flags = self.records.iter().fold(0u8, |flags, record| flags | record.entry_flags);

        let creation_timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);

        let header = FileHeader::new(self.config.chunk_size, self.records.len() as u64, trailer_offset, creation_timestamp, mode_flags);

        self.sink.seek(SeekFrom::Start(0))?;
        self.sink.write_all(&header.encode())?;
        self.sink.flush()?;

        tracing::info!(entries = self.records.len(), trailer_offset, "archive finalized");
        Ok(())
    }
}

impl<W> Drop for Writer<W> {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            tracing::warn!("Writer dropped without calling close(); the archive on disk is incomplete");
        }
    }
}

fn validate_name(name: &str) -> Result<(), ArchiveError> {
    if name.is_empty() {
        return Err(ArchiveError::invalid_name("entry name must not be empty"));
    }
    if name.len() > apack_domain::constants::MAX_NAME_LEN {
        return Err(ArchiveError::invalid_name(format!(
            "entry name is {} bytes, exceeding the {}-byte limit",
            name.len(),
            apack_domain::constants::MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Fills `buf` from `reader`, looping over short reads, stopping only at
/// EOF or a full buffer. Returns the number of bytes actually filled.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = reader.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use apack_domain::value_objects::ChunkSize;

    use super::*;

    #[test]
    fn writes_and_finalizes_a_plain_entry() {
        let mut writer = Writer::new(Cursor::new(Vec::new()), WriterConfig::new().with_chunk_size(ChunkSize::default())).unwrap();
        writer.add("hello.txt", b"Hello, World!").unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut writer = Writer::new(Cursor::new(Vec::new()), WriterConfig::new()).unwrap();
        writer.add("a.bin", b"one").unwrap();
        let err = writer.add("a.bin", b"two").unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateName(_)));
    }

    #[test]
    fn rejects_empty_name() {
        let mut writer = Writer::new(Cursor::new(Vec::new()), WriterConfig::new()).unwrap();
        assert!(writer.add("", b"data").is_err());
    }

    #[test]
    fn rejects_operations_after_close() {
        let mut writer = Writer::new(Cursor::new(Vec::new()), WriterConfig::new()).unwrap();
        writer.add("a.bin", b"one").unwrap();
        writer.close().unwrap();
        let err = writer.add("b.bin", b"two").unwrap_err();
        assert!(matches!(err, ArchiveError::AlreadyClosed(_)));
    }

    #[test]
    fn rejects_double_close() {
        let mut writer = Writer::new(Cursor::new(Vec::new()), WriterConfig::new()).unwrap();
        writer.add("a.bin", b"one").unwrap();
        writer.close().unwrap();
        assert!(matches!(writer.close(), Err(ArchiveError::AlreadyClosed(_))));
    }

    #[test]
    fn multi_chunk_entry_splits_on_boundary() {
        let chunk_size = ChunkSize::new(1024).unwrap();
        let mut writer = Writer::new(Cursor::new(Vec::new()), WriterConfig::new().with_chunk_size(chunk_size)).unwrap();
        let data = vec![7u8; 5 * 1024];
        writer.add("data.bin", &data).unwrap();
        assert_eq!(writer.records.last().unwrap().chunk_count, 5);
        writer.close().unwrap();
    }
}
