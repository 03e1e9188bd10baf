//! LZ4 provider, pure-Rust block mode with a length-prefixed frame so
//! `decompress` knows the declared output size before it allocates.
//!
//! The teacher's own multi-algorithm adapter stubs this branch entirely
//! ("LZ4 not yet implemented"); this implementation fills it in.

use apack_domain::error::ArchiveError;
use apack_domain::services::CompressionProvider;
use apack_domain::value_objects::CompressionId;

#[derive(Debug, Default)]
pub struct Lz4Provider;

impl Lz4Provider {
    pub fn new() -> Self {
        Lz4Provider
    }
}

impl CompressionProvider for Lz4Provider {
    fn id(&self) -> CompressionId {
        CompressionId::Lz4
    }

    fn default_level(&self) -> i32 {
        // lz4_flex's block compressor has one fast mode; there is no level
        // knob to thread through, so every requested level compresses the
        // same way.
        0
    }

    fn compress(&self, input: &[u8], _level: i32) -> Result<Vec<u8>, ArchiveError> {
        Ok(lz4_flex::block::compress_prepend_size(input))
    }

    fn decompress(&self, input: &[u8], max_output_size: usize) -> Result<Vec<u8>, ArchiveError> {
        if input.len() < 4 {
            return Err(ArchiveError::decompression("lz4 input is shorter than its size prefix"));
        }
        let declared_size = u32::from_le_bytes(input[0..4].try_into().unwrap()) as usize;
        if declared_size > max_output_size {
            return Err(ArchiveError::decompression(format!(
                "lz4 declares {declared_size} output bytes, exceeding the {max_output_size}-byte bound"
            )));
        }
        lz4_flex::block::decompress_size_prepended(input)
            .map_err(|e| ArchiveError::decompression(format!("lz4 decompression failed: {e}")))
    }
}
