//! ZSTD provider: levels 1..22, default 3.

use apack_domain::error::ArchiveError;
use apack_domain::services::CompressionProvider;
use apack_domain::value_objects::CompressionId;

#[derive(Debug, Default)]
pub struct ZstdProvider;

impl ZstdProvider {
    pub fn new() -> Self {
        ZstdProvider
    }
}

impl CompressionProvider for ZstdProvider {
    fn id(&self) -> CompressionId {
        CompressionId::Zstd
    }

    fn default_level(&self) -> i32 {
        3
    }

    fn compress(&self, input: &[u8], level: i32) -> Result<Vec<u8>, ArchiveError> {
        zstd::bulk::compress(input, level).map_err(|e| ArchiveError::format(format!("zstd compression failed: {e}")))
    }

    fn decompress(&self, input: &[u8], max_output_size: usize) -> Result<Vec<u8>, ArchiveError> {
        zstd::bulk::decompress(input, max_output_size)
            .map_err(|e| ArchiveError::decompression(format!("zstd decompression failed: {e}")))
    }
}
