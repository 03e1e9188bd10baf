//! Pluggable compression contract.
//!
//! The Chunk Processor holds a `dyn CompressionProvider` (or none); it never
//! matches on an algorithm itself, it just calls through the trait.

use crate::error::ArchiveError;
use crate::value_objects::CompressionId;

pub trait CompressionProvider: Send + Sync {
    fn id(&self) -> CompressionId;

    fn default_level(&self) -> i32;

    fn compress(&self, input: &[u8], level: i32) -> Result<Vec<u8>, ArchiveError>;

    /// Decompresses `input`, refusing to produce more than `max_output_size`
    /// bytes. Exceeding the bound is an error, never a buffer overrun.
    fn decompress(&self, input: &[u8], max_output_size: usize) -> Result<Vec<u8>, ArchiveError>;
}
