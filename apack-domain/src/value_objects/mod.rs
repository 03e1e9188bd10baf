mod algorithm;
mod attribute;
mod chunk_size;
mod entry_id;
mod processed_chunk;
mod secret_key;

pub use algorithm::{ChecksumAlgorithm, CompressionId, EncryptionId};
pub use attribute::{Attribute, AttributeValue};
pub use chunk_size::ChunkSize;
pub use entry_id::EntryId;
pub use processed_chunk::ProcessedChunk;
pub use secret_key::SecretKey;
