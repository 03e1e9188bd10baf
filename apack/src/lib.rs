//! # APACK
//!
//! A chunked, random-access archive format with pluggable compression and
//! authenticated encryption.
//!
//! [`Writer`] builds an archive over any write-and-seek byte sink, slicing
//! each entry's bytes into fixed-size chunks and running every chunk through
//! a compress-then-encrypt pipeline before the chunk is written. [`Reader`]
//! opens an archive back up, validating the header and trailer up front, and
//! retrieves entries by name or id without decoding chunks it was not asked
//! for.
//!
//! ## Providers
//!
//! Compression and encryption are both pluggable: a [`CompressionProvider`]
//! or [`EncryptionProvider`] implementation is chosen when a [`Writer`] is
//! configured, and its algorithm id byte travels with every chunk and TOC
//! record it produces. A [`Reader`] never needs to be told in advance which
//! algorithm an archive used — it looks the id up in a [`ProviderRegistry`]
//! and dispatches from there, which is what makes the format genuinely
//! self-describing.
//!
//! ## Layout
//!
//! The on-disk layout (magic bytes, field order, checksums) lives in
//! `apack-domain`, which this crate depends on but never duplicates. This
//! crate adds everything that touches a filesystem or an external codec:
//! the Writer and Reader themselves, the concrete provider implementations,
//! and the Chunk Processor that sequences them.

pub mod chunk_processor;
pub mod config;
pub mod providers;
pub mod reader;
pub mod writer;

pub use apack_domain::entities::Entry;
pub use apack_domain::error::{ArchiveError, ArchiveResult};
pub use apack_domain::services::{
    generate_salt, unwrap, unwrap_with_password, wrap, wrap_with_password, CompressionProvider, EncryptionProvider,
    KeyDerivation, SALT_LEN,
};
pub use apack_domain::value_objects::{Attribute, AttributeValue, ChunkSize, EntryId, SecretKey};

pub use config::{CompressionChoice, EncryptionChoice, ProviderRegistry, ReaderLimits, WriterConfig};
pub use reader::Reader;
pub use writer::{EntryMetadata, Writer};
