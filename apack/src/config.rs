//! Plain configuration structs for the Writer and Reader. A small number of
//! optional knobs with defaults — no builder type needed for a config this
//! shallow.

use std::collections::HashMap;
use std::sync::Arc;

use apack_domain::value_objects::{ChunkSize, CompressionId, EncryptionId, SecretKey};

use crate::providers::compression::{Lz4Provider, ZstdProvider};
use crate::providers::encryption::{Aes256GcmProvider, ChaCha20Poly1305Provider};
use crate::CompressionProvider;
use crate::EncryptionProvider;

/// Compression chosen for a Writer: a provider plus its level.
#[derive(Clone)]
pub struct CompressionChoice {
    pub provider: Arc<dyn CompressionProvider>,
    pub level: i32,
}

impl CompressionChoice {
    pub fn new(provider: Arc<dyn CompressionProvider>, level: i32) -> Self {
        CompressionChoice { provider, level }
    }
}

impl Default for CompressionChoice {
    fn default() -> Self {
        let provider = Arc::new(ZstdProvider::new());
        let level = provider.default_level();
        CompressionChoice { provider, level }
    }
}

/// Encryption chosen for a Writer: a provider plus its content key.
#[derive(Clone)]
pub struct EncryptionChoice {
    pub provider: Arc<dyn EncryptionProvider>,
    pub key: SecretKey,
}

impl EncryptionChoice {
    pub fn new(provider: Arc<dyn EncryptionProvider>, key: SecretKey) -> Self {
        EncryptionChoice { provider, key }
    }
}

#[derive(Clone, Default)]
pub struct WriterConfig {
    pub chunk_size: ChunkSize,
    pub compression: Option<CompressionChoice>,
    pub encryption: Option<EncryptionChoice>,
}

impl WriterConfig {
    pub fn new() -> Self {
        WriterConfig::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: ChunkSize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_compression(mut self, compression: CompressionChoice) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn with_encryption(mut self, encryption: EncryptionChoice) -> Self {
        self.encryption = Some(encryption);
        self
    }
}

/// Every provider a Reader might need to dispatch to, keyed by the id byte
/// stored in chunk headers and TOC records — the provider id is what makes
/// the archive self-describing, so the Reader never has to be told which
/// algorithm it is about to meet.
#[derive(Clone)]
pub struct ProviderRegistry {
    compression: HashMap<u8, Arc<dyn CompressionProvider>>,
    encryption: HashMap<u8, Arc<dyn EncryptionProvider>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let mut compression: HashMap<u8, Arc<dyn CompressionProvider>> = HashMap::new();
        compression.insert(CompressionId::Zstd.as_u8(), Arc::new(ZstdProvider::new()));
        compression.insert(CompressionId::Lz4.as_u8(), Arc::new(Lz4Provider::new()));

        let mut encryption: HashMap<u8, Arc<dyn EncryptionProvider>> = HashMap::new();
        encryption.insert(EncryptionId::Aes256Gcm.as_u8(), Arc::new(Aes256GcmProvider::new()));
        encryption.insert(EncryptionId::ChaCha20Poly1305.as_u8(), Arc::new(ChaCha20Poly1305Provider::new()));

        ProviderRegistry { compression, encryption }
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry::default()
    }

    pub fn register_compression(&mut self, provider: Arc<dyn CompressionProvider>) {
        self.compression.insert(provider.id().as_u8(), provider);
    }

    pub fn register_encryption(&mut self, provider: Arc<dyn EncryptionProvider>) {
        self.encryption.insert(provider.id().as_u8(), provider);
    }

    pub fn compression(&self, id: u8) -> Option<Arc<dyn CompressionProvider>> {
        self.compression.get(&id).cloned()
    }

    pub fn encryption(&self, id: u8) -> Option<Arc<dyn EncryptionProvider>> {
        self.encryption.get(&id).cloned()
    }
}

/// Reader-side resource bounds. A Reader never chooses providers itself —
/// the archive's own chunk and TOC records say which ones to use — it only
/// needs a registry to dispatch through and, for encrypted archives, a key.
#[derive(Clone)]
pub struct ReaderLimits {
    pub registry: ProviderRegistry,
    pub encryption_key: Option<SecretKey>,
}

impl Default for ReaderLimits {
    fn default() -> Self {
        ReaderLimits { registry: ProviderRegistry::default(), encryption_key: None }
    }
}

impl ReaderLimits {
    pub fn new() -> Self {
        ReaderLimits::default()
    }

    pub fn with_encryption_key(mut self, key: SecretKey) -> Self {
        self.encryption_key = Some(key);
        self
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }
}
