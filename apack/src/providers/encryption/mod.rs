mod aes_gcm;
mod chacha20poly1305_provider;

pub use aes_gcm::Aes256GcmProvider;
pub use chacha20poly1305_provider::ChaCha20Poly1305Provider;
