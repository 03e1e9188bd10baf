mod compression;
mod encryption;
mod kdf;

pub use compression::CompressionProvider;
pub use encryption::EncryptionProvider;
pub use kdf::{generate_salt, unwrap, unwrap_with_password, wrap, wrap_with_password, KeyDerivation, SALT_LEN};
