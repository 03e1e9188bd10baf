mod lz4;
mod zstd_provider;

pub use lz4::Lz4Provider;
pub use zstd_provider::ZstdProvider;
