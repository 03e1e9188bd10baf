mod argon2_kdf;

pub use argon2_kdf::{Argon2Kdf, Argon2Params};
