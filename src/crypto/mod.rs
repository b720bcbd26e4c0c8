//! Cryptography module - SHA-256 digests over canonical JSON

mod hash;

pub use hash::*;
