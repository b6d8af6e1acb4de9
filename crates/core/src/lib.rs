//! Domain primitives shared by the storage and HTTP crates.

pub mod error;
pub mod fingerprint;
pub mod hashing;
pub mod types;
