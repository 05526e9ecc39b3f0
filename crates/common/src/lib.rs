//! Error types and wire-layout definitions shared across the SIV AEAD crates.

pub mod error;
pub mod scheme;

pub use error::SivError;
pub use scheme::{Scheme, TagPosition, BLOCK_SIZE, TAG_SIZE};
