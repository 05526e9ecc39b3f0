//! Error types shared across crates.

use thiserror::Error;

/// Top-level error type for the SIV AEAD constructions.
///
/// Variants fall into two groups:
/// - construction errors ([`SivError::KeySize`], [`SivError::NonceSize`]),
///   returned before any cipher instance exists;
/// - [`SivError::Authentication`], the only error an `open` call can return.
///
/// Caller-contract violations such as a wrong nonce length are not represented
/// here: they panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SivError {
    /// The key does not have one of the lengths accepted by the scheme.
    #[error("invalid key size: {0} bytes")]
    KeySize(usize),

    /// The configured nonce size is not usable (it must be non-zero).
    #[error("invalid nonce size: {0} bytes")]
    NonceSize(usize),

    /// The ciphertext, tag, nonce or associated data did not authenticate.
    ///
    /// Deliberately carries no detail about which input was wrong.
    #[error("message authentication failed")]
    Authentication,
}

impl SivError {
    /// Returns `true` for errors produced while constructing a cipher.
    pub fn is_construction(&self) -> bool {
        match self {
            SivError::KeySize(_) | SivError::NonceSize(_) => true,
            SivError::Authentication => false,
        }
    }
}
