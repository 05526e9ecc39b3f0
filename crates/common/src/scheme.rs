//! Wire layout of the two SIV constructions.
//!
//! Both schemes add exactly [`TAG_SIZE`] bytes to the plaintext. Only the
//! position of the tag differs:
//!
//! ```text
//! AES-SIV-CMAC:  tag(16) || E(plaintext)
//! AES-GCM-SIV:   E(plaintext) || tag(16)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of the synthetic tag, and therefore of the ciphertext overhead.
pub const TAG_SIZE: usize = 16;

/// AES block length.
pub const BLOCK_SIZE: usize = 16;

/// Where the tag sits inside a sealed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPosition {
    /// The tag precedes the encrypted data.
    Leading,
    /// The tag follows the encrypted data.
    Trailing,
}

/// The SIV construction a cipher implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scheme {
    /// RFC 5297: S2V over AES-CMAC plus AES-CTR.
    AesSivCmac,
    /// RFC 8452: POLYVAL plus AES-CTR under a per-nonce key.
    AesGcmSiv,
}

impl Scheme {
    /// Human-readable algorithm name.
    pub fn name(self) -> &'static str {
        match self {
            Scheme::AesSivCmac => "AES-SIV-CMAC",
            Scheme::AesGcmSiv => "AES-GCM-SIV",
        }
    }

    /// Position of the tag in the ciphertext.
    pub fn tag_position(self) -> TagPosition {
        match self {
            Scheme::AesSivCmac => TagPosition::Leading,
            Scheme::AesGcmSiv => TagPosition::Trailing,
        }
    }

    /// Nonce length used unless a cipher is configured otherwise.
    pub fn default_nonce_size(self) -> usize {
        match self {
            Scheme::AesSivCmac => 16,
            Scheme::AesGcmSiv => 12,
        }
    }

    /// Key lengths, in bytes, accepted by the scheme.
    pub fn key_sizes(self) -> &'static [usize] {
        match self {
            Scheme::AesSivCmac => &[32, 48, 64],
            Scheme::AesGcmSiv => &[16, 32],
        }
    }

    /// Split a sealed message into `(tag, encrypted data)`.
    ///
    /// Returns `None` if the message is shorter than [`TAG_SIZE`].
    pub fn split(self, sealed: &[u8]) -> Option<(&[u8; TAG_SIZE], &[u8])> {
        if sealed.len() < TAG_SIZE {
            return None;
        }
        let (tag, body) = match self.tag_position() {
            TagPosition::Leading => {
                let (tag, body) = sealed.split_at(TAG_SIZE);
                (tag, body)
            }
            TagPosition::Trailing => {
                let (body, tag) = sealed.split_at(sealed.len() - TAG_SIZE);
                (tag, body)
            }
        };
        Some((tag.try_into().ok()?, body))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
