//! Thin wrappers over the AES block cipher and AES-CMAC.
//!
//! Both are enums over the three AES key sizes so the constructions can pick a
//! key size at runtime without boxing.

use std::fmt;

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};
use cmac::{Cmac, Mac};
use siv_common::SivError;

/// Keyed AES block cipher; the key schedule is zeroized on drop.
#[derive(Clone)]
pub(crate) enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    /// # Errors
    ///
    /// Returns [`SivError::KeySize`] unless `key` is 16, 24 or 32 bytes.
    pub(crate) fn new(key: &[u8]) -> Result<Self, SivError> {
        let err = |_| SivError::KeySize(key.len());
        let cipher = match key.len() {
            16 => Self::Aes128(<Aes128 as KeyInit>::new_from_slice(key).map_err(err)?),
            24 => Self::Aes192(<Aes192 as KeyInit>::new_from_slice(key).map_err(err)?),
            32 => Self::Aes256(<Aes256 as KeyInit>::new_from_slice(key).map_err(err)?),
            n => return Err(SivError::KeySize(n)),
        };
        Ok(cipher)
    }

    pub(crate) fn aes128(key: &[u8; 16]) -> Self {
        Self::Aes128(<Aes128 as KeyInit>::new(GenericArray::from_slice(key)))
    }

    pub(crate) fn aes256(key: &[u8; 32]) -> Self {
        Self::Aes256(<Aes256 as KeyInit>::new(GenericArray::from_slice(key)))
    }

    pub(crate) fn key_len(&self) -> usize {
        match self {
            Self::Aes128(_) => 16,
            Self::Aes192(_) => 24,
            Self::Aes256(_) => 32,
        }
    }

    pub(crate) fn encrypt_block(&self, block: &mut [u8; 16]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    /// Encrypt several blocks in one call so the cipher can pipeline them.
    pub(crate) fn encrypt_blocks(&self, blocks: &mut [Block]) {
        match self {
            Self::Aes128(c) => c.encrypt_blocks(blocks),
            Self::Aes192(c) => c.encrypt_blocks(blocks),
            Self::Aes256(c) => c.encrypt_blocks(blocks),
        }
    }
}

impl fmt::Debug for BlockCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "BlockCipher(AES-{}, [REDACTED])", self.key_len() * 8)
    }
}

/// Keyed AES-CMAC used as the S2V pseudo-random function.
///
/// Instances held by a cipher are prototypes: every computation works on a
/// clone so a shared cipher is never mutated.
#[derive(Clone)]
pub(crate) enum Prf {
    Aes128(Cmac<Aes128>),
    Aes192(Cmac<Aes192>),
    Aes256(Cmac<Aes256>),
}

impl Prf {
    /// # Errors
    ///
    /// Returns [`SivError::KeySize`] unless `key` is 16, 24 or 32 bytes.
    pub(crate) fn new(key: &[u8]) -> Result<Self, SivError> {
        let err = |_| SivError::KeySize(key.len());
        let prf = match key.len() {
            16 => Self::Aes128(<Cmac<Aes128> as KeyInit>::new_from_slice(key).map_err(err)?),
            24 => Self::Aes192(<Cmac<Aes192> as KeyInit>::new_from_slice(key).map_err(err)?),
            32 => Self::Aes256(<Cmac<Aes256> as KeyInit>::new_from_slice(key).map_err(err)?),
            n => return Err(SivError::KeySize(n)),
        };
        Ok(prf)
    }

    pub(crate) fn update(&mut self, data: &[u8]) {
        match self {
            Self::Aes128(m) => Mac::update(m, data),
            Self::Aes192(m) => Mac::update(m, data),
            Self::Aes256(m) => Mac::update(m, data),
        }
    }

    /// Return the MAC of everything written so far and rearm for a new input.
    pub(crate) fn finalize_reset(&mut self) -> [u8; 16] {
        let tag = match self {
            Self::Aes128(m) => Mac::finalize_reset(m).into_bytes(),
            Self::Aes192(m) => Mac::finalize_reset(m).into_bytes(),
            Self::Aes256(m) => Mac::finalize_reset(m).into_bytes(),
        };
        let mut out = [0u8; 16];
        out.copy_from_slice(&tag);
        out
    }
}

impl fmt::Debug for Prf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Prf(AES-CMAC, [REDACTED])")
    }
}
