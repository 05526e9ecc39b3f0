//! AES-GCM-SIV (RFC 8452).
//!
//! Every nonce derives a fresh authentication key and encryption key from the
//! key-generating key. The tag is the AES encryption of the POLYVAL hash with
//! the nonce folded in; the initial counter block is the tag with its top bit
//! set.

use std::fmt;

use siv_common::{Scheme, SivError, TAG_SIZE};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroize;

use super::{assert_nonce_len, SivAead};
use crate::backend::Backend;
use crate::ctr::{apply_keystream, LittleEndian32};
use crate::kdf::{derive_keys, DerivedKeys};
use crate::polyval;
use crate::primitives::BlockCipher;

/// Upper bound on plaintext and associated data lengths.
const MAX_INPUT_LEN: u64 = 1 << 36;

/// AES-GCM-SIV with a 128- or 256-bit key.
#[derive(Clone)]
pub struct AesGcmSiv {
    cipher: BlockCipher,
    backend: Backend,
}

impl AesGcmSiv {
    /// Build a cipher on the process-wide backend.
    ///
    /// # Errors
    ///
    /// Returns [`SivError::KeySize`] unless `key` is 16 or 32 bytes.
    pub fn new(key: &[u8]) -> Result<Self, SivError> {
        Self::with_backend(key, Backend::process_default(Scheme::AesGcmSiv))
    }

    /// Build a cipher pinned to `backend`.
    ///
    /// # Errors
    ///
    /// Same as [`AesGcmSiv::new`].
    pub fn with_backend(key: &[u8], backend: Backend) -> Result<Self, SivError> {
        // AES-192 is a valid AES key but not an AES-GCM-SIV one.
        if !Scheme::AesGcmSiv.key_sizes().contains(&key.len()) {
            return Err(SivError::KeySize(key.len()));
        }
        Ok(Self {
            cipher: BlockCipher::new(key)?,
            backend,
        })
    }

    /// The backend this instance runs on.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// `AES(enc, POLYVAL(auth, ad, pt) ^ nonce)` with bit 127 cleared.
    fn tag(
        &self,
        keys: &DerivedKeys,
        enc: &BlockCipher,
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> [u8; TAG_SIZE] {
        let mut s = polyval::compute(keys.auth_key(), associated_data, plaintext, self.backend);
        for (b, n) in s.iter_mut().zip(nonce) {
            *b ^= n;
        }
        s[15] &= 0x7f;
        enc.encrypt_block(&mut s);
        s
    }
}

fn check_lengths(associated_data: &[u8], buffer: &[u8]) {
    assert!(
        associated_data.len() as u64 <= MAX_INPUT_LEN,
        "AES-GCM-SIV: associated data exceeds 2^36 bytes"
    );
    assert!(
        buffer.len() as u64 <= MAX_INPUT_LEN,
        "AES-GCM-SIV: message exceeds 2^36 bytes"
    );
}

fn counter_block(tag: &[u8; TAG_SIZE]) -> [u8; 16] {
    let mut block = *tag;
    block[15] |= 0x80;
    block
}

impl SivAead for AesGcmSiv {
    fn scheme(&self) -> Scheme {
        Scheme::AesGcmSiv
    }

    fn nonce_size(&self) -> usize {
        Scheme::AesGcmSiv.default_nonce_size()
    }

    fn seal_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> [u8; TAG_SIZE] {
        assert_nonce_len(Scheme::AesGcmSiv, nonce, self.nonce_size());
        check_lengths(associated_data, buffer);

        let keys = derive_keys(&self.cipher, nonce);
        let enc = keys.encryption_cipher();
        let tag = self.tag(&keys, &enc, nonce, associated_data, buffer);
        let mut block = counter_block(&tag);
        apply_keystream::<LittleEndian32>(&enc, &block, buffer, self.backend);
        block.zeroize();
        tag
    }

    fn open_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_SIZE],
    ) -> Result<(), SivError> {
        assert_nonce_len(Scheme::AesGcmSiv, nonce, self.nonce_size());
        check_lengths(associated_data, buffer);

        let keys = derive_keys(&self.cipher, nonce);
        let enc = keys.encryption_cipher();
        let mut block = counter_block(tag);
        apply_keystream::<LittleEndian32>(&enc, &block, buffer, self.backend);
        block.zeroize();

        let mut expected = self.tag(&keys, &enc, nonce, associated_data, buffer);
        let ok: bool = expected[..].ct_eq(&tag[..]).into();
        expected.zeroize();
        if ok {
            Ok(())
        } else {
            buffer.zeroize();
            debug!(scheme = %Scheme::AesGcmSiv, "authentication failed");
            Err(SivError::Authentication)
        }
    }
}

impl fmt::Debug for AesGcmSiv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmSiv")
            .field("key", &"[REDACTED]")
            .field("key_bits", &(self.cipher.key_len() * 8))
            .field("backend", &self.backend)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const KEY: [u8; 16] = hex!("01000000000000000000000000000000");
    const NONCE: [u8; 12] = hex!("030000000000000000000000");

    #[test]
    fn rfc8452_empty_message() {
        for backend in [Backend::Generic, Backend::Accelerated] {
            let cipher = AesGcmSiv::with_backend(&KEY, backend).unwrap();
            assert_eq!(
                cipher.encrypt(&NONCE, b"", b""),
                hex!("dc20e2d83f25705bb49e439eca56de25")
            );
        }
    }

    #[test]
    fn rfc8452_aes256_with_ad() {
        let cipher = AesGcmSiv::new(&hex!(
            "3c535de192eaed3822a2fbbe2ca9dfc88255e14a661b8aa82cc54236093bbc23"
        ))
        .unwrap();
        let nonce = hex!("688089e55540db1872504e1c");
        let pt = hex!("ced532ce4159b035277d4dfbb7db62968b13cd4eec");
        let ad = hex!("734320ccc9d9bbbb19cb81b2af4ecbc3e72834321f7aa0f70b7282b4f33df23f167541");
        let sealed = cipher.encrypt(&nonce, &pt, &ad);
        assert_eq!(
            sealed,
            hex!("626660c26ea6612fb17ad91e8e767639edd6c9faee9d6c7029675b89eaf4ba1ded1a286594")
        );
        assert_eq!(cipher.decrypt(&nonce, &sealed, &ad).unwrap(), pt);
    }

    #[test]
    fn empty_nonce_equals_zero_nonce() {
        let cipher = AesGcmSiv::new(&KEY).unwrap();
        let sealed = cipher.encrypt(&[], b"abc", b"");
        assert_eq!(sealed, hex!("703bc5ec59c93b9b4285b1dfb1060c8f570a7b"));
        assert_eq!(sealed, cipher.encrypt(&[0u8; 12], b"abc", b""));
    }

    #[test]
    fn rejects_aes192_and_other_sizes() {
        for len in [0, 15, 24, 33, 48] {
            assert_eq!(
                AesGcmSiv::new(&vec![1u8; len]).unwrap_err(),
                SivError::KeySize(len)
            );
        }
    }

    #[test]
    fn counter_block_sets_top_bit() {
        assert_eq!(counter_block(&[0u8; 16])[15], 0x80);
        assert_eq!(counter_block(&[0xffu8; 16]), [0xffu8; 16]);
    }

    #[test]
    fn tampered_ad_zeroes_buffer() {
        let cipher = AesGcmSiv::with_backend(&KEY, Backend::Generic).unwrap();
        let mut buffer = b"attack at dawn".to_vec();
        let tag = cipher.seal_in_place_detached(&NONCE, b"header", &mut buffer);
        assert_eq!(
            cipher.open_in_place_detached(&NONCE, b"headeR", &mut buffer, &tag),
            Err(SivError::Authentication)
        );
        assert!(buffer.iter().all(|&b| b == 0));
    }
}
