//! AES-SIV-CMAC (RFC 5297).
//!
//! The key is split in half: the first half keys the S2V PRF, the second the
//! CTR cipher. The S2V output is the tag; with the top bits of bytes 8 and 12
//! cleared it becomes the initial counter block.

use std::fmt;

use siv_common::{Scheme, SivError, TAG_SIZE};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroize;

use super::{assert_nonce_len, SivAead};
use crate::backend::Backend;
use crate::ctr::{apply_keystream, BigEndian128};
use crate::primitives::{BlockCipher, Prf};
use crate::s2v::s2v;

/// AES-SIV-CMAC with a 256-, 384- or 512-bit key.
#[derive(Clone)]
pub struct AesSivCmac {
    mac: Prf,
    ctr: BlockCipher,
    nonce_size: usize,
    backend: Backend,
}

impl AesSivCmac {
    /// Build a cipher with the default 16-byte nonce and the process-wide
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns [`SivError::KeySize`] unless `key` is 32, 48 or 64 bytes.
    pub fn new(key: &[u8]) -> Result<Self, SivError> {
        Self::build(
            key,
            Scheme::AesSivCmac.default_nonce_size(),
            Backend::process_default(Scheme::AesSivCmac),
        )
    }

    /// Build a cipher that accepts `nonce_size`-byte nonces.
    ///
    /// # Errors
    ///
    /// Returns [`SivError::KeySize`] for a bad key and [`SivError::NonceSize`]
    /// if `nonce_size` is zero.
    pub fn with_nonce_size(key: &[u8], nonce_size: usize) -> Result<Self, SivError> {
        Self::with_nonce_size_and_backend(
            key,
            nonce_size,
            Backend::process_default(Scheme::AesSivCmac),
        )
    }

    /// Build a cipher that accepts `nonce_size`-byte nonces, pinned to
    /// `backend`.
    ///
    /// # Errors
    ///
    /// Same as [`AesSivCmac::with_nonce_size`].
    pub fn with_nonce_size_and_backend(
        key: &[u8],
        nonce_size: usize,
        backend: Backend,
    ) -> Result<Self, SivError> {
        if nonce_size == 0 {
            return Err(SivError::NonceSize(nonce_size));
        }
        Self::build(key, nonce_size, backend)
    }

    /// Build a cipher pinned to `backend`.
    ///
    /// An accelerated backend on a CPU without AES-NI still produces correct
    /// output; the `aes` crate falls back to its portable implementation.
    ///
    /// # Errors
    ///
    /// Same as [`AesSivCmac::new`].
    pub fn with_backend(key: &[u8], backend: Backend) -> Result<Self, SivError> {
        Self::build(key, Scheme::AesSivCmac.default_nonce_size(), backend)
    }

    fn build(key: &[u8], nonce_size: usize, backend: Backend) -> Result<Self, SivError> {
        if !Scheme::AesSivCmac.key_sizes().contains(&key.len()) {
            return Err(SivError::KeySize(key.len()));
        }
        let (mac_key, ctr_key) = key.split_at(key.len() / 2);
        Ok(Self {
            mac: Prf::new(mac_key)?,
            ctr: BlockCipher::new(ctr_key)?,
            nonce_size,
            backend,
        })
    }

    /// The backend this instance runs on.
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

/// Clear the bits RFC 5297 masks so the low counter words cannot carry.
fn counter_block(tag: &[u8; TAG_SIZE]) -> [u8; 16] {
    let mut iv = *tag;
    iv[8] &= 0x7f;
    iv[12] &= 0x7f;
    iv
}

impl SivAead for AesSivCmac {
    fn scheme(&self) -> Scheme {
        Scheme::AesSivCmac
    }

    fn nonce_size(&self) -> usize {
        self.nonce_size
    }

    fn seal_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> [u8; TAG_SIZE] {
        assert_nonce_len(Scheme::AesSivCmac, nonce, self.nonce_size);
        let tag = s2v(&self.mac, associated_data, nonce, buffer);
        let mut iv = counter_block(&tag);
        apply_keystream::<BigEndian128>(&self.ctr, &iv, buffer, self.backend);
        iv.zeroize();
        tag
    }

    fn open_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_SIZE],
    ) -> Result<(), SivError> {
        assert_nonce_len(Scheme::AesSivCmac, nonce, self.nonce_size);
        let mut iv = counter_block(tag);
        apply_keystream::<BigEndian128>(&self.ctr, &iv, buffer, self.backend);
        iv.zeroize();

        let mut expected = s2v(&self.mac, associated_data, nonce, buffer);
        let ok: bool = expected[..].ct_eq(&tag[..]).into();
        expected.zeroize();
        if ok {
            Ok(())
        } else {
            buffer.zeroize();
            debug!(scheme = %Scheme::AesSivCmac, "authentication failed");
            Err(SivError::Authentication)
        }
    }
}

impl fmt::Debug for AesSivCmac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesSivCmac")
            .field("key", &"[REDACTED]")
            .field("nonce_size", &self.nonce_size)
            .field("backend", &self.backend)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const KEY: [u8; 32] =
        hex!("fffefdfcfbfaf9f8f7f6f5f4f3f2f1f0f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff");
    const AD: [u8; 24] = hex!("101112131415161718191a1b1c1d1e1f2021222324252627");
    const PT: [u8; 14] = hex!("112233445566778899aabbccddee");

    #[test]
    fn rfc5297_a1_on_both_backends() {
        for backend in [Backend::Generic, Backend::Accelerated] {
            let cipher = AesSivCmac::with_backend(&KEY, backend).unwrap();
            let sealed = cipher.encrypt(&[], &PT, &AD);
            assert_eq!(
                sealed,
                hex!("85632d07c6e8f37f950acd320a2ecc9340c02b9690c4dc04daef7f6afe5c")
            );
            assert_eq!(cipher.decrypt(&[], &sealed, &AD).unwrap(), PT);
        }
    }

    #[test]
    fn rejects_bad_key_sizes() {
        for len in [0, 16, 24, 31, 33, 65] {
            assert_eq!(
                AesSivCmac::new(&vec![0u8; len]).unwrap_err(),
                SivError::KeySize(len)
            );
        }
        for len in [32, 48, 64] {
            assert!(AesSivCmac::new(&vec![0u8; len]).is_ok());
        }
    }

    #[test]
    fn nonce_size_is_configurable() {
        let cipher = AesSivCmac::with_nonce_size(&KEY, 24).unwrap();
        assert_eq!(cipher.nonce_size(), 24);
        let sealed = cipher.encrypt(&[3u8; 24], b"msg", b"");
        assert_eq!(cipher.decrypt(&[3u8; 24], &sealed, b"").unwrap(), b"msg");

        assert_eq!(
            AesSivCmac::with_nonce_size(&KEY, 0).unwrap_err(),
            SivError::NonceSize(0)
        );
    }

    #[test]
    fn nonce_size_and_backend_are_both_honoured() {
        let generic = AesSivCmac::with_nonce_size_and_backend(&KEY, 24, Backend::Generic).unwrap();
        assert_eq!(generic.backend(), Backend::Generic);
        assert_eq!(generic.nonce_size(), 24);

        let accelerated =
            AesSivCmac::with_nonce_size_and_backend(&KEY, 24, Backend::Accelerated).unwrap();
        assert_eq!(accelerated.backend(), Backend::Accelerated);
        let sealed = generic.encrypt(&[7u8; 24], &PT, &AD);
        assert_eq!(sealed, accelerated.encrypt(&[7u8; 24], &PT, &AD));
        assert_eq!(accelerated.decrypt(&[7u8; 24], &sealed, &AD).unwrap(), PT);

        assert_eq!(
            AesSivCmac::with_nonce_size_and_backend(&KEY, 0, Backend::Generic).unwrap_err(),
            SivError::NonceSize(0)
        );
    }

    #[test]
    #[should_panic(expected = "AES-SIV-CMAC")]
    fn default_nonce_size_is_enforced() {
        let cipher = AesSivCmac::new(&KEY).unwrap();
        cipher.encrypt(&[0u8; 12], b"msg", b"");
    }

    #[test]
    fn counter_block_masks_two_bits() {
        assert_eq!(
            counter_block(&[0xff; 16]),
            hex!("ffffffffffffffff7fffffff7fffffff")
        );
    }

    #[test]
    fn tampered_tag_zeroes_buffer() {
        let cipher = AesSivCmac::with_backend(&KEY, Backend::Generic).unwrap();
        let mut buffer = PT.to_vec();
        let mut tag = cipher.seal_in_place_detached(&[], &AD, &mut buffer);
        tag[15] ^= 0x80;
        assert_eq!(
            cipher.open_in_place_detached(&[], &AD, &mut buffer, &tag),
            Err(SivError::Authentication)
        );
        assert_eq!(buffer, vec![0u8; PT.len()]);
    }

    #[test]
    fn debug_is_redacted() {
        let cipher = AesSivCmac::new(&KEY).unwrap();
        let out = format!("{cipher:?}");
        assert!(out.contains("REDACTED"));
        assert!(!out.contains("fffefdfc"));
    }
}
