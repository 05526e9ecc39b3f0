//! The uniform seal/open contract shared by both SIV constructions.
//!
//! Implementors provide the detached in-place primitives; the buffer-owning
//! forms are derived from them and lay the tag out according to
//! [`Scheme::tag_position`].

mod cmac_siv;
mod gcm_siv;

pub use cmac_siv::AesSivCmac;
pub use gcm_siv::AesGcmSiv;

use siv_common::{Scheme, SivError, TagPosition, TAG_SIZE};
use zeroize::Zeroize;

/// A misuse-resistant AEAD cipher bound to one key.
///
/// Every method takes `&self` and keeps no per-call state on the instance, so
/// one cipher can be shared across threads.
///
/// # Panics
///
/// All sealing and opening methods panic if `nonce` is neither empty nor
/// exactly [`SivAead::nonce_size`] bytes long.
pub trait SivAead: Send + Sync {
    /// The construction this cipher implements.
    fn scheme(&self) -> Scheme;

    /// Accepted non-empty nonce length in bytes.
    fn nonce_size(&self) -> usize;

    /// Bytes a sealed message adds to the plaintext.
    fn overhead(&self) -> usize {
        TAG_SIZE
    }

    /// Encrypt `buffer` in place and return the tag.
    fn seal_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
    ) -> [u8; TAG_SIZE];

    /// Decrypt `buffer` in place if `tag` authenticates it.
    ///
    /// # Errors
    ///
    /// Returns [`SivError::Authentication`] if the tag does not match; `buffer`
    /// is then all zeros.
    fn open_in_place_detached(
        &self,
        nonce: &[u8],
        associated_data: &[u8],
        buffer: &mut [u8],
        tag: &[u8; TAG_SIZE],
    ) -> Result<(), SivError>;

    /// Append the sealed form of `plaintext` to `dst`.
    ///
    /// Exactly `plaintext.len() + overhead()` bytes are appended.
    fn seal(&self, dst: &mut Vec<u8>, nonce: &[u8], plaintext: &[u8], associated_data: &[u8]) {
        assert_nonce_len(self.scheme(), nonce, self.nonce_size());
        let start = dst.len();
        match self.scheme().tag_position() {
            TagPosition::Leading => {
                dst.extend_from_slice(&[0u8; TAG_SIZE]);
                dst.extend_from_slice(plaintext);
                let (tag_out, body) = dst[start..].split_at_mut(TAG_SIZE);
                let tag = self.seal_in_place_detached(nonce, associated_data, body);
                tag_out.copy_from_slice(&tag);
            }
            TagPosition::Trailing => {
                dst.extend_from_slice(plaintext);
                let tag = self.seal_in_place_detached(nonce, associated_data, &mut dst[start..]);
                dst.extend_from_slice(&tag);
            }
        }
    }

    /// Append the plaintext recovered from `ciphertext` to `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`SivError::Authentication`] if `ciphertext` is shorter than the
    /// tag or does not authenticate. The bytes appended to `dst` are then all
    /// zeros.
    fn open(
        &self,
        dst: &mut Vec<u8>,
        nonce: &[u8],
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<(), SivError> {
        assert_nonce_len(self.scheme(), nonce, self.nonce_size());
        let (tag, body) = self
            .scheme()
            .split(ciphertext)
            .ok_or(SivError::Authentication)?;
        let start = dst.len();
        dst.extend_from_slice(body);
        let result = self.open_in_place_detached(nonce, associated_data, &mut dst[start..], tag);
        if result.is_err() {
            dst[start..].zeroize();
        }
        result
    }

    /// Seal into a fresh vector.
    fn encrypt(&self, nonce: &[u8], plaintext: &[u8], associated_data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(plaintext.len() + self.overhead());
        self.seal(&mut out, nonce, plaintext, associated_data);
        out
    }

    /// Open into a fresh vector.
    ///
    /// # Errors
    ///
    /// Same as [`SivAead::open`]; no partial plaintext is returned.
    fn decrypt(
        &self,
        nonce: &[u8],
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SivError> {
        let mut out = Vec::with_capacity(ciphertext.len().saturating_sub(TAG_SIZE));
        self.open(&mut out, nonce, ciphertext, associated_data)?;
        Ok(out)
    }
}

/// Panic unless `nonce` is empty or `expected` bytes long.
pub(crate) fn assert_nonce_len(scheme: Scheme, nonce: &[u8], expected: usize) {
    assert!(
        nonce.is_empty() || nonce.len() == expected,
        "{scheme}: nonce must be empty or {expected} bytes, got {}",
        nonce.len()
    );
}
