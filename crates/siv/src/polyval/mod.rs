//! POLYVAL universal hash (RFC 8452 section 3).
//!
//! Inputs are absorbed as 16-byte little-endian field elements, each
//! zero-padded if short: `S = (S ^ X) * H`. AES-GCM-SIV hashes the
//! associated data, then the plaintext, then one length block holding both
//! bit lengths.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod clmul;

use zeroize::Zeroize;

use crate::backend::Backend;
use crate::field::FieldElement;

/// Running POLYVAL state keyed with `H`.
pub(crate) struct Polyval {
    h: FieldElement,
    acc: FieldElement,
    mul: Multiplier,
}

#[derive(Clone, Copy)]
enum Multiplier {
    Soft,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    Clmul(clmul::Token),
}

impl Polyval {
    pub(crate) fn new(key: &[u8; 16], backend: Backend) -> Self {
        Self {
            h: FieldElement::from_le_bytes(key),
            acc: FieldElement::default(),
            mul: Multiplier::for_backend(backend),
        }
    }

    /// Absorb `data` as whole blocks, zero-padding the last partial block.
    pub(crate) fn update_padded(&mut self, data: &[u8]) {
        for chunk in data.chunks(16) {
            self.update_block(FieldElement::from_partial(chunk));
        }
    }

    fn update_block(&mut self, block: FieldElement) {
        self.acc ^= block;
        self.acc = match self.mul {
            Multiplier::Soft => self.acc.mul(self.h),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Multiplier::Clmul(token) => clmul::mul(token, self.acc, self.h),
        };
    }

    /// Absorb the AES-GCM-SIV length block and return the hash.
    pub(crate) fn finalize(mut self, ad_len: usize, msg_len: usize) -> [u8; 16] {
        self.update_block(FieldElement {
            lo: (ad_len as u64) * 8,
            hi: (msg_len as u64) * 8,
        });
        self.acc.to_le_bytes()
    }

    /// Current accumulator, without the length block.
    #[cfg(test)]
    fn state(&self) -> [u8; 16] {
        self.acc.to_le_bytes()
    }
}

impl Drop for Polyval {
    fn drop(&mut self) {
        self.h.zeroize();
        self.acc.zeroize();
    }
}

impl Multiplier {
    fn for_backend(backend: Backend) -> Self {
        match backend {
            Backend::Generic => Multiplier::Soft,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::Accelerated => clmul::Token::get().map_or(Multiplier::Soft, Multiplier::Clmul),
            #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
            Backend::Accelerated => Multiplier::Soft,
        }
    }
}

/// `POLYVAL(auth_key, associated_data || pad, message || pad, lengths)`.
pub(crate) fn compute(
    auth_key: &[u8; 16],
    associated_data: &[u8],
    message: &[u8],
    backend: Backend,
) -> [u8; 16] {
    let mut polyval = Polyval::new(auth_key, backend);
    polyval.update_padded(associated_data);
    polyval.update_padded(message);
    polyval.finalize(associated_data.len(), message.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const H: [u8; 16] = hex!("25629347589242761d31f826ba4b757b");
    const X1: [u8; 16] = hex!("4f4f95668c83dfb6401762bb2d01a262");
    const X2: [u8; 16] = hex!("d1a24ddd2721d006bbe45f20d3c9f362");

    #[test]
    fn rfc8452_appendix_a() {
        for backend in [Backend::Generic, Backend::Accelerated] {
            let mut polyval = Polyval::new(&H, backend);
            polyval.update_padded(&X1);
            polyval.update_padded(&X2);
            assert_eq!(polyval.state(), hex!("f7a3b47b846119fae5b7866cf5e5b77e"));
        }
    }

    #[test]
    fn empty_input_hashes_to_zero() {
        // Only the all-zero length block is absorbed.
        let auth_key = hex!("d9b360279694941ac5dbc6987ada7377");
        assert_eq!(compute(&auth_key, &[], &[], Backend::Generic), [0u8; 16]);
    }

    #[test]
    fn backends_agree_on_every_length() {
        let key = hex!("0102030405060708090a0b0c0d0e0f10");
        let data: Vec<u8> = (0..=255u8).cycle().take(1024).collect();
        for len in (0..=64).chain([127, 128, 129, 1023, 1024]) {
            let (ad, msg) = data[..len].split_at(len / 3);
            assert_eq!(
                compute(&key, ad, msg, Backend::Generic),
                compute(&key, ad, msg, Backend::Accelerated),
                "length {len}"
            );
        }
    }

    #[test]
    fn partial_block_padding_matches_explicit_zeros() {
        let key = [0x5au8; 16];
        let mut a = Polyval::new(&key, Backend::Generic);
        a.update_padded(&[1, 2, 3]);
        let mut b = Polyval::new(&key, Backend::Generic);
        let mut padded = [0u8; 16];
        padded[..3].copy_from_slice(&[1, 2, 3]);
        b.update_padded(&padded);
        assert_eq!(a.state(), b.state());
    }
}
