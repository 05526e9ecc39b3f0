//! S2V vector hash (RFC 5297 section 2.4) over AES-CMAC.
//!
//! The vector is fixed to at most three components: associated data, nonce
//! and plaintext. An empty nonce is dropped from the vector; empty associated
//! data is kept whenever a nonce is present.

use zeroize::Zeroize;

use crate::field::dbl;
use crate::primitives::Prf;

/// Compute `S2V(K, AD, N, P)` with `prf` keyed by `K`.
///
/// `prf` is a prototype and is cloned, never mutated.
pub(crate) fn s2v(prf: &Prf, associated_data: &[u8], nonce: &[u8], plaintext: &[u8]) -> [u8; 16] {
    let mut mac = prf.clone();

    mac.update(&[0u8; 16]);
    let mut d = mac.finalize_reset();

    if !associated_data.is_empty() || !nonce.is_empty() {
        dbl(&mut d);
        mac.update(associated_data);
        xor_in_place(&mut d, &mac.finalize_reset());
    }

    if !nonce.is_empty() {
        dbl(&mut d);
        mac.update(nonce);
        xor_in_place(&mut d, &mac.finalize_reset());
    }

    let iv = if plaintext.len() >= 16 {
        // xorend: fold D into the last 16 bytes of the plaintext.
        let (head, tail) = plaintext.split_at(plaintext.len() - 16);
        mac.update(head);
        let mut last = [0u8; 16];
        last.copy_from_slice(tail);
        xor_in_place(&mut last, &d);
        mac.update(&last);
        last.zeroize();
        mac.finalize_reset()
    } else {
        dbl(&mut d);
        let mut padded = [0u8; 16];
        padded[..plaintext.len()].copy_from_slice(plaintext);
        padded[plaintext.len()] = 0x80;
        xor_in_place(&mut padded, &d);
        mac.update(&padded);
        padded.zeroize();
        mac.finalize_reset()
    };

    d.zeroize();
    iv
}

fn xor_in_place(dst: &mut [u8; 16], src: &[u8; 16]) {
    for (a, b) in dst.iter_mut().zip(src) {
        *a ^= b;
    }
}
