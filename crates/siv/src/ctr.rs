//! AES counter mode with the two counter layouts the constructions use.
//!
//! AES-SIV-CMAC increments the whole block as a 128-bit big-endian integer;
//! AES-GCM-SIV increments only the first four bytes as a little-endian
//! 32-bit integer. Both wrap silently.

use aes::Block;
use zeroize::Zeroize;

use crate::backend::Backend;
use crate::primitives::BlockCipher;

/// Blocks encrypted per call on the accelerated backend.
const PAR_BLOCKS: usize = 8;

pub(crate) trait Counter {
    fn increment(block: &mut [u8; 16]);
}

/// Whole block, big-endian, modulo 2^128.
pub(crate) struct BigEndian128;

impl Counter for BigEndian128 {
    fn increment(block: &mut [u8; 16]) {
        *block = u128::from_be_bytes(*block).wrapping_add(1).to_be_bytes();
    }
}

/// Bytes 0..4, little-endian, modulo 2^32; bytes 4..16 are fixed.
pub(crate) struct LittleEndian32;

impl Counter for LittleEndian32 {
    fn increment(block: &mut [u8; 16]) {
        let mut ctr = [0u8; 4];
        ctr.copy_from_slice(&block[..4]);
        let next = u32::from_le_bytes(ctr).wrapping_add(1);
        block[..4].copy_from_slice(&next.to_le_bytes());
    }
}

/// XOR `buf` with the keystream starting at counter block `iv`.
pub(crate) fn apply_keystream<C: Counter>(
    cipher: &BlockCipher,
    iv: &[u8; 16],
    buf: &mut [u8],
    backend: Backend,
) {
    let mut counter = *iv;
    match backend {
        Backend::Generic => xor_single::<C>(cipher, &mut counter, buf),
        Backend::Accelerated => xor_batched::<C>(cipher, &mut counter, buf),
    }
    counter.zeroize();
}

fn xor_single<C: Counter>(cipher: &BlockCipher, counter: &mut [u8; 16], buf: &mut [u8]) {
    let mut keystream = [0u8; 16];
    for chunk in buf.chunks_mut(16) {
        keystream = *counter;
        cipher.encrypt_block(&mut keystream);
        xor(chunk, &keystream);
        C::increment(counter);
    }
    keystream.zeroize();
}

fn xor_batched<C: Counter>(cipher: &BlockCipher, counter: &mut [u8; 16], buf: &mut [u8]) {
    let mut blocks = [Block::default(); PAR_BLOCKS];
    for batch in buf.chunks_mut(16 * PAR_BLOCKS) {
        let n = (batch.len() + 15) / 16;
        for block in &mut blocks[..n] {
            block.copy_from_slice(&counter[..]);
            C::increment(counter);
        }
        cipher.encrypt_blocks(&mut blocks[..n]);
        for (chunk, keystream) in batch.chunks_mut(16).zip(&blocks) {
            xor(chunk, keystream);
        }
    }
    for block in &mut blocks {
        block.as_mut_slice().zeroize();
    }
}

fn xor(dst: &mut [u8], keystream: &[u8]) {
    for (d, k) in dst.iter_mut().zip(keystream) {
        *d ^= k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn big_endian_carries_across_bytes() {
        let mut block = hex!("000000000000000000000000000000ff");
        BigEndian128::increment(&mut block);
        assert_eq!(block, hex!("00000000000000000000000000000100"));

        let mut block = [0xff; 16];
        BigEndian128::increment(&mut block);
        assert_eq!(block, [0u8; 16]);
    }

    #[test]
    fn little_endian_wraps_within_four_bytes() {
        let mut block = hex!("ff000000aaaaaaaaaaaaaaaaaaaaaaaa");
        LittleEndian32::increment(&mut block);
        assert_eq!(block, hex!("00010000aaaaaaaaaaaaaaaaaaaaaaaa"));

        let mut block = hex!("ffffffffaaaaaaaaaaaaaaaaaaaaaaaa");
        LittleEndian32::increment(&mut block);
        assert_eq!(block, hex!("00000000aaaaaaaaaaaaaaaaaaaaaaaa"));
    }

    #[test]
    fn backends_produce_identical_keystream() {
        let cipher = BlockCipher::aes128(&[0x11; 16]);
        let iv = hex!("fffffffdffffffffffffffffffffffff");
        for len in [0, 1, 15, 16, 17, 127, 128, 129, 300] {
            let mut a = vec![0xa5u8; len];
            let mut b = a.clone();
            apply_keystream::<LittleEndian32>(&cipher, &iv, &mut a, Backend::Generic);
            apply_keystream::<LittleEndian32>(&cipher, &iv, &mut b, Backend::Accelerated);
            assert_eq!(a, b, "little-endian, length {len}");

            let mut a = vec![0x5au8; len];
            let mut b = a.clone();
            apply_keystream::<BigEndian128>(&cipher, &iv, &mut a, Backend::Generic);
            apply_keystream::<BigEndian128>(&cipher, &iv, &mut b, Backend::Accelerated);
            assert_eq!(a, b, "big-endian, length {len}");
        }
    }

    #[test]
    fn applying_twice_is_identity() {
        let cipher = BlockCipher::aes256(&[0x22; 32]);
        let iv = [0x80; 16];
        let original: Vec<u8> = (0..100u8).collect();
        let mut buf = original.clone();
        apply_keystream::<BigEndian128>(&cipher, &iv, &mut buf, Backend::Accelerated);
        assert_ne!(buf, original);
        apply_keystream::<BigEndian128>(&cipher, &iv, &mut buf, Backend::Generic);
        assert_eq!(buf, original);
    }
}
