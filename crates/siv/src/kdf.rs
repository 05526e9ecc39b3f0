//! Per-nonce key derivation for AES-GCM-SIV (RFC 8452 section 4).

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::primitives::BlockCipher;

/// Message-authentication and message-encryption keys for one nonce.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct DerivedKeys {
    auth: [u8; 16],
    enc: [u8; 32],
    enc_len: usize,
}

impl DerivedKeys {
    pub(crate) fn auth_key(&self) -> &[u8; 16] {
        &self.auth
    }

    /// The encryption key; as long as the key-generating key.
    #[cfg(test)]
    pub(crate) fn enc_key(&self) -> &[u8] {
        &self.enc[..self.enc_len]
    }

    pub(crate) fn encryption_cipher(&self) -> BlockCipher {
        if self.enc_len == 16 {
            let mut key = [0u8; 16];
            key.copy_from_slice(&self.enc[..16]);
            let cipher = BlockCipher::aes128(&key);
            key.zeroize();
            cipher
        } else {
            BlockCipher::aes256(&self.enc)
        }
    }
}

/// Derive the per-nonce keys with the key-generating `cipher`.
///
/// Block `i` is `le32(i) || nonce`, with the nonce zero-filled to 12 bytes.
/// The first 8 bytes of each AES output are kept: blocks 0-1 form the
/// authentication key, blocks 2-3 (2-5 for a 256-bit key) the encryption key.
pub(crate) fn derive_keys(cipher: &BlockCipher, nonce: &[u8]) -> DerivedKeys {
    let enc_len = cipher.key_len();
    let blocks = 2 + enc_len / 8;

    let mut material = [0u8; 48];
    let mut block = [0u8; 16];
    for i in 0..blocks {
        block.fill(0);
        block[..4].copy_from_slice(&(i as u32).to_le_bytes());
        block[4..4 + nonce.len()].copy_from_slice(nonce);
        cipher.encrypt_block(&mut block);
        material[i * 8..i * 8 + 8].copy_from_slice(&block[..8]);
    }
    block.zeroize();

    let mut keys = DerivedKeys {
        auth: [0u8; 16],
        enc: [0u8; 32],
        enc_len,
    };
    keys.auth.copy_from_slice(&material[..16]);
    keys.enc[..enc_len].copy_from_slice(&material[16..16 + enc_len]);
    material.zeroize();
    keys
}
