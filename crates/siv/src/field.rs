//! GF(2^128) arithmetic for both constructions.
//!
//! S2V doubles in the RFC 5297 representation (big-endian bits, reduction
//! by `x^128 + x^7 + x^2 + x + 1`). POLYVAL multiplies in the RFC 8452
//! representation (little-endian bits, `x^128 + x^127 + x^126 + x^121 + 1`),
//! where `a * b` is the Montgomery-style product `a * b * x^-128`.
//!
//! Everything here is branch-free on secret data.

use std::ops::BitXorAssign;

use zeroize::Zeroize;

/// Low word of the POLYVAL reduction polynomial: `x^63 + x^62 + x^57`.
pub(crate) const POLYVAL_MASK: u64 = 0xc200_0000_0000_0000;

/// Multiply `block` by `x` (RFC 5297 `dbl`).
pub(crate) fn dbl(block: &mut [u8; 16]) {
    let v = u128::from_be_bytes(*block);
    let carry = v >> 127;
    *block = ((v << 1) ^ (carry.wrapping_neg() & 0x87)).to_be_bytes();
}

/// POLYVAL field element as two little-endian 64-bit words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Zeroize)]
pub(crate) struct FieldElement {
    pub(crate) lo: u64,
    pub(crate) hi: u64,
}

impl FieldElement {
    pub(crate) fn from_le_bytes(bytes: &[u8; 16]) -> Self {
        let v = u128::from_le_bytes(*bytes);
        Self {
            lo: v as u64,
            hi: (v >> 64) as u64,
        }
    }

    pub(crate) fn to_le_bytes(self) -> [u8; 16] {
        (u128::from(self.lo) | (u128::from(self.hi) << 64)).to_le_bytes()
    }

    /// Load up to 16 bytes, zero-padding a short final block.
    pub(crate) fn from_partial(chunk: &[u8]) -> Self {
        let mut block = [0u8; 16];
        block[..chunk.len()].copy_from_slice(chunk);
        let fe = Self::from_le_bytes(&block);
        block.zeroize();
        fe
    }

    /// Portable POLYVAL product.
    pub(crate) fn mul(self, rhs: Self) -> Self {
        let (w0, w1, w2, w3) = widening_mul(self, rhs, clmul64);
        reduce(w0, w1, w2, w3, clmul64)
    }
}

impl BitXorAssign for FieldElement {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.lo ^= rhs.lo;
        self.hi ^= rhs.hi;
    }
}

/// Unreduced 256-bit product `a * b` as four little-endian words.
///
/// `clmul` is any 64x64 -> 128-bit carry-less multiplier returning
/// `(low, high)`.
#[inline]
pub(crate) fn widening_mul(
    a: FieldElement,
    b: FieldElement,
    clmul: impl Fn(u64, u64) -> (u64, u64),
) -> (u64, u64, u64, u64) {
    let (lo0, lo1) = clmul(a.lo, b.lo);
    let (m0, m1) = clmul(a.hi, b.lo);
    let (n0, n1) = clmul(a.lo, b.hi);
    let (hi0, hi1) = clmul(a.hi, b.hi);
    (lo0, lo1 ^ m0 ^ n0, hi0 ^ m1 ^ n1, hi1)
}

/// Fold the low 128 bits of a 256-bit product into the high 128 bits.
#[inline]
pub(crate) fn reduce(
    w0: u64,
    w1: u64,
    w2: u64,
    w3: u64,
    clmul: impl Fn(u64, u64) -> (u64, u64),
) -> FieldElement {
    let fold = |lo: u64, hi: u64| {
        let (p0, p1) = clmul(POLYVAL_MASK, lo);
        (p0 ^ hi, p1 ^ lo)
    };
    let (a0, a1) = fold(w0, w1);
    let (b0, b1) = fold(a0, a1);
    FieldElement {
        lo: w2 ^ b0,
        hi: w3 ^ b1,
    }
}

/// Bit-serial carry-less multiply, one iteration per bit of `b`.
pub(crate) fn clmul64(a: u64, b: u64) -> (u64, u64) {
    let (mut lo, mut hi) = (0u64, 0u64);
    for i in 0..64 {
        hi ^= ((b >> i) & 1).wrapping_neg() & a;
        lo = (lo >> 1) | (hi << 63);
        hi >>= 1;
    }
    (lo, hi)
}
