//! PCLMULQDQ-based POLYVAL multiplication.
//!
//! Four carry-less products form the 256-bit result, then two folds by
//! `P1 = x^63 + x^62 + x^57` reduce it, the same schedule as the portable
//! path in [`crate::field`].

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::backend;
use crate::field::{FieldElement, POLYVAL_MASK};

/// Proof that the CPU supports `pclmulqdq`. Only [`Token::get`] creates one.
#[derive(Clone, Copy)]
pub(super) struct Token(());

impl Token {
    pub(super) fn get() -> Option<Self> {
        backend::has_clmul().then_some(Token(()))
    }
}

pub(super) fn mul(_token: Token, a: FieldElement, b: FieldElement) -> FieldElement {
    // SAFETY: a `Token` only exists once `pclmulqdq` support was detected.
    unsafe { mul_clmul(a, b) }
}

#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn mul_clmul(a: FieldElement, b: FieldElement) -> FieldElement {
    let a = _mm_set_epi64x(a.hi as i64, a.lo as i64);
    let b = _mm_set_epi64x(b.hi as i64, b.lo as i64);
    let p = _mm_set_epi64x(0, POLYVAL_MASK as i64);

    let lo = _mm_clmulepi64_si128(a, b, 0x00);
    let hi = _mm_clmulepi64_si128(a, b, 0x11);
    let mid = _mm_xor_si128(
        _mm_clmulepi64_si128(a, b, 0x01),
        _mm_clmulepi64_si128(a, b, 0x10),
    );
    let lo = _mm_xor_si128(lo, _mm_slli_si128(mid, 8));
    let hi = _mm_xor_si128(hi, _mm_srli_si128(mid, 8));

    // fold: [w0 : w1] -> [w1 ^ lo(P1*w0) : w0 ^ hi(P1*w0)]
    let t = _mm_clmulepi64_si128(lo, p, 0x00);
    let lo = _mm_xor_si128(_mm_shuffle_epi32(lo, 0x4e), t);
    let t = _mm_clmulepi64_si128(lo, p, 0x00);
    let lo = _mm_xor_si128(_mm_shuffle_epi32(lo, 0x4e), t);

    let mut out = [0u64; 2];
    _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_xor_si128(hi, lo));
    FieldElement {
        lo: out[0],
        hi: out[1],
    }
}
