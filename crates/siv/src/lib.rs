//! Misuse-resistant authenticated encryption with associated data.
//!
//! Two constructions are provided:
//!
//! - [`AesSivCmac`] (RFC 5297): the S2V vector hash over AES-CMAC produces a
//!   synthetic IV that doubles as the tag; AES-CTR encrypts.
//! - [`AesGcmSiv`] (RFC 8452): POLYVAL under a per-nonce derived key produces
//!   the tag; AES-CTR under a second derived key encrypts.
//!
//! Both are deterministic for a fixed `(nonce, plaintext, associated data)`.
//! Reusing or omitting the nonce only reveals whether two messages were equal.
//!
//! ```
//! use siv::{AesSivCmac, SivAead};
//!
//! let cipher = AesSivCmac::new(&[0x42; 32]).unwrap();
//! let sealed = cipher.encrypt(&[], b"plaintext", b"header");
//! assert_eq!(sealed.len(), b"plaintext".len() + cipher.overhead());
//! assert_eq!(cipher.decrypt(&[], &sealed, b"header").unwrap(), b"plaintext");
//! ```
//!
//! # Backends
//!
//! Each cipher runs on a [`Backend`] fixed at construction: a portable one and
//! one using AES-NI/PCLMULQDQ on x86. Both produce identical output. The
//! process-wide default comes from [`Capabilities::detect`] and the
//! `SIV_BACKEND` environment variable (see [`config`]).

pub mod aead;
pub mod backend;
pub mod config;

mod ctr;
mod field;
mod kdf;
mod polyval;
mod primitives;
mod s2v;

pub use aead::{AesGcmSiv, AesSivCmac, SivAead};
pub use backend::{Backend, BackendPreference, Capabilities};
pub use siv_common::{Scheme, SivError, TagPosition, TAG_SIZE};
