//! Backend selection: portable code or x86 AES-NI / PCLMULQDQ paths.
//!
//! The choice is made once per cipher instance. [`Backend::select`] is a pure
//! function of a [`BackendPreference`], the probed [`Capabilities`] and the
//! [`Scheme`]; [`Backend::process_default`] resolves the environment
//! configuration and the CPU probe exactly once per process.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use siv_common::Scheme;
use tracing::{debug, warn};

use crate::config::BackendConfig;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
cpufeatures::new!(aes_intrinsics, "aes");
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
cpufeatures::new!(clmul_intrinsics, "pclmulqdq");

/// Whether the running CPU supports `pclmulqdq`.
///
/// The POLYVAL hardware path checks this before executing any carry-less
/// multiply instruction, whatever backend it was asked to use.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) fn has_clmul() -> bool {
    clmul_intrinsics::get()
}

/// Which implementation a caller asks for.
///
/// Parsed with [`FromStr`], case-insensitively; `portable` and `asm` are
/// accepted as aliases of `generic` and `accelerated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendPreference {
    /// Use the accelerated backend when the CPU supports it.
    #[default]
    Auto,
    /// Always use the portable backend.
    Generic,
    /// Use the accelerated backend, degrading to generic if unsupported.
    Accelerated,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "generic" | "portable" => Ok(Self::Generic),
            "accelerated" | "asm" => Ok(Self::Accelerated),
            other => Err(format!("unknown backend `{other}`")),
        }
    }
}

/// CPU features relevant to the accelerated backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// AES round instructions (AES-NI).
    pub aes: bool,
    /// Carry-less multiplication (PCLMULQDQ).
    pub clmul: bool,
}

impl Capabilities {
    /// Probe the running CPU. Results are cached by `cpufeatures`.
    pub fn detect() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            Self {
                aes: aes_intrinsics::get(),
                clmul: clmul_intrinsics::get(),
            }
        }
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        {
            Self::none()
        }
    }

    /// A CPU with none of the optional features.
    pub const fn none() -> Self {
        Self {
            aes: false,
            clmul: false,
        }
    }

    /// Whether `scheme` can run its accelerated backend on this CPU.
    pub fn supports(&self, scheme: Scheme) -> bool {
        match scheme {
            Scheme::AesSivCmac => self.aes,
            Scheme::AesGcmSiv => self.aes && self.clmul,
        }
    }
}

/// The implementation a cipher instance runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Portable code: bit-serial POLYVAL, one AES block at a time.
    Generic,
    /// PCLMULQDQ POLYVAL and pipelined multi-block AES-CTR.
    Accelerated,
}

impl Backend {
    /// Pick the backend for `scheme`. Pure: no probing, no logging.
    pub fn select(preference: BackendPreference, caps: Capabilities, scheme: Scheme) -> Self {
        match preference {
            BackendPreference::Generic => Backend::Generic,
            BackendPreference::Auto | BackendPreference::Accelerated => {
                if caps.supports(scheme) {
                    Backend::Accelerated
                } else {
                    Backend::Generic
                }
            }
        }
    }

    /// The backend new ciphers use unless one is passed explicitly.
    ///
    /// Reads `SIV_BACKEND` and probes the CPU on first use; the result never
    /// changes for the lifetime of the process.
    pub fn process_default(scheme: Scheme) -> Self {
        let resolved = PROCESS_DEFAULT.get_or_init(Resolved::from_environment);
        Self::select(resolved.preference, resolved.caps, scheme)
    }

    /// Short name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Backend::Generic => "generic",
            Backend::Accelerated => "accelerated",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static PROCESS_DEFAULT: OnceLock<Resolved> = OnceLock::new();

struct Resolved {
    preference: BackendPreference,
    caps: Capabilities,
}

impl Resolved {
    fn from_environment() -> Self {
        let preference = resolve_preference(BackendConfig::from_env());
        let caps = Capabilities::detect();
        if preference == BackendPreference::Accelerated && !caps.supports(Scheme::AesGcmSiv) {
            warn!(
                aes = caps.aes,
                clmul = caps.clmul,
                "accelerated backend requested but not fully supported; falling back to generic where needed"
            );
        }
        debug!(
            preference = ?preference,
            aes = caps.aes,
            clmul = caps.clmul,
            cmac = %Backend::select(preference, caps, Scheme::AesSivCmac),
            gcm = %Backend::select(preference, caps, Scheme::AesGcmSiv),
            "resolved process-wide SIV backend"
        );
        Self { preference, caps }
    }
}

/// The preference named by `config`, or `Auto` if it could not be loaded.
fn resolve_preference(config: anyhow::Result<BackendConfig>) -> BackendPreference {
    match config.and_then(|c| c.preference()) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "invalid backend configuration; using auto");
            BackendPreference::Auto
        }
    }
}
