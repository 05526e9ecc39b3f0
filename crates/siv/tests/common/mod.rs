//! Helpers shared by the integration tests.

#![allow(dead_code)]

use siv::{AesGcmSiv, AesSivCmac, Backend, SivAead};
use tracing_subscriber::EnvFilter;

/// Install a JSON subscriber writing through the test harness.
///
/// Only the first call in a test binary installs it; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub const BACKENDS: [Backend; 2] = [Backend::Generic, Backend::Accelerated];

/// One cipher per scheme and key size, pinned to `backend`.
pub fn all_ciphers(backend: Backend) -> Vec<Box<dyn SivAead>> {
    let key: Vec<u8> = (0u8..64).collect();
    vec![
        Box::new(AesSivCmac::with_backend(&key[..32], backend).unwrap()),
        Box::new(AesSivCmac::with_backend(&key[..48], backend).unwrap()),
        Box::new(AesSivCmac::with_backend(&key[..64], backend).unwrap()),
        Box::new(AesGcmSiv::with_backend(&key[..16], backend).unwrap()),
        Box::new(AesGcmSiv::with_backend(&key[..32], backend).unwrap()),
    ]
}
