// SPDX-License-Identifier: CC0-1.0

//! Setup logging, compiled to nothing without the `log` feature.
//!
//! Raw key and nonce bytes are only ever logged with `trace-material`, a build
//! meant for checking test vectors.

#[cfg(feature = "trace-material")]
use hex::DisplayHex;

#[cfg(feature = "log")]
pub(crate) fn key_loaded(key: &[u8]) {
    log::debug!(
        "ChaCha key loaded, {} bytes with expand {}-byte k constants.",
        key.len(),
        key.len()
    );
    #[cfg(feature = "trace-material")]
    log::trace!("ChaCha key: {}", key.as_hex());
}

#[cfg(feature = "log")]
pub(crate) fn iv_loaded(nonce: &[u8], counter: u32) {
    log::debug!("ChaCha nonce loaded, block counter starts at {}.", counter);
    #[cfg(feature = "trace-material")]
    log::trace!("ChaCha nonce: {}", nonce.as_hex());
    #[cfg(not(feature = "trace-material"))]
    let _ = nonce;
}

#[cfg(not(feature = "log"))]
#[inline(always)]
pub(crate) fn key_loaded(_key: &[u8]) {}

#[cfg(not(feature = "log"))]
#[inline(always)]
pub(crate) fn iv_loaded(_nonce: &[u8], _counter: u32) {}
