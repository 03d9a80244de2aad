// SPDX-License-Identifier: CC0-1.0

//! Fuzz test for key and nonce validation.
//!
//! The first byte picks how the rest is split between key and nonce.

#![no_main]
use chacha::{ChaCha20, Error, NUM_KEY_BYTES, NUM_NONCE_BYTES, NUM_SHORT_KEY_BYTES};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((split, rest)) = data.split_first() else {
        return;
    };
    let split = (*split as usize).min(rest.len());
    let (key, nonce) = rest.split_at(split);

    let mut cipher = ChaCha20::default();
    match cipher.set_key(key) {
        Ok(()) => assert!(key.len() == NUM_KEY_BYTES || key.len() == NUM_SHORT_KEY_BYTES),
        Err(e) => assert_eq!(e, Error::InvalidKeyLength(key.len())),
    }
    match cipher.set_iv(nonce, 0) {
        Ok(()) => assert_eq!(nonce.len(), NUM_NONCE_BYTES),
        Err(e) => assert_eq!(e, Error::InvalidNonceLength(nonce.len())),
    }
});
