// SPDX-License-Identifier: CC0-1.0

//! The ChaCha20 stream cipher.
//!
//! A keystream is generated from a secret key, a 96-bit nonce and a 32-bit block
//! counter, then combined with plaintext (or ciphertext) by exclusive-or. Encryption
//! and decryption are the same operation.
//!
//! This crate is only the keystream core. It does not authenticate data, manage keys,
//! or track nonce reuse, those belong to a calling AEAD layer.
//!
//! # Quick Start
//!
//! ```
//! use chacha::ChaCha20;
//!
//! # fn main() -> Result<(), chacha::Error> {
//! let key = [0x42u8; 32];
//! let nonce = [0x24u8; 12];
//!
//! let mut cipher = ChaCha20::new(&key, &nonce, 1)?;
//! let plaintext = *b"attack at dawn";
//! let mut ciphertext = [0u8; 14];
//! cipher.process(&mut ciphertext, &plaintext)?;
//!
//! // Same key, nonce and starting counter reverses it.
//! let mut cipher = ChaCha20::new(&key, &nonce, 1)?;
//! cipher.apply_keystream(&mut ciphertext);
//! assert_eq!(ciphertext, plaintext);
//! # Ok(())
//! # }
//! ```
//!
//! # Setup
//!
//! A [`ChaCha20`] can also be built in two steps, mirroring the classic
//! `set_key` / `set_iv` interface. Keys may be 16 or 32 bytes, the two lengths use
//! different constants so they produce unrelated keystreams.
//!
//! ```
//! use chacha::{ChaCha20, Error};
//!
//! let mut cipher = ChaCha20::default();
//! assert_eq!(cipher.set_key(&[0u8; 24]), Err(Error::InvalidKeyLength(24)));
//! cipher.set_key(&[7u8; 16]).unwrap();
//! cipher.set_iv(&[0u8; 12], 0).unwrap();
//! ```
//!
//! # Block Counter
//!
//! Every call consumes whole 64-byte blocks. A call over 10 bytes still advances the
//! counter by one and the remaining 54 bytes of that keystream block are dropped, so
//! a stream split across calls only lines up with a one-shot call when every split
//! lands on a multiple of [`NUM_BLOCK_BYTES`].
//!
//! The counter wraps modulo 2^32 without error. Staying under 2^32 blocks per
//! key/nonce pair is up to the caller.
//!
//! # Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `std` | `std::error::Error` for [`Error`], implies `alloc`. Default. |
//! | `alloc` | Allocating helpers such as [`ChaCha20::process_with_alloc`]. |
//! | `log` | Debug logs for key and nonce setup through the `log` facade. |
//! | `trace-material` | Trace logs of raw key and nonce bytes, for checking test vectors. |
#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

mod block;
mod state;
mod stream;
mod trace;

use core::fmt;

pub use block::block_function;
pub use stream::ChaCha20;

/// Number of bytes in one keystream block.
pub const NUM_BLOCK_BYTES: usize = 64;
/// Number of bytes in a nonce.
pub const NUM_NONCE_BYTES: usize = 12;
/// Number of bytes in a full length key.
pub const NUM_KEY_BYTES: usize = 32;
/// Number of bytes in a short key, which is repeated to fill the key words.
pub const NUM_SHORT_KEY_BYTES: usize = 16;
/// Number of 32-bit words in the cipher state.
pub const NUM_STATE_WORDS: usize = 16;

/// Arguments rejected while setting up or driving the cipher.
///
/// These are configuration errors, retrying with the same input fails the same way.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Keys must be 16 or 32 bytes, holds the length given.
    InvalidKeyLength(usize),
    /// Nonces must be 12 bytes, holds the length given.
    InvalidNonceLength(usize),
    /// Output buffer must be exactly as long as the input.
    BufferLengthMismatch { input: usize, output: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKeyLength(len) => write!(
                f,
                "Invalid key length {len}, expected {NUM_SHORT_KEY_BYTES} or {NUM_KEY_BYTES} bytes."
            ),
            Error::InvalidNonceLength(len) => write!(
                f,
                "Invalid nonce length {len}, expected {NUM_NONCE_BYTES} bytes."
            ),
            Error::BufferLengthMismatch { input, output } => write!(
                f,
                "Output buffer is {output} bytes but input is {input} bytes."
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidKeyLength(_) => None,
            Error::InvalidNonceLength(_) => None,
            Error::BufferLengthMismatch { .. } => None,
        }
    }
}
