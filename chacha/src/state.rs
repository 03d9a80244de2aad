// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cipher state and the key/nonce scheduler which fills it in.

use crate::{
    Error, NUM_BLOCK_BYTES, NUM_KEY_BYTES, NUM_NONCE_BYTES, NUM_SHORT_KEY_BYTES, NUM_STATE_WORDS,
};

/// "expand 32-byte k", the first row of the state for full length keys.
const SIGMA: [u32; 4] = [0x61707865, 0x3320646e, 0x79622d32, 0x6b206574];
/// "expand 16-byte k", the first row of the state for short keys.
const TAU: [u32; 4] = [0x61707865, 0x3120646e, 0x79622d36, 0x6b206574];

/// Index of the block counter word.
const COUNTER_WORD: usize = 12;

/// The 512-bit cipher state broken up into 16 32-bit words.
///
/// The 16 words can be visualized as a 4x4 matrix:
///
/// ```text
///   const  const  const  const
///   key    key    key    key
///   key    key    key    key
///   block  nonce  nonce  nonce
/// ```
///
/// Nothing checks the constant row after setup, overwriting it silently produces
/// a different keystream.
#[derive(Clone, Default)]
pub(crate) struct State {
    words: [u32; NUM_STATE_WORDS],
}

impl State {
    pub(crate) fn words(&self) -> &[u32; NUM_STATE_WORDS] {
        &self.words
    }

    /// Load the constant row and key rows.
    ///
    /// A 32-byte key fills both key rows. A 16-byte key fills the first key row
    /// and is repeated into the second. On error the state is left untouched.
    pub(crate) fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        let (constants, upper) = match key.len() {
            NUM_KEY_BYTES => (SIGMA, &key[NUM_SHORT_KEY_BYTES..]),
            NUM_SHORT_KEY_BYTES => (TAU, key),
            len => return Err(Error::InvalidKeyLength(len)),
        };

        self.words[0..4].copy_from_slice(&constants);
        load_le_words(&mut self.words[4..8], &key[..NUM_SHORT_KEY_BYTES]);
        load_le_words(&mut self.words[8..12], upper);
        Ok(())
    }

    /// Load the block counter and nonce row.
    pub(crate) fn set_iv(&mut self, nonce: &[u8], counter: u32) -> Result<(), Error> {
        if nonce.len() != NUM_NONCE_BYTES {
            return Err(Error::InvalidNonceLength(nonce.len()));
        }

        self.words[COUNTER_WORD] = counter;
        load_le_words(&mut self.words[13..16], nonce);
        Ok(())
    }

    pub(crate) fn counter(&self) -> u32 {
        self.words[COUNTER_WORD]
    }

    pub(crate) fn set_counter(&mut self, counter: u32) {
        self.words[COUNTER_WORD] = counter;
    }

    /// Step to the next block, wrapping at 2^32.
    pub(crate) fn advance(&mut self) {
        self.words[COUNTER_WORD] = self.words[COUNTER_WORD].wrapping_add(1);
    }

    /// Serialize as 16 little-endian words.
    pub(crate) fn to_le_bytes(&self) -> [u8; NUM_BLOCK_BYTES] {
        let mut bytes = [0u8; NUM_BLOCK_BYTES];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.words.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    pub(crate) fn from_le_bytes(bytes: [u8; NUM_BLOCK_BYTES]) -> Self {
        let mut words = [0u32; NUM_STATE_WORDS];
        load_le_words(&mut words, &bytes);
        State { words }
    }
}

/// Fill `words` from consecutive little-endian 4-byte chunks of `bytes`.
fn load_le_words(words: &mut [u32], bytes: &[u8]) {
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
}
