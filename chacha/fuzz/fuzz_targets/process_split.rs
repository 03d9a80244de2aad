// SPDX-License-Identifier: CC0-1.0

//! Fuzz test for block aligned stream continuation.
//!
//! Processing a message in two calls split on a block boundary has to match a
//! single call, and running the keystream a second time has to restore the message.

#![no_main]
use chacha::{ChaCha20, NUM_BLOCK_BYTES};
use libfuzzer_sys::fuzz_target;

// 32 key bytes, 12 nonce bytes, 4 counter bytes and 1 split byte.
const HEADER_BYTES: usize = 49;

fuzz_target!(|data: &[u8]| {
    if data.len() < HEADER_BYTES {
        return;
    }

    let (header, message) = data.split_at(HEADER_BYTES);
    let key = &header[0..32];
    let nonce = &header[32..44];
    let counter = u32::from_le_bytes(header[44..48].try_into().unwrap());
    let blocks = message.len() / NUM_BLOCK_BYTES;
    let split = (header[48] as usize % (blocks + 1)) * NUM_BLOCK_BYTES;

    let mut whole = vec![0u8; message.len()];
    let mut cipher = ChaCha20::new(key, nonce, counter).unwrap();
    cipher.process(&mut whole, message).unwrap();
    let end_counter = cipher.counter();

    let mut pieces = message.to_vec();
    let mut cipher = ChaCha20::new(key, nonce, counter).unwrap();
    let (head, tail) = pieces.split_at_mut(split);
    cipher.apply_keystream(head);
    cipher.apply_keystream(tail);
    assert_eq!(pieces, whole);
    assert_eq!(cipher.counter(), end_counter);

    let mut cipher = ChaCha20::new(key, nonce, counter).unwrap();
    cipher.apply_keystream(&mut pieces);
    assert_eq!(pieces, message);
});
