// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drive the block function across buffers of any length.

use core::fmt;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::block::keystream;
use crate::state::State;
use crate::{trace, Error, NUM_BLOCK_BYTES};

/// The ChaCha20 stream cipher.
///
/// The 20-round IETF variant with a 96-bit nonce and a 32-bit block counter.
/// Each 64-byte block of keystream bumps the counter by one, including a final
/// partial block, so the cipher can be reused across calls to continue a stream.
///
/// The whole cipher is 64 bytes of plain data with no heap allocations. It is
/// not `Copy`, an explicit clone is the only way to fork a stream position and
/// both forks then produce the same keystream.
#[derive(Clone, Default)]
pub struct ChaCha20 {
    state: State,
}

impl ChaCha20 {
    /// Make a new instance from a 16 or 32 byte key, a 12 byte nonce and the
    /// block to start the keystream at.
    ///
    /// # Errors
    ///
    /// * `InvalidKeyLength` - The key is not 16 or 32 bytes.
    /// * `InvalidNonceLength` - The nonce is not 12 bytes.
    pub fn new(key: &[u8], nonce: &[u8], counter: u32) -> Result<Self, Error> {
        let mut cipher = ChaCha20::default();
        cipher.set_key(key)?;
        cipher.set_iv(nonce, counter)?;
        Ok(cipher)
    }

    /// Load a key, replacing any previous key.
    ///
    /// Full 32-byte keys and short 16-byte keys use different constants, so they
    /// never produce the same keystream even if the short key is a prefix.
    ///
    /// # Errors
    ///
    /// * `InvalidKeyLength` - The key is not 16 or 32 bytes, the cipher is unchanged.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), Error> {
        self.state.set_key(key)?;
        trace::key_loaded(key);
        Ok(())
    }

    /// Load a nonce and the block counter to start the keystream at.
    ///
    /// # Errors
    ///
    /// * `InvalidNonceLength` - The nonce is not 12 bytes, the cipher is unchanged.
    pub fn set_iv(&mut self, nonce: &[u8], counter: u32) -> Result<(), Error> {
        self.state.set_iv(nonce, counter)?;
        trace::iv_loaded(nonce, counter);
        Ok(())
    }

    /// The block counter of the next keystream block.
    pub fn counter(&self) -> u32 {
        self.state.counter()
    }

    /// Jump to a block in the keystream.
    pub fn set_counter(&mut self, counter: u32) {
        self.state.set_counter(counter);
    }

    /// Generate the keystream block at the current counter and step past it.
    pub fn keystream_block(&mut self) -> [u8; NUM_BLOCK_BYTES] {
        let block = keystream(self.state.words());
        self.state.advance();
        block
    }

    /// Apply the keystream to a buffer in place.
    pub fn apply_keystream(&mut self, buffer: &mut [u8]) {
        for chunk in buffer.chunks_mut(NUM_BLOCK_BYTES) {
            let keystream = self.keystream_block();
            for (byte, key_byte) in chunk.iter_mut().zip(keystream.iter()) {
                *byte ^= *key_byte;
            }
        }
    }

    /// XOR `input` with the keystream into `output`.
    ///
    /// # Arguments
    ///
    /// - `output` - Receives the result, must be exactly as long as `input`.
    /// - `input`  - Plaintext to encrypt or ciphertext to decrypt.
    ///
    /// # Errors
    ///
    /// * `BufferLengthMismatch` - The buffers differ in length, nothing is
    ///   written and the counter is unchanged.
    pub fn process(&mut self, output: &mut [u8], input: &[u8]) -> Result<(), Error> {
        if output.len() != input.len() {
            return Err(Error::BufferLengthMismatch {
                input: input.len(),
                output: output.len(),
            });
        }

        for (out_chunk, in_chunk) in output
            .chunks_mut(NUM_BLOCK_BYTES)
            .zip(input.chunks(NUM_BLOCK_BYTES))
        {
            let keystream = self.keystream_block();
            for ((out, byte), key_byte) in out_chunk
                .iter_mut()
                .zip(in_chunk.iter())
                .zip(keystream.iter())
            {
                *out = *byte ^ *key_byte;
            }
        }

        Ok(())
    }

    /// XOR `input` with the keystream into a newly allocated buffer.
    #[cfg(feature = "alloc")]
    pub fn process_with_alloc(&mut self, input: &[u8]) -> Vec<u8> {
        let mut output = input.to_vec();
        self.apply_keystream(&mut output);
        output
    }

    /// Serialize the full cipher state as 16 little-endian 32-bit words.
    ///
    /// The snapshot holds the key, treat it as secret.
    pub fn snapshot(&self) -> [u8; NUM_BLOCK_BYTES] {
        self.state.to_le_bytes()
    }

    /// Continue a stream from a [`ChaCha20::snapshot`].
    pub fn resume(snapshot: [u8; NUM_BLOCK_BYTES]) -> Self {
        ChaCha20 {
            state: State::from_le_bytes(snapshot),
        }
    }
}

impl fmt::Debug for ChaCha20 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaCha20")
            .field("counter", &self.counter())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg(feature = "alloc")]
mod tests {
    use super::*;
    use alloc::format;
    #[cfg(feature = "std")]
    use alloc::vec;
    use hex::prelude::*;
    #[cfg(feature = "std")]
    use rand::Rng;

    const LADIES: &[u8; 114] = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";

    fn rfc_cipher(counter: u32) -> ChaCha20 {
        let key = Vec::from_hex("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
            .unwrap();
        let nonce = Vec::from_hex("000000000000004a00000000").unwrap();
        ChaCha20::new(&key, &nonce, counter).unwrap()
    }

    #[test]
    fn test_small_plaintext() {
        let mut chacha = rfc_cipher(1);
        let mut binding = [8; 3];
        chacha.apply_keystream(&mut binding[..]);
        assert_eq!(chacha.counter(), 2);
        let mut chacha = rfc_cipher(1);
        chacha.apply_keystream(&mut binding[..]);
        assert_eq!([8; 3], binding);
    }

    #[test]
    fn test_modulo_64() {
        let mut chacha = rfc_cipher(1);
        let mut binding = [8; 64];
        chacha.apply_keystream(&mut binding[..]);
        assert_eq!(chacha.counter(), 2);
        let mut chacha = rfc_cipher(1);
        chacha.apply_keystream(&mut binding[..]);
        assert_eq!([8; 64], binding);
    }

    #[test]
    fn test_rfc_standard() {
        let mut chacha = rfc_cipher(1);
        let mut binding = [0u8; 114];
        chacha.process(&mut binding, LADIES).unwrap();
        assert_eq!(binding[..], Vec::from_hex("6e2e359a2568f98041ba0728dd0d6981e97e7aec1d4360c20a27afccfd9fae0bf91b65c5524733ab8f593dabcd62b3571639d624e65152ab8f530c359f0861d807ca0dbf500d6a6156a38e088a22b65e52bc514d16ccf806818ce91ab77937365af90bbf74a35be6b40b8eedf2785e42874d").unwrap());
        assert_eq!(chacha.counter(), 3);

        let mut chacha = rfc_cipher(1);
        chacha.apply_keystream(&mut binding);
        assert_eq!(&binding, LADIES);
    }

    #[test]
    fn test_process_matches_apply_keystream() {
        let mut in_place = rfc_cipher(7);
        let mut buffered = rfc_cipher(7);
        let mut expected = *LADIES;
        in_place.apply_keystream(&mut expected);
        let mut output = [0u8; 114];
        buffered.process(&mut output, LADIES).unwrap();
        assert_eq!(output, expected);
        assert_eq!(in_place.snapshot(), buffered.snapshot());
    }

    #[test]
    fn test_mismatched_buffers() {
        let mut chacha = rfc_cipher(1);
        let mut output = [0u8; 10];
        assert_eq!(
            chacha.process(&mut output, &[1u8; 11]),
            Err(Error::BufferLengthMismatch {
                input: 11,
                output: 10
            })
        );
        assert_eq!(output, [0u8; 10]);
        assert_eq!(chacha.counter(), 1);
    }

    #[test]
    fn test_empty_is_noop() {
        let mut chacha = rfc_cipher(5);
        let before = chacha.snapshot();
        chacha.process(&mut [], &[]).unwrap();
        chacha.apply_keystream(&mut []);
        assert_eq!(chacha.counter(), 5);
        assert_eq!(chacha.snapshot(), before);
    }

    #[test]
    fn test_keystream_block() {
        let mut chacha = rfc_cipher(1);
        let first = chacha.keystream_block();
        let second = chacha.keystream_block();
        assert_eq!(chacha.counter(), 3);

        let mut zeroes = [0u8; 128];
        rfc_cipher(1).apply_keystream(&mut zeroes);
        assert_eq!(zeroes[..64], first);
        assert_eq!(zeroes[64..], second);
    }

    #[test]
    fn test_set_counter() {
        let mut chacha = rfc_cipher(0);
        chacha.set_counter(1);
        let mut binding = [0u8; 114];
        chacha.process(&mut binding, LADIES).unwrap();
        assert_eq!(binding[..4].to_lower_hex_string(), "6e2e359a");
    }

    #[test]
    fn test_snapshot_resume() {
        let mut chacha = rfc_cipher(1);
        let mut head = [0u8; 64];
        chacha.process(&mut head, &LADIES[..64]).unwrap();

        let snapshot = chacha.snapshot();
        assert_eq!(snapshot[48..52], 2u32.to_le_bytes());
        let mut resumed = ChaCha20::resume(snapshot);
        let mut tail = [0u8; 50];
        resumed.process(&mut tail, &LADIES[64..]).unwrap();

        let mut whole = [0u8; 114];
        rfc_cipher(1).process(&mut whole, LADIES).unwrap();
        assert_eq!(whole[..64], head);
        assert_eq!(whole[64..], tail);
    }

    #[test]
    fn test_process_with_alloc() {
        let ciphertext = rfc_cipher(1).process_with_alloc(LADIES);
        assert_eq!(ciphertext.len(), LADIES.len());
        assert_eq!(rfc_cipher(1).process_with_alloc(&ciphertext), LADIES.to_vec());
    }

    #[test]
    fn test_clone_forks_stream() {
        let mut original = rfc_cipher(1);
        let mut first = [0u8; 64];
        original.apply_keystream(&mut first);

        // Moving the cipher carries the position along, only a clone repeats it.
        let mut moved = original;
        let mut fork = moved.clone();
        let mut second = [0u8; 64];
        let mut forked = [0u8; 64];
        moved.apply_keystream(&mut second);
        fork.apply_keystream(&mut forked);

        assert_ne!(first, second);
        assert_eq!(second, forked);
        assert_eq!(moved.counter(), 3);
        assert_eq!(fork.counter(), 3);
    }

    #[test]
    fn test_debug_hides_key() {
        let chacha = ChaCha20::new(&[0xaa; 32], &[0u8; 12], 9).unwrap();
        let debug = format!("{:?}", chacha);
        assert_eq!(debug, "ChaCha20 { counter: 9, .. }");
    }

    #[cfg(feature = "std")]
    fn gen_garbage(garbage_len: usize) -> Vec<u8> {
        let mut rng = rand::thread_rng();
        (0..garbage_len).map(|_| rng.gen()).collect()
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_fuzz_block_aligned_splits() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let key = gen_garbage(if rng.gen() { 32 } else { 16 });
            let nonce = gen_garbage(12);
            let counter: u32 = rng.gen();
            let message = gen_garbage(rng.gen_range(0..600));

            let mut whole = vec![0u8; message.len()];
            ChaCha20::new(&key, &nonce, counter)
                .unwrap()
                .process(&mut whole, &message)
                .unwrap();

            let split = rng.gen_range(0..=message.len() / 64) * 64;
            let mut chacha = ChaCha20::new(&key, &nonce, counter).unwrap();
            let mut pieces = message.clone();
            let (head, tail) = pieces.split_at_mut(split);
            chacha.apply_keystream(head);
            chacha.apply_keystream(tail);
            assert_eq!(pieces, whole);
        }
    }
}
