// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ChaCha20 block function.
//!
//! Twenty rounds of add-rotate-xor (ARX) over the 4x4 word matrix, ten column
//! rounds interleaved with ten diagonal rounds, followed by adding the input
//! state back in.

use core::ops::BitXor;

use crate::{NUM_BLOCK_BYTES, NUM_STATE_WORDS};

/// Each iteration is a column round and a diagonal round.
const DOUBLE_ROUNDS: usize = 10;

/// One row of the state matrix held as four lanes.
///
/// Every quarter round in a column or diagonal round touches a different
/// quarter of the state, so all four can run at once if the state is held
/// row-wise and the arithmetic is done lane by lane. The lane-wise loops are
/// simple enough for the compiler to lower to 128-bit vector instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct U32x4([u32; 4]);

impl U32x4 {
    #[inline(always)]
    fn wrapping_add(self, rhs: Self) -> Self {
        let mut result = [0u32; 4];
        (0..4).for_each(|i| result[i] = self.0[i].wrapping_add(rhs.0[i]));
        U32x4(result)
    }

    /// Rotate every lane left by `N` bits.
    ///
    /// Written as a shift pair since that is all vector units offer.
    #[inline(always)]
    fn rotate_bits_left<const N: u32>(self) -> Self {
        let mut result = [0u32; 4];
        (0..4).for_each(|i| result[i] = (self.0[i] << N) | (self.0[i] >> (32 - N)));
        U32x4(result)
    }

    /// Cycle the lanes `N` positions to the left.
    #[inline(always)]
    fn rotate_lanes_left<const N: usize>(self) -> Self {
        U32x4([
            self.0[N % 4],
            self.0[(N + 1) % 4],
            self.0[(N + 2) % 4],
            self.0[(N + 3) % 4],
        ])
    }
}

impl BitXor for U32x4 {
    type Output = Self;

    #[inline(always)]
    fn bitxor(self, rhs: Self) -> Self {
        let mut result = [0u32; 4];
        (0..4).for_each(|i| result[i] = self.0[i] ^ rhs.0[i]);
        U32x4(result)
    }
}

/// Four quarter rounds at once, lane `i` of each row forms one quarter round.
#[inline(always)]
fn quarter_round([a, b, c, d]: [U32x4; 4]) -> [U32x4; 4] {
    let a = a.wrapping_add(b);
    let d = (d ^ a).rotate_bits_left::<16>();

    let c = c.wrapping_add(d);
    let b = (b ^ c).rotate_bits_left::<12>();

    let a = a.wrapping_add(b);
    let d = (d ^ a).rotate_bits_left::<8>();

    let c = c.wrapping_add(d);
    let b = (b ^ c).rotate_bits_left::<7>();

    [a, b, c, d]
}

/// A column round followed by a diagonal round.
///
/// Columns are `[0,4,8,12]`, `[1,5,9,13]`, `[2,6,10,14]`, `[3,7,11,15]`, which line
/// up with the lanes as is. Diagonals are `[0,5,10,15]`, `[1,6,11,12]`, `[2,7,8,13]`,
/// `[3,4,9,14]`. Shifting row `r` left by `r` lanes turns the diagonals into
/// columns, and shifting by `4 - r` afterwards puts the words back.
#[inline(always)]
fn double_round(rows: [U32x4; 4]) -> [U32x4; 4] {
    let [a, b, c, d] = quarter_round(rows);

    let [a, b, c, d] = quarter_round([
        a,
        b.rotate_lanes_left::<1>(),
        c.rotate_lanes_left::<2>(),
        d.rotate_lanes_left::<3>(),
    ]);

    [
        a,
        b.rotate_lanes_left::<3>(),
        c.rotate_lanes_left::<2>(),
        d.rotate_lanes_left::<1>(),
    ]
}

/// Run the ChaCha20 block function over a state.
///
/// Returns the 20-round permutation of `input` with `input` added word-wise
/// (mod 2^32). `input` itself is not modified.
pub fn block_function(input: &[u32; NUM_STATE_WORDS]) -> [u32; NUM_STATE_WORDS] {
    let mut initial = [U32x4([0; 4]); 4];
    for (row, words) in initial.iter_mut().zip(input.chunks_exact(4)) {
        row.0.copy_from_slice(words);
    }

    let mut working = initial;
    for _ in 0..DOUBLE_ROUNDS {
        working = double_round(working);
    }

    let mut output = [0u32; NUM_STATE_WORDS];
    for ((words, mixed), original) in output
        .chunks_exact_mut(4)
        .zip(working.iter())
        .zip(initial.iter())
    {
        words.copy_from_slice(&mixed.wrapping_add(*original).0);
    }
    output
}

/// The keystream block for a state, output words serialized little-endian.
pub(crate) fn keystream(input: &[u32; NUM_STATE_WORDS]) -> [u8; NUM_BLOCK_BYTES] {
    let mut keystream = [0u8; NUM_BLOCK_BYTES];
    for (bytes, word) in keystream
        .chunks_exact_mut(4)
        .zip(block_function(input).iter())
    {
        bytes.copy_from_slice(&word.to_le_bytes());
    }
    keystream
}
