// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helper functions for streaming data through the ChaCha20 keystream.
//!
//! Input is read in chunks of whole 64-byte blocks. The cipher drops the unused
//! tail of a partially consumed block, so every chunk but the last has to be
//! completely filled before it is processed to keep the output identical to a
//! one-shot pass over the whole input.

use std::fmt;

use chacha::{ChaCha20, NUM_BLOCK_BYTES};
use hex::prelude::*;
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default number of blocks per chunk, 64KiB.
pub const DEFAULT_CHUNK_BLOCKS: usize = 1024;

/// An error occured setting up the cipher or while streaming.
#[derive(Debug)]
pub enum Error {
    /// Key or nonce is not valid hex.
    Hex(hex::HexToBytesError),
    /// Key or nonce has the wrong length.
    Cipher(chacha::Error),
    /// Chunk size is zero blocks or too large to allocate.
    ChunkSize(usize),
    /// Reading the input or writing the output failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Hex(e) => write!(f, "unable to decode hex {}", e),
            Error::Cipher(e) => write!(f, "cipher setup error {}", e),
            Error::ChunkSize(blocks) => write!(f, "invalid chunk size of {} blocks", blocks),
            Error::Io(e) => write!(f, "io {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Hex(e) => Some(e),
            Error::Cipher(e) => Some(e),
            Error::ChunkSize(_) => None,
            Error::Io(e) => Some(e),
        }
    }
}

impl From<hex::HexToBytesError> for Error {
    fn from(e: hex::HexToBytesError) -> Self {
        Error::Hex(e)
    }
}

impl From<chacha::Error> for Error {
    fn from(e: chacha::Error) -> Self {
        Error::Cipher(e)
    }
}

// Convert IO errors.
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Build a cipher from hex encoded key and nonce strings.
pub fn parse_cipher(key: &str, nonce: &str, counter: u32) -> Result<ChaCha20, Error> {
    let key = Vec::from_hex(key.trim())?;
    let nonce = Vec::from_hex(nonce.trim())?;
    Ok(ChaCha20::new(&key, &nonce, counter)?)
}

/// Read until `buffer` is full or the input is exhausted, returns the bytes read.
async fn fill_chunk<R: AsyncRead + Unpin>(
    input: &mut R,
    buffer: &mut [u8],
) -> Result<usize, Error> {
    let mut filled = 0;
    while filled < buffer.len() {
        let read = input.read(&mut buffer[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

/// Apply the keystream to everything read from `input` and write it to `output`.
///
/// Returns the total number of bytes processed. The output is flushed before returning.
pub async fn xor_stream<R, W>(
    cipher: &mut ChaCha20,
    input: &mut R,
    output: &mut W,
    chunk_blocks: usize,
) -> Result<u64, Error>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let chunk_len = match chunk_blocks.checked_mul(NUM_BLOCK_BYTES) {
        Some(len) if len > 0 => len,
        _ => return Err(Error::ChunkSize(chunk_blocks)),
    };

    let mut buffer = vec![0u8; chunk_len];
    let mut total: u64 = 0;
    loop {
        let filled = fill_chunk(input, &mut buffer).await?;
        if filled == 0 {
            break;
        }

        cipher.apply_keystream(&mut buffer[..filled]);
        output.write_all(&buffer[..filled]).await?;
        total += filled as u64;
        debug!(
            "Processed {} byte chunk, next block is {}.",
            filled,
            cipher.counter()
        );

        // A short chunk means the input ran dry.
        if filled < chunk_len {
            break;
        }
    }
    output.flush().await?;

    Ok(total)
}
