//! Decompression of LZ-packed stage definitions.
//!
//! Packed files start with two little-endian `u32`s, the packed size
//! (header included) and the unpacked size, followed by an LZSS stream. Each
//! control byte governs the next eight tokens, least significant bit first: a
//! set bit is a literal byte, a clear bit is a two-byte back-reference into a
//! 4096-byte ring buffer.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

/// Size of the packed-file header.
pub const HEADER_SIZE: usize = 8;

const RING_SIZE: usize = 0x1000;
const RING_START: usize = 0xFEE;
const MIN_MATCH: usize = 3;
/// Upper bound on the output buffer reserved from the header's claim.
const MAX_PREALLOC: usize = 0x10_0000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LzError {
    #[error("packed data ends early at byte {position}")]
    Truncated { position: usize },
}

/// Returns true if `data` carries a packed-file header whose packed size
/// matches the buffer length.
pub fn looks_compressed(data: &[u8]) -> bool {
    let mut cursor = Cursor::new(data);
    match cursor.read_u32::<LittleEndian>() {
        Ok(packed_size) => data.len() >= HEADER_SIZE && packed_size as usize == data.len(),
        Err(_) => false,
    }
}

/// Decompresses a packed stage definition and returns the unpacked bytes.
///
/// Output stops at the size declared in the header. A packed size that
/// disagrees with the buffer length is tolerated.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, LzError> {
    let mut cursor = Cursor::new(data);
    let packed_size = read_u32(&mut cursor)?;
    let unpacked_size = read_u32(&mut cursor)? as usize;
    if packed_size as usize != data.len() {
        log::debug!(
            "packed size {packed_size:#x} does not match buffer length {:#x}",
            data.len()
        );
    }

    let mut out = Vec::with_capacity(unpacked_size.min(MAX_PREALLOC));
    let mut ring = Ring::new();
    while out.len() < unpacked_size {
        let flags = read_u8(&mut cursor)?;
        for bit in 0..8 {
            if out.len() >= unpacked_size {
                break;
            }
            if flags & (1 << bit) != 0 {
                let byte = read_u8(&mut cursor)?;
                ring.push(byte);
                out.push(byte);
            } else {
                let position = cursor.position() as usize;
                let mut pair = [0u8; 2];
                cursor
                    .read_exact(&mut pair)
                    .map_err(|_| LzError::Truncated { position })?;
                let offset = usize::from(pair[0]) | (usize::from(pair[1] & 0xF0) << 4);
                let length = usize::from(pair[1] & 0x0F) + MIN_MATCH;
                for i in 0..length {
                    if out.len() >= unpacked_size {
                        break;
                    }
                    // Reads see bytes written earlier in the same match.
                    let byte = ring.get(offset + i);
                    ring.push(byte);
                    out.push(byte);
                }
            }
        }
    }
    Ok(out)
}

struct Ring {
    bytes: [u8; RING_SIZE],
    head: usize,
}

impl Ring {
    fn new() -> Self {
        Self {
            bytes: [0; RING_SIZE],
            head: RING_START,
        }
    }

    fn get(&self, index: usize) -> u8 {
        self.bytes[index % RING_SIZE]
    }

    fn push(&mut self, byte: u8) {
        self.bytes[self.head] = byte;
        self.head = (self.head + 1) % RING_SIZE;
    }
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, LzError> {
    let position = cursor.position() as usize;
    cursor
        .read_u8()
        .map_err(|_| LzError::Truncated { position })
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, LzError> {
    let position = cursor.position() as usize;
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| LzError::Truncated { position })
}
