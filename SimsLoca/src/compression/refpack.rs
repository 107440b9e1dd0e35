//! RefPack (QFS) decompression for package resources
//!
//! RefPack is an LZ77-style byte codec. A stream starts with a flags byte,
//! the `0xFB` signature and a big-endian decompressed size (3 bytes, or 4
//! when bit 7 of the flags is set), followed by opcodes. Each opcode emits
//! some literal bytes from the input and then copies bytes from earlier in
//! the output:
//!
//! | Class | First byte    | Length | Literals | Copy length | Copy distance |
//! |-------|---------------|--------|----------|-------------|---------------|
//! | A     | `0x00..=0x7F` | 2      | 0-3      | 3-10        | 0-1023        |
//! | B     | `0x80..=0xBF` | 3      | 0-3      | 4-67        | 0-16383       |
//! | C     | `0xC0..=0xDF` | 4      | 0-3      | 5-1028      | 0-131071      |
//! | D     | `0xE0..=0xFB` | 1      | 4-112    | -           | -             |
//! | E     | `0xFC..=0xFF` | 1      | 0-3      | -           | - (terminal)  |
//!
//! Only decoding is supported.

use crate::error::{Error, Result};

/// Signature byte found at offset 1 of every RefPack stream
pub const REFPACK_SIGNATURE: u8 = 0xFB;

/// Flags bit selecting a 4-byte decompressed size
const LARGE_SIZE_FLAG: u8 = 0x80;

/// One decoded opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Opcode {
    literals: usize,
    copy_len: usize,
    /// Raw distance; the copy source is `distance + 1` bytes behind the cursor
    distance: usize,
    terminal: bool,
}

/// Input cursor with bounds-checked byte reads
struct Input<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Input<'a> {
    fn byte(&mut self) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or(Error::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(Error::UnexpectedEof)?;
        let slice = self.data.get(self.pos..end).ok_or(Error::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

/// Decompress a RefPack stream.
///
/// # Errors
/// Returns [`Error::InvalidRefPackSignature`] if byte 1 is not `0xFB`,
/// [`Error::UnexpectedEof`] if the stream is cut short,
/// [`Error::RefPackOverflow`] if an opcode writes past the declared size and
/// [`Error::RefPackBadReference`] if a copy reaches before the output start.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() < 2 {
        return Err(Error::TooShort {
            expected: 2,
            actual: input.len(),
        });
    }
    if input[1] != REFPACK_SIGNATURE {
        return Err(Error::InvalidRefPackSignature(input[1]));
    }

    let flags = input[0];
    let mut src = Input { data: input, pos: 2 };

    let size_bytes = if flags & LARGE_SIZE_FLAG != 0 { 4 } else { 3 };
    let size = src
        .take(size_bytes)?
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));

    let mut out = vec![0u8; size];
    let mut cursor = 0usize;

    while src.remaining() > 0 {
        let op = read_opcode(&mut src)?;

        if op.literals > 0 {
            let literals = src.take(op.literals)?;
            let end = cursor + op.literals;
            if end > size {
                return Err(Error::RefPackOverflow { needed: end, size });
            }
            out[cursor..end].copy_from_slice(literals);
            cursor = end;
        }

        if op.copy_len > 0 {
            let back = op.distance + 1;
            if back > cursor {
                return Err(Error::RefPackBadReference {
                    distance: back,
                    position: cursor,
                });
            }
            let end = cursor + op.copy_len;
            if end > size {
                return Err(Error::RefPackOverflow { needed: end, size });
            }
            // Byte at a time: the source may overlap bytes written by this copy
            for _ in 0..op.copy_len {
                out[cursor] = out[cursor - back];
                cursor += 1;
            }
        }

        if op.terminal {
            break;
        }
    }

    if cursor < size {
        tracing::warn!(
            "RefPack stream ended after {} of {} bytes",
            cursor,
            size
        );
        out.truncate(cursor);
    }

    Ok(out)
}

fn read_opcode(src: &mut Input<'_>) -> Result<Opcode> {
    let b0 = src.byte()?;
    let op = match b0 {
        0x00..=0x7F => {
            let b1 = usize::from(src.byte()?);
            let b0 = usize::from(b0);
            Opcode {
                literals: b0 & 0x03,
                copy_len: ((b0 & 0x1C) >> 2) + 3,
                distance: ((b0 & 0x60) << 3) | b1,
                terminal: false,
            }
        }
        0x80..=0xBF => {
            let b1 = usize::from(src.byte()?);
            let b2 = usize::from(src.byte()?);
            Opcode {
                literals: (b1 & 0xC0) >> 6,
                copy_len: (usize::from(b0) & 0x3F) + 4,
                distance: ((b1 & 0x3F) << 8) | b2,
                terminal: false,
            }
        }
        0xC0..=0xDF => {
            let b1 = usize::from(src.byte()?);
            let b2 = usize::from(src.byte()?);
            let b3 = usize::from(src.byte()?);
            let b0 = usize::from(b0);
            Opcode {
                literals: b0 & 0x03,
                copy_len: ((b0 & 0x0C) << 6) + b3 + 5,
                distance: ((b0 & 0x10) << 12) | (b1 << 8) | b2,
                terminal: false,
            }
        }
        0xE0..=0xFB => Opcode {
            literals: ((usize::from(b0) & 0x1F) << 2) + 4,
            copy_len: 0,
            distance: 0,
            terminal: false,
        },
        0xFC..=0xFF => Opcode {
            literals: usize::from(b0) & 0x03,
            copy_len: 0,
            distance: 0,
            terminal: true,
        },
    };
    Ok(op)
}
