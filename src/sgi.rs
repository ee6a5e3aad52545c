//! SGI image decoder
//!
//! Only the layout the tank textures use is accepted: run-length encoded,
//! one byte per channel, three dimensions, 256x256 pixels, three channels.
//! Anything else is rejected with a [`DecodeError`] instead of a panic.

use std::path::Path;
use thiserror::Error;

use crate::texture::{Texture, TextureError};

pub const MAGIC: u16 = 474;
pub const SIZE: usize = 256;
pub const CHANNELS: usize = 3;

/// Byte offset of the scanline offset table
const TABLE_START: usize = 512;
const SCANLINES: usize = SIZE * CHANNELS;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("bad magic number {0}, expected {MAGIC}")]
    BadMagic(u16),
    #[error("storage format {0} is not run-length encoded")]
    NotRunLength(u8),
    #[error("{0} bytes per channel, expected 1")]
    BadBytesPerChannel(u8),
    #[error("dimension {0}, expected 3")]
    BadDimension(u16),
    #[error("image is {x}x{y}x{z}, expected 256x256x3")]
    BadSize { x: u16, y: u16, z: u16 },
    #[error("need {needed} bytes at offset {offset} but file has {len}")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("run overflows scanline {row} of channel {channel}")]
    RunOverflow { row: usize, channel: usize },
    #[error("scanline {row} of channel {channel} has no terminator")]
    Unterminated { row: usize, channel: usize },
}

/// Bounds-checked big-endian reader over the file bytes
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn bytes(&self, offset: usize, needed: usize) -> Result<&'a [u8], DecodeError> {
        offset
            .checked_add(needed)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(DecodeError::Truncated {
                offset,
                needed,
                len: self.data.len(),
            })
    }

    fn u8(&self, offset: usize) -> Result<u8, DecodeError> {
        Ok(self.bytes(offset, 1)?[0])
    }

    fn u16(&self, offset: usize) -> Result<u16, DecodeError> {
        let b = self.bytes(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&self, offset: usize) -> Result<u32, DecodeError> {
        let b = self.bytes(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Read a texture file from disk and decode it
pub fn load(path: impl AsRef<Path>) -> Result<Texture, TextureError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let texture = decode(&data).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("decoded {} ({} bytes)", path.display(), data.len());
    Ok(texture)
}

/// Decode an RLE SGI image into a 256x256 RGBA texture with opaque alpha
pub fn decode(data: &[u8]) -> Result<Texture, DecodeError> {
    let r = Reader { data };

    let magic = r.u16(0)?;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic(magic));
    }
    let storage = r.u8(2)?;
    if storage != 1 {
        return Err(DecodeError::NotRunLength(storage));
    }
    let bpc = r.u8(3)?;
    if bpc != 1 {
        return Err(DecodeError::BadBytesPerChannel(bpc));
    }
    let dimension = r.u16(4)?;
    if dimension != 3 {
        return Err(DecodeError::BadDimension(dimension));
    }
    let (x, y, z) = (r.u16(6)?, r.u16(8)?, r.u16(10)?);
    if (x as usize, y as usize, z as usize) != (SIZE, SIZE, CHANNELS) {
        return Err(DecodeError::BadSize { x, y, z });
    }

    let mut texture = Texture::new(SIZE as u32, SIZE as u32);
    for px in 0..SIZE as u32 {
        for py in 0..SIZE as u32 {
            texture.set_channel(px, py, 3, 255);
        }
    }

    let mut line = [0u8; SIZE];
    for channel in 0..CHANNELS {
        for row in 0..SIZE {
            let entry = row + SIZE * channel;
            let start = r.u32(TABLE_START + entry * 4)? as usize;
            let length = r.u32(TABLE_START + (SCANLINES + entry) * 4)? as usize;
            let packed = r.bytes(start, length)?;
            line.fill(0);
            decode_scanline(packed, &mut line, row, channel, start)?;
            for (px, &value) in line.iter().enumerate() {
                texture.set_channel(px as u32, row as u32, channel, value);
            }
        }
    }

    Ok(texture)
}

/// Expand one packed scanline into `out`. `base` is the file offset of
/// `packed`, used to report truncation at the right place.
fn decode_scanline(
    packed: &[u8],
    out: &mut [u8; SIZE],
    row: usize,
    channel: usize,
    base: usize,
) -> Result<(), DecodeError> {
    let mut src = 0;
    let mut dst = 0;
    loop {
        let Some(&control) = packed.get(src) else {
            return Err(DecodeError::Unterminated { row, channel });
        };
        src += 1;
        let count = (control & 0x7f) as usize;
        if count == 0 {
            return Ok(());
        }
        if dst + count > SIZE {
            return Err(DecodeError::RunOverflow { row, channel });
        }
        if control & 0x80 != 0 {
            let run = packed.get(src..src + count).ok_or(DecodeError::Truncated {
                offset: base + src,
                needed: count,
                len: base + packed.len(),
            })?;
            out[dst..dst + count].copy_from_slice(run);
            src += count;
        } else {
            let Some(&value) = packed.get(src) else {
                return Err(DecodeError::Truncated {
                    offset: base + src,
                    needed: 1,
                    len: base + packed.len(),
                });
            };
            src += 1;
            out[dst..dst + count].fill(value);
        }
        dst += count;
    }
}
