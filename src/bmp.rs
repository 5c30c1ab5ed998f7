//! Windows bitmap input.
//!
//! Uncompressed 8-bit palettized, 24-bit BGR and 32-bit BGRX bitmaps are
//! decoded into a top-down RGB buffer that implements [`SampleSource`].

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::SampleSource;
use crate::types::Channel;

/// Size of the BITMAPFILEHEADER.
const FILE_HEADER_SIZE: usize = 14;
/// Smallest info header we read fields from (BITMAPINFOHEADER).
const INFO_HEADER_MIN_SIZE: u32 = 40;

const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;

/// Channel masks of a 32-bit BGRX pixel.
const STANDARD_MASKS: [u32; 3] = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF];

/// An RGB image read from a BMP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpImage {
    width: u32,
    height: u32,
    /// Top-down interleaved RGB
    rgb: Vec<u8>,
}

/// Fields of the file and info headers the decoder needs.
#[derive(Debug)]
struct BmpHeader {
    data_offset: u32,
    info_size: u32,
    width: i32,
    height: i32,
    bits_per_pixel: u16,
    compression: u32,
    colors_used: u32,
}

fn truncated(_: std::io::Error) -> Error {
    Error::InvalidBitmap("truncated header")
}

impl BmpHeader {
    fn parse(bytes: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(bytes);
        let mut signature = [0u8; 2];
        r.read_exact(&mut signature).map_err(truncated)?;
        if &signature != b"BM" {
            return Err(Error::InvalidBitmap("missing BM signature"));
        }

        // File size and reserved fields are unreliable in the wild
        r.set_position(10);
        let data_offset = r.read_u32::<LittleEndian>().map_err(truncated)?;
        let info_size = r.read_u32::<LittleEndian>().map_err(truncated)?;
        if info_size < INFO_HEADER_MIN_SIZE {
            return Err(Error::InvalidBitmap("unsupported info header"));
        }
        let width = r.read_i32::<LittleEndian>().map_err(truncated)?;
        let height = r.read_i32::<LittleEndian>().map_err(truncated)?;
        let _planes = r.read_u16::<LittleEndian>().map_err(truncated)?;
        let bits_per_pixel = r.read_u16::<LittleEndian>().map_err(truncated)?;
        let compression = r.read_u32::<LittleEndian>().map_err(truncated)?;

        r.set_position(46);
        let colors_used = r.read_u32::<LittleEndian>().map_err(truncated)?;

        Ok(Self {
            data_offset,
            info_size,
            width,
            height,
            bits_per_pixel,
            compression,
            colors_used,
        })
    }

    /// Check compression against the pixel depth.
    fn check_compression(&self, bytes: &[u8]) -> Result<()> {
        match (self.compression, self.bits_per_pixel) {
            (BI_RGB, _) => Ok(()),
            (BI_BITFIELDS, 32) => {
                // Masks follow the 40-byte header, or sit at the same offset in V4/V5
                let mut r = Cursor::new(bytes);
                r.set_position((FILE_HEADER_SIZE as u32 + INFO_HEADER_MIN_SIZE) as u64);
                let mut masks = [0u32; 3];
                for mask in &mut masks {
                    *mask = r.read_u32::<LittleEndian>().map_err(truncated)?;
                }
                if masks == STANDARD_MASKS {
                    Ok(())
                } else {
                    Err(Error::InvalidBitmap("non-standard channel masks"))
                }
            }
            _ => Err(Error::InvalidBitmap("compressed bitmaps are not supported")),
        }
    }
}

impl BmpImage {
    /// Read and decode a BMP file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Decode a BMP file held in memory.
    ///
    /// # Errors
    /// - [`Error::InvalidBitmap`] for malformed or compressed files
    /// - [`Error::InvalidDimensions`] for a zero width or height
    /// - [`Error::UnsupportedSampleDepth`] for depths other than 8, 24 and 32
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = BmpHeader::parse(bytes)?;

        if header.width < 0 {
            return Err(Error::InvalidBitmap("negative width"));
        }
        let width = header.width as u32;
        let top_down = header.height < 0;
        let height = header.height.unsigned_abs();
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if !matches!(header.bits_per_pixel, 8 | 24 | 32) {
            return Err(Error::UnsupportedSampleDepth(header.bits_per_pixel));
        }
        header.check_compression(bytes)?;

        let palette = if header.bits_per_pixel == 8 {
            read_palette(bytes, &header)?
        } else {
            Vec::new()
        };

        let bytes_per_pixel = header.bits_per_pixel as usize / 8;
        let row_bytes = (width as usize)
            .checked_mul(bytes_per_pixel)
            .map(|n| n.div_ceil(4) * 4)
            .ok_or(Error::InvalidDimensions { width, height })?;
        let data_len = row_bytes
            .checked_mul(height as usize)
            .ok_or(Error::InvalidDimensions { width, height })?;
        let start = header.data_offset as usize;
        let pixels = start
            .checked_add(data_len)
            .and_then(|end| bytes.get(start..end))
            .ok_or(Error::InvalidBitmap("pixel data truncated"))?;

        let mut rgb = vec![0u8; width as usize * height as usize * 3];
        for (file_row, row) in pixels.chunks_exact(row_bytes).enumerate() {
            let out_row = if top_down {
                file_row
            } else {
                height as usize - 1 - file_row
            };
            let out = &mut rgb[out_row * width as usize * 3..(out_row + 1) * width as usize * 3];
            let row = &row[..width as usize * bytes_per_pixel];

            if bytes_per_pixel == 1 {
                for (dst, &index) in out.chunks_exact_mut(3).zip(row) {
                    let color = palette
                        .get(index as usize)
                        .ok_or(Error::InvalidBitmap("palette index out of range"))?;
                    dst.copy_from_slice(color);
                }
            } else {
                let src = row.chunks_exact(bytes_per_pixel);
                for (dst, bgr) in out.chunks_exact_mut(3).zip(src) {
                    dst[0] = bgr[2];
                    dst[1] = bgr[1];
                    dst[2] = bgr[0];
                }
            }
        }

        debug!(
            width,
            height,
            bits = header.bits_per_pixel,
            top_down,
            "decoded bitmap"
        );
        Ok(Self { width, height, rgb })
    }

    /// Top-down interleaved RGB pixels.
    pub fn rgb_data(&self) -> &[u8] {
        &self.rgb
    }
}

/// RGB palette entries of an 8-bit bitmap (stored as BGRA quads).
fn read_palette(bytes: &[u8], header: &BmpHeader) -> Result<Vec<[u8; 3]>> {
    let count = match header.colors_used {
        0 => 256,
        n if n <= 256 => n as usize,
        _ => return Err(Error::InvalidBitmap("palette larger than 256 entries")),
    };
    let start = FILE_HEADER_SIZE + header.info_size as usize;
    let quads = bytes
        .get(start..start + count * 4)
        .ok_or(Error::InvalidBitmap("palette truncated"))?;
    Ok(quads
        .chunks_exact(4)
        .map(|q| [q[2], q[1], q[0]])
        .collect())
}

impl SampleSource for BmpImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn sample(&self, row: u32, col: u32, channel: Channel) -> u8 {
        let idx = (row as usize * self.width as usize + col as usize) * 3;
        let offset = match channel {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
        };
        self.rgb[idx + offset]
    }
}
