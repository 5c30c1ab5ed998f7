//! Pixel sources the encoder reads from.
//!
//! The encoder never owns or parses an image container. It only needs the
//! image dimensions and a per-sample accessor, expressed by [`SampleSource`].

use crate::error::{Error, Result};
use crate::types::Channel;

/// Read-only access to an RGB raster.
///
/// Rows are numbered top to bottom, columns left to right.
pub trait SampleSource {
    /// Image width in pixels.
    fn width(&self) -> u32;

    /// Image height in pixels.
    fn height(&self) -> u32;

    /// Sample value of `channel` at (`row`, `col`).
    ///
    /// Callers only pass `row < height()` and `col < width()`.
    fn sample(&self, row: u32, col: u32, channel: Channel) -> u8;

    /// Bits per channel sample. Only 8 is encodable.
    fn bits_per_sample(&self) -> u16 {
        8
    }

    /// Reads all three channels of one pixel.
    #[inline]
    fn rgb(&self, row: u32, col: u32) -> (u8, u8, u8) {
        (
            self.sample(row, col, Channel::R),
            self.sample(row, col, Channel::G),
            self.sample(row, col, Channel::B),
        )
    }
}

impl<T: SampleSource + ?Sized> SampleSource for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn sample(&self, row: u32, col: u32, channel: Channel) -> u8 {
        (**self).sample(row, col, channel)
    }

    fn bits_per_sample(&self) -> u16 {
        (**self).bits_per_sample()
    }

    fn rgb(&self, row: u32, col: u32) -> (u8, u8, u8) {
        (**self).rgb(row, col)
    }
}

fn checked_len(width: u32, height: u32, channels: usize) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(Error::InvalidDimensions { width, height })
}

/// Interleaved 8-bit RGB pixels, 3 bytes per pixel, row-major.
#[derive(Debug, Clone, Copy)]
pub struct RgbImage<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> RgbImage<'a> {
    /// Wraps an interleaved RGB buffer.
    ///
    /// # Errors
    /// [`Error::BufferSizeMismatch`] if `data` is not exactly `width * height * 3` bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = checked_len(width, height, 3)?;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }
}

impl SampleSource for RgbImage<'_> {
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
        self.data[idx + offset]
    }

    #[inline]
    fn rgb(&self, row: u32, col: u32) -> (u8, u8, u8) {
        let idx = (row as usize * self.width as usize + col as usize) * 3;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }
}

/// 8-bit grayscale pixels, 1 byte per pixel, row-major.
///
/// Every channel reads the same value, so the luminance of each pixel equals
/// its gray level.
#[derive(Debug, Clone, Copy)]
pub struct GrayImage<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> GrayImage<'a> {
    /// Wraps a grayscale buffer.
    ///
    /// # Errors
    /// [`Error::BufferSizeMismatch`] if `data` is not exactly `width * height` bytes.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = checked_len(width, height, 1)?;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }
}

impl SampleSource for GrayImage<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn sample(&self, row: u32, col: u32, _channel: Channel) -> u8 {
        self.data[row as usize * self.width as usize + col as usize]
    }
}
