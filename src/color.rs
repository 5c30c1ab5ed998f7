//! Color space conversion routines.
//!
//! RGB to YCbCr conversion following CCIR 601-1 as used by JFIF:
//! ```text
//! Y  =  0.299  * R + 0.587  * G + 0.114  * B
//! Cb = -0.1687 * R - 0.3313 * G + 0.5    * B + 128
//! Cr =  0.5    * R - 0.4187 * G - 0.0813 * B + 128
//! ```
//! Results are rounded half away from zero and clamped to 0..=255. The clamp
//! matters: saturated reds and blues land at 255.5 before rounding.

use crate::sample::Plane;
use crate::source::SampleSource;

/// Round half away from zero, then clamp to the 8-bit range.
#[inline]
fn to_sample(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert a single RGB pixel to YCbCr.
///
/// # Returns
/// Tuple of (Y, Cb, Cr) values, each in range 0-255
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r = r as f32;
    let g = g as f32;
    let b = b as f32;

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.1687 * r - 0.3313 * g + 0.5 * b + 128.0;
    let cr = 0.5 * r - 0.4187 * g - 0.0813 * b + 128.0;

    (to_sample(y), to_sample(cb), to_sample(cr))
}

/// Convert a single RGB pixel to its luminance.
#[inline]
pub fn rgb_to_gray(r: u8, g: u8, b: u8) -> u8 {
    to_sample(0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
}

/// Reads the whole source into Y, Cb and Cr planes.
pub fn ycbcr_planes<S: SampleSource + ?Sized>(source: &S) -> [Plane; 3] {
    let width = source.width() as usize;
    let height = source.height() as usize;
    let mut y_out = vec![0u8; width * height];
    let mut cb_out = vec![0u8; width * height];
    let mut cr_out = vec![0u8; width * height];

    let mut i = 0;
    for row in 0..source.height() {
        for col in 0..source.width() {
            let (r, g, b) = source.rgb(row, col);
            let (y, cb, cr) = rgb_to_ycbcr(r, g, b);
            y_out[i] = y;
            cb_out[i] = cb;
            cr_out[i] = cr;
            i += 1;
        }
    }

    [
        Plane::new(width, height, y_out),
        Plane::new(width, height, cb_out),
        Plane::new(width, height, cr_out),
    ]
}

/// Reads the source into a single luminance plane.
pub fn luma_plane<S: SampleSource + ?Sized>(source: &S) -> Plane {
    let width = source.width() as usize;
    let height = source.height() as usize;
    let mut out = Vec::with_capacity(width * height);
    for row in 0..source.height() {
        for col in 0..source.width() {
            let (r, g, b) = source.rgb(row, col);
            out.push(rgb_to_gray(r, g, b));
        }
    }
    Plane::new(width, height, out)
}
