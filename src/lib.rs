//! # jfif-encoder
//!
//! Pure Rust baseline JPEG encoder producing JFIF files.
//!
//! The encoder implements the sequential DCT-based process of ITU-T T.81 with
//! Huffman coding:
//!
//! - **Color transform** - RGB to YCbCr (or a single luminance plane)
//! - **4:2:0 chroma subsampling** - optional, 16x16 MCUs
//! - **Quality scaling** - IJG-style scaling of the Annex K quantization tables
//! - **Huffman optimization** - 2-pass encoding with length-limited optimal tables
//!
//! ## Quick Start
//!
//! The [`Encoder`] struct is the main entry point for encoding images:
//!
//! ```no_run
//! use jfif_encoder::Encoder;
//!
//! # fn main() -> Result<(), jfif_encoder::Error> {
//! // RGB pixel data (3 bytes per pixel, row-major order)
//! let rgb_pixels: Vec<u8> = vec![0; 640 * 480 * 3];
//!
//! // Default: quality 50, optimized Huffman tables, 4:4:4
//! let jpeg_data = Encoder::new().encode_rgb(&rgb_pixels, 640, 480)?;
//!
//! // Higher quality with the standard Huffman tables
//! let jpeg_data = Encoder::new()
//!     .quality(90)
//!     .huffman_mode(jfif_encoder::HuffmanMode::Standard)
//!     .encode_rgb(&rgb_pixels, 640, 480)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Quality
//!
//! [`Encoder::quality`] clamps out-of-range values, so `quality(0)` encodes at
//! 1 and `quality(150)` at 100. Use [`Encoder::try_quality`] to reject them
//! with [`Error::InvalidQuality`] instead:
//!
//! ```
//! use jfif_encoder::{Encoder, Error};
//!
//! assert_eq!(Encoder::new().quality(150).get_quality(), 100);
//! assert_eq!(
//!     Encoder::new().try_quality(150).unwrap_err(),
//!     Error::InvalidQuality(150)
//! );
//! ```
//!
//! ## Custom Sample Sources
//!
//! Anything that can answer "what is channel C at (row, col)" can be encoded
//! by implementing [`SampleSource`]:
//!
//! ```no_run
//! use jfif_encoder::{Channel, Encoder, SampleSource};
//!
//! struct Checkerboard;
//!
//! impl SampleSource for Checkerboard {
//!     fn width(&self) -> u32 { 64 }
//!     fn height(&self) -> u32 { 64 }
//!     fn sample(&self, row: u32, col: u32, _channel: Channel) -> u8 {
//!         if (row / 8 + col / 8) % 2 == 0 { 255 } else { 0 }
//!     }
//! }
//!
//! # fn main() -> Result<(), jfif_encoder::Error> {
//! let jpeg = Encoder::new().grayscale(true).encode(&Checkerboard)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing to a File or Stream
//!
//! ```no_run
//! use jfif_encoder::{BmpImage, Encoder, PixelDensity};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = BmpImage::open("input.bmp")?;
//! let file = File::create("output.jpg")?;
//!
//! Encoder::new()
//!     .quality(85)
//!     .pixel_density(PixelDensity::dpi(300, 300))
//!     .encode_to_writer(&image, file)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

// ============================================================================
// Internal modules - hidden from public docs but accessible for tests
// ============================================================================
// These modules contain the individual pipeline stages. They are exposed
// for testing and benchmarks but are not part of the stable API.

/// Bitstream writing with byte stuffing (internal).
#[doc(hidden)]
pub mod bitstream;

/// Color conversion and plane construction (internal).
#[doc(hidden)]
pub mod color;

/// JPEG constants and standard tables (internal).
#[doc(hidden)]
pub mod consts;

/// Forward DCT (internal).
#[doc(hidden)]
pub mod dct;

/// Symbol generation and entropy encoding (internal).
#[doc(hidden)]
pub mod entropy;

/// Huffman table construction (internal).
#[doc(hidden)]
pub mod huffman;

/// JPEG marker writing (internal).
#[doc(hidden)]
pub mod marker;

/// Quantization (internal).
#[doc(hidden)]
pub mod quant;

/// Sample planes, block partitioning and downsampling (internal).
#[doc(hidden)]
pub mod sample;

/// Type definitions (internal).
#[doc(hidden)]
pub mod types;

/// Zig-zag reordering (internal).
#[doc(hidden)]
pub mod zigzag;

mod bmp;
mod encode;
mod error;
mod source;

// ============================================================================
// Public API
// ============================================================================

/// The baseline JPEG encoder.
///
/// Use the builder pattern to configure encoding options, then call
/// [`encode()`](Encoder::encode), [`encode_rgb()`](Encoder::encode_rgb) or
/// [`encode_gray()`](Encoder::encode_gray) to produce JPEG data.
///
/// # Example
///
/// ```no_run
/// use jfif_encoder::{Encoder, Subsampling};
///
/// # fn main() -> Result<(), jfif_encoder::Error> {
/// let pixels: Vec<u8> = vec![0; 640 * 480 * 3];
///
/// let jpeg = Encoder::new()
///     .quality(85)
///     .subsampling(Subsampling::S420)
///     .encode_rgb(&pixels, 640, 480)?;
/// # Ok(())
/// # }
/// ```
pub use encode::Encoder;

/// Largest width or height a baseline frame can carry.
pub use encode::MAX_DIMENSION;

/// Error type for encoding operations.
///
/// # Example
///
/// ```no_run
/// use jfif_encoder::{Encoder, Error};
///
/// # fn example() {
/// let result = Encoder::new().encode_rgb(&[], 0, 0);
/// match result {
///     Ok(data) => println!("Encoded {} bytes", data.len()),
///     Err(Error::InvalidDimensions { width, height }) => {
///         eprintln!("Invalid dimensions: {}x{}", width, height);
///     }
///     Err(e) => eprintln!("Encoding failed: {}", e),
/// }
/// # }
/// ```
pub use error::Error;

/// Result type alias for encoding operations.
///
/// Equivalent to `std::result::Result<T, jfif_encoder::Error>`.
pub use error::Result;

/// Read access to the pixels being encoded.
pub use source::SampleSource;

/// Borrowed interleaved RGB and grayscale buffers.
pub use source::{GrayImage, RgbImage};

/// An image decoded from a Windows bitmap file.
pub use bmp::BmpImage;

/// Input channel selector used by [`SampleSource`].
pub use types::Channel;

/// Chroma subsampling mode.
///
/// | Mode | Ratio | Description |
/// |------|-------|-------------|
/// | [`S444`](Subsampling::S444) | 4:4:4 | No subsampling (highest quality) |
/// | [`S420`](Subsampling::S420) | 4:2:0 | Both directions (most common) |
pub use types::Subsampling;

/// Where the Huffman tables come from.
///
/// [`Optimized`](HuffmanMode::Optimized) tables are built from the image's
/// own symbol statistics and are usually smaller than the
/// [`Standard`](HuffmanMode::Standard) Annex K tables.
pub use types::HuffmanMode;

/// Pixel density for JFIF metadata.
///
/// # Example
///
/// ```no_run
/// use jfif_encoder::{Encoder, PixelDensity};
///
/// # fn main() -> Result<(), jfif_encoder::Error> {
/// # let pixels: Vec<u8> = vec![0; 100 * 100 * 3];
/// // 300 DPI for print
/// let jpeg = Encoder::new()
///     .pixel_density(PixelDensity::dpi(300, 300))
///     .encode_rgb(&pixels, 100, 100)?;
///
/// // 2:1 pixel aspect ratio
/// let jpeg = Encoder::new()
///     .pixel_density(PixelDensity::aspect_ratio(2, 1))
///     .encode_rgb(&pixels, 100, 100)?;
/// # Ok(())
/// # }
/// ```
pub use types::PixelDensity;

/// Pixel density unit for JFIF metadata.
pub use types::DensityUnit;
