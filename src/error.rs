//! Error types for the JFIF encoder.

use std::fmt;

/// Result type for encoder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for encoder operations.
///
/// Every variant is fatal for the encode that produced it. Nothing reaches
/// the output sink once an error has been returned.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid image dimensions (zero, or larger than a JPEG frame can describe)
    InvalidDimensions {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },
    /// The sample source reports a channel depth the color transform cannot handle
    UnsupportedSampleDepth(u16),
    /// A Huffman code length could not be limited to 16 bits
    TableOverflow,
    /// The output sink rejected a write
    SinkWriteFailure(String),
    /// Image buffer size doesn't match dimensions
    BufferSizeMismatch {
        /// Expected buffer size in bytes
        expected: usize,
        /// Actual buffer size in bytes
        actual: usize,
    },
    /// Invalid quality value (must be 1-100)
    InvalidQuality(u8),
    /// Invalid Huffman table structure
    InvalidHuffmanTable,
    /// A symbol has no code in the selected Huffman table
    MissingHuffmanCode {
        /// The Huffman symbol (category, or run/size byte)
        symbol: u8,
    },
    /// Malformed or unsupported bitmap input
    InvalidBitmap(&'static str),
    /// I/O error while reading input
    IoError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {}x{}", width, height)
            }
            Error::UnsupportedSampleDepth(bits) => {
                write!(f, "Unsupported sample depth: {} bits", bits)
            }
            Error::TableOverflow => {
                write!(f, "Huffman code length overflow (exceeds 16 bits)")
            }
            Error::SinkWriteFailure(msg) => {
                write!(f, "Output sink write failed: {}", msg)
            }
            Error::BufferSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Buffer size mismatch: expected {}, got {}",
                    expected, actual
                )
            }
            Error::InvalidQuality(q) => {
                write!(f, "Invalid quality value: {} (must be 1-100)", q)
            }
            Error::InvalidHuffmanTable => {
                write!(f, "Invalid Huffman table structure")
            }
            Error::MissingHuffmanCode { symbol } => {
                write!(f, "No Huffman code for symbol 0x{:02X}", symbol)
            }
            Error::InvalidBitmap(reason) => {
                write!(f, "Invalid bitmap: {}", reason)
            }
            Error::IoError(msg) => {
                write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}
