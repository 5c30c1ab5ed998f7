//! Bitstream writer for JPEG entropy coding.
//!
//! This module provides bit-level output with:
//! - MSB-first packing of variable-length codes
//! - Automatic 0xFF byte stuffing (0xFF -> 0xFF 0x00)
//! - Byte-aligned flushing with 1-bit padding at segment end
//!
//! Only entropy-coded data goes through this writer. Marker segments are
//! written by [`crate::marker::MarkerWriter`] and are never stuffed.

use std::io::{self, Write};

/// Bitstream writer for one entropy-coded segment.
///
/// Fewer than 8 bits are pending between calls; every completed byte is
/// committed to the output immediately.
pub struct BitWriter<W: Write> {
    /// Output destination
    output: W,
    /// Pending bits, right-aligned
    acc: u32,
    /// Number of pending bits (0-7 between calls)
    nbits: u8,
    /// Set by `flush_to_byte`, cleared by `begin_segment`
    sealed: bool,
    /// Total bytes written, stuffing included
    bytes_written: usize,
}

impl<W: Write> BitWriter<W> {
    /// Create a new bitstream writer.
    pub fn new(output: W) -> Self {
        Self {
            output,
            acc: 0,
            nbits: 0,
            sealed: false,
            bytes_written: 0,
        }
    }

    /// Append `length` bits of `value`, most significant first.
    ///
    /// # Arguments
    /// * `value` - The bits to write (right-aligned)
    /// * `length` - Number of bits to write (0-16)
    ///
    /// # Errors
    /// Fails if the segment was already flushed, or if the output fails.
    #[inline]
    pub fn write_bits(&mut self, value: u32, length: u8) -> io::Result<()> {
        debug_assert!(length <= 16, "length must be <= 16 bits");
        debug_assert!(value < (1u32 << length), "value exceeds length bits");
        if self.sealed {
            return Err(io::Error::other("bits written after segment flush"));
        }
        if length == 0 {
            return Ok(());
        }

        self.acc = (self.acc << length) | (value & ((1u32 << length) - 1));
        self.nbits += length;

        while self.nbits >= 8 {
            self.nbits -= 8;
            let byte = (self.acc >> self.nbits) as u8;
            self.emit_byte_stuffed(byte)?;
        }
        self.acc &= (1u32 << self.nbits) - 1;

        Ok(())
    }

    /// Emit a single byte with 0xFF stuffing.
    #[inline]
    fn emit_byte_stuffed(&mut self, byte: u8) -> io::Result<()> {
        if byte == 0xFF {
            self.output.write_all(&[0xFF, 0x00])?;
            self.bytes_written += 2;
        } else {
            self.output.write_all(&[byte])?;
            self.bytes_written += 1;
        }
        Ok(())
    }

    /// Pad the pending bits with 1-bits to the next byte boundary and commit.
    ///
    /// The padding byte is stuffed like any other. After this call no more
    /// bits are accepted until [`begin_segment`](Self::begin_segment).
    pub fn flush_to_byte(&mut self) -> io::Result<()> {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.write_bits((1u32 << pad) - 1, pad)?;
        }
        debug_assert_eq!(self.nbits, 0);
        self.sealed = true;
        Ok(())
    }

    /// Start a new entropy-coded segment after a flush.
    pub fn begin_segment(&mut self) {
        self.acc = 0;
        self.nbits = 0;
        self.sealed = false;
    }

    /// Number of bits waiting for a complete byte.
    pub fn pending_bits(&self) -> u8 {
        self.nbits
    }

    /// Get the number of bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Consume the writer and return the underlying output.
    pub fn into_inner(self) -> W {
        self.output
    }
}

/// An in-memory bitstream.
pub type VecBitWriter = BitWriter<Vec<u8>>;

impl VecBitWriter {
    /// Create a new bitstream writer backed by a Vec.
    pub fn new_vec() -> Self {
        Self::new(Vec::new())
    }

    /// Get the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_bits() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0b10101010, 8).unwrap();
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.into_bytes(), vec![0b10101010]);
    }

    #[test]
    fn test_multiple_small_writes() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0b11, 2).unwrap();
        writer.write_bits(0b00, 2).unwrap();
        writer.write_bits(0b1111, 4).unwrap();
        assert_eq!(writer.pending_bits(), 0);
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.into_bytes(), vec![0b11001111]);
    }

    #[test]
    fn test_cross_byte_boundary() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0b111100001111, 12).unwrap();
        assert_eq!(writer.pending_bits(), 4);
        writer.flush_to_byte().unwrap();
        // 11110000 1111 + 1111 padding = 0xF0 0xFF, and 0xFF is stuffed
        assert_eq!(writer.into_bytes(), vec![0xF0, 0xFF, 0x00]);
    }

    #[test]
    fn test_byte_stuffing() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0xFF, 8).unwrap();
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.into_bytes(), vec![0xFF, 0x00]);
    }

    #[test]
    fn test_byte_stuffing_unaligned() {
        let mut writer = VecBitWriter::new_vec();
        // 0 + 11111111 + 1111111 = 0x7F 0xFF
        writer.write_bits(0, 1).unwrap();
        writer.write_bits(0xFF, 8).unwrap();
        writer.write_bits(0b1111111, 7).unwrap();
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.into_bytes(), vec![0x7F, 0xFF, 0x00]);
    }

    #[test]
    fn test_no_stuffing_for_non_ff() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0xFE, 8).unwrap();
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.into_bytes(), vec![0xFE]);
    }

    #[test]
    fn test_padding_with_ones() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0b10101, 5).unwrap();
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.into_bytes(), vec![0b10101111]);
    }

    #[test]
    fn test_flush_when_aligned_adds_nothing() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0xAB, 8).unwrap();
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.bytes_written(), 1);
    }

    #[test]
    fn test_large_write() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0xABCD, 16).unwrap();
        writer.flush_to_byte().unwrap();
        assert_eq!(writer.into_bytes(), vec![0xAB, 0xCD]);
    }

    #[test]
    fn test_huffman_like_codes() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0b100, 3).unwrap();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b1010, 4).unwrap();
        writer.flush_to_byte().unwrap();
        // 100 101 1010 + 111111 padding
        assert_eq!(writer.into_bytes(), vec![0b10010110, 0b10111111]);
    }

    #[test]
    fn test_write_after_flush_rejected() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(1, 1).unwrap();
        writer.flush_to_byte().unwrap();
        assert!(writer.write_bits(1, 1).is_err());

        writer.begin_segment();
        writer.write_bits(0, 8).unwrap();
        assert_eq!(writer.into_bytes(), vec![0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_bytes_written_count() {
        let mut writer = VecBitWriter::new_vec();
        writer.write_bits(0xFF, 8).unwrap();
        writer.write_bits(0x12, 8).unwrap();
        assert_eq!(writer.bytes_written(), 3);
    }

    proptest! {
        #[test]
        fn prop_every_ff_is_followed_by_zero(
            codes in proptest::collection::vec((0u32..65536, 1u8..=16), 0..200)
        ) {
            let mut writer = VecBitWriter::new_vec();
            let mut total_bits = 0usize;
            for &(value, len) in &codes {
                let value = value & ((1u32 << len) - 1);
                writer.write_bits(value, len).unwrap();
                total_bits += len as usize;
            }
            writer.flush_to_byte().unwrap();
            let bytes = writer.into_bytes();

            let mut i = 0;
            let mut payload = 0usize;
            while i < bytes.len() {
                if bytes[i] == 0xFF {
                    prop_assert_eq!(bytes.get(i + 1), Some(&0x00));
                    i += 2;
                } else {
                    i += 1;
                }
                payload += 1;
            }
            prop_assert_eq!(payload, total_bits.div_ceil(8));
        }
    }
}
