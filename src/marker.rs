//! JPEG marker emission for encoding.
//!
//! This module handles writing JFIF file format markers:
//! - SOI (Start of Image)
//! - APP0 (JFIF header)
//! - DQT (Define Quantization Table)
//! - SOF0 (Start of Frame, baseline)
//! - DHT (Define Huffman Table)
//! - SOS (Start of Scan)
//! - EOI (End of Image)
//!
//! Segment bytes are written as-is; only entropy-coded data is byte-stuffed.
//!
//! Reference: ITU-T T.81 Section B

use std::io::Write;

use crate::consts::{
    DCTSIZE2, JPEG_APP0, JPEG_DHT, JPEG_DQT, JPEG_EOI, JPEG_SOF0, JPEG_SOI, JPEG_SOS,
};
use crate::huffman::TableClass;
use crate::types::{ComponentInfo, HuffmanTable, PixelDensity, QuantTable};
use crate::zigzag::table_to_zigzag;

/// JFIF identifier
const JFIF_ID: [u8; 5] = *b"JFIF\0";

/// JFIF version 1.01
const JFIF_VERSION: [u8; 2] = [1, 1];

/// Baseline sample precision
const BASELINE_PRECISION: u8 = 8;

/// Marker writer for JPEG encoding.
pub struct MarkerWriter<W: Write> {
    output: W,
    bytes_written: usize,
}

impl<W: Write> MarkerWriter<W> {
    /// Create a new marker writer.
    pub fn new(output: W) -> Self {
        Self {
            output,
            bytes_written: 0,
        }
    }

    /// Write a single byte.
    fn emit_byte(&mut self, byte: u8) -> std::io::Result<()> {
        self.output.write_all(&[byte])?;
        self.bytes_written += 1;
        Ok(())
    }

    /// Write a 2-byte value in big-endian order.
    fn emit_2bytes(&mut self, value: u16) -> std::io::Result<()> {
        self.emit_byte((value >> 8) as u8)?;
        self.emit_byte(value as u8)?;
        Ok(())
    }

    fn emit_bytes(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.output.write_all(bytes)?;
        self.bytes_written += bytes.len();
        Ok(())
    }

    /// Write a marker (0xFF followed by marker code).
    fn emit_marker(&mut self, marker: u8) -> std::io::Result<()> {
        self.emit_byte(0xFF)?;
        self.emit_byte(marker)?;
        Ok(())
    }

    /// Write Start of Image marker.
    pub fn write_soi(&mut self) -> std::io::Result<()> {
        self.emit_marker(JPEG_SOI)
    }

    /// Write End of Image marker.
    pub fn write_eoi(&mut self) -> std::io::Result<()> {
        self.emit_marker(JPEG_EOI)
    }

    /// Write APP0 (JFIF) marker with no thumbnail.
    pub fn write_jfif_app0(&mut self, density: &PixelDensity) -> std::io::Result<()> {
        self.emit_marker(JPEG_APP0)?;

        // Length: 2 (length) + 5 (identifier) + 2 (version) + 1 (units) +
        //         2 (x_density) + 2 (y_density) + 1 (thumbnail_width) +
        //         1 (thumbnail_height) = 16
        self.emit_2bytes(16)?;

        self.emit_bytes(&JFIF_ID)?;
        self.emit_bytes(&JFIF_VERSION)?;

        self.emit_byte(density.unit as u8)?;
        self.emit_2bytes(density.x)?;
        self.emit_2bytes(density.y)?;

        // No thumbnail
        self.emit_byte(0)?;
        self.emit_byte(0)?;

        Ok(())
    }

    /// Write one DQT segment for a single 8-bit table.
    ///
    /// # Arguments
    /// * `table_index` - Table slot (0-3)
    /// * `table` - Quantization table in natural order, entries 1..=255
    pub fn write_dqt(&mut self, table_index: u8, table: &QuantTable) -> std::io::Result<()> {
        self.emit_marker(JPEG_DQT)?;
        // Length: 2 (length) + 1 (Pq/Tq) + 64 (values)
        self.emit_2bytes(2 + 1 + DCTSIZE2 as u16)?;

        // Pq = 0 (8-bit) in high nibble, Tq in low nibble
        self.emit_byte(table_index & 0x0F)?;

        for value in table_to_zigzag(&table.values) {
            debug_assert!((1..=255).contains(&value));
            self.emit_byte(value as u8)?;
        }

        Ok(())
    }

    /// Write Start of Frame marker for a baseline frame.
    ///
    /// # Arguments
    /// * `height` - Image height in pixels
    /// * `width` - Image width in pixels
    /// * `components` - Component information
    pub fn write_sof0(
        &mut self,
        height: u16,
        width: u16,
        components: &[ComponentInfo],
    ) -> std::io::Result<()> {
        self.emit_marker(JPEG_SOF0)?;

        // Length: 2 (length) + 1 (precision) + 2 (height) + 2 (width) +
        //         1 (num_components) + 3 * num_components
        let num_components = components.len() as u16;
        self.emit_2bytes(8 + 3 * num_components)?;

        self.emit_byte(BASELINE_PRECISION)?;
        self.emit_2bytes(height)?;
        self.emit_2bytes(width)?;
        self.emit_byte(num_components as u8)?;

        for comp in components {
            self.emit_byte(comp.component_id)?;
            // Sampling factors: (H << 4) | V
            self.emit_byte((comp.h_samp_factor << 4) | comp.v_samp_factor)?;
            self.emit_byte(comp.quant_tbl_no)?;
        }

        Ok(())
    }

    /// Write one DHT segment for a single table.
    ///
    /// # Arguments
    /// * `table_index` - Table slot (0-3)
    /// * `class` - DC or AC
    /// * `table` - Code length counts and symbols in canonical order
    pub fn write_dht(
        &mut self,
        table_index: u8,
        class: TableClass,
        table: &HuffmanTable,
    ) -> std::io::Result<()> {
        let num_symbols = table.num_symbols();

        self.emit_marker(JPEG_DHT)?;
        // Length: 2 (length) + 1 (Tc/Th) + 16 (bits) + symbols
        self.emit_2bytes(2 + 1 + 16 + num_symbols as u16)?;

        // Tc (table class) in high nibble, Th (table index) in low nibble
        let tc = match class {
            TableClass::Dc => 0x00,
            TableClass::Ac => 0x10,
        };
        self.emit_byte(tc | (table_index & 0x0F))?;

        self.emit_bytes(&table.bits[1..=16])?;
        self.emit_bytes(&table.huffval[..num_symbols])?;

        Ok(())
    }

    /// Write Start of Scan marker for a sequential scan over `components`.
    pub fn write_sos(&mut self, components: &[ComponentInfo]) -> std::io::Result<()> {
        self.emit_marker(JPEG_SOS)?;

        // Length: 2 (length) + 1 (Ns) + 2*Ns (component specs) + 3 (Ss, Se, Ah/Al)
        let num_components = components.len() as u16;
        self.emit_2bytes(6 + 2 * num_components)?;
        self.emit_byte(num_components as u8)?;

        for comp in components {
            self.emit_byte(comp.component_id)?;
            // DC table in high nibble, AC table in low nibble
            self.emit_byte((comp.dc_tbl_no << 4) | comp.ac_tbl_no)?;
        }

        // Baseline: full spectrum, no successive approximation
        self.emit_byte(0)?;
        self.emit_byte(63)?;
        self.emit_byte(0)?;

        Ok(())
    }

    /// Write raw bytes (the entropy-coded payload) without stuffing.
    pub fn write_raw(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.emit_bytes(bytes)
    }

    /// Get total bytes written.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Consume the writer and return the underlying output.
    pub fn into_inner(self) -> W {
        self.output
    }
}
