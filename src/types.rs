//! Core type definitions for the encoder.
//!
//! Configuration enums, frame/component descriptors and the table types
//! shared by the quantizer, the Huffman builder and the marker writer.

use crate::consts::DCTSIZE2;

// =============================================================================
// Channels
// =============================================================================

/// A channel of the RGB input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red
    R,
    /// Green
    G,
    /// Blue
    B,
}

impl Channel {
    /// All input channels in R, G, B order.
    pub const ALL: [Channel; 3] = [Channel::R, Channel::G, Channel::B];
}

// =============================================================================
// Sampling Factor / Subsampling
// =============================================================================

/// Chroma subsampling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subsampling {
    /// 4:4:4 - No subsampling (highest quality)
    #[default]
    S444,
    /// 4:2:0 - Chroma halved horizontally and vertically
    S420,
}

impl Subsampling {
    /// Returns (h_samp_factor, v_samp_factor) for the luminance component.
    pub const fn luma_factors(self) -> (u8, u8) {
        match self {
            Subsampling::S444 => (1, 1),
            Subsampling::S420 => (2, 2),
        }
    }

    /// Returns (h_samp_factor, v_samp_factor) for chroma components.
    pub const fn chroma_factors(self) -> (u8, u8) {
        (1, 1)
    }

    /// MCU edge length in luminance samples.
    pub const fn mcu_size(self) -> usize {
        match self {
            Subsampling::S444 => 8,
            Subsampling::S420 => 16,
        }
    }
}

// =============================================================================
// Huffman mode
// =============================================================================

/// How the entropy coder obtains its Huffman tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HuffmanMode {
    /// The example tables from Annex K of the JPEG standard.
    Standard,
    /// Tables built from the symbol statistics of the image (two passes).
    #[default]
    Optimized,
}

// =============================================================================
// Pixel density (JFIF APP0)
// =============================================================================

/// Units for the JFIF density fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DensityUnit {
    /// No units, only the pixel aspect ratio is meaningful
    None = 0,
    /// Dots per inch
    #[default]
    DotsPerInch = 1,
    /// Dots per centimeter
    DotsPerCm = 2,
}

/// Pixel density written into the JFIF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDensity {
    /// Density unit
    pub unit: DensityUnit,
    /// Horizontal density
    pub x: u16,
    /// Vertical density
    pub y: u16,
}

impl PixelDensity {
    /// Density in dots per inch.
    pub const fn dpi(x: u16, y: u16) -> Self {
        Self {
            unit: DensityUnit::DotsPerInch,
            x,
            y,
        }
    }

    /// Density in dots per centimeter.
    pub const fn dpcm(x: u16, y: u16) -> Self {
        Self {
            unit: DensityUnit::DotsPerCm,
            x,
            y,
        }
    }

    /// Pixel aspect ratio only.
    pub const fn aspect_ratio(x: u16, y: u16) -> Self {
        Self {
            unit: DensityUnit::None,
            x,
            y,
        }
    }
}

impl Default for PixelDensity {
    /// 72 x 72 dpi.
    fn default() -> Self {
        Self::dpi(72, 72)
    }
}

// =============================================================================
// Component Info
// =============================================================================

/// Frame and scan parameters of one output component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Component identifier (1=Y, 2=Cb, 3=Cr)
    pub component_id: u8,
    /// Horizontal sampling factor
    pub h_samp_factor: u8,
    /// Vertical sampling factor
    pub v_samp_factor: u8,
    /// Quantization table index
    pub quant_tbl_no: u8,
    /// DC Huffman table index
    pub dc_tbl_no: u8,
    /// AC Huffman table index
    pub ac_tbl_no: u8,
}

impl ComponentInfo {
    /// Luminance component.
    pub const fn luma(subsampling: Subsampling) -> Self {
        let (h, v) = subsampling.luma_factors();
        Self {
            component_id: 1,
            h_samp_factor: h,
            v_samp_factor: v,
            quant_tbl_no: 0,
            dc_tbl_no: 0,
            ac_tbl_no: 0,
        }
    }

    /// Chrominance component with the given id (2 = Cb, 3 = Cr).
    pub const fn chroma(component_id: u8, subsampling: Subsampling) -> Self {
        let (h, v) = subsampling.chroma_factors();
        Self {
            component_id,
            h_samp_factor: h,
            v_samp_factor: v,
            quant_tbl_no: 1,
            dc_tbl_no: 1,
            ac_tbl_no: 1,
        }
    }

    /// Number of blocks this component contributes to one MCU.
    pub const fn blocks_per_mcu(&self) -> usize {
        self.h_samp_factor as usize * self.v_samp_factor as usize
    }
}

// =============================================================================
// Quantization Table
// =============================================================================

/// A quantization table with 64 coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    /// Quantization values in natural (row-major) order
    pub values: [u16; DCTSIZE2],
}

impl QuantTable {
    /// Create a new quantization table from values.
    pub const fn new(values: [u16; DCTSIZE2]) -> Self {
        Self { values }
    }

    /// Create from a base table scaled by a percentage (100 = use table as-is).
    ///
    /// Entries are clamped to 1..=255 so the table fits an 8-bit DQT entry.
    pub fn scaled(base: &[u16; DCTSIZE2], scale_factor: u32) -> Self {
        let mut values = [0u16; DCTSIZE2];
        for (out, &b) in values.iter_mut().zip(base.iter()) {
            let temp = (b as u32 * scale_factor + 50) / 100;
            *out = temp.clamp(1, 255) as u16;
        }
        Self { values }
    }
}

// =============================================================================
// Huffman Table
// =============================================================================

/// A Huffman coding table in the form stored in a DHT segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuffmanTable {
    /// Number of codes of each length (`bits[k]` = # of symbols with k-bit codes).
    /// `bits[0]` is unused.
    pub bits: [u8; 17],
    /// Symbol values in order of increasing code length
    pub huffval: Vec<u8>,
}

impl HuffmanTable {
    /// Create a new Huffman table from bits and values.
    pub fn new(bits: [u8; 17], huffval: Vec<u8>) -> Self {
        Self { bits, huffval }
    }

    /// Returns the total number of symbols in this table.
    pub fn num_symbols(&self) -> usize {
        self.bits[1..].iter().map(|&b| b as usize).sum()
    }
}

// =============================================================================
// Block Types
// =============================================================================

/// A single 8x8 block of quantized coefficients (natural or zig-zag order).
pub type DctBlock = [i16; DCTSIZE2];

/// A single 8x8 block of pixel samples.
pub type SampleBlock = [u8; DCTSIZE2];

/// A single 8x8 block of floating-point values.
pub type FloatBlock = [f32; DCTSIZE2];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsampling_factors() {
        assert_eq!(Subsampling::S444.luma_factors(), (1, 1));
        assert_eq!(Subsampling::S420.luma_factors(), (2, 2));
        assert_eq!(Subsampling::S420.chroma_factors(), (1, 1));
        assert_eq!(Subsampling::S444.mcu_size(), 8);
        assert_eq!(Subsampling::S420.mcu_size(), 16);
    }

    #[test]
    fn test_component_info() {
        let y = ComponentInfo::luma(Subsampling::S420);
        assert_eq!(y.component_id, 1);
        assert_eq!(y.blocks_per_mcu(), 4);

        let cr = ComponentInfo::chroma(3, Subsampling::S420);
        assert_eq!(cr.component_id, 3);
        assert_eq!(cr.quant_tbl_no, 1);
        assert_eq!(cr.blocks_per_mcu(), 1);
    }

    #[test]
    fn test_quant_table_scaling() {
        let base = [16u16; DCTSIZE2];

        let scaled = QuantTable::scaled(&base, 100);
        assert_eq!(scaled.values, base);

        let scaled = QuantTable::scaled(&base, 200);
        assert_eq!(scaled.values[0], 32);

        let scaled = QuantTable::scaled(&base, 50);
        assert_eq!(scaled.values[0], 8);

        // Never zero, never above 8-bit precision
        let scaled = QuantTable::scaled(&base, 0);
        assert_eq!(scaled.values[0], 1);
        let scaled = QuantTable::scaled(&[1000u16; DCTSIZE2], 100);
        assert_eq!(scaled.values[0], 255);
    }

    #[test]
    fn test_pixel_density_default() {
        let d = PixelDensity::default();
        assert_eq!(d.unit, DensityUnit::DotsPerInch);
        assert_eq!((d.x, d.y), (72, 72));
        assert_eq!(PixelDensity::dpcm(10, 20).unit as u8, 2);
        assert_eq!(PixelDensity::aspect_ratio(1, 1).unit as u8, 0);
    }
}
