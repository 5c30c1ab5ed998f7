//! JPEG encoder pipeline.
//!
//! [`Encoder`] is a builder over the baseline JFIF encoder. One call runs the
//! whole pipeline:
//!
//! 1. Read the [`SampleSource`] into Y/Cb/Cr planes (or one Y plane)
//! 2. Downsample chroma for 4:2:0
//! 3. Transform, quantize and zig-zag every block (in parallel with the
//!    `parallel` feature)
//! 4. Generate symbols in MCU order, threading DC prediction per component
//! 5. Pick Huffman tables (Annex K, or optimized from the symbol counts)
//! 6. Write markers and the entropy-coded scan into memory
//! 7. Hand the finished file to the sink in one write
//!
//! # Examples
//!
//! ```ignore
//! use jfif_encoder::{Encoder, HuffmanMode, Subsampling};
//!
//! let jpeg = Encoder::new()
//!     .quality(85)
//!     .subsampling(Subsampling::S420)
//!     .huffman_mode(HuffmanMode::Optimized)
//!     .encode_rgb(&pixels, width, height)?;
//! ```

use std::io::Write;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::bitstream::VecBitWriter;
use crate::color::{luma_plane, ycbcr_planes};
use crate::dct::transform_block;
use crate::entropy::{DcPredictor, EntropyEncoder, ScanSymbols};
use crate::error::{Error, Result};
use crate::huffman::{
    std_ac_chroma, std_ac_luma, std_dc_chroma, std_dc_luma, CodeTable, TableClass,
};
use crate::marker::MarkerWriter;
use crate::quant::{chroma_table, luma_table, quantize_block, REFERENCE_QUALITY};
use crate::sample::{downsample_h2v2, McuLayout, Plane};
use crate::source::{GrayImage, RgbImage, SampleSource};
use crate::types::{
    ComponentInfo, DctBlock, HuffmanMode, HuffmanTable, PixelDensity, QuantTable, Subsampling,
};
use crate::zigzag::to_zigzag;

/// Largest width or height a SOF0 header can carry.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// The only sample depth baseline JPEG encodes.
const BASELINE_SAMPLE_BITS: u16 = 8;

/// Baseline JFIF encoder.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Quality level (1-100)
    quality: u8,
    /// Source of the Huffman tables
    huffman_mode: HuffmanMode,
    /// Chroma subsampling mode
    subsampling: Subsampling,
    /// Encode a single luminance component
    grayscale: bool,
    /// Pixel density for JFIF APP0 marker
    pixel_density: PixelDensity,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// One component of the frame with its samples and quantization table.
struct FrameComponent {
    info: ComponentInfo,
    plane: Plane,
    qtable: QuantTable,
}

/// Huffman tables in both forms, indexed by table pair (0 = luma, 1 = chroma).
struct HuffmanTables {
    dht: Vec<(HuffmanTable, HuffmanTable)>,
    codes: Vec<(CodeTable, CodeTable)>,
}

impl Encoder {
    /// Create an encoder with default settings.
    ///
    /// Quality 50 (the unscaled Annex K matrices), optimized Huffman tables,
    /// 4:4:4 color, 72 dpi.
    pub fn new() -> Self {
        Self {
            quality: REFERENCE_QUALITY,
            huffman_mode: HuffmanMode::default(),
            subsampling: Subsampling::default(),
            grayscale: false,
            pixel_density: PixelDensity::default(),
        }
    }

    /// Set quality level (1-100).
    ///
    /// Out-of-range values are clamped: 0 becomes 1 and anything above 100
    /// becomes 100. See [`try_quality`](Self::try_quality) for a strict setter.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    /// Set quality level, rejecting values outside 1-100.
    ///
    /// # Errors
    /// [`Error::InvalidQuality`] for 0 or anything above 100.
    pub fn try_quality(mut self, quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }
        self.quality = quality;
        Ok(self)
    }

    /// Choose standard or optimized Huffman tables.
    pub fn huffman_mode(mut self, mode: HuffmanMode) -> Self {
        self.huffman_mode = mode;
        self
    }

    /// Set chroma subsampling mode. Ignored for grayscale output.
    pub fn subsampling(mut self, mode: Subsampling) -> Self {
        self.subsampling = mode;
        self
    }

    /// Encode only the luminance component.
    pub fn grayscale(mut self, enable: bool) -> Self {
        self.grayscale = enable;
        self
    }

    /// Set pixel density for the JFIF APP0 marker.
    pub fn pixel_density(mut self, density: PixelDensity) -> Self {
        self.pixel_density = density;
        self
    }

    /// Current quality level.
    pub fn get_quality(&self) -> u8 {
        self.quality
    }

    /// Encode interleaved RGB data.
    ///
    /// # Arguments
    /// * `rgb_data` - RGB pixel data (3 bytes per pixel, row-major)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    ///
    /// # Returns
    /// JPEG-encoded data as a `Vec<u8>`.
    pub fn encode_rgb(&self, rgb_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        self.encode(&RgbImage::new(rgb_data, width, height)?)
    }

    /// Encode grayscale data as a single-component JPEG.
    pub fn encode_gray(&self, gray_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        let source = GrayImage::new(gray_data, width, height)?;
        self.encode_frame(&source, true)
    }

    /// Encode any sample source into memory.
    pub fn encode<S: SampleSource + ?Sized>(&self, source: &S) -> Result<Vec<u8>> {
        self.encode_frame(source, self.grayscale)
    }

    /// Encode a sample source and write the file to `sink`.
    ///
    /// The file is assembled in memory first, so nothing reaches the sink
    /// when encoding fails.
    ///
    /// # Errors
    /// Any encoding error, or [`Error::SinkWriteFailure`] if the sink rejects
    /// the write or the flush.
    pub fn encode_to_writer<S: SampleSource + ?Sized, W: Write>(
        &self,
        source: &S,
        mut sink: W,
    ) -> Result<usize> {
        let jpeg = self.encode(source)?;
        sink.write_all(&jpeg)
            .and_then(|()| sink.flush())
            .map_err(|e| Error::SinkWriteFailure(e.to_string()))?;
        Ok(jpeg.len())
    }

    #[instrument(level = "debug", skip_all, fields(
        width = source.width(),
        height = source.height(),
        quality = self.quality,
    ))]
    fn encode_frame<S: SampleSource + ?Sized>(
        &self,
        source: &S,
        grayscale: bool,
    ) -> Result<Vec<u8>> {
        validate_source(source)?;
        let width = source.width();
        let height = source.height();

        let subsampling = if grayscale {
            Subsampling::S444
        } else {
            self.subsampling
        };
        let components = self.frame_components(source, grayscale, subsampling);
        let layout = McuLayout::new(width as usize, height as usize, subsampling.mcu_size());

        let blocks: Vec<Vec<DctBlock>> = components
            .iter()
            .map(|c| quantized_blocks(c, &layout))
            .collect();
        let scan = scan_symbols(&components, &blocks, layout.mcu_count());
        debug!(
            mcus = layout.mcu_count(),
            blocks = scan.block_count(),
            symbols = scan.symbol_count(),
            "generated symbols"
        );

        let tables = self.huffman_tables(&scan, if grayscale { 1 } else { 2 })?;

        let infos: Vec<ComponentInfo> = components.iter().map(|c| c.info).collect();
        let jpeg = self.write_file(width, height, &components, &infos, &tables, &scan)?;
        debug!(bytes = jpeg.len(), "encoded JFIF");
        Ok(jpeg)
    }

    fn frame_components<S: SampleSource + ?Sized>(
        &self,
        source: &S,
        grayscale: bool,
        subsampling: Subsampling,
    ) -> Vec<FrameComponent> {
        let luma_q = luma_table(self.quality);
        if grayscale {
            return vec![FrameComponent {
                info: ComponentInfo::luma(Subsampling::S444),
                plane: luma_plane(source),
                qtable: luma_q,
            }];
        }

        let chroma_q = chroma_table(self.quality);
        let [y, cb, cr] = ycbcr_planes(source);
        let (cb, cr) = match subsampling {
            Subsampling::S444 => (cb, cr),
            Subsampling::S420 => (downsample_h2v2(&cb), downsample_h2v2(&cr)),
        };
        vec![
            FrameComponent {
                info: ComponentInfo::luma(subsampling),
                plane: y,
                qtable: luma_q,
            },
            FrameComponent {
                info: ComponentInfo::chroma(2, subsampling),
                plane: cb,
                qtable: chroma_q,
            },
            FrameComponent {
                info: ComponentInfo::chroma(3, subsampling),
                plane: cr,
                qtable: chroma_q,
            },
        ]
    }

    fn huffman_tables(&self, scan: &ScanSymbols, pairs: usize) -> Result<HuffmanTables> {
        let dht = match self.huffman_mode {
            HuffmanMode::Standard => [
                (std_dc_luma(), std_ac_luma()),
                (std_dc_chroma(), std_ac_chroma()),
            ]
            .into_iter()
            .take(pairs)
            .collect::<Vec<_>>(),
            HuffmanMode::Optimized => scan
                .frequencies(pairs)
                .iter()
                .map(|(dc, ac)| Ok((dc.generate_table()?, ac.generate_table()?)))
                .collect::<Result<Vec<_>>>()?,
        };

        let codes = dht
            .iter()
            .map(|(dc, ac)| {
                Ok((
                    CodeTable::from_huffman_table(dc, TableClass::Dc)?,
                    CodeTable::from_huffman_table(ac, TableClass::Ac)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            mode = ?self.huffman_mode,
            symbols = ?dht
                .iter()
                .map(|(dc, ac)| (dc.num_symbols(), ac.num_symbols()))
                .collect::<Vec<_>>(),
            "selected Huffman tables"
        );
        Ok(HuffmanTables { dht, codes })
    }

    fn write_file(
        &self,
        width: u32,
        height: u32,
        components: &[FrameComponent],
        infos: &[ComponentInfo],
        tables: &HuffmanTables,
        scan: &ScanSymbols,
    ) -> Result<Vec<u8>> {
        let mut markers = MarkerWriter::new(Vec::new());
        markers.write_soi()?;
        markers.write_jfif_app0(&self.pixel_density)?;
        // Cr shares table 1 with Cb
        for comp in components.iter().take(2) {
            markers.write_dqt(comp.info.quant_tbl_no, &comp.qtable)?;
        }
        markers.write_sof0(height as u16, width as u16, infos)?;
        for (slot, (dc, ac)) in tables.dht.iter().enumerate() {
            markers.write_dht(slot as u8, TableClass::Dc, dc)?;
            markers.write_dht(slot as u8, TableClass::Ac, ac)?;
        }
        markers.write_sos(infos)?;

        let mut bits = VecBitWriter::new_vec();
        let mut encoder = EntropyEncoder::new(&mut bits);
        encoder.encode_scan(scan, &tables.codes)?;
        encoder.finish()?;
        markers.write_raw(&bits.into_bytes())?;

        markers.write_eoi()?;
        Ok(markers.into_inner())
    }
}

/// Reject sources a baseline frame cannot represent.
fn validate_source<S: SampleSource + ?Sized>(source: &S) -> Result<()> {
    let (width, height) = (source.width(), source.height());
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(Error::InvalidDimensions { width, height });
    }
    let bits = source.bits_per_sample();
    if bits != BASELINE_SAMPLE_BITS {
        return Err(Error::UnsupportedSampleDepth(bits));
    }
    Ok(())
}

/// Transform, quantize and zig-zag every block of a component in MCU order.
fn quantized_blocks(comp: &FrameComponent, layout: &McuLayout) -> Vec<DctBlock> {
    let positions = layout.block_positions(&comp.info);
    let encode_block = |&(bx, by): &(usize, usize)| {
        let coeffs = transform_block(&comp.plane.read_block(bx, by));
        to_zigzag(&quantize_block(&coeffs, &comp.qtable))
    };

    #[cfg(feature = "parallel")]
    let blocks = positions.par_iter().map(encode_block).collect();
    #[cfg(not(feature = "parallel"))]
    let blocks = positions.iter().map(encode_block).collect();

    blocks
}

/// Interleave the components' blocks MCU by MCU into one symbol stream.
fn scan_symbols(
    components: &[FrameComponent],
    blocks: &[Vec<DctBlock>],
    mcus: usize,
) -> ScanSymbols {
    let total = blocks.iter().map(Vec::len).sum();
    let mut scan = ScanSymbols::with_block_capacity(total);
    let mut predictors = vec![DcPredictor::new(); components.len()];

    for mcu in 0..mcus {
        for (ci, comp) in components.iter().enumerate() {
            let per_mcu = comp.info.blocks_per_mcu();
            for block in &blocks[ci][mcu * per_mcu..(mcu + 1) * per_mcu] {
                predictors[ci] = scan.push_block(block, comp.info.dc_tbl_no, predictors[ci]);
            }
        }
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::Symbol;
    use crate::types::Channel;

    fn gray_frame(width: usize, height: usize, value: u8) -> FrameComponent {
        FrameComponent {
            info: ComponentInfo::luma(Subsampling::S444),
            plane: Plane::filled(width, height, value),
            qtable: luma_table(REFERENCE_QUALITY),
        }
    }

    /// A source that claims a sample depth other than 8.
    struct DeepSource;

    impl SampleSource for DeepSource {
        fn width(&self) -> u32 {
            4
        }
        fn height(&self) -> u32 {
            4
        }
        fn sample(&self, _row: u32, _col: u32, _channel: Channel) -> u8 {
            0
        }
        fn bits_per_sample(&self) -> u16 {
            12
        }
    }

    #[test]
    fn test_defaults() {
        let enc = Encoder::default();
        assert_eq!(enc.get_quality(), 50);
        assert_eq!(enc.huffman_mode, HuffmanMode::Optimized);
        assert_eq!(enc.subsampling, Subsampling::S444);
        assert!(!enc.grayscale);
        assert_eq!(enc.pixel_density, PixelDensity::dpi(72, 72));
    }

    #[test]
    fn test_quality_clamped() {
        assert_eq!(Encoder::new().quality(0).get_quality(), 1);
        assert_eq!(Encoder::new().quality(150).get_quality(), 100);
    }

    #[test]
    fn test_try_quality() {
        assert_eq!(Encoder::new().try_quality(90).unwrap().get_quality(), 90);
        assert_eq!(
            Encoder::new().try_quality(0).unwrap_err(),
            Error::InvalidQuality(0)
        );
        assert_eq!(
            Encoder::new().try_quality(101).unwrap_err(),
            Error::InvalidQuality(101)
        );
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let err = Encoder::new().encode_rgb(&[], 0, 8).unwrap_err();
        assert_eq!(err, Error::InvalidDimensions { width: 0, height: 8 });
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let data = vec![0u8; 65536];
        let err = Encoder::new().encode_gray(&data, 65536, 1).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidDimensions {
                width: 65536,
                height: 1
            }
        );
    }

    #[test]
    fn test_unsupported_depth_rejected() {
        assert_eq!(
            Encoder::new().encode(&DeepSource).unwrap_err(),
            Error::UnsupportedSampleDepth(12)
        );
    }

    #[test]
    fn test_mid_gray_blocks_have_zero_dc_diffs() {
        let comps = vec![gray_frame(16, 16, 128)];
        let layout = McuLayout::new(16, 16, 8);
        let blocks = vec![quantized_blocks(&comps[0], &layout)];
        assert_eq!(blocks[0].len(), 4);

        let scan = scan_symbols(&comps, &blocks, layout.mcu_count());
        assert_eq!(scan.block_count(), 4);
        for (_, symbols) in scan.blocks() {
            assert_eq!(symbols, &[Symbol::Dc { category: 0, bits: 0 }, Symbol::Eob]);
        }
    }

    #[test]
    fn test_flat_blocks_predict_from_previous() {
        // Flat 160: DC = (160 - 128) * 8 / 16 = 16, later blocks repeat it
        let comps = vec![gray_frame(24, 8, 160)];
        let layout = McuLayout::new(24, 8, 8);
        let blocks = vec![quantized_blocks(&comps[0], &layout)];
        let scan = scan_symbols(&comps, &blocks, layout.mcu_count());

        let dcs: Vec<Symbol> = scan.blocks().map(|(_, s)| s[0]).collect();
        assert_eq!(
            dcs,
            vec![
                Symbol::Dc { category: 5, bits: 16 },
                Symbol::Dc { category: 0, bits: 0 },
                Symbol::Dc { category: 0, bits: 0 },
            ]
        );
    }

    #[test]
    fn test_420_interleaving_order() {
        let rgb = vec![200u8; 32 * 16 * 3];
        let source = RgbImage::new(&rgb, 32, 16).unwrap();
        let enc = Encoder::new().subsampling(Subsampling::S420);
        let comps = enc.frame_components(&source, false, Subsampling::S420);
        assert_eq!(comps[1].plane.width(), 16);
        assert_eq!(comps[1].plane.height(), 8);

        let layout = McuLayout::new(32, 16, 16);
        let blocks: Vec<_> = comps.iter().map(|c| quantized_blocks(c, &layout)).collect();
        let scan = scan_symbols(&comps, &blocks, layout.mcu_count());

        let tables: Vec<u8> = scan.blocks().map(|(t, _)| t).collect();
        assert_eq!(tables, vec![0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_standard_tables_for_grayscale() {
        let data = vec![90u8; 8 * 8];
        let jpeg = Encoder::new()
            .huffman_mode(HuffmanMode::Standard)
            .encode_gray(&data, 8, 8)
            .unwrap();
        let dht_count = jpeg.windows(2).filter(|w| *w == [0xFF, 0xC4]).count();
        assert_eq!(dht_count, 2);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_scan_payload_follows_sos() {
        // One mid-gray block: DC category 0 then EOB, padded with 1s
        let data = vec![128u8; 8 * 8];
        let jpeg = Encoder::new()
            .huffman_mode(HuffmanMode::Standard)
            .encode_gray(&data, 8, 8)
            .unwrap();
        let sos = jpeg.windows(2).position(|w| *w == [0xFF, 0xDA]).unwrap();
        let payload = &jpeg[sos + 10..];
        assert_eq!(payload, &[0x2B, 0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_to_writer_counts_bytes() {
        let rgb = vec![10u8; 8 * 8 * 3];
        let source = RgbImage::new(&rgb, 8, 8).unwrap();
        let mut out = Vec::new();
        let written = Encoder::new().encode_to_writer(&source, &mut out).unwrap();
        assert_eq!(written, out.len());
        assert_eq!(&out[..2], &[0xFF, 0xD8]);
    }
}
