//! Quantization: quality scaling of the Annex K tables and coefficient rounding.
//!
//! Quality follows the IJG convention. Quality 50 uses the Annex K tables
//! unchanged, lower qualities scale them up by `5000 / q` percent and higher
//! qualities scale them down by `200 - 2q` percent.

use crate::consts::{DCTSIZE2, STD_CHROMINANCE_QUANT_TBL, STD_LUMINANCE_QUANT_TBL};
use crate::types::{DctBlock, FloatBlock, QuantTable};

/// Quality that reproduces the reference tables.
pub const REFERENCE_QUALITY: u8 = 50;

/// Convert a 1-100 quality to a percentage scale factor.
///
/// Out-of-range input is clamped to 1..=100.
pub fn quality_to_scale_factor(quality: u8) -> u32 {
    let q = quality.clamp(1, 100) as u32;
    if q < 50 {
        5000 / q
    } else {
        200 - q * 2
    }
}

/// Luminance table for the given quality.
pub fn luma_table(quality: u8) -> QuantTable {
    QuantTable::scaled(&STD_LUMINANCE_QUANT_TBL, quality_to_scale_factor(quality))
}

/// Chrominance table for the given quality.
pub fn chroma_table(quality: u8) -> QuantTable {
    QuantTable::scaled(&STD_CHROMINANCE_QUANT_TBL, quality_to_scale_factor(quality))
}

/// Divide each coefficient by its table entry and round half away from zero.
///
/// Input and output are both in natural (row-major) order.
pub fn quantize_block(coeffs: &FloatBlock, table: &QuantTable) -> DctBlock {
    let mut out = [0i16; DCTSIZE2];
    for i in 0..DCTSIZE2 {
        out[i] = (coeffs[i] / table.values[i] as f32).round() as i16;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_scale_factor() {
        assert_eq!(quality_to_scale_factor(50), 100);
        assert_eq!(quality_to_scale_factor(75), 50);
        assert_eq!(quality_to_scale_factor(100), 0);
        assert_eq!(quality_to_scale_factor(25), 200);
        assert_eq!(quality_to_scale_factor(1), 5000);
        assert_eq!(quality_to_scale_factor(0), 5000);
        assert_eq!(quality_to_scale_factor(200), 0);
    }

    #[test]
    fn test_reference_quality_is_unscaled() {
        assert_eq!(luma_table(REFERENCE_QUALITY).values, STD_LUMINANCE_QUANT_TBL);
        assert_eq!(
            chroma_table(REFERENCE_QUALITY).values,
            STD_CHROMINANCE_QUANT_TBL
        );
    }

    #[test]
    fn test_tables_bounds() {
        assert!(luma_table(100).values.iter().all(|&v| v == 1));
        assert!(luma_table(1).values.iter().all(|&v| (1..=255).contains(&v)));
        assert_eq!(luma_table(1).values[0], 255);
        // Lower quality never gives finer quantization
        let q30 = luma_table(30);
        let q90 = luma_table(90);
        for i in 0..DCTSIZE2 {
            assert!(q30.values[i] >= q90.values[i]);
        }
    }

    #[test]
    fn test_quantize_rounds_half_away_from_zero() {
        let table = QuantTable::new([10; DCTSIZE2]);
        let mut coeffs = [0.0f32; DCTSIZE2];
        coeffs[0] = 25.0;
        coeffs[1] = -25.0;
        coeffs[2] = 24.9;
        coeffs[3] = -15.0;
        coeffs[4] = 4.0;

        let q = quantize_block(&coeffs, &table);
        assert_eq!(q[0], 3);
        assert_eq!(q[1], -3);
        assert_eq!(q[2], 2);
        assert_eq!(q[3], -2);
        assert_eq!(q[4], 0);
    }
}
