//! Forward DCT (Discrete Cosine Transform) implementation.
//!
//! Computes the orthonormal 8x8 type-II DCT used by JPEG:
//! ```text
//! D(u,v) = 1/4 C(u) C(v) sum_x sum_y B(x,y) cos((2x+1)u pi/16) cos((2y+1)v pi/16)
//! C(0) = 1/sqrt(2), C(k) = 1 otherwise
//! ```
//! on level-shifted samples (`sample - 128`, so inputs lie in -128..=127).
//!
//! Two implementations are provided. [`forward_dct_reference`] evaluates the
//! formula directly and exists as the yardstick for tests. [`forward_dct_8x8`]
//! factors it into a row pass and a column pass against a precomputed cosine
//! table and is what the encoder uses. Both produce the same coefficients up
//! to floating-point rounding.
//!
//! Blocks are row-major: index `y * 8 + x` holds the sample at column `x`,
//! row `y`, and the coefficient at horizontal frequency `u = x`, vertical
//! frequency `v = y`.

use std::f32::consts::{FRAC_1_SQRT_2, PI};
use std::sync::OnceLock;

use crate::consts::{DCTSIZE, DCTSIZE2};
use crate::types::{FloatBlock, SampleBlock};

/// Level shift applied before the transform.
pub const CENTER_SAMPLE: i16 = 128;

/// `COS[k][n] = C(k) * cos((2n+1) k pi / 16) / 2`, so the 2-D scale factor
/// 1/4 C(u) C(v) splits evenly between the two passes.
fn cosine_table() -> &'static [[f32; DCTSIZE]; DCTSIZE] {
    static TABLE: OnceLock<[[f32; DCTSIZE]; DCTSIZE]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[0.0f32; DCTSIZE]; DCTSIZE];
        for (k, row) in table.iter_mut().enumerate() {
            let ck = if k == 0 { FRAC_1_SQRT_2 } else { 1.0 };
            for (n, c) in row.iter_mut().enumerate() {
                let angle = ((2 * n + 1) * k) as f32 * PI / 16.0;
                *c = 0.5 * ck * angle.cos();
            }
        }
        table
    })
}

/// Subtract 128 from every sample.
///
/// # Arguments
/// * `samples` - Input samples (0-255)
/// * `output` - Output level-shifted samples (-128 to 127)
pub fn level_shift(samples: &SampleBlock, output: &mut [i16; DCTSIZE2]) {
    for (out, &s) in output.iter_mut().zip(samples.iter()) {
        *out = s as i16 - CENTER_SAMPLE;
    }
}

/// Separable forward DCT of one level-shifted block.
pub fn forward_dct_8x8(samples: &[i16; DCTSIZE2]) -> FloatBlock {
    let cos = cosine_table();

    // Row pass: tmp[y][u] = sum_x B[y][x] * COS[u][x]
    let mut tmp = [0.0f32; DCTSIZE2];
    for y in 0..DCTSIZE {
        let row = &samples[y * DCTSIZE..(y + 1) * DCTSIZE];
        for u in 0..DCTSIZE {
            let mut acc = 0.0f32;
            for x in 0..DCTSIZE {
                acc += row[x] as f32 * cos[u][x];
            }
            tmp[y * DCTSIZE + u] = acc;
        }
    }

    // Column pass: out[v][u] = sum_y tmp[y][u] * COS[v][y]
    let mut out = [0.0f32; DCTSIZE2];
    for u in 0..DCTSIZE {
        for v in 0..DCTSIZE {
            let mut acc = 0.0f32;
            for y in 0..DCTSIZE {
                acc += tmp[y * DCTSIZE + u] * cos[v][y];
            }
            out[v * DCTSIZE + u] = acc;
        }
    }
    out
}

/// Direct O(n^4) evaluation of the DCT formula.
pub fn forward_dct_reference(samples: &[i16; DCTSIZE2]) -> FloatBlock {
    let mut out = [0.0f32; DCTSIZE2];
    for v in 0..DCTSIZE {
        for u in 0..DCTSIZE {
            let cu = if u == 0 { FRAC_1_SQRT_2 as f64 } else { 1.0 };
            let cv = if v == 0 { FRAC_1_SQRT_2 as f64 } else { 1.0 };
            let mut sum = 0.0f64;
            for y in 0..DCTSIZE {
                for x in 0..DCTSIZE {
                    let b = samples[y * DCTSIZE + x] as f64;
                    let cx = (((2 * x + 1) * u) as f64 * std::f64::consts::PI / 16.0).cos();
                    let cy = (((2 * y + 1) * v) as f64 * std::f64::consts::PI / 16.0).cos();
                    sum += b * cx * cy;
                }
            }
            out[v * DCTSIZE + u] = (0.25 * cu * cv * sum) as f32;
        }
    }
    out
}

/// Level shift followed by the separable DCT.
#[inline]
pub fn transform_block(samples: &SampleBlock) -> FloatBlock {
    let mut shifted = [0i16; DCTSIZE2];
    level_shift(samples, &mut shifted);
    forward_dct_8x8(&shifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn assert_close(a: &FloatBlock, b: &FloatBlock, tol: f32) {
        for i in 0..DCTSIZE2 {
            assert!(
                (a[i] - b[i]).abs() <= tol,
                "coefficient [{}] differs: {} vs {}",
                i,
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn test_level_shift() {
        let samples = [128u8; DCTSIZE2];
        let mut output = [0i16; DCTSIZE2];
        level_shift(&samples, &mut output);
        assert!(output.iter().all(|&v| v == 0));

        let mut samples2 = [0u8; DCTSIZE2];
        samples2[0] = 255;
        level_shift(&samples2, &mut output);
        assert_eq!(output[0], 127);
        assert_eq!(output[1], -128);
    }

    #[test]
    fn test_mid_gray_block_is_all_zero() {
        let coeffs = transform_block(&[128u8; DCTSIZE2]);
        for (i, c) in coeffs.iter().enumerate() {
            assert!(c.abs() < 1e-4, "coefficient [{}] = {}", i, c);
        }
    }

    #[test]
    fn test_dc_coefficient() {
        // Flat block: D(0,0) = 1/4 * 1/2 * 64 * value = 8 * value
        let samples = [100i16; DCTSIZE2];
        let coeffs = forward_dct_8x8(&samples);
        assert!((coeffs[0] - 800.0).abs() < 1e-2);
        for i in 1..DCTSIZE2 {
            assert!(coeffs[i].abs() < 1e-2, "AC [{}] = {}", i, coeffs[i]);
        }
    }

    #[test]
    fn test_extreme_dc_range() {
        let low = forward_dct_8x8(&[-128i16; DCTSIZE2]);
        let high = forward_dct_8x8(&[127i16; DCTSIZE2]);
        assert!((low[0] + 1024.0).abs() < 1e-2);
        assert!((high[0] - 1016.0).abs() < 1e-2);
    }

    #[test]
    fn test_alternating_rows() {
        // Horizontal stripes only carry vertical frequencies
        let mut samples = [0i16; DCTSIZE2];
        for row in 0..DCTSIZE {
            let val = if row % 2 == 0 { 100 } else { -100 };
            for col in 0..DCTSIZE {
                samples[row * DCTSIZE + col] = val;
            }
        }
        let coeffs = forward_dct_8x8(&samples);
        assert!(coeffs[0].abs() < 1e-2);
        for u in 1..DCTSIZE {
            for v in 0..DCTSIZE {
                assert!(coeffs[v * DCTSIZE + u].abs() < 1e-2);
            }
        }
        assert!(coeffs[7 * DCTSIZE].abs() > 50.0);
    }

    #[test]
    fn test_gradient_energy_in_first_horizontal_ac() {
        let mut samples = [0i16; DCTSIZE2];
        for row in 0..DCTSIZE {
            for col in 0..DCTSIZE {
                samples[row * DCTSIZE + col] = (col as i16 - 4) * 20;
            }
        }
        let coeffs = forward_dct_8x8(&samples);
        assert!(coeffs[1].abs() > 100.0);
        assert!(coeffs[DCTSIZE].abs() < 1e-2);
    }

    #[test]
    fn test_separable_matches_reference() {
        let mut rng = StdRng::seed_from_u64(0x1234_5678);
        for _ in 0..16 {
            let mut samples = [0i16; DCTSIZE2];
            for s in samples.iter_mut() {
                *s = rng.random_range(-128..=127);
            }
            assert_close(
                &forward_dct_8x8(&samples),
                &forward_dct_reference(&samples),
                1e-2,
            );
        }
    }
}
