//! Component planes, block partitioning and chroma downsampling.
//!
//! A [`Plane`] stores exactly the image samples of one component. Blocks that
//! hang over the right or bottom edge read the last valid column/row instead,
//! so padding is a read-time fallback and never stored.
//!
//! 4:2:0 downsampling averages 2x2 neighbourhoods with alternating rounding
//! bias (1, 2, 1, 2...) to avoid a systematic drift toward larger values.

use crate::consts::{DCTSIZE, DCTSIZE2};
use crate::types::{ComponentInfo, SampleBlock};

/// One component of the image, row-major, one byte per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Plane {
    /// Wraps sample data. `data.len()` must equal `width * height`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// Plane filled with a single value.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self::new(width, height, vec![value; width * height])
    }

    /// Width in samples.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in samples.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sample at (`x`, `y`), replicating the last column/row past the edge.
    #[inline]
    pub fn get_clamped(&self, x: usize, y: usize) -> u8 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.data[y * self.width + x]
    }

    /// Reads the 8x8 block whose top-left corner is block (`bx`, `by`).
    ///
    /// Block coordinates may lie past the plane: such blocks are made
    /// entirely of replicated edge samples.
    pub fn read_block(&self, bx: usize, by: usize) -> SampleBlock {
        let mut block = [0u8; DCTSIZE2];
        let x0 = bx * DCTSIZE;
        let y0 = by * DCTSIZE;

        if x0 + DCTSIZE <= self.width && y0 + DCTSIZE <= self.height {
            for (row, out) in block.chunks_exact_mut(DCTSIZE).enumerate() {
                let start = (y0 + row) * self.width + x0;
                out.copy_from_slice(&self.data[start..start + DCTSIZE]);
            }
        } else {
            for (row, out) in block.chunks_exact_mut(DCTSIZE).enumerate() {
                for (col, v) in out.iter_mut().enumerate() {
                    *v = self.get_clamped(x0 + col, y0 + row);
                }
            }
        }
        block
    }
}

/// Block grid of a frame: the number of MCUs and their size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McuLayout {
    /// MCUs per row
    pub mcu_cols: usize,
    /// MCU rows
    pub mcu_rows: usize,
}

impl McuLayout {
    /// Layout for an image of `width` x `height` with `mcu_size`-pixel MCUs.
    pub fn new(width: usize, height: usize, mcu_size: usize) -> Self {
        Self {
            mcu_cols: width.div_ceil(mcu_size),
            mcu_rows: height.div_ceil(mcu_size),
        }
    }

    /// Total number of MCUs.
    pub fn mcu_count(&self) -> usize {
        self.mcu_cols * self.mcu_rows
    }

    /// Block coordinates of `comp` in scan order.
    ///
    /// MCUs are visited left to right, top to bottom. Inside an MCU the
    /// component's `h x v` blocks are visited row-major. With a single block
    /// per MCU this is plain row-major tiling of the plane.
    pub fn block_positions(&self, comp: &ComponentInfo) -> Vec<(usize, usize)> {
        let h = comp.h_samp_factor as usize;
        let v = comp.v_samp_factor as usize;
        let mut positions = Vec::with_capacity(self.mcu_count() * h * v);
        for my in 0..self.mcu_rows {
            for mx in 0..self.mcu_cols {
                for dy in 0..v {
                    for dx in 0..h {
                        positions.push((mx * h + dx, my * v + dy));
                    }
                }
            }
        }
        positions
    }
}

/// Downsample a 2-row strip with 2:1 horizontal, 2:1 vertical ratio (4:2:0).
///
/// `row1` may be `row0` at the bottom edge; an odd last column is paired
/// with itself.
pub fn downsample_h2v2_rows(row0: &[u8], row1: &[u8], output: &mut [u8]) {
    debug_assert_eq!(row0.len(), row1.len());
    let output_len = row0.len().div_ceil(2);
    debug_assert!(output.len() >= output_len);

    let mut bias = 1u16;
    for (i, out) in output.iter_mut().enumerate().take(output_len) {
        let idx = i * 2;
        let p00 = row0[idx] as u16;
        let p10 = row1[idx] as u16;
        let (p01, p11) = if idx + 1 < row0.len() {
            (row0[idx + 1] as u16, row1[idx + 1] as u16)
        } else {
            (p00, p10)
        };
        *out = ((p00 + p01 + p10 + p11 + bias) >> 2) as u8;
        bias ^= 3;
    }
}

/// Halves a plane in both directions.
///
/// The result is `ceil(width / 2)` x `ceil(height / 2)`.
pub fn downsample_h2v2(input: &Plane) -> Plane {
    let out_w = input.width.div_ceil(2);
    let out_h = input.height.div_ceil(2);
    let mut out = vec![0u8; out_w * out_h];

    for (oy, out_row) in out.chunks_exact_mut(out_w).enumerate() {
        let y0 = oy * 2;
        let y1 = (y0 + 1).min(input.height - 1);
        let row0 = &input.data[y0 * input.width..(y0 + 1) * input.width];
        let row1 = &input.data[y1 * input.width..(y1 + 1) * input.width];
        downsample_h2v2_rows(row0, row1, out_row);
    }

    Plane::new(out_w, out_h, out)
}
