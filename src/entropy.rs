//! Symbol generation and Huffman entropy encoding for baseline JPEG.
//!
//! This module turns zig-zag ordered blocks into symbols and symbols into bits:
//! - DC coefficients are coded as the difference from the previous block of
//!   the same component ([`DcPredictor`])
//! - AC coefficients are coded as (zero run, category) pairs with ZRL for
//!   runs of 16 zeros and EOB for a block's trailing zeros
//! - Each category is followed by its magnitude bits, written raw
//!
//! Reference: ITU-T T.81 Section F.1.2

use std::io::Write;

use crate::bitstream::BitWriter;
use crate::consts::{DCTSIZE2, MAX_AC_CATEGORY, MAX_DC_CATEGORY};
use crate::error::{Error, Result};
use crate::huffman::{CodeTable, FrequencyCounter};
use crate::types::DctBlock;

/// EOB (End of Block) symbol - encodes as run=0, size=0
pub const EOB: u8 = 0x00;

/// ZRL (Zero Run Length 16) symbol - encodes 16 consecutive zeros
pub const ZRL: u8 = 0xF0;

/// Calculate the magnitude category of a value.
///
/// This is the number of bits needed to represent `|value|`:
/// - 0 → 0 bits (value must be 0)
/// - 1 → 1 bit (values -1, 1)
/// - 2 → 2 bits (values -3..-2, 2..3)
/// - etc.
#[inline]
pub fn jpeg_nbits(value: i16) -> u8 {
    if value == 0 {
        return 0;
    }
    16 - value.unsigned_abs().leading_zeros() as u8
}

/// Category and magnitude bits of a value.
///
/// Positive values are their own binary representation. Negative values are
/// stored as `value + 2^category - 1`, which puts them in the lower half of
/// the category's range.
#[inline]
pub fn magnitude_bits(value: i16) -> (u8, u16) {
    let category = jpeg_nbits(value);
    if category == 0 {
        return (0, 0);
    }
    let mask = ((1u32 << category) - 1) as u16;
    let bits = if value < 0 {
        (value as u16).wrapping_sub(1) & mask
    } else {
        value as u16
    };
    (category, bits)
}

/// Inverse of [`magnitude_bits`].
#[inline]
pub fn decode_magnitude(category: u8, bits: u16) -> i16 {
    if category == 0 {
        return 0;
    }
    let half = 1i32 << (category - 1);
    let bits = bits as i32;
    if bits >= half {
        bits as i16
    } else {
        (bits - (1i32 << category) + 1) as i16
    }
}

/// One coded unit of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// DC difference: category 0..=11 and its magnitude bits
    Dc {
        /// Magnitude category
        category: u8,
        /// Raw magnitude bits (`category` wide)
        bits: u16,
    },
    /// Nonzero AC coefficient preceded by `run` zeros (0..=15)
    Ac {
        /// Zeros skipped before this coefficient
        run: u8,
        /// Magnitude category (1..=10)
        category: u8,
        /// Raw magnitude bits (`category` wide)
        bits: u16,
    },
    /// Sixteen zero AC coefficients
    Zrl,
    /// All remaining AC coefficients of the block are zero
    Eob,
}

impl Symbol {
    /// The byte that is Huffman coded for this symbol.
    #[inline]
    pub fn huffman_symbol(&self) -> u8 {
        match *self {
            Symbol::Dc { category, .. } => category,
            Symbol::Ac { run, category, .. } => (run << 4) | category,
            Symbol::Zrl => ZRL,
            Symbol::Eob => EOB,
        }
    }

    /// Magnitude bits written after the Huffman code, with their width.
    #[inline]
    pub fn extra_bits(&self) -> (u16, u8) {
        match *self {
            Symbol::Dc { category, bits } | Symbol::Ac { category, bits, .. } => (bits, category),
            Symbol::Zrl | Symbol::Eob => (0, 0),
        }
    }

    /// True for the DC symbol that opens every block.
    #[inline]
    pub fn is_dc(&self) -> bool {
        matches!(self, Symbol::Dc { .. })
    }
}

/// DC prediction state of one component for one scan.
///
/// Passed into and returned from [`encode_block_symbols`] so the cross-block
/// dependency stays visible at the call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DcPredictor {
    last_dc: i16,
}

impl DcPredictor {
    /// Predictor at the start of a scan (predicts 0).
    pub const fn new() -> Self {
        Self { last_dc: 0 }
    }

    /// The value the next block's DC is predicted to be.
    pub const fn predicted(&self) -> i16 {
        self.last_dc
    }

    /// Difference of `dc` from the prediction, and the predictor for the
    /// following block.
    #[inline]
    pub fn advance(self, dc: i16) -> (i16, DcPredictor) {
        (dc.wrapping_sub(self.last_dc), DcPredictor { last_dc: dc })
    }
}

/// Append the symbols of one zig-zag ordered block to `out`.
///
/// Emits one DC symbol and then the AC run-length symbols for positions
/// 1..64. EOB is emitted only when the block ends in zeros.
///
/// # Returns
/// The predictor for the next block of the same component.
pub fn encode_block_symbols(
    zigzag: &DctBlock,
    predictor: DcPredictor,
    out: &mut Vec<Symbol>,
) -> DcPredictor {
    let (diff, next) = predictor.advance(zigzag[0]);
    let (category, bits) = magnitude_bits(diff);
    debug_assert!(category <= MAX_DC_CATEGORY, "DC diff {} out of range", diff);
    out.push(Symbol::Dc { category, bits });

    let mut run = 0u8;
    for &coef in &zigzag[1..DCTSIZE2] {
        if coef == 0 {
            run += 1;
            continue;
        }
        while run >= 16 {
            out.push(Symbol::Zrl);
            run -= 16;
        }
        let (category, bits) = magnitude_bits(coef);
        debug_assert!(category <= MAX_AC_CATEGORY, "AC {} out of range", coef);
        out.push(Symbol::Ac {
            run,
            category,
            bits,
        });
        run = 0;
    }
    if run > 0 {
        out.push(Symbol::Eob);
    }

    next
}

/// Symbols of a whole scan, in coding order.
///
/// Each block's symbols are tagged with the Huffman table pair (0 for
/// luminance, 1 for chrominance) that codes them.
#[derive(Debug, Default, Clone)]
pub struct ScanSymbols {
    symbols: Vec<Symbol>,
    /// (table pair, end index into `symbols`) per block
    blocks: Vec<(u8, usize)>,
}

impl ScanSymbols {
    /// Create an empty stream with room for `blocks` blocks.
    pub fn with_block_capacity(blocks: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(blocks * 4),
            blocks: Vec::with_capacity(blocks),
        }
    }

    /// Append one zig-zag ordered block coded with table pair `table`.
    pub fn push_block(
        &mut self,
        zigzag: &DctBlock,
        table: u8,
        predictor: DcPredictor,
    ) -> DcPredictor {
        let next = encode_block_symbols(zigzag, predictor, &mut self.symbols);
        self.blocks.push((table, self.symbols.len()));
        next
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of symbols.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Blocks as (table pair, symbols) in coding order.
    pub fn blocks(&self) -> impl Iterator<Item = (u8, &[Symbol])> + '_ {
        let mut start = 0;
        self.blocks.iter().map(move |&(table, end)| {
            let block = &self.symbols[start..end];
            start = end;
            (table, block)
        })
    }

    /// Symbol frequencies for `tables` table pairs, as (DC, AC) counters.
    pub fn frequencies(&self, tables: usize) -> Vec<(FrequencyCounter, FrequencyCounter)> {
        let mut counters = vec![(FrequencyCounter::new(), FrequencyCounter::new()); tables];
        for (table, block) in self.blocks() {
            let (dc, ac) = &mut counters[table as usize];
            for symbol in block {
                if symbol.is_dc() {
                    dc.count(symbol.huffman_symbol());
                } else {
                    ac.count(symbol.huffman_symbol());
                }
            }
        }
        counters
    }
}

/// Writes symbols as Huffman codes plus magnitude bits.
pub struct EntropyEncoder<'a, W: Write> {
    /// Bitstream writer
    writer: &'a mut BitWriter<W>,
}

impl<'a, W: Write> EntropyEncoder<'a, W> {
    /// Create a new entropy encoder.
    pub fn new(writer: &'a mut BitWriter<W>) -> Self {
        Self { writer }
    }

    /// Encode one symbol with the matching table.
    #[inline]
    pub fn encode_symbol(&mut self, symbol: &Symbol, table: &CodeTable) -> Result<()> {
        let value = symbol.huffman_symbol();
        let (code, size) = table
            .code(value)
            .ok_or(Error::MissingHuffmanCode { symbol: value })?;
        self.writer.write_bits(code as u32, size)?;

        let (bits, nbits) = symbol.extra_bits();
        if nbits > 0 {
            self.writer.write_bits(bits as u32, nbits)?;
        }
        Ok(())
    }

    /// Encode a whole scan. `tables[i]` is the (DC, AC) pair for table pair `i`.
    pub fn encode_scan(
        &mut self,
        scan: &ScanSymbols,
        tables: &[(CodeTable, CodeTable)],
    ) -> Result<()> {
        for (table, block) in scan.blocks() {
            let (dc_table, ac_table) = tables
                .get(table as usize)
                .ok_or(Error::InvalidHuffmanTable)?;
            for symbol in block {
                let codes = if symbol.is_dc() { dc_table } else { ac_table };
                self.encode_symbol(symbol, codes)?;
            }
        }
        Ok(())
    }

    /// Pad to a byte boundary, ending the entropy-coded segment.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush_to_byte()?;
        Ok(())
    }
}
