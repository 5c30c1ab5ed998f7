//! Huffman table construction.
//!
//! Tables exist in two forms:
//! - [`HuffmanTable`]: the DHT form, code-length counts plus symbols in code order.
//! - [`CodeTable`]: the encoder form, a (code, length) pair per symbol, derived
//!   with the canonical assignment of Annex C (Figures C.1 to C.3).
//!
//! Optimized tables come from symbol frequencies through the length-limited
//! procedure of Annex K.2. A reserved pseudo-symbol with count 1 takes the
//! last code of the longest length, so no real symbol is ever assigned a
//! code made entirely of 1-bits.

use tracing::trace;

use crate::consts::{
    AC_CHROMINANCE_BITS, AC_CHROMINANCE_VALUES, AC_LUMINANCE_BITS, AC_LUMINANCE_VALUES,
    DC_CHROMINANCE_BITS, DC_CHROMINANCE_VALUES, DC_LUMINANCE_BITS, DC_LUMINANCE_VALUES,
    MAX_HUFFMAN_CODE_LEN,
};
use crate::error::{Error, Result};
use crate::types::HuffmanTable;

/// Longest code length the unconstrained tree may reach before limiting.
/// 257 leaves cannot produce a deeper tree.
const MAX_TREE_DEPTH: usize = 256;

/// Pseudo-symbol reserving the all-ones code.
const RESERVED_SYMBOL: usize = 256;

/// Table class, which also bounds the symbol range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableClass {
    /// DC table: symbols are categories 0..=15
    Dc = 0,
    /// AC table: symbols are run/size bytes
    Ac = 1,
}

/// Per-symbol codes derived from a [`HuffmanTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [u16; 256],
    lengths: [u8; 256],
}

impl CodeTable {
    /// Derive canonical codes.
    ///
    /// Codes are handed out in order of increasing length, and in `huffval`
    /// order within a length, each one the previous code plus one.
    ///
    /// # Errors
    /// [`Error::InvalidHuffmanTable`] if the counts overflow a length, a
    /// symbol repeats, a DC symbol exceeds 15, or the last code would be
    /// all 1-bits.
    pub fn from_huffman_table(table: &HuffmanTable, class: TableClass) -> Result<Self> {
        let total = table.num_symbols();
        if total > 256 || table.huffval.len() < total {
            return Err(Error::InvalidHuffmanTable);
        }

        let mut derived = Self {
            codes: [0; 256],
            lengths: [0; 256],
        };
        let max_symbol = match class {
            TableClass::Dc => 15,
            TableClass::Ac => 255,
        };

        let mut code = 0u32;
        let mut k = 0usize;
        for len in 1..=MAX_HUFFMAN_CODE_LEN {
            for _ in 0..table.bits[len] {
                let symbol = table.huffval[k] as usize;
                if symbol > max_symbol || derived.lengths[symbol] != 0 {
                    return Err(Error::InvalidHuffmanTable);
                }
                derived.codes[symbol] = code as u16;
                derived.lengths[symbol] = len as u8;
                code += 1;
                k += 1;
            }
            if code > (1 << len) {
                return Err(Error::InvalidHuffmanTable);
            }
            if k == total && total > 0 {
                // Only the last code can be all ones
                if code == (1 << len) {
                    return Err(Error::InvalidHuffmanTable);
                }
                break;
            }
            code <<= 1;
        }

        Ok(derived)
    }

    /// Code and length for `symbol`, or `None` if the table has no code for it.
    #[inline]
    pub fn code(&self, symbol: u8) -> Option<(u16, u8)> {
        let len = self.lengths[symbol as usize];
        (len != 0).then(|| (self.codes[symbol as usize], len))
    }

    /// Iterator over `(symbol, code, length)` for every coded symbol.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u16, u8)> + '_ {
        (0..256usize)
            .filter(|&s| self.lengths[s] != 0)
            .map(|s| (s as u8, self.codes[s], self.lengths[s]))
    }
}

/// Build an optimal Huffman table from symbol frequencies (Annex K.2).
///
/// Code lengths are limited to 16 bits. Symbols with a zero count get no
/// code. An all-zero frequency table yields an empty table.
///
/// # Errors
/// [`Error::TableOverflow`] if the lengths cannot be limited to 16 bits.
#[allow(clippy::needless_range_loop)]
pub fn build_optimal_table(freq: &[u32; 256]) -> Result<HuffmanTable> {
    // Working counts: 0 means "not (or no longer) a live tree root".
    let mut count = [0u64; 257];
    for (c, &f) in count.iter_mut().zip(freq.iter()) {
        *c = f as u64;
    }
    count[RESERVED_SYMBOL] = 1;

    let mut codesize = [0usize; 257];
    // Singly linked chains of the symbols in each subtree
    let mut next = [usize::MAX; 257];

    loop {
        // Two smallest live counts; ties go to the larger symbol value so the
        // reserved symbol ends up deepest.
        let mut c1 = usize::MAX;
        let mut c2 = usize::MAX;
        for i in 0..257 {
            if count[i] == 0 {
                continue;
            }
            if c1 == usize::MAX || count[i] <= count[c1] {
                c2 = c1;
                c1 = i;
            } else if c2 == usize::MAX || count[i] <= count[c2] {
                c2 = i;
            }
        }
        if c2 == usize::MAX {
            break;
        }

        count[c1] += count[c2];
        count[c2] = 0;

        let mut node = c1;
        codesize[node] += 1;
        while next[node] != usize::MAX {
            node = next[node];
            codesize[node] += 1;
        }
        next[node] = c2;

        let mut node = c2;
        codesize[node] += 1;
        while next[node] != usize::MAX {
            node = next[node];
            codesize[node] += 1;
        }
    }

    let mut bits = [0usize; MAX_TREE_DEPTH + 1];
    for i in 0..257 {
        if codesize[i] > MAX_TREE_DEPTH {
            return Err(Error::TableOverflow);
        }
        if codesize[i] > 0 {
            bits[codesize[i]] += 1;
        }
    }

    // Figure K.3: move pairs of over-long leaves up until nothing is deeper
    // than 16 bits.
    for i in (MAX_HUFFMAN_CODE_LEN + 1..=MAX_TREE_DEPTH).rev() {
        while bits[i] > 0 {
            let mut j = i - 2;
            while j > 0 && bits[j] == 0 {
                j -= 1;
            }
            if j == 0 {
                return Err(Error::TableOverflow);
            }
            bits[i] -= 2;
            bits[i - 1] += 1;
            bits[j + 1] += 2;
            bits[j] -= 1;
        }
    }

    // Drop the reserved symbol from the longest length in use
    if let Some(longest) = (1..=MAX_HUFFMAN_CODE_LEN).rev().find(|&l| bits[l] > 0) {
        bits[longest] -= 1;
    }

    // Symbols ordered by original code size, then symbol value. Lengths were
    // only reshuffled within this order, so shorter codes stay with more
    // frequent symbols.
    let mut order: Vec<usize> = (0..256).filter(|&s| codesize[s] > 0).collect();
    order.sort_by_key(|&s| (codesize[s], s));

    let mut table = HuffmanTable::default();
    for len in 1..=MAX_HUFFMAN_CODE_LEN {
        table.bits[len] = bits[len] as u8;
    }
    // Within a length, symbols go in increasing value
    let mut start = 0usize;
    for len in 1..=MAX_HUFFMAN_CODE_LEN {
        let end = start + bits[len];
        let mut group = order[start..end].to_vec();
        group.sort_unstable();
        table.huffval.extend(group.into_iter().map(|s| s as u8));
        start = end;
    }

    trace!(
        symbols = table.huffval.len(),
        bits = ?&table.bits[1..],
        "built optimal Huffman table"
    );
    Ok(table)
}

/// Symbol frequencies gathered for one Huffman table.
#[derive(Clone, Debug)]
pub struct FrequencyCounter {
    counts: [u32; 256],
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl FrequencyCounter {
    /// Create a new frequency counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for a symbol.
    #[inline]
    pub fn count(&mut self, symbol: u8) {
        self.counts[symbol as usize] = self.counts[symbol as usize].saturating_add(1);
    }

    /// Count of one symbol.
    pub fn get(&self, symbol: u8) -> u32 {
        self.counts[symbol as usize]
    }

    /// Raw counts.
    pub fn counts(&self) -> &[u32; 256] {
        &self.counts
    }

    /// Generate an optimal Huffman table from the collected frequencies.
    pub fn generate_table(&self) -> Result<HuffmanTable> {
        build_optimal_table(&self.counts)
    }
}

fn std_table(bits: &[u8; 17], values: &[u8]) -> HuffmanTable {
    HuffmanTable::new(*bits, values.to_vec())
}

/// Annex K DC luminance table.
pub fn std_dc_luma() -> HuffmanTable {
    std_table(&DC_LUMINANCE_BITS, &DC_LUMINANCE_VALUES)
}

/// Annex K AC luminance table.
pub fn std_ac_luma() -> HuffmanTable {
    std_table(&AC_LUMINANCE_BITS, &AC_LUMINANCE_VALUES)
}

/// Annex K DC chrominance table.
pub fn std_dc_chroma() -> HuffmanTable {
    std_table(&DC_CHROMINANCE_BITS, &DC_CHROMINANCE_VALUES)
}

/// Annex K AC chrominance table.
pub fn std_ac_chroma() -> HuffmanTable {
    std_table(&AC_CHROMINANCE_BITS, &AC_CHROMINANCE_VALUES)
}
