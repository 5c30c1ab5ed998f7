//! Zig-zag serialization of quantized blocks.

use crate::consts::{DCTSIZE2, JPEG_NATURAL_ORDER, JPEG_ZIGZAG_ORDER};
use crate::types::DctBlock;

/// Reorder a natural-order block into zig-zag order.
///
/// Element 0 of the result is the DC coefficient; elements 1..64 are the AC
/// coefficients in increasing frequency.
#[inline]
pub fn to_zigzag(block: &DctBlock) -> DctBlock {
    let mut out = [0i16; DCTSIZE2];
    for (zz, &natural) in JPEG_NATURAL_ORDER.iter().enumerate() {
        out[zz] = block[natural];
    }
    out
}

/// Inverse of [`to_zigzag`].
#[inline]
pub fn from_zigzag(zigzag: &DctBlock) -> DctBlock {
    let mut out = [0i16; DCTSIZE2];
    for (natural, &zz) in JPEG_ZIGZAG_ORDER.iter().enumerate() {
        out[natural] = zigzag[zz];
    }
    out
}

/// Reorder a natural-order table of `u16` (quantization tables in DQT).
pub fn table_to_zigzag(table: &[u16; DCTSIZE2]) -> [u16; DCTSIZE2] {
    let mut out = [0u16; DCTSIZE2];
    for (zz, &natural) in JPEG_NATURAL_ORDER.iter().enumerate() {
        out[zz] = table[natural];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_matrix() -> DctBlock {
        let mut m = [0i16; DCTSIZE2];
        for (i, v) in m.iter_mut().enumerate() {
            *v = i as i16;
        }
        m
    }

    #[test]
    fn test_zigzag_prefix() {
        let zz = to_zigzag(&index_matrix());
        assert_eq!(
            &zz[..16],
            &[0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5]
        );
        assert_eq!(&zz[60..], &[47, 55, 62, 63]);
    }

    #[test]
    fn test_zigzag_is_permutation() {
        let zz = to_zigzag(&index_matrix());
        let mut seen = [false; DCTSIZE2];
        for &v in zz.iter() {
            assert!(!seen[v as usize]);
            seen[v as usize] = true;
        }
    }

    #[test]
    fn test_from_zigzag_inverts() {
        let m = index_matrix();
        assert_eq!(from_zigzag(&to_zigzag(&m)), m);
    }

    #[test]
    fn test_table_to_zigzag() {
        let mut table = [0u16; DCTSIZE2];
        table[8] = 99;
        let zz = table_to_zigzag(&table);
        assert_eq!(zz[2], 99);
    }
}
