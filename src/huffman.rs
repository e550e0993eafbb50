//! C4: Huffman table construction. Builds a two-level decode table from
//! the DHT segment's code-length counts and leaf values, validates the
//! code against the Kraft-equality recurrence, and exposes an O(1) lookup
//! keyed on a 16-bit lookahead window of the bitstream.
//!
//! The construction follows the standard canonical-Huffman assignment
//! (as in `jpegexp-rs/src/jpeg1/huffman.rs`'s `build_from_dht`), but the
//! storage is the two-level primary/secondary layout rather than a
//! bit-by-bit min/max/val_ptr walk, so that lookup costs one or two array
//! reads regardless of code length. Per spec the simplified
//! leaf/link-discriminator encoding is an accepted alternative to a single
//! packed `256 + 255*s` buffer; a `length == 0` entry in the primary table
//! marks a link, never a leaf (leaf lengths are always >= 1).

use crate::error::JpegError;

const PRIMARY_BITS: u32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffEntry {
    pub value: u8,
    /// 0 marks a link into a secondary table (by index, stored in `value`);
    /// 1..=16 is a leaf of that bit length.
    pub length: u8,
}

#[derive(Debug, Clone)]
pub struct HuffmanTable {
    primary: [HuffEntry; 256],
    secondary: Vec<[HuffEntry; 256]>,
}

impl HuffmanTable {
    /// `leaf_counts[l]` is the number of codes of length `l + 1` (so index
    /// 0 holds the count of length-1 codes, per DHT wire order).
    /// `leaf_values` is the concatenation of symbol values in code order.
    pub fn build(leaf_counts: &[u8; 16], leaf_values: &[u8]) -> Result<Self, JpegError> {
        let total_leaves: usize = leaf_counts.iter().map(|&c| c as usize).sum();
        if leaf_values.len() != total_leaves {
            return Err(JpegError::HuffmanValueCountMismatch);
        }

        // Kraft-equality validity recurrence: N_0 = 1, N_l = 2*N_{l-1} - L_l.
        let mut n: i32 = 1;
        for &count in leaf_counts.iter() {
            n = 2 * n - count as i32;
            if n < 0 {
                return Err(JpegError::MalformedHuffmanTable);
            }
        }
        if n != 1 {
            return Err(JpegError::MalformedHuffmanTable);
        }

        let mut primary = [HuffEntry::default(); 256];
        let mut secondary: Vec<[HuffEntry; 256]> = Vec::new();
        let mut prefix_table: [Option<usize>; 256] = [None; 256];

        let mut code: u32 = 0;
        let mut val_idx = 0usize;
        for (li, &count) in leaf_counts.iter().enumerate() {
            let length = (li + 1) as u32;
            for _ in 0..count {
                let value = leaf_values[val_idx];
                val_idx += 1;
                if length <= PRIMARY_BITS {
                    let shift = PRIMARY_BITS - length;
                    let base = (code << shift) as usize;
                    let run = 1usize << shift;
                    for slot in &mut primary[base..base + run] {
                        *slot = HuffEntry { value, length: length as u8 };
                    }
                } else {
                    let prefix = (code >> (length - PRIMARY_BITS)) as usize;
                    let sec_idx = *prefix_table[prefix].get_or_insert_with(|| {
                        let idx = secondary.len();
                        secondary.push([HuffEntry::default(); 256]);
                        primary[prefix] = HuffEntry { value: idx as u8, length: 0 };
                        idx
                    });
                    let shift = 16 - length;
                    let low_base = ((code << shift) & 0xFF) as usize;
                    let run = 1usize << shift;
                    for slot in &mut secondary[sec_idx][low_base..low_base + run] {
                        *slot = HuffEntry { value, length: length as u8 };
                    }
                }
                code += 1;
            }
            code <<= 1;
        }

        Ok(Self { primary, secondary })
    }

    /// Looks up the symbol encoded by the top bits of a 16-bit lookahead
    /// window. Returns the matching entry, whose `length` field tells the
    /// caller how many bits to actually consume from the bitstream.
    pub fn lookup(&self, lookahead: u16) -> Result<HuffEntry, JpegError> {
        let hi = (lookahead >> 8) as usize;
        let entry = self.primary[hi];
        if entry.length != 0 {
            return Ok(entry);
        }
        let lo = (lookahead & 0xFF) as usize;
        let entry = self.secondary[entry.value as usize][lo];
        if entry.length == 0 {
            // Only the single length-16 code the standard reserves (all
            // ones) can land here in an otherwise-valid table.
            return Err(JpegError::MalformedHuffmanTable);
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ISO/IEC 10918-1 Annex K.3 standard luminance DC table.
    const STD_LUMINANCE_DC_LENGTHS: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
    const STD_LUMINANCE_DC_VALUES: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

    #[test]
    fn builds_standard_luminance_dc_table() {
        let table = HuffmanTable::build(&STD_LUMINANCE_DC_LENGTHS, &STD_LUMINANCE_DC_VALUES).unwrap();
        // Category 0 is the shortest code: length 2, code "00", filling the
        // first quarter of the primary table (2^(8-2) = 64 entries).
        let entry = table.lookup(0x0000).unwrap();
        assert_eq!(entry, HuffEntry { value: 0, length: 2 });
        let entry = table.lookup(0x3FFF).unwrap();
        assert_eq!(entry.length, 2);
        assert_eq!(entry.value, 0);
    }

    #[test]
    fn rejects_over_subscribed_code() {
        // Two length-1 codes is already a complete binary tree by itself;
        // a third overflows it.
        let counts = [3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let values = [0u8, 1, 2];
        assert_eq!(
            HuffmanTable::build(&counts, &values),
            Err(JpegError::MalformedHuffmanTable)
        );
    }

    #[test]
    fn rejects_under_subscribed_code() {
        let counts = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let values = [0u8];
        assert_eq!(
            HuffmanTable::build(&counts, &values),
            Err(JpegError::MalformedHuffmanTable)
        );
    }

    #[test]
    fn rejects_value_count_mismatch() {
        let counts = [2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let values = [0u8];
        assert_eq!(
            HuffmanTable::build(&counts, &values),
            Err(JpegError::HuffmanValueCountMismatch)
        );
    }

    #[test]
    fn decodes_codes_longer_than_eight_bits() {
        // Two codes of length 1 reserved for an over-8-bit branch: build a
        // table with one 9-bit code so the secondary table path is hit.
        // lengths: one 8-bit code and two 9-bit codes, Kraft-balanced.
        let mut counts = [0u8; 16];
        counts[7] = 1; // one length-8 code
        counts[8] = 2; // two length-9 codes
        let values = [0u8, 1, 2];
        let table = HuffmanTable::build(&counts, &values).unwrap();
        // length-8 code is 0x00 -> fills primary[0] exactly.
        assert_eq!(table.lookup(0x0000).unwrap(), HuffEntry { value: 0, length: 8 });
        // The two length-9 codes live under primary[1] (the next 8-bit
        // prefix), split across the low bit of the second byte.
        let low = table.lookup(0x0100).unwrap();
        assert_eq!(low.length, 9);
        let high = table.lookup(0x0180).unwrap();
        assert_eq!(high.length, 9);
        assert_ne!(low.value, high.value);
    }
}
