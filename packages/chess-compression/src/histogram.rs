//! Quantized symbol statistics for the entropy coders.

use crate::error::{CompressionError, Result};
use crate::rans::RansConfig;
use std::sync::OnceLock;

/// Number of symbols in the move-index alphabet.
pub const MOVE_INDEX_ALPHABET: usize = 256;

/// How often the move at each rank of the sorted legal-move list was played,
/// counted over a large corpus of online games.
pub const MOVE_INDEX_FREQUENCIES: [u64; MOVE_INDEX_ALPHABET] = [
    225883932, 134956126, 89041269, 69386238, 57040790, 44974559, 36547155, 31624920,
    28432772, 26540493, 24484873, 23058034, 23535272, 20482457, 20450172, 18316057,
    17214833, 16964761, 16530028, 15369510, 14178440, 14275714, 13353306, 12829602,
    13102592, 11932647, 10608657, 10142459, 8294594, 7337490, 6337744, 5380717, 4560556,
    3913313, 3038767, 2480514, 1951026, 1521451, 1183252, 938708, 673339, 513153, 377299,
    276996, 199682, 144602, 103313, 73046, 52339, 36779, 26341, 18719, 13225, 9392, 6945,
    4893, 3698, 2763, 2114, 1631, 1380, 1090, 887, 715, 590, 549, 477, 388, 351, 319, 262,
    236, 200, 210, 153, 117, 121, 121, 115, 95, 75, 67, 55, 50, 55, 33, 33, 30, 32, 28, 29,
    27, 21, 15, 9, 10, 12, 12, 8, 7, 2, 4, 5, 5, 1, 5, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
];

/// Symbol weights summing to exactly `2^quantization_bits`, every weight at
/// least 1, with a cumulative table and an inverse lookup for O(1) decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    quantization_bits: u32,
    frequencies: Vec<u32>,
    cdf: Vec<u32>,
    quantiles: Vec<u16>,
}

impl FrequencyTable {
    /// Quantizes raw symbol counts to a total of `2^quantization_bits`.
    pub fn new(counts: &[u64], quantization_bits: u32) -> Result<Self> {
        let total = check_alphabet(counts.len(), quantization_bits)?;
        let raw_total: u64 = counts.iter().sum();
        if raw_total == 0 {
            return Err(CompressionError::InvalidFrequencyTable(
                "all symbol counts are zero".to_owned(),
            ));
        }

        let mut frequencies: Vec<u32> = counts
            .iter()
            .map(|&count| (count as f64 / raw_total as f64 * f64::from(total)).floor() as u32)
            .collect();
        fill_zero_frequencies(&mut frequencies);
        assign_remainder(&mut frequencies, total)?;

        Self::from_weights(frequencies, quantization_bits)
    }

    /// Wraps weights that are already quantized. The weights must be non-zero
    /// and sum to exactly `2^quantization_bits`.
    pub fn from_weights(frequencies: Vec<u32>, quantization_bits: u32) -> Result<Self> {
        let total = check_alphabet(frequencies.len(), quantization_bits)?;
        if frequencies.iter().any(|&f| f == 0) {
            return Err(CompressionError::InvalidFrequencyTable(
                "zero weight in table".to_owned(),
            ));
        }
        let sum: u64 = frequencies.iter().map(|&f| u64::from(f)).sum();
        if sum != u64::from(total) {
            return Err(CompressionError::InvalidFrequencyTable(format!(
                "weights sum to {sum}, expected {total}"
            )));
        }

        let mut cdf = Vec::with_capacity(frequencies.len() + 1);
        cdf.push(0u32);
        for &frequency in &frequencies {
            cdf.push(cdf[cdf.len() - 1] + frequency);
        }

        let mut quantiles = vec![0u16; total as usize];
        for (symbol, bounds) in cdf.windows(2).enumerate() {
            quantiles[bounds[0] as usize..bounds[1] as usize].fill(symbol as u16);
        }

        Ok(FrequencyTable {
            quantization_bits,
            frequencies,
            cdf,
            quantiles,
        })
    }

    pub fn quantization_bits(&self) -> u32 {
        self.quantization_bits
    }

    /// Number of symbols in the alphabet.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn total(&self) -> u32 {
        1 << self.quantization_bits
    }

    pub fn frequency(&self, symbol: usize) -> u32 {
        self.frequencies[symbol]
    }

    /// Inclusive lower bound of the symbol's slot range.
    pub fn cdf(&self, symbol: usize) -> u32 {
        self.cdf[symbol]
    }

    /// The symbol whose slot range `[cdf(s), cdf(s + 1))` contains `slot`.
    pub fn quantile(&self, slot: u32) -> usize {
        usize::from(self.quantiles[slot as usize])
    }

    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }
}

/// Table for move indexes at the default rANS precision, built on first use.
pub fn move_index_table() -> &'static FrequencyTable {
    static TABLE: OnceLock<FrequencyTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        FrequencyTable::new(
            &MOVE_INDEX_FREQUENCIES,
            RansConfig::default().quantization_bits,
        )
        .expect("move index statistics quantize to a valid table")
    })
}

fn check_alphabet(len: usize, quantization_bits: u32) -> Result<u32> {
    if quantization_bits == 0 || quantization_bits > 16 {
        return Err(CompressionError::InvalidFrequencyTable(format!(
            "quantization bits must be in 1..=16, got {quantization_bits}"
        )));
    }
    let total = 1u32 << quantization_bits;
    if len == 0 || len > total as usize {
        return Err(CompressionError::InvalidFrequencyTable(format!(
            "alphabet of {len} symbols does not fit a total of {total}"
        )));
    }
    Ok(total)
}

// The i-th zero weight takes one unit from the i-th weight above one, both in
// index order, until no zero weight is left.
fn fill_zero_frequencies(frequencies: &mut [u32]) {
    loop {
        let zeros: Vec<usize> = (0..frequencies.len())
            .filter(|&i| frequencies[i] == 0)
            .collect();
        if zeros.is_empty() {
            return;
        }
        let donors: Vec<usize> = (0..frequencies.len())
            .filter(|&i| frequencies[i] > 1)
            .collect();
        if donors.is_empty() {
            for i in zeros {
                frequencies[i] = 1;
            }
            return;
        }
        for (&zero, &donor) in zeros.iter().zip(&donors) {
            frequencies[zero] += 1;
            frequencies[donor] -= 1;
        }
    }
}

// Flooring loses mass; the heaviest symbol absorbs whatever is missing.
fn assign_remainder(frequencies: &mut [u32], total: u32) -> Result<()> {
    let sum: u32 = frequencies.iter().sum();
    let deficit = total.checked_sub(sum).ok_or_else(|| {
        CompressionError::InvalidFrequencyTable(format!(
            "quantized weights sum to {sum}, above {total}"
        ))
    })?;
    let heaviest = frequencies
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(i, _)| i)
        .unwrap_or(0);
    frequencies[heaviest] += deficit;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_invariants(table: &FrequencyTable) {
        let sum: u32 = table.frequencies().iter().sum();
        assert_eq!(sum, table.total());
        assert!(table.frequencies().iter().all(|&f| f >= 1));
        assert_eq!(table.cdf(0), 0);
        assert_eq!(table.cdf(table.len()), table.total());
    }

    #[test]
    fn test_move_index_table() {
        let table = move_index_table();
        assert_eq!(table.len(), MOVE_INDEX_ALPHABET);
        assert_eq!(table.quantization_bits(), 14);
        assert_invariants(table);
        // the most played rank keeps the largest weight
        let max = table.frequencies().iter().copied().max().unwrap();
        assert_eq!(table.frequency(0), max);
        assert_eq!(table.frequency(255), 1);
    }

    #[test]
    fn test_zero_weights_borrow_in_index_order() {
        // floor(count / 1003 * 16): [15, 0, 0, 0] before the fix-up
        let table = FrequencyTable::new(&[1000, 1, 1, 1], 4).unwrap();
        assert_eq!(table.frequencies(), &[13, 1, 1, 1]);
        assert_invariants(&table);
    }

    #[test]
    fn test_remainder_goes_to_heaviest_symbol() {
        // floor: [5, 5, 5] sums to 15, one unit short of 16
        let table = FrequencyTable::new(&[1, 1, 1], 4).unwrap();
        assert_eq!(table.frequencies(), &[6, 5, 5]);
        let table = FrequencyTable::new(&[1, 2, 2], 4).unwrap();
        assert_eq!(table.frequencies(), &[3, 7, 6]);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(FrequencyTable::new(&[], 8).is_err());
        assert!(FrequencyTable::new(&[0, 0], 8).is_err());
        assert!(FrequencyTable::new(&[1; 17], 4).is_err());
        assert!(FrequencyTable::new(&[1, 1], 17).is_err());
        assert!(FrequencyTable::from_weights(vec![8, 7], 4).is_err());
        assert!(FrequencyTable::from_weights(vec![16, 0], 4).is_err());
    }

    #[test]
    fn test_quantile_boundaries() {
        let table = FrequencyTable::from_weights(vec![4, 1, 11], 4).unwrap();
        assert_eq!(table.quantile(0), 0);
        assert_eq!(table.quantile(3), 0);
        assert_eq!(table.quantile(4), 1);
        assert_eq!(table.quantile(5), 2);
        assert_eq!(table.quantile(15), 2);
    }

    proptest! {
        #[test]
        fn prop_table_invariants(
            counts in prop::collection::vec(0u64..1_000_000, 1..300),
            quantization_bits in 9u32..=16,
        ) {
            prop_assume!(counts.iter().any(|&c| c > 0));
            let table = FrequencyTable::new(&counts, quantization_bits).unwrap();
            prop_assert_eq!(table.len(), counts.len());
            prop_assert_eq!(table.frequencies().iter().sum::<u32>(), 1u32 << quantization_bits);
            prop_assert!(table.frequencies().iter().all(|&f| f >= 1));
        }

        #[test]
        fn prop_quantile_inverts_cdf(
            counts in prop::collection::vec(1u64..10_000, 1..64),
        ) {
            let table = FrequencyTable::new(&counts, 12).unwrap();
            for symbol in 0..table.len() {
                for slot in table.cdf(symbol)..table.cdf(symbol + 1) {
                    prop_assert_eq!(table.quantile(slot), symbol);
                }
            }
        }
    }
}
