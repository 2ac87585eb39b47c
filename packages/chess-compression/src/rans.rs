//! Range asymmetric numeral system (rANS) coder over a static
//! [`FrequencyTable`].
//!
//! The coder is a stack: symbols come out of the decoder in the reverse of the
//! order they went into the encoder. Callers that want forward decoding encode
//! back to front.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{CompressionError, Result};
use crate::histogram::FrequencyTable;

/// Bit widths shared by an encoder and its decoder. Payloads written with one
/// configuration cannot be read with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RansConfig {
    /// Precision of the frequency table: weights sum to `2^quantization_bits`.
    pub quantization_bits: u32,
    /// Lower bound of the normalized state is `2^normalization_bits`.
    pub normalization_bits: u32,
    /// Width of each renormalization chunk moved to or from the stream.
    pub chunk_bits: u32,
}

impl Default for RansConfig {
    fn default() -> Self {
        RansConfig {
            quantization_bits: 14,
            normalization_bits: 16,
            chunk_bits: 8,
        }
    }
}

impl RansConfig {
    pub fn validate(&self) -> Result<()> {
        let RansConfig {
            quantization_bits: q,
            normalization_bits: n,
            chunk_bits: c,
        } = *self;
        if !(1..=16).contains(&q) {
            return Err(CompressionError::InvalidConfiguration(format!(
                "quantization bits must be in 1..=16, got {q}"
            )));
        }
        if n < q {
            return Err(CompressionError::InvalidConfiguration(format!(
                "normalization bits ({n}) must be at least the quantization bits ({q})"
            )));
        }
        if !(1..=16).contains(&c) || n + c > 32 {
            return Err(CompressionError::InvalidConfiguration(format!(
                "chunk bits ({c}) must be in 1..=16 with normalization + chunk bits <= 32"
            )));
        }
        Ok(())
    }

    /// Smallest normalized state, also the state the encoder starts from.
    pub fn lower_bound(&self) -> u32 {
        1 << self.normalization_bits
    }

    /// Largest normalized state.
    pub fn upper_bound(&self) -> u32 {
        ((1u64 << (self.normalization_bits + self.chunk_bits)) - 1) as u32
    }

    pub fn contains(&self, state: u32) -> bool {
        state >= self.lower_bound() && state <= self.upper_bound()
    }

    fn chunk_mask(&self) -> u32 {
        ((1u64 << self.chunk_bits) - 1) as u32
    }

    pub(crate) fn check_table(&self, table: &FrequencyTable) -> Result<()> {
        self.validate()?;
        if table.quantization_bits() != self.quantization_bits {
            return Err(CompressionError::InvalidConfiguration(format!(
                "table quantized to {} bits, configuration expects {}",
                table.quantization_bits(),
                self.quantization_bits
            )));
        }
        Ok(())
    }
}

pub struct RansEncoder<'a> {
    config: RansConfig,
    table: &'a FrequencyTable,
    state: u32,
    chunks: Vec<u32>,
}

impl<'a> RansEncoder<'a> {
    pub fn new(config: RansConfig, table: &'a FrequencyTable) -> Result<Self> {
        config.check_table(table)?;
        Ok(RansEncoder {
            config,
            table,
            state: config.lower_bound(),
            chunks: Vec::new(),
        })
    }

    /// Pushes one symbol, first shifting out chunks until the successor state
    /// fits the normalized range.
    pub fn encode(&mut self, symbol: usize) -> Result<()> {
        if symbol >= self.table.len() {
            return Err(CompressionError::SymbolOutOfRange {
                symbol,
                alphabet: self.table.len(),
            });
        }
        debug_assert!(self.config.contains(self.state));

        let upper = u64::from(self.config.upper_bound());
        while self.next_state(symbol) > upper {
            self.chunks.push(self.state & self.config.chunk_mask());
            self.state >>= self.config.chunk_bits;
        }
        self.state = self.next_state(symbol) as u32;

        debug_assert!(self.config.contains(self.state));
        Ok(())
    }

    fn next_state(&self, symbol: usize) -> u64 {
        let state = u64::from(self.state);
        let frequency = u64::from(self.table.frequency(symbol));
        ((state / frequency) << self.config.quantization_bits)
            + u64::from(self.table.cdf(symbol))
            + state % frequency
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Returns the final state and the emitted chunks, last emitted first, so
    /// that a decoder can consume them front to back.
    pub fn finish(mut self) -> (u32, Vec<u32>) {
        self.chunks.reverse();
        (self.state, self.chunks)
    }

    /// Writes the chunks to `writer` in decoding order and returns the final
    /// state.
    pub fn finish_into(self, writer: &mut BitWriter) -> u32 {
        let chunk_bits = self.config.chunk_bits;
        let (state, chunks) = self.finish();
        for chunk in chunks {
            writer.write_bits(chunk, chunk_bits);
        }
        state
    }
}

pub struct RansDecoder<'a> {
    config: RansConfig,
    table: &'a FrequencyTable,
    state: u32,
}

impl<'a> RansDecoder<'a> {
    /// Starts decoding from the final state of an encoder.
    pub fn new(config: RansConfig, table: &'a FrequencyTable, state: u32) -> Result<Self> {
        config.check_table(table)?;
        if !config.contains(state) {
            return Err(CompressionError::InvalidState { state });
        }
        Ok(RansDecoder {
            config,
            table,
            state,
        })
    }

    /// Pops the most recently encoded symbol, refilling the state from
    /// `reader` when it drops below the normalized range.
    pub fn decode(&mut self, reader: &mut BitReader) -> Result<usize> {
        let q = self.config.quantization_bits;
        let slot = self.state & ((1 << q) - 1);
        let symbol = self.table.quantile(slot);

        let previous = u64::from(self.table.frequency(symbol)) * u64::from(self.state >> q)
            + u64::from(slot)
            - u64::from(self.table.cdf(symbol));
        self.state = previous as u32;

        while self.state < self.config.lower_bound() {
            let bits = reader.read_bits(self.config.chunk_bits)?;
            self.state = (self.state << self.config.chunk_bits) + bits;
        }
        Ok(symbol)
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// True once every encoded symbol has been popped.
    pub fn is_initial(&self) -> bool {
        self.state == self.config.lower_bound()
    }
}
