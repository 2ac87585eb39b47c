//! Fixed-width bit packing on top of [`BitVec`].
//!
//! Values are written most-significant bit first. Byte conversion pads the
//! final byte with zero bits, so readers must know how many values to expect.

use crate::error::{CompressionError, Result};
use bit_vec::BitVec;

#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bits: BitVec,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            bits: BitVec::new(),
        }
    }

    /// Appends the low `width` bits of `value`, MSB first.
    pub fn write_bits(&mut self, value: u32, width: u32) {
        debug_assert!(width <= 32);
        for i in (0..width).rev() {
            self.bits.push((value >> i) & 1 == 1);
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.to_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct BitReader {
    bits: BitVec,
    cursor: usize,
}

impl BitReader {
    pub fn new(bits: BitVec) -> Self {
        BitReader { bits, cursor: 0 }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(BitVec::from_bytes(bytes))
    }

    /// Reads exactly `width` bits, MSB first. Fails without advancing when
    /// fewer than `width` bits remain.
    pub fn read_bits(&mut self, width: u32) -> Result<u32> {
        debug_assert!(width <= 32);
        if self.remaining() < width as usize {
            return Err(CompressionError::TruncatedStream);
        }
        let mut value = 0u32;
        for _ in 0..width {
            let bit = self
                .bits
                .get(self.cursor)
                .ok_or(CompressionError::TruncatedStream)?;
            value = (value << 1) | u32::from(bit);
            self.cursor += 1;
        }
        Ok(value)
    }

    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_bits_msb_first() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b1010, 4);
        writer.write_bits(0b11, 2);
        assert_eq!(writer.len(), 6);
        assert_eq!(writer.to_bytes(), vec![0b1010_1100]);
    }

    #[test]
    fn test_read_back_mixed_widths() {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bits(37, 6);
        writer.write_bits(0xAB, 8);
        writer.write_bits(0, 0);

        let mut reader = BitReader::from_bytes(&writer.to_bytes());
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(6).unwrap(), 37);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
        assert_eq!(reader.position(), 15);
        // one padding bit left in the second byte
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let mut reader = BitReader::from_bytes(&[0xFF]);
        assert_eq!(reader.read_bits(5).unwrap(), 0b11111);
        assert_eq!(
            reader.read_bits(8),
            Err(CompressionError::TruncatedStream)
        );
        // a failed read leaves the cursor untouched
        assert_eq!(reader.read_bits(3).unwrap(), 0b111);
    }

    #[test]
    fn test_empty_reader() {
        let mut reader = BitReader::from_bytes(&[]);
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert!(reader.read_bit().is_err());
    }
}
