//! In-memory mirror of configuration registers.

use std::collections::BTreeMap;

/// Last value successfully written to each shadowed register.
///
/// Registers that were never seeded or written read as 0x00. The owning
/// [`Device`](crate::Device) only commits a value after the bus write
/// succeeded, so the shadow never runs ahead of the hardware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterShadow {
    values: BTreeMap<u8, u8>,
}

impl RegisterShadow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shadowed value of `offset`.
    #[inline]
    pub fn get(&self, offset: u8) -> u8 {
        self.values.get(&offset).copied().unwrap_or(0)
    }

    /// Records a value known to be in the register without writing it,
    /// e.g. a power-on default or a value read back from the chip.
    pub fn seed(&mut self, offset: u8, value: u8) {
        self.values.insert(offset, value);
    }

    /// Records a value that was just written successfully.
    pub(crate) fn commit(&mut self, offset: u8, value: u8) {
        self.values.insert(offset, value);
    }

    /// Records consecutive values written by one block write.
    pub(crate) fn commit_block(&mut self, offset: u8, data: &[u8]) {
        for (i, &value) in data.iter().enumerate() {
            self.values.insert(offset.wrapping_add(i as u8), value);
        }
    }

    /// Returns `true` if `offset` has been seeded or written.
    pub fn contains(&self, offset: u8) -> bool {
        self.values.contains_key(&offset)
    }

    /// Forgets every shadowed value.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Returns `value` with the `mask` bits set or cleared.
#[inline]
pub fn update_bits(value: u8, mask: u8, set: bool) -> u8 {
    if set {
        value | mask
    } else {
        value & !mask
    }
}

/// Replaces the `mask` bits of `value` with the matching bits of `bits`.
#[inline]
pub fn replace_bits(value: u8, mask: u8, bits: u8) -> u8 {
    (value & !mask) | (bits & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseeded_register_reads_zero() {
        let shadow = RegisterShadow::new();
        assert_eq!(shadow.get(0x12), 0);
        assert!(!shadow.contains(0x12));
    }

    #[test]
    fn test_seed_and_commit_block() {
        let mut shadow = RegisterShadow::new();
        shadow.seed(0x00, 0xFF);
        shadow.commit_block(0x06, &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(shadow.get(0x00), 0xFF);
        assert_eq!(shadow.get(0x07), 0x02);
        assert_eq!(shadow.get(0x09), 0x04);
        shadow.clear();
        assert_eq!(shadow.get(0x00), 0);
    }

    #[test]
    fn test_bit_helpers() {
        assert_eq!(update_bits(0b0000_0101, 0b0000_1000, true), 0b0000_1101);
        assert_eq!(update_bits(0b0000_1101, 0b0000_0100, false), 0b0000_1001);
        assert_eq!(replace_bits(0b1001_1100, 0b0110_0000, 0b0100_0000), 0b1101_1100);
    }
}
