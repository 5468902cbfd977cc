//! Mapping of caller-facing channel/pin/port numbers onto register offsets
//! and bit masks.

use crate::error::{out_of_range, Result};

/// A single bit inside an 8-bit register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitAddress {
    /// Register offset, relative to the bank the mapper describes.
    pub offset: u8,
    /// Single-bit mask within that register.
    pub mask: u8,
}

impl BitAddress {
    /// Returns the same bit in the register bank starting at `base`.
    ///
    /// Chips with several parallel register banks (direction, pull-up,
    /// latch, ...) share one mapper and rebase the result per bank.
    #[inline]
    pub fn in_bank(self, base: u8) -> BitAddress {
        BitAddress {
            offset: base + self.offset,
            mask: self.mask,
        }
    }

    /// Bit position (0-7) of the mask.
    #[inline]
    pub fn bit(&self) -> u8 {
        self.mask.trailing_zeros() as u8
    }
}

/// Describes how a chip numbers its channels or pins.
///
/// Index `first_index` maps to bit 0 of register 0, the next index to
/// bit 1, and so on, wrapping into the next register every
/// `bits_per_register` indices. The mapping is a pure function of the
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMapper {
    what: &'static str,
    count: u8,
    first_index: u8,
    bits_per_register: u8,
}

impl BitMapper {
    /// Creates a mapper for `count` indices starting at `first_index`
    /// (0 or 1 depending on the board), packed `bits_per_register` per
    /// register (1-8). `what` names the index in error messages.
    ///
    /// # Panics
    ///
    /// Panics if `count` is 0, if the last index does not fit in a `u8`,
    /// or if `bits_per_register` is outside 1-8. Used in a `const` item
    /// this fails the build instead.
    pub const fn new(
        what: &'static str,
        count: u8,
        first_index: u8,
        bits_per_register: u8,
    ) -> Self {
        assert!(count > 0, "BitMapper needs at least one index");
        assert!(
            first_index as u16 + count as u16 - 1 <= u8::MAX as u16,
            "BitMapper indices must fit in a u8"
        );
        assert!(
            bits_per_register >= 1 && bits_per_register <= 8,
            "BitMapper packs 1-8 bits per register"
        );
        Self {
            what,
            count,
            first_index,
            bits_per_register,
        }
    }

    /// Number of valid indices.
    #[inline]
    pub fn count(&self) -> u8 {
        self.count
    }

    /// Lowest valid index.
    #[inline]
    pub fn first_index(&self) -> u8 {
        self.first_index
    }

    /// Highest valid index.
    #[inline]
    pub fn last_index(&self) -> u8 {
        self.first_index + self.count - 1
    }

    /// Number of registers (ports) the indices span.
    #[inline]
    pub fn ports(&self) -> u8 {
        self.count.div_ceil(self.bits_per_register)
    }

    /// Checks `index` and returns its zero-based position.
    pub fn position(&self, index: u8) -> Result<u8> {
        if index < self.first_index || index > self.last_index() {
            return Err(out_of_range(
                self.what,
                index as u32,
                self.first_index as u32,
                self.last_index() as u32,
            ));
        }
        Ok(index - self.first_index)
    }

    /// Maps a logical index to its register offset and bit mask.
    pub fn map(&self, index: u8) -> Result<BitAddress> {
        let position = self.position(index)?;
        Ok(BitAddress {
            offset: position / self.bits_per_register,
            mask: 1 << (position % self.bits_per_register),
        })
    }

    /// Maps a zero-based port number to its register offset.
    ///
    /// A port is every bit of one register.
    pub fn map_port(&self, port: u8) -> Result<u8> {
        let ports = self.ports();
        if port >= ports {
            return Err(out_of_range("port", port as u32, 0, ports as u32 - 1));
        }
        Ok(port)
    }

    /// Mask covering every valid bit of `port`.
    pub fn port_mask(&self, port: u8) -> Result<u8> {
        let offset = self.map_port(port)?;
        let used = self.count - offset * self.bits_per_register;
        let bits = used.min(self.bits_per_register) as u32;
        Ok(((1u16 << bits) - 1) as u8)
    }
}
