//! Register access for one chip at one bus address.

use crate::error::Result;
use crate::i2c::{BusTransport, I2cAddress};
use crate::shadow::{replace_bits, update_bits, RegisterShadow};
use log::trace;

/// One physical chip on an I2C bus.
///
/// Owns the transport handle it was given (pass `&mut bus` or
/// `&RefCell<bus>` to share one bus between several devices) and a
/// [`RegisterShadow`] of the configuration registers the driver mutates
/// bit by bit.
///
/// Every method performs at most one bus transaction. Bus errors are
/// returned unchanged and leave the shadow untouched.
#[derive(Debug)]
pub struct Device<B> {
    bus: B,
    address: I2cAddress,
    shadow: RegisterShadow,
    // Register-less chips (MCP3424, PCA9546A) take a single command byte
    command: Option<u8>,
}

impl<B: BusTransport> Device<B> {
    /// Creates a device handle. No bus traffic is generated.
    pub fn new(bus: B, address: I2cAddress) -> Self {
        Self {
            bus,
            address,
            shadow: RegisterShadow::new(),
            command: None,
        }
    }

    /// The device's bus address.
    #[inline]
    pub fn address(&self) -> I2cAddress {
        self.address
    }

    /// Read access to the register shadow.
    #[inline]
    pub fn shadow_registers(&self) -> &RegisterShadow {
        &self.shadow
    }

    /// Mutable access to the register shadow, for seeding power-on defaults.
    #[inline]
    pub fn shadow_registers_mut(&mut self) -> &mut RegisterShadow {
        &mut self.shadow
    }

    /// Shadowed value of `offset` (no bus traffic).
    #[inline]
    pub fn shadow(&self, offset: u8) -> u8 {
        self.shadow.get(offset)
    }

    /// Consumes the device and returns the transport.
    pub fn release(self) -> B {
        self.bus
    }

    // --- Register Access ---

    /// Reads one register from the chip.
    pub fn read_register(&mut self, offset: u8) -> Result<u8> {
        let value = self.bus.read_byte(self.address.value(), offset)?;
        trace!(
            "Read {} reg 0x{:02X} = 0x{:02X}",
            self.address,
            offset,
            value
        );
        Ok(value)
    }

    /// Reads consecutive registers starting at `offset`.
    pub fn read_registers(&mut self, offset: u8, buffer: &mut [u8]) -> Result<()> {
        self.bus
            .read_block(self.address.value(), offset, buffer)?;
        trace!(
            "Read {} regs 0x{:02X}..: {:02X?}",
            self.address,
            offset,
            buffer
        );
        Ok(())
    }

    /// Writes one register and records it in the shadow.
    pub fn write_register(&mut self, offset: u8, value: u8) -> Result<()> {
        trace!(
            "Writing {} reg 0x{:02X} = 0x{:02X}",
            self.address,
            offset,
            value
        );
        self.bus.write_byte(self.address.value(), offset, value)?;
        self.shadow.commit(offset, value);
        Ok(())
    }

    /// Writes consecutive registers and records them in the shadow.
    pub fn write_registers(&mut self, offset: u8, data: &[u8]) -> Result<()> {
        trace!(
            "Writing {} regs 0x{:02X}..: {:02X?}",
            self.address,
            offset,
            data
        );
        self.bus.write_block(self.address.value(), offset, data)?;
        self.shadow.commit_block(offset, data);
        Ok(())
    }

    /// Sets (`value == true`) or clears the `mask` bits of `offset`.
    ///
    /// The current value comes from the shadow, not from the chip, so the
    /// call costs exactly one bus write. Returns the byte written.
    pub fn write_bit(&mut self, offset: u8, mask: u8, value: bool) -> Result<u8> {
        let new_val = update_bits(self.shadow.get(offset), mask, value);
        self.write_register(offset, new_val)?;
        Ok(new_val)
    }

    /// Replaces the `mask` bits of `offset` with the matching bits of `bits`.
    /// Returns the byte written.
    pub fn write_masked(&mut self, offset: u8, mask: u8, bits: u8) -> Result<u8> {
        let new_val = replace_bits(self.shadow.get(offset), mask, bits);
        self.write_register(offset, new_val)?;
        Ok(new_val)
    }

    /// Re-reads `offset` from the chip into the shadow.
    pub fn sync_shadow(&mut self, offset: u8) -> Result<u8> {
        let value = self.read_register(offset)?;
        self.shadow.seed(offset, value);
        Ok(value)
    }

    // --- Register-less chips ---

    /// Last command byte written with [`Device::write_command`], if any.
    #[inline]
    pub fn command(&self) -> Option<u8> {
        self.command
    }

    /// Records a command byte known to be in the chip without writing it.
    pub fn seed_command(&mut self, value: u8) {
        self.command = Some(value);
    }

    /// Writes a bare command byte (no register pointer).
    pub fn write_command(&mut self, value: u8) -> Result<()> {
        trace!("Writing {} command 0x{:02X}", self.address, value);
        self.bus.write(self.address.value(), &[value])?;
        self.command = Some(value);
        Ok(())
    }

    /// Writes `value` only if it differs from the last command written.
    /// Returns `true` if a bus write was issued.
    pub fn update_command(&mut self, value: u8) -> Result<bool> {
        if self.command == Some(value) {
            trace!("{} command already 0x{:02X}", self.address, value);
            return Ok(false);
        }
        self.write_command(value)?;
        Ok(true)
    }

    /// Reads bytes straight from the chip (no register pointer).
    pub fn read_direct(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.bus.read(self.address.value(), buffer)?;
        trace!("Read {} direct: {:02X?}", self.address, buffer);
        Ok(())
    }
}
