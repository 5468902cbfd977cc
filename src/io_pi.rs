//! IO Pi driver: 16 digital pins on an MCP23017 expander.
//!
//! Pins are numbered 1-16. Port 0 holds pins 1-8, port 1 holds pins 9-16.
//! Direction, polarity, pull-up and output latch registers are shadowed, so
//! single-pin changes cost exactly one bus write and never disturb the
//! other pins of the port.

use crate::consts::mcp23017 as regs;
use crate::convert::level_from_bit;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::gpio::{GpioDirection, GpioLevel, Polarity};
use crate::i2c::{BusTransport, I2cAddress};
use crate::mapper::{BitAddress, BitMapper};
use log::debug;

const PINS: BitMapper = BitMapper::new("pin", regs::PIN_COUNT, 1, 8);

/// One MCP23017 bus on an IO Pi or Expander Pi board.
#[derive(Debug)]
pub struct IoPi<B> {
    device: Device<B>,
}

impl<B: BusTransport> IoPi<B> {
    /// Opens the expander at `address` (0x20 or 0x21 on the IO Pi).
    ///
    /// With `initialise` set every pin becomes an input with pull-ups and
    /// inversion disabled. Otherwise the current chip configuration is read
    /// back into the shadow, leaving the outputs undisturbed.
    pub fn new(bus: B, address: u8, initialise: bool) -> Result<Self> {
        let mut device = Device::new(bus, I2cAddress::new(address)?);
        device.write_register(regs::REG_IOCON, regs::IOCON_DEFAULT)?;
        let mut io = IoPi { device };
        if initialise {
            debug!("Initialising IO Pi at {}", io.device.address());
            io.device
                .write_registers(regs::REG_IODIR, &[regs::IODIR_RESET; 2])?;
            io.device.write_registers(regs::REG_IPOL, &[0x00; 2])?;
            io.device.write_registers(regs::REG_GPPU, &[0x00; 2])?;
            io.sync_bank(regs::REG_OLAT)?;
        } else {
            for bank in [
                regs::REG_IODIR,
                regs::REG_IPOL,
                regs::REG_GPPU,
                regs::REG_OLAT,
            ] {
                io.sync_bank(bank)?;
            }
        }
        Ok(io)
    }

    // Reads both ports of a register bank into the shadow
    fn sync_bank(&mut self, bank: u8) -> Result<()> {
        let mut values = [0u8; 2];
        self.device.read_registers(bank, &mut values)?;
        let shadow = self.device.shadow_registers_mut();
        shadow.seed(bank, values[0]);
        shadow.seed(bank + 1, values[1]);
        Ok(())
    }

    #[inline]
    fn pin_bit(pin: u8, bank: u8) -> Result<BitAddress> {
        Ok(PINS.map(pin)?.in_bank(bank))
    }

    #[inline]
    fn port_reg(port: u8, bank: u8) -> Result<u8> {
        Ok(bank + PINS.map_port(port)?)
    }

    /// The underlying register device.
    pub fn device(&self) -> &Device<B> {
        &self.device
    }

    /// Consumes the driver and returns the transport.
    pub fn release(self) -> B {
        self.device.release()
    }

    // --- Direction ---

    /// Sets a single pin as input or output.
    pub fn set_pin_direction(&mut self, pin: u8, direction: GpioDirection) -> Result<()> {
        let bit = Self::pin_bit(pin, regs::REG_IODIR)?;
        debug!("Setting IODIR pin {}: {:?}", pin, direction);
        self.device
            .write_bit(bit.offset, bit.mask, direction == GpioDirection::Input)?;
        Ok(())
    }

    /// Sets the direction of all 8 pins of a port; bit set = input.
    pub fn set_port_direction(&mut self, port: u8, value: u8) -> Result<()> {
        let reg = Self::port_reg(port, regs::REG_IODIR)?;
        debug!("Setting IODIR port {}: 0x{:02X}", port, value);
        self.device.write_register(reg, value)
    }

    /// Configured direction of a pin (from the shadow).
    pub fn get_pin_direction(&self, pin: u8) -> Result<GpioDirection> {
        let bit = Self::pin_bit(pin, regs::REG_IODIR)?;
        Ok(if self.device.shadow(bit.offset) & bit.mask != 0 {
            GpioDirection::Input
        } else {
            GpioDirection::Output
        })
    }

    /// Configured direction byte of a port (from the shadow).
    pub fn get_port_direction(&self, port: u8) -> Result<u8> {
        Ok(self.device.shadow(Self::port_reg(port, regs::REG_IODIR)?))
    }

    // --- Pull-ups ---

    /// Enables or disables the 100k pull-up on a pin.
    pub fn set_pin_pullup(&mut self, pin: u8, enabled: bool) -> Result<()> {
        let bit = Self::pin_bit(pin, regs::REG_GPPU)?;
        debug!("Setting GPPU pin {}: {}", pin, enabled);
        self.device.write_bit(bit.offset, bit.mask, enabled)?;
        Ok(())
    }

    /// Sets the pull-ups of all 8 pins of a port; bit set = enabled.
    pub fn set_port_pullups(&mut self, port: u8, value: u8) -> Result<()> {
        let reg = Self::port_reg(port, regs::REG_GPPU)?;
        self.device.write_register(reg, value)
    }

    /// Whether the pull-up on a pin is enabled (from the shadow).
    pub fn get_pin_pullup(&self, pin: u8) -> Result<bool> {
        let bit = Self::pin_bit(pin, regs::REG_GPPU)?;
        Ok(self.device.shadow(bit.offset) & bit.mask != 0)
    }

    // --- Polarity ---

    /// Inverts (or restores) the reported level of an input pin.
    pub fn invert_pin(&mut self, pin: u8, invert: bool) -> Result<()> {
        let bit = Self::pin_bit(pin, regs::REG_IPOL)?;
        debug!("Setting IPOL pin {}: {}", pin, invert);
        self.device.write_bit(bit.offset, bit.mask, invert)?;
        Ok(())
    }

    /// Sets the input polarity of all 8 pins of a port; bit set = inverted.
    pub fn invert_port(&mut self, port: u8, value: u8) -> Result<()> {
        let reg = Self::port_reg(port, regs::REG_IPOL)?;
        self.device.write_register(reg, value)
    }

    /// Polarity configured for a pin (from the shadow).
    pub fn get_pin_polarity(&self, pin: u8) -> Result<Polarity> {
        let bit = Self::pin_bit(pin, regs::REG_IPOL)?;
        Ok(if self.device.shadow(bit.offset) & bit.mask != 0 {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        })
    }

    // --- Output ---

    /// Drives an output pin high or low.
    ///
    /// Fails with [`Error::Configuration`] if the pin is configured as an
    /// input; no bus traffic is generated in that case.
    pub fn write_pin(&mut self, pin: u8, level: GpioLevel) -> Result<()> {
        if self.get_pin_direction(pin)? == GpioDirection::Input {
            return Err(Error::Configuration(format!(
                "pin {} is configured as an input",
                pin
            )));
        }
        let bit = Self::pin_bit(pin, regs::REG_OLAT)?;
        self.device.write_bit(bit.offset, bit.mask, level.is_high())?;
        Ok(())
    }

    /// Writes the output latch of a whole port.
    ///
    /// Bits of pins configured as inputs are latched but have no effect
    /// until the pin becomes an output.
    pub fn write_port(&mut self, port: u8, value: u8) -> Result<()> {
        let reg = Self::port_reg(port, regs::REG_OLAT)?;
        self.device.write_register(reg, value)
    }

    /// Last value written to a port's output latch (from the shadow).
    pub fn read_output_latch(&self, port: u8) -> Result<u8> {
        Ok(self.device.shadow(Self::port_reg(port, regs::REG_OLAT)?))
    }

    // --- Input ---

    /// Reads a pin as reported by the chip, after any configured inversion.
    pub fn read_pin(&mut self, pin: u8) -> Result<GpioLevel> {
        let bit = Self::pin_bit(pin, regs::REG_GPIO)?;
        let value = self.device.read_register(bit.offset)?;
        Ok(GpioLevel::from(value & bit.mask != 0))
    }

    /// Reads the electrical level of a pin, undoing the configured inversion.
    pub fn read_pin_line(&mut self, pin: u8) -> Result<GpioLevel> {
        let polarity = self.get_pin_polarity(pin)?;
        let bit = Self::pin_bit(pin, regs::REG_GPIO)?;
        let value = self.device.read_register(bit.offset)?;
        Ok(level_from_bit(value & bit.mask != 0, polarity))
    }

    /// Reads all 8 pins of a port.
    pub fn read_port(&mut self, port: u8) -> Result<u8> {
        let reg = Self::port_reg(port, regs::REG_GPIO)?;
        self.device.read_register(reg)
    }
}
