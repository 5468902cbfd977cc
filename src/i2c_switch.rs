//! I2C Switch driver: PCA9546A 4-channel I2C multiplexer.
//!
//! The chip has a single control byte, bit n enabling downstream channel
//! n+1. The driver keeps the last byte written so single-channel changes
//! do not need a read first.

use crate::consts::pca9546 as regs;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::gpio::{GpioLevel, NoLines, OutputLines};
use crate::i2c::{BusTransport, I2cAddress};
use crate::mapper::BitMapper;
use crate::shadow::update_bits;
use log::debug;
use std::thread;
use std::time::Duration;

const CHANNELS: BitMapper = BitMapper::new("channel", regs::CHANNELS, 1, 8);

// Minimum reset pulse and recovery time
const RESET_PULSE: Duration = Duration::from_millis(1);

/// Driver for a PCA9546A switch.
#[derive(Debug)]
pub struct I2cSwitch<B, L = NoLines> {
    device: Device<B>,
    lines: L,
    reset_line: u8,
}

impl<B: BusTransport> I2cSwitch<B, NoLines> {
    /// Opens the switch without a reset line. All channels are assumed off.
    pub fn new(bus: B, address: u8) -> Result<Self> {
        I2cSwitch::with_reset_line(bus, address, NoLines, 0)
    }
}

impl<B: BusTransport, L: OutputLines> I2cSwitch<B, L> {
    /// Opens the switch with `lines[reset_line]` wired to its active-low reset.
    pub fn with_reset_line(bus: B, address: u8, lines: L, reset_line: u8) -> Result<Self> {
        let mut device = Device::new(bus, I2cAddress::new(address)?);
        device.seed_command(0x00);
        Ok(I2cSwitch {
            device,
            lines,
            reset_line,
        })
    }

    /// The underlying register device.
    pub fn device(&self) -> &Device<B> {
        &self.device
    }

    /// Consumes the driver and returns the transport and lines.
    pub fn release(self) -> (B, L) {
        (self.device.release(), self.lines)
    }

    /// Enables `channel` (1-4) and disables all others.
    pub fn switch_channel(&mut self, channel: u8) -> Result<()> {
        let bit = CHANNELS.map(channel)?;
        debug!("Switching to I2C channel {}", channel);
        self.device.write_command(bit.mask)
    }

    /// Enables or disables `channel` (1-4), leaving the others as they are.
    pub fn set_channel_state(&mut self, channel: u8, enabled: bool) -> Result<()> {
        let bit = CHANNELS.map(channel)?;
        let current = self.device.command().unwrap_or(0);
        debug!("Setting I2C channel {}: {}", channel, enabled);
        self.device
            .write_command(update_bits(current, bit.mask, enabled))
    }

    /// Reads the control byte from the chip and reports `channel` (1-4).
    pub fn get_channel_state(&mut self, channel: u8) -> Result<bool> {
        let bit = CHANNELS.map(channel)?;
        let control = self.read_control()?;
        Ok(control & bit.mask != 0)
    }

    /// Reads the control byte from the chip.
    pub fn read_control(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.device.read_direct(&mut buf)?;
        Ok(buf[0])
    }

    /// Last control byte written (no bus traffic).
    pub fn control(&self) -> u8 {
        self.device.command().unwrap_or(0)
    }

    /// Pulses the reset line, which disables every channel, and checks
    /// that the chip came back with all channels off.
    pub fn reset(&mut self) -> Result<()> {
        debug!("Resetting I2C switch at {}", self.device.address());
        self.lines.set_line(self.reset_line, GpioLevel::Low)?;
        thread::sleep(RESET_PULSE);
        self.lines.set_line(self.reset_line, GpioLevel::High)?;
        thread::sleep(RESET_PULSE);
        self.device.seed_command(0x00);
        let control = self.read_control()?;
        if control != 0 {
            return Err(Error::Configuration(format!(
                "switch still reports channels 0x{:02X} after reset",
                control
            )));
        }
        Ok(())
    }
}
