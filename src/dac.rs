//! MCP4822 dual 12-bit DAC, shared by the ADC DAC Pi and Expander Pi.

use crate::consts::mcp4822 as regs;
use crate::convert::voltage_to_raw;
use crate::error::{out_of_range, value_out_of_range, Result};
use crate::mapper::BitMapper;
use crate::spi::SpiTransport;
use log::{debug, trace};

const CHANNELS: BitMapper = BitMapper::new("DAC channel", regs::CHANNELS, 1, 8);

/// Output amplifier gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DacGain {
    /// Full scale 2.048 V.
    #[default]
    X1,
    /// Full scale 4.096 V, limited by the 3.3 V supply.
    X2,
}

impl DacGain {
    pub fn factor(self) -> f64 {
        match self {
            DacGain::X1 => 1.0,
            DacGain::X2 => 2.0,
        }
    }
}

/// MCP4822 on its own chip select.
///
/// The chip is write-only, so the last code written to each channel is
/// kept here; it is updated only after the SPI transfer succeeded.
#[derive(Debug)]
pub struct Mcp4822<S> {
    spi: S,
    gain: DacGain,
    shadow: [Option<u16>; 2],
}

impl<S: SpiTransport> Mcp4822<S> {
    /// Creates the driver. No bus traffic is generated.
    pub fn new(spi: S, gain: DacGain) -> Self {
        Self {
            spi,
            gain,
            shadow: [None; 2],
        }
    }

    pub fn gain(&self) -> DacGain {
        self.gain
    }

    /// Selects the gain used by subsequent writes.
    pub fn set_gain(&mut self, gain: DacGain) {
        debug!("Setting DAC gain: {:?}", gain);
        self.gain = gain;
    }

    /// Highest voltage the output can reach with the current gain.
    pub fn max_voltage(&self) -> f64 {
        (regs::VREF * self.gain.factor()).min(regs::SUPPLY_VOLTAGE)
    }

    /// Last raw code written to `channel` (1-2), `None` if never written
    /// or shut down.
    pub fn last_raw(&self, channel: u8) -> Result<Option<u16>> {
        Ok(self.shadow[CHANNELS.position(channel)? as usize])
    }

    /// Consumes the driver and returns the transport.
    pub fn release(self) -> S {
        self.spi
    }

    fn send(&mut self, channel: u8, word: u16) -> Result<()> {
        let mut buf = word.to_be_bytes();
        trace!("DAC channel {} word 0x{:04X}", channel, word);
        self.spi.transfer(&mut buf)?;
        Ok(())
    }

    /// Writes a raw 12-bit code to `channel` (1-2).
    pub fn set_raw(&mut self, channel: u8, raw: u16) -> Result<()> {
        let position = CHANNELS.position(channel)?;
        if raw > regs::DATA_MASK {
            return Err(out_of_range(
                "DAC raw value",
                raw as u32,
                0,
                regs::DATA_MASK as u32,
            ));
        }
        let mut word = regs::ACTIVE | raw;
        if position == 1 {
            word |= regs::CHANNEL_B;
        }
        if self.gain == DacGain::X1 {
            word |= regs::GAIN_1X;
        }
        self.send(channel, word)?;
        self.shadow[position as usize] = Some(raw);
        Ok(())
    }

    /// Sets `channel` (1-2) to `voltage`. Returns the raw code written.
    ///
    /// Voltages outside `0.0..=max_voltage()` are rejected.
    pub fn set_voltage(&mut self, channel: u8, voltage: f64) -> Result<u16> {
        CHANNELS.position(channel)?;
        let max = self.max_voltage();
        if !(0.0..=max).contains(&voltage) {
            return Err(value_out_of_range(voltage, 0.0, max));
        }
        let raw = voltage_to_raw(voltage, regs::BITS, regs::VREF * self.gain.factor())? as u16;
        self.set_raw(channel, raw)?;
        Ok(raw)
    }

    /// Puts `channel` (1-2) into its high-impedance shutdown state.
    pub fn shutdown(&mut self, channel: u8) -> Result<()> {
        let position = CHANNELS.position(channel)?;
        let word = if position == 1 { regs::CHANNEL_B } else { 0 };
        self.send(channel, word)?;
        self.shadow[position as usize] = None;
        Ok(())
    }
}
