//! ADC DAC Pi driver: MCP3202 2-channel ADC and MCP4822 2-channel DAC,
//! both 12-bit, each on its own SPI chip select.

use crate::adc_pi::InputMode;
use crate::consts::mcp3202 as regs;
use crate::convert::{check_vref, raw_to_voltage};
use crate::dac::{DacGain, Mcp4822};
use crate::error::Result;
use crate::mapper::BitMapper;
use crate::spi::SpiTransport;
use log::{debug, trace};

const CHANNELS: BitMapper = BitMapper::new("ADC channel", regs::CHANNELS, 1, 8);

/// MCP3202 on its own chip select.
#[derive(Debug)]
pub struct Mcp3202<S> {
    spi: S,
    vref: f64,
}

impl<S: SpiTransport> Mcp3202<S> {
    pub fn new(spi: S, vref: f64) -> Result<Self> {
        check_vref(vref)?;
        Ok(Self { spi, vref })
    }

    pub fn reference_voltage(&self) -> f64 {
        self.vref
    }

    /// Sets the reference voltage used for conversions (the supply rail).
    pub fn set_reference_voltage(&mut self, vref: f64) -> Result<()> {
        check_vref(vref)?;
        debug!("Setting MCP3202 reference: {} V", vref);
        self.vref = vref;
        Ok(())
    }

    /// Reads the raw 12-bit code of `channel` (1-2).
    ///
    /// In differential mode channel 1 reads CH0-CH1 and channel 2 reads
    /// CH1-CH0; a negative difference reads as 0.
    pub fn read_raw(&mut self, channel: u8, mode: InputMode) -> Result<u16> {
        let position = CHANNELS.position(channel)?;
        let mut control = regs::MSB_FIRST | (position << regs::CHANNEL_SHIFT);
        if mode == InputMode::SingleEnded {
            control |= regs::SINGLE_ENDED;
        }
        let mut buf = [regs::START, control, 0x00];
        self.spi.transfer(&mut buf)?;
        let raw = (((buf[1] & 0x0F) as u16) << 8) | buf[2] as u16;
        trace!("MCP3202 channel {} raw {}", channel, raw);
        Ok(raw)
    }

    /// Reads `channel` (1-2) in volts.
    pub fn read_voltage(&mut self, channel: u8, mode: InputMode) -> Result<f64> {
        let raw = self.read_raw(channel, mode)?;
        raw_to_voltage(raw as u32, regs::BITS, self.vref)
    }

    /// Consumes the driver and returns the transport.
    pub fn release(self) -> S {
        self.spi
    }
}

/// Configuration for [`AdcDacPi`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcDacPiConfig {
    /// ADC reference (the board's 3.3 V rail unless measured otherwise).
    pub adc_vref: f64,
    pub dac_gain: DacGain,
}

impl Default for AdcDacPiConfig {
    fn default() -> Self {
        AdcDacPiConfig {
            adc_vref: regs::DEFAULT_VREF,
            dac_gain: DacGain::X1,
        }
    }
}

impl AdcDacPiConfig {
    pub fn with_adc_vref(mut self, vref: f64) -> Self {
        self.adc_vref = vref;
        self
    }

    pub fn with_dac_gain(mut self, gain: DacGain) -> Self {
        self.dac_gain = gain;
        self
    }
}

/// Driver for an ADC DAC Pi board.
///
/// `adc_spi` must select CE0 (MCP3202), `dac_spi` CE1 (MCP4822).
#[derive(Debug)]
pub struct AdcDacPi<A, D> {
    adc: Mcp3202<A>,
    dac: Mcp4822<D>,
}

impl<A: SpiTransport, D: SpiTransport> AdcDacPi<A, D> {
    pub fn new(adc_spi: A, dac_spi: D, config: AdcDacPiConfig) -> Result<Self> {
        Ok(AdcDacPi {
            adc: Mcp3202::new(adc_spi, config.adc_vref)?,
            dac: Mcp4822::new(dac_spi, config.dac_gain),
        })
    }

    pub fn adc(&mut self) -> &mut Mcp3202<A> {
        &mut self.adc
    }

    pub fn dac(&mut self) -> &mut Mcp4822<D> {
        &mut self.dac
    }

    /// Reads the raw code of ADC `channel` (1-2).
    pub fn read_adc_raw(&mut self, channel: u8, mode: InputMode) -> Result<u16> {
        self.adc.read_raw(channel, mode)
    }

    /// Reads ADC `channel` (1-2) in volts.
    pub fn read_adc_voltage(&mut self, channel: u8, mode: InputMode) -> Result<f64> {
        self.adc.read_voltage(channel, mode)
    }

    pub fn set_adc_refvoltage(&mut self, vref: f64) -> Result<()> {
        self.adc.set_reference_voltage(vref)
    }

    /// Writes a raw code to DAC `channel` (1-2).
    pub fn set_dac_raw(&mut self, channel: u8, raw: u16) -> Result<()> {
        self.dac.set_raw(channel, raw)
    }

    /// Sets DAC `channel` (1-2) to `voltage`.
    pub fn set_dac_voltage(&mut self, channel: u8, voltage: f64) -> Result<u16> {
        self.dac.set_voltage(channel, voltage)
    }

    pub fn set_dac_gain(&mut self, gain: DacGain) {
        self.dac.set_gain(gain)
    }

    /// Consumes the driver and returns both transports.
    pub fn release(self) -> (A, D) {
        (self.adc.release(), self.dac.release())
    }
}
