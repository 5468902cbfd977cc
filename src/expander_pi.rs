//! Expander Pi driver: MCP3208 8-channel ADC, MCP4822 DAC, MCP23017 IO
//! and DS1307 RTC on one board.
//!
//! The IO and RTC sections are the same chips as the IO Pi and RTC Pi and
//! reuse those drivers; both share the board's I2C bus.

use crate::adc_pi::InputMode;
use crate::consts::{ds1307, mcp23017, mcp3208 as regs};
use crate::convert::{check_vref, raw_to_voltage};
use crate::dac::{DacGain, Mcp4822};
use crate::error::Result;
use crate::i2c::BusTransport;
use crate::io_pi::IoPi;
use crate::mapper::BitMapper;
use crate::rtc_pi::RtcPi;
use crate::spi::SpiTransport;
use log::{debug, trace};

const CHANNELS: BitMapper = BitMapper::new("ADC channel", regs::CHANNELS, 1, 8);

/// MCP3208 on its own chip select.
#[derive(Debug)]
pub struct Mcp3208<S> {
    spi: S,
    vref: f64,
}

impl<S: SpiTransport> Mcp3208<S> {
    pub fn new(spi: S, vref: f64) -> Result<Self> {
        check_vref(vref)?;
        Ok(Self { spi, vref })
    }

    pub fn reference_voltage(&self) -> f64 {
        self.vref
    }

    /// Sets the reference voltage (4.096 V on-board, or an external one).
    pub fn set_reference_voltage(&mut self, vref: f64) -> Result<()> {
        check_vref(vref)?;
        debug!("Setting MCP3208 reference: {} V", vref);
        self.vref = vref;
        Ok(())
    }

    /// Reads the raw 12-bit code of `channel` (1-8).
    ///
    /// In differential mode odd channels read CHn-CHn+1 and even channels
    /// the reverse pair.
    pub fn read_raw(&mut self, channel: u8, mode: InputMode) -> Result<u16> {
        let position = CHANNELS.position(channel)?;
        let mut first = regs::START | (position >> 2);
        if mode == InputMode::SingleEnded {
            first |= regs::SINGLE_ENDED;
        }
        let mut buf = [first, (position & 0x03) << 6, 0x00];
        self.spi.transfer(&mut buf)?;
        let raw = (((buf[1] & 0x0F) as u16) << 8) | buf[2] as u16;
        trace!("MCP3208 channel {} raw {}", channel, raw);
        Ok(raw)
    }

    /// Reads `channel` (1-8) in volts.
    pub fn read_voltage(&mut self, channel: u8, mode: InputMode) -> Result<f64> {
        let raw = self.read_raw(channel, mode)?;
        raw_to_voltage(raw as u32, regs::BITS, self.vref)
    }

    /// Consumes the driver and returns the transport.
    pub fn release(self) -> S {
        self.spi
    }
}

/// Configuration for [`ExpanderPi`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpanderPiConfig {
    pub io_address: u8,
    pub rtc_address: u8,
    /// Reset every IO pin to input at start-up.
    pub io_initialise: bool,
    pub adc_vref: f64,
    pub dac_gain: DacGain,
}

impl Default for ExpanderPiConfig {
    fn default() -> Self {
        ExpanderPiConfig {
            io_address: mcp23017::DEFAULT_ADDRESS,
            rtc_address: ds1307::DEFAULT_ADDRESS,
            io_initialise: true,
            adc_vref: regs::DEFAULT_VREF,
            dac_gain: DacGain::X1,
        }
    }
}

impl ExpanderPiConfig {
    pub fn with_io_initialise(mut self, initialise: bool) -> Self {
        self.io_initialise = initialise;
        self
    }

    pub fn with_adc_vref(mut self, vref: f64) -> Self {
        self.adc_vref = vref;
        self
    }

    pub fn with_dac_gain(mut self, gain: DacGain) -> Self {
        self.dac_gain = gain;
        self
    }
}

/// All four sections of an Expander Pi.
///
/// `B` is the shared I2C transport (e.g. `&RefCell<HalI2c<_>>`), cloned
/// into the IO and RTC drivers.
#[derive(Debug)]
pub struct ExpanderPi<B, A, D> {
    pub adc: Mcp3208<A>,
    pub dac: Mcp4822<D>,
    pub io: IoPi<B>,
    pub rtc: RtcPi<B>,
}

impl<B, A, D> ExpanderPi<B, A, D>
where
    B: BusTransport + Clone,
    A: SpiTransport,
    D: SpiTransport,
{
    pub fn new(i2c: B, adc_spi: A, dac_spi: D, config: ExpanderPiConfig) -> Result<Self> {
        debug!("Initialising Expander Pi: {:?}", config);
        Ok(ExpanderPi {
            adc: Mcp3208::new(adc_spi, config.adc_vref)?,
            dac: Mcp4822::new(dac_spi, config.dac_gain),
            io: IoPi::new(i2c.clone(), config.io_address, config.io_initialise)?,
            rtc: RtcPi::new(i2c, config.rtc_address)?,
        })
    }
}
