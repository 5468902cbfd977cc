//! ADC Pi / ADC Differential Pi driver: 8 channels on two MCP3424
//! delta-sigma converters.
//!
//! Channels 1-4 live on the first chip, 5-8 on the second. Each chip is
//! register-less: the driver writes a single configuration byte and reads
//! back 3 or 4 bytes (data plus status). The last configuration written
//! to each chip is shadowed so channel changes in continuous mode cost one
//! bus write only when the channel actually changes.

use crate::consts::mcp3424 as regs;
use crate::convert::{signed_from_raw, signed_to_voltage};
use crate::error::{BusError, Error, Result};
use crate::i2c::{BusTransport, I2cAddress};
use crate::mapper::BitMapper;
use crate::shadow::replace_bits;
use log::{debug, trace};
use std::time::{Duration, Instant};

const CHANNELS: BitMapper = BitMapper::new(
    "channel",
    2 * regs::CHANNELS_PER_CHIP,
    1,
    regs::CHANNELS_PER_CHIP,
);

/// Conversion resolution (and with it, sample rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitRate {
    /// 12 bits, 240 samples per second.
    Bits12,
    /// 14 bits, 60 samples per second.
    Bits14,
    /// 16 bits, 15 samples per second.
    Bits16,
    /// 18 bits, 3.75 samples per second.
    Bits18,
}

impl BitRate {
    /// Resolution in bits, including the sign bit.
    pub fn bits(self) -> u8 {
        match self {
            BitRate::Bits12 => 12,
            BitRate::Bits14 => 14,
            BitRate::Bits16 => 16,
            BitRate::Bits18 => 18,
        }
    }

    fn config_bits(self) -> u8 {
        let code = match self {
            BitRate::Bits12 => 0b00,
            BitRate::Bits14 => 0b01,
            BitRate::Bits16 => 0b10,
            BitRate::Bits18 => 0b11,
        };
        code << regs::CONFIG_RATE_SHIFT
    }

    /// Time one conversion takes.
    pub fn sample_period(self) -> Duration {
        match self {
            BitRate::Bits12 => Duration::from_micros(4_167),
            BitRate::Bits14 => Duration::from_micros(16_667),
            BitRate::Bits16 => Duration::from_micros(66_667),
            BitRate::Bits18 => Duration::from_micros(266_667),
        }
    }

    // Number of data bytes preceding the status byte
    fn data_len(self) -> usize {
        if self == BitRate::Bits18 {
            3
        } else {
            2
        }
    }
}

/// Programmable gain amplifier setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgaGain {
    X1,
    X2,
    X4,
    X8,
}

impl PgaGain {
    pub fn factor(self) -> f64 {
        match self {
            PgaGain::X1 => 1.0,
            PgaGain::X2 => 2.0,
            PgaGain::X4 => 4.0,
            PgaGain::X8 => 8.0,
        }
    }

    fn config_bits(self) -> u8 {
        match self {
            PgaGain::X1 => 0b00,
            PgaGain::X2 => 0b01,
            PgaGain::X4 => 0b10,
            PgaGain::X8 => 0b11,
        }
    }
}

/// Conversion mode of both chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMode {
    /// A conversion is started for every read.
    OneShot,
    /// The chip converts continuously; reads return the latest result.
    Continuous,
}

/// How negative readings are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// ADC Pi: inputs are referenced to ground, negative codes read as 0 V.
    SingleEnded,
    /// ADC Differential Pi: signed readings.
    Differential,
}

/// Configuration for [`AdcPi`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcPiConfig {
    /// Address of the chip serving channels 1-4.
    pub address_1: u8,
    /// Address of the chip serving channels 5-8.
    pub address_2: u8,
    pub bit_rate: BitRate,
    pub pga: PgaGain,
    pub conversion_mode: ConversionMode,
    pub input_mode: InputMode,
    /// Gain of the board's input network, applied to every voltage.
    pub input_scale: f64,
    /// Upper bound on waiting for a conversion; `None` waits 100 sample periods.
    pub conversion_timeout: Option<Duration>,
}

impl Default for AdcPiConfig {
    fn default() -> Self {
        AdcPiConfig {
            address_1: regs::DEFAULT_ADDRESS_1,
            address_2: regs::DEFAULT_ADDRESS_2,
            bit_rate: BitRate::Bits18,
            pga: PgaGain::X1,
            conversion_mode: ConversionMode::Continuous,
            input_mode: InputMode::SingleEnded,
            input_scale: regs::ADC_PI_INPUT_SCALE,
            conversion_timeout: None,
        }
    }
}

impl AdcPiConfig {
    /// Defaults for the ADC Differential Pi (signed readings, no input divider).
    pub fn differential() -> Self {
        AdcPiConfig {
            input_mode: InputMode::Differential,
            input_scale: 1.0,
            ..Self::default()
        }
    }

    pub fn with_addresses(mut self, address_1: u8, address_2: u8) -> Self {
        self.address_1 = address_1;
        self.address_2 = address_2;
        self
    }

    pub fn with_bit_rate(mut self, bit_rate: BitRate) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    pub fn with_pga(mut self, pga: PgaGain) -> Self {
        self.pga = pga;
        self
    }

    pub fn with_conversion_mode(mut self, mode: ConversionMode) -> Self {
        self.conversion_mode = mode;
        self
    }

    pub fn with_input_scale(mut self, scale: f64) -> Self {
        self.input_scale = scale;
        self
    }

    pub fn with_conversion_timeout(mut self, timeout: Duration) -> Self {
        self.conversion_timeout = Some(timeout);
        self
    }
}

/// Driver for an ADC Pi board (two MCP3424s).
#[derive(Debug)]
pub struct AdcPi<B> {
    bus: B,
    addresses: [I2cAddress; 2],
    config: AdcPiConfig,
    // Last configuration byte successfully written to each chip
    shadow: [Option<u8>; 2],
}

impl<B: BusTransport> AdcPi<B> {
    /// Creates the driver and writes the initial configuration to both chips
    /// (channel 1 and 5 selected).
    pub fn new(bus: B, config: AdcPiConfig) -> Result<Self> {
        if !(config.input_scale.is_finite() && config.input_scale > 0.0) {
            return Err(Error::Configuration(format!(
                "input scale {} must be positive",
                config.input_scale
            )));
        }
        let addresses = [
            I2cAddress::new(config.address_1)?,
            I2cAddress::new(config.address_2)?,
        ];
        let mut adc = AdcPi {
            bus,
            addresses,
            config,
            shadow: [None; 2],
        };
        debug!(
            "Initialising ADC Pi at {}/{}: {:?}",
            addresses[0], addresses[1], config
        );
        adc.write_settings()?;
        Ok(adc)
    }

    /// The active configuration.
    pub fn config(&self) -> &AdcPiConfig {
        &self.config
    }

    /// Last configuration byte written to chip `chip` (0 or 1).
    pub fn config_register(&self, chip: usize) -> Option<u8> {
        self.shadow.get(chip).copied().flatten()
    }

    /// Consumes the driver and returns the transport.
    pub fn release(self) -> B {
        self.bus
    }

    // Configuration byte for `chip_channel` (0-3) without the RDY bit
    fn config_byte(&self, chip_channel: u8) -> u8 {
        let mut value = self.config.bit_rate.config_bits() | self.config.pga.config_bits();
        if self.config.conversion_mode == ConversionMode::Continuous {
            value |= regs::CONFIG_CONTINUOUS;
        }
        replace_bits(
            value,
            regs::CONFIG_CHANNEL_MASK,
            chip_channel << regs::CONFIG_CHANNEL_SHIFT,
        )
    }

    fn write_config(&mut self, chip: usize, value: u8) -> Result<()> {
        let address = self.addresses[chip];
        trace!("Writing {} config 0x{:02X}", address, value);
        self.bus.write(address.value(), &[value])?;
        self.shadow[chip] = Some(value & !regs::CONFIG_RDY);
        Ok(())
    }

    // Re-writes both chips, keeping each chip's selected channel
    fn write_settings(&mut self) -> Result<()> {
        for chip in 0..2 {
            let channel = self.shadow[chip]
                .map(|v| (v & regs::CONFIG_CHANNEL_MASK) >> regs::CONFIG_CHANNEL_SHIFT)
                .unwrap_or(0);
            let value = self.config_byte(channel);
            self.write_config(chip, value)?;
        }
        Ok(())
    }

    // --- Settings ---

    /// Sets the PGA gain on both chips.
    pub fn set_pga(&mut self, pga: PgaGain) -> Result<()> {
        debug!("Setting ADC Pi PGA: {:?}", pga);
        self.config.pga = pga;
        self.write_settings()
    }

    /// Sets the resolution on both chips.
    pub fn set_bit_rate(&mut self, bit_rate: BitRate) -> Result<()> {
        debug!("Setting ADC Pi bit rate: {:?}", bit_rate);
        self.config.bit_rate = bit_rate;
        self.write_settings()
    }

    /// Sets one-shot or continuous conversion on both chips.
    pub fn set_conversion_mode(&mut self, mode: ConversionMode) -> Result<()> {
        debug!("Setting ADC Pi conversion mode: {:?}", mode);
        self.config.conversion_mode = mode;
        self.write_settings()
    }

    // --- Reading ---

    /// Reads the signed raw code of `channel` (1-8).
    ///
    /// In single-ended mode a negative code means the input is below ground.
    pub fn read_raw(&mut self, channel: u8) -> Result<i32> {
        let bit = CHANNELS.map(channel)?;
        let chip = bit.offset as usize;
        let address = self.addresses[chip];
        let value = self.config_byte(bit.bit());

        match self.config.conversion_mode {
            ConversionMode::OneShot => self.write_config(chip, value | regs::CONFIG_RDY)?,
            ConversionMode::Continuous => {
                if self.shadow[chip] != Some(value) {
                    self.write_config(chip, value)?;
                }
            }
        }

        let bit_rate = self.config.bit_rate;
        let timeout = self
            .config
            .conversion_timeout
            .unwrap_or(bit_rate.sample_period() * 100);
        let deadline = Instant::now() + timeout;
        let data_len = bit_rate.data_len();
        let mut buf = [0u8; 4];
        loop {
            self.bus.read(address.value(), &mut buf[..=data_len])?;
            if buf[data_len] & regs::CONFIG_RDY == 0 {
                break;
            }
            if Instant::now() > deadline {
                return Err(BusError::Timeout {
                    address: address.value(),
                }
                .into());
            }
        }
        trace!(
            "ADC Pi channel {} data: {:02X?}",
            channel,
            &buf[..=data_len]
        );

        let raw = match bit_rate {
            BitRate::Bits18 => {
                ((buf[0] as u32 & 0x03) << 16) | ((buf[1] as u32) << 8) | buf[2] as u32
            }
            BitRate::Bits16 => ((buf[0] as u32) << 8) | buf[1] as u32,
            BitRate::Bits14 => ((buf[0] as u32 & 0x3F) << 8) | buf[1] as u32,
            BitRate::Bits12 => ((buf[0] as u32 & 0x0F) << 8) | buf[1] as u32,
        };
        signed_from_raw(raw, bit_rate.bits())
    }

    /// Reads `channel` (1-8) in volts at the board input.
    pub fn read_voltage(&mut self, channel: u8) -> Result<f64> {
        let code = self.read_raw(channel)?;
        if code < 0 && self.config.input_mode == InputMode::SingleEnded {
            return Ok(0.0);
        }
        let volts = signed_to_voltage(code, self.config.bit_rate.bits(), regs::VREF)?;
        Ok(volts / self.config.pga.factor() * self.config.input_scale)
    }
}
