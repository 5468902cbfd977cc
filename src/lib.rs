//! # pi-board-drivers
//!
//! Register-level drivers for Raspberry Pi add-on boards built around
//! common I²C and SPI peripheral chips: ADCs, DACs, an IO expander, a
//! real-time clock, a PWM servo controller and an I²C multiplexer.
//!
//! Every driver is a thin layer over one shared core:
//!
//! *   [`BitMapper`] maps a caller-facing channel/pin/port number to a
//!     register offset and bit mask, rejecting invalid numbers before any
//!     bus traffic.
//! *   [`Device`] performs register reads and writes through an injected
//!     [`BusTransport`] and keeps a [`RegisterShadow`] of configuration
//!     registers. Single-bit changes read the shadow (never the chip) and
//!     commit the new byte only after the bus write succeeded.
//! *   [`convert`] turns raw codes into volts (and back), register bits into
//!     levels under a polarity, and BCD into decimal.
//!
//! ## Boards
//!
//! *   [`AdcPi`] - 8 channels on two MCP3424 (also the ADC Differential Pi).
//! *   [`AdcDacPi`] - MCP3202 ADC and MCP4822 DAC over SPI.
//! *   [`ExpanderPi`] - MCP3208 ADC, MCP4822 DAC, MCP23017 IO, DS1307 RTC.
//! *   [`IoPi`] - 16 pins on an MCP23017.
//! *   [`RtcPi`] - DS1307 clock, square-wave output and battery-backed RAM.
//! *   [`ServoPi`] - 16-channel PCA9685 PWM with a servo position layer.
//! *   [`I2cSwitch`] - PCA9546A 4-channel I²C multiplexer.
//!
//! ## Transports
//!
//! The drivers never open a bus themselves. Pass any [`BusTransport`] (or
//! [`SpiTransport`]) when constructing a driver:
//!
//! *   [`HalI2c`] / [`HalSpi`] adapt any `embedded-hal` 1.0 bus, such as
//!     `rppal` on a Raspberry Pi.
//! *   `&mut T` lends a transport to one driver at a time.
//! *   `&RefCell<T>` shares one transport between several drivers; each
//!     transaction completes before the next one starts.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use pi_board_drivers::{GpioDirection, GpioLevel, HalI2c, IoPi, Result};
//! use rppal::i2c::I2c;
//!
//! fn main() -> Result<()> {
//!     let i2c = I2c::new().expect("open /dev/i2c-1");
//!     let mut io = IoPi::new(HalI2c::new(i2c), 0x20, true)?;
//!
//!     io.set_pin_direction(1, GpioDirection::Output)?;
//!     io.write_pin(1, GpioLevel::High)?;
//!     println!("Pin 9 reads {:?}", io.read_pin(9)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`Result`]. Invalid indices fail with
//! [`Error::OutOfRange`] and unrepresentable values with
//! [`Error::ValueOutOfRange`], both before touching the bus. Transport
//! failures surface as [`Error::Bus`] unchanged; nothing is retried.

mod consts;
mod error;

pub mod adc_dac_pi;
pub mod adc_pi;
pub mod convert;
pub mod dac;
pub mod device;
pub mod expander_pi;
pub mod gpio;
pub mod i2c;
pub mod i2c_switch;
pub mod io_pi;
pub mod mapper;
pub mod rtc_pi;
pub mod servo_pi;
pub mod shadow;
pub mod spi;

pub use error::{BusError, Error, Result};

pub use device::Device;
pub use gpio::{GpioDirection, GpioLevel, HalLines, NoLines, OutputLines, Polarity};
pub use i2c::{BusTransport, HalI2c, I2cAddress};
pub use mapper::{BitAddress, BitMapper};
pub use shadow::RegisterShadow;
pub use spi::{HalSpi, SpiTransport};

pub use adc_dac_pi::{AdcDacPi, AdcDacPiConfig, Mcp3202};
pub use adc_pi::{AdcPi, AdcPiConfig, BitRate, ConversionMode, InputMode, PgaGain};
pub use dac::{DacGain, Mcp4822};
pub use expander_pi::{ExpanderPi, ExpanderPiConfig, Mcp3208};
pub use i2c_switch::I2cSwitch;
pub use io_pi::IoPi;
pub use rtc_pi::{RtcPi, SquareWave};
pub use servo_pi::{ServoPi, ServoPiConfig};

/// Default bus addresses of the supported boards.
pub mod addresses {
    pub use crate::consts::ds1307::DEFAULT_ADDRESS as RTC_PI;
    pub use crate::consts::mcp23017::DEFAULT_ADDRESS as IO_PI;
    pub use crate::consts::mcp3424::{DEFAULT_ADDRESS_1 as ADC_PI_1, DEFAULT_ADDRESS_2 as ADC_PI_2};
    pub use crate::consts::pca9546::DEFAULT_ADDRESS as I2C_SWITCH;
    pub use crate::consts::pca9685::DEFAULT_ADDRESS as SERVO_PI;
}
