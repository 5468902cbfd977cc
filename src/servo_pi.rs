//! Servo Pi driver: 16-channel PCA9685 PWM controller with a servo
//! position layer on top.

use crate::consts::pca9685 as regs;
use crate::device::Device;
use crate::error::{value_out_of_range, Error, Result};
use crate::gpio::{GpioLevel, NoLines, OutputLines, Polarity};
use crate::i2c::{BusTransport, I2cAddress};
use crate::mapper::BitMapper;
use log::{debug, trace};
use std::thread;
use std::time::Duration;

const CHANNELS: BitMapper = BitMapper::new("channel", regs::CHANNELS, 1, 8);

// Oscillator start-up time after leaving sleep
const OSCILLATOR_SETTLE: Duration = Duration::from_micros(500);

/// Configuration for [`ServoPi`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoPiConfig {
    pub address: u8,
    /// PWM frequency applied at start-up, in Hz.
    pub frequency: f64,
    /// Pulse width at servo position 0, in milliseconds.
    pub low_limit_ms: f64,
    /// Pulse width at the last servo position, in milliseconds.
    pub high_limit_ms: f64,
    /// Stagger each channel's pulse start to spread the load on the supply.
    pub offset_enabled: bool,
    /// Id of the output-enable line (active low) on the attached [`OutputLines`].
    pub oe_line: u8,
}

impl Default for ServoPiConfig {
    fn default() -> Self {
        ServoPiConfig {
            address: regs::DEFAULT_ADDRESS,
            frequency: 50.0,
            low_limit_ms: 1.0,
            high_limit_ms: 2.0,
            offset_enabled: false,
            oe_line: 0,
        }
    }
}

impl ServoPiConfig {
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_limits(mut self, low_ms: f64, high_ms: f64) -> Self {
        self.low_limit_ms = low_ms;
        self.high_limit_ms = high_ms;
        self
    }

    pub fn with_offsets(mut self, enabled: bool) -> Self {
        self.offset_enabled = enabled;
        self
    }

    pub fn with_oe_line(mut self, line: u8) -> Self {
        self.oe_line = line;
        self
    }
}

/// Converts a PWM frequency to the PCA9685 prescale value.
/// Returns `Err` if the frequency is outside what the prescaler can produce.
pub fn frequency_to_prescale(frequency: f64) -> Result<u8> {
    let tick_hz = regs::OSCILLATOR_HZ / regs::COUNTER_STEPS as f64;
    let min_hz = tick_hz / 256.0;
    let max_hz = tick_hz / (regs::PRESCALE_MIN as f64 + 1.0);
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(value_out_of_range(frequency, min_hz, max_hz));
    }
    let prescale = (tick_hz / frequency).round() - 1.0;
    if prescale < regs::PRESCALE_MIN as f64 || prescale > 255.0 {
        return Err(value_out_of_range(frequency, min_hz, max_hz));
    }
    Ok(prescale as u8)
}

// Pulse limits must satisfy 0 <= low < high <= one PWM period
fn check_limits(low_ms: f64, high_ms: f64, frequency: f64) -> Result<()> {
    let period_ms = 1000.0 / frequency;
    if !(0.0..=period_ms).contains(&low_ms) {
        return Err(value_out_of_range(low_ms, 0.0, period_ms));
    }
    if !(low_ms..=period_ms).contains(&high_ms) {
        return Err(value_out_of_range(high_ms, low_ms, period_ms));
    }
    if high_ms == low_ms {
        return Err(Error::Configuration(format!(
            "Servo pulse limits must differ (both {} ms)",
            low_ms
        )));
    }
    Ok(())
}

/// Driver for a Servo Pi board.
///
/// `L` drives the board's output-enable line; boards without one use
/// [`NoLines`].
#[derive(Debug)]
pub struct ServoPi<B, L = NoLines> {
    device: Device<B>,
    lines: L,
    config: ServoPiConfig,
}

impl<B: BusTransport> ServoPi<B, NoLines> {
    /// Opens the board without output-enable control.
    pub fn new(bus: B, config: ServoPiConfig) -> Result<Self> {
        ServoPi::with_lines(bus, NoLines, config)
    }
}

impl<B: BusTransport, L: OutputLines> ServoPi<B, L> {
    /// Opens the board, resets MODE1/MODE2 and applies the configured frequency.
    ///
    /// The frequency and pulse limits are checked before anything is written.
    pub fn with_lines(bus: B, lines: L, config: ServoPiConfig) -> Result<Self> {
        frequency_to_prescale(config.frequency)?;
        check_limits(config.low_limit_ms, config.high_limit_ms, config.frequency)?;
        let mut device = Device::new(bus, I2cAddress::new(config.address)?);
        debug!("Initialising Servo Pi at {}", device.address());
        device.write_register(regs::REG_MODE1, regs::MODE1_DEFAULT)?;
        device.write_register(regs::REG_MODE2, regs::MODE2_DEFAULT)?;
        let mut servo = ServoPi {
            device,
            lines,
            config,
        };
        servo.set_pwm_freq(config.frequency)?;
        Ok(servo)
    }

    /// The underlying register device.
    pub fn device(&self) -> &Device<B> {
        &self.device
    }

    pub fn config(&self) -> &ServoPiConfig {
        &self.config
    }

    /// Consumes the driver and returns the transport and lines.
    pub fn release(self) -> (B, L) {
        (self.device.release(), self.lines)
    }

    // --- PWM ---

    /// Sets the PWM frequency of all channels.
    ///
    /// The prescaler can only be written while the oscillator sleeps, so
    /// this puts the chip to sleep, writes the prescaler, and restarts it.
    pub fn set_pwm_freq(&mut self, frequency: f64) -> Result<()> {
        let prescale = frequency_to_prescale(frequency)?;
        debug!(
            "Setting PWM frequency {} Hz (prescale {})",
            frequency, prescale
        );
        let old_mode = self.device.shadow(regs::REG_MODE1) & !regs::MODE1_RESTART;
        self.device
            .write_register(regs::REG_MODE1, old_mode | regs::MODE1_SLEEP)?;
        self.device.write_register(regs::REG_PRE_SCALE, prescale)?;
        self.device.write_register(regs::REG_MODE1, old_mode)?;
        thread::sleep(OSCILLATOR_SETTLE);
        self.device
            .write_register(regs::REG_MODE1, old_mode | regs::MODE1_RESTART)?;
        self.config.frequency = frequency;
        Ok(())
    }

    /// Frequency last applied with [`ServoPi::set_pwm_freq`].
    pub fn frequency(&self) -> f64 {
        self.config.frequency
    }

    fn check_count(count: u16) -> Result<()> {
        if count > regs::MAX_COUNT {
            return Err(value_out_of_range(
                count as f64,
                0.0,
                regs::MAX_COUNT as f64,
            ));
        }
        Ok(())
    }

    fn channel_reg(channel: u8) -> Result<u8> {
        Ok(regs::REG_LED0_ON_L + 4 * CHANNELS.position(channel)?)
    }

    /// Sets the on and off counts (0-4095) of `channel` (1-16).
    pub fn set_pwm(&mut self, channel: u8, on: u16, off: u16) -> Result<()> {
        let reg = Self::channel_reg(channel)?;
        Self::check_count(on)?;
        Self::check_count(off)?;
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        trace!("Channel {} PWM on={} off={}", channel, on, off);
        self.device.write_registers(reg, &[on_l, on_h, off_l, off_h])
    }

    /// Reads back the on and off registers of `channel` (1-16).
    ///
    /// Bit 12 of each value is the full-on / full-off flag.
    pub fn get_pwm(&mut self, channel: u8) -> Result<(u16, u16)> {
        let reg = Self::channel_reg(channel)?;
        let mut buf = [0u8; 4];
        self.device.read_registers(reg, &mut buf)?;
        Ok((
            u16::from_le_bytes([buf[0], buf[1]]),
            u16::from_le_bytes([buf[2], buf[3]]),
        ))
    }

    /// Sets the on and off counts of every channel at once.
    pub fn set_all_pwm(&mut self, on: u16, off: u16) -> Result<()> {
        Self::check_count(on)?;
        Self::check_count(off)?;
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        debug!("All channels PWM on={} off={}", on, off);
        self.device
            .write_registers(regs::REG_ALL_LED_ON_L, &[on_l, on_h, off_l, off_h])
    }

    /// Drives `channel` (1-16) permanently high.
    pub fn set_pwm_full_on(&mut self, channel: u8) -> Result<()> {
        let reg = Self::channel_reg(channel)?;
        self.device
            .write_registers(reg, &[0x00, regs::FULL_FLAG, 0x00, 0x00])
    }

    /// Drives `channel` (1-16) permanently low.
    pub fn set_pwm_full_off(&mut self, channel: u8) -> Result<()> {
        let reg = Self::channel_reg(channel)?;
        self.device
            .write_registers(reg, &[0x00, 0x00, 0x00, regs::FULL_FLAG])
    }

    /// Inverts the logic of every output (for external drivers).
    pub fn invert_output(&mut self, invert: bool) -> Result<()> {
        debug!("Setting MODE2 invert: {}", invert);
        self.device
            .write_bit(regs::REG_MODE2, regs::MODE2_INVERT, invert)?;
        Ok(())
    }

    /// Output polarity configured in MODE2 (from the shadow).
    pub fn output_polarity(&self) -> Polarity {
        if self.device.shadow(regs::REG_MODE2) & regs::MODE2_INVERT != 0 {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        }
    }

    /// Puts the oscillator to sleep; outputs stop.
    pub fn sleep(&mut self) -> Result<()> {
        // Writing RESTART back as 1 would clear it on the chip
        let mode = self.device.shadow(regs::REG_MODE1) & !regs::MODE1_RESTART;
        self.device
            .write_register(regs::REG_MODE1, mode | regs::MODE1_SLEEP)
    }

    /// Wakes the oscillator.
    pub fn wake(&mut self) -> Result<()> {
        let mode = self.device.shadow(regs::REG_MODE1)
            & !(regs::MODE1_SLEEP | regs::MODE1_RESTART);
        self.device.write_register(regs::REG_MODE1, mode)
    }

    /// Whether the oscillator is asleep (from the shadow).
    pub fn is_sleeping(&self) -> bool {
        self.device.shadow(regs::REG_MODE1) & regs::MODE1_SLEEP != 0
    }

    // --- Output enable ---

    /// Enables the outputs by pulling the OE line low.
    pub fn output_enable(&mut self) -> Result<()> {
        self.lines.set_line(self.config.oe_line, GpioLevel::Low)
    }

    /// Disables the outputs by pulling the OE line high.
    pub fn output_disable(&mut self) -> Result<()> {
        self.lines.set_line(self.config.oe_line, GpioLevel::High)
    }

    // --- Servo layer ---

    // Pulse limits converted to counts at the current frequency
    fn limit_counts(&self) -> (f64, f64) {
        let period_ms = 1000.0 / self.config.frequency;
        let steps = regs::COUNTER_STEPS as f64;
        (
            self.config.low_limit_ms * steps / period_ms,
            self.config.high_limit_ms * steps / period_ms,
        )
    }

    fn channel_offset(&self, channel: u8) -> Result<u16> {
        let position = CHANNELS.position(channel)? as u16;
        Ok(if self.config.offset_enabled {
            position * (regs::COUNTER_STEPS / regs::CHANNELS as u16)
        } else {
            0
        })
    }

    /// Sets the servo pulse limits in milliseconds.
    ///
    /// Both must lie within one PWM period and `high_ms` must exceed `low_ms`.
    pub fn set_servo_limits(&mut self, low_ms: f64, high_ms: f64) -> Result<()> {
        check_limits(low_ms, high_ms, self.config.frequency)?;
        self.config.low_limit_ms = low_ms;
        self.config.high_limit_ms = high_ms;
        Ok(())
    }

    /// Moves the servo on `channel` (1-16) to `position` out of `steps`.
    ///
    /// Position 0 produces the low pulse limit, `steps` the high limit.
    pub fn move_servo(&mut self, channel: u8, position: u32, steps: u32) -> Result<()> {
        let offset = self.channel_offset(channel)?;
        if steps == 0 || position > steps {
            return Err(value_out_of_range(position as f64, 0.0, steps as f64));
        }
        let (low, high) = self.limit_counts();
        let width = ((high - low) / steps as f64 * position as f64 + low).trunc();
        // Limits longer than the period at the current frequency overrun the counter
        let off = offset as f64 + width;
        if off > regs::MAX_COUNT as f64 {
            return Err(value_out_of_range(off, 0.0, regs::MAX_COUNT as f64));
        }
        self.set_pwm(channel, offset, off as u16)
    }

    /// Reads back the servo position of `channel` (1-16) out of `steps`.
    pub fn get_servo_position(&mut self, channel: u8, steps: u32) -> Result<u32> {
        if steps == 0 {
            return Err(value_out_of_range(0.0, 1.0, u32::MAX as f64));
        }
        let (on, off) = self.get_pwm(channel)?;
        let width = (off & regs::MAX_COUNT) as f64 - (on & regs::MAX_COUNT) as f64;
        let (low, high) = self.limit_counts();
        let position = ((width - low) / ((high - low) / steps as f64)).round();
        Ok(position.clamp(0.0, steps as f64) as u32)
    }
}
