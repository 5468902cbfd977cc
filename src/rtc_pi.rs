//! RTC Pi driver: DS1307 real-time clock with square-wave output and
//! 56 bytes of battery-backed RAM.

use crate::consts::ds1307 as regs;
use crate::convert::{bcd_to_dec, dec_to_bcd};
use crate::device::Device;
use crate::error::{out_of_range, value_out_of_range, Result};
use crate::i2c::{BusTransport, I2cAddress};
use log::debug;
use time::{Date, Month, PrimitiveDateTime, Time};

/// Square-wave output frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareWave {
    Hz1,
    Hz4096,
    Hz8192,
    Hz32768,
}

impl SquareWave {
    /// Maps the board's 1-4 frequency selector.
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            1 => Ok(SquareWave::Hz1),
            2 => Ok(SquareWave::Hz4096),
            3 => Ok(SquareWave::Hz8192),
            4 => Ok(SquareWave::Hz32768),
            _ => Err(out_of_range("frequency", index as u32, 1, 4)),
        }
    }

    fn rate_select(self) -> u8 {
        match self {
            SquareWave::Hz1 => 0b00,
            SquareWave::Hz4096 => 0b01,
            SquareWave::Hz8192 => 0b10,
            SquareWave::Hz32768 => 0b11,
        }
    }
}

/// One DS1307 on an RTC Pi or Expander Pi board.
#[derive(Debug)]
pub struct RtcPi<B> {
    device: Device<B>,
    century: i32,
}

impl<B: BusTransport> RtcPi<B> {
    /// Opens the clock at `address` (0x68) and writes the default
    /// control register (output off, 32.768 kHz selected).
    pub fn new(bus: B, address: u8) -> Result<Self> {
        let mut device = Device::new(bus, I2cAddress::new(address)?);
        device.write_register(regs::REG_CONTROL, regs::CONTROL_DEFAULT)?;
        Ok(RtcPi {
            device,
            century: regs::DEFAULT_CENTURY,
        })
    }

    /// The underlying register device.
    pub fn device(&self) -> &Device<B> {
        &self.device
    }

    /// Consumes the driver and returns the transport.
    pub fn release(self) -> B {
        self.device.release()
    }

    /// First year of the century the two-digit year register counts from.
    pub fn century(&self) -> i32 {
        self.century
    }

    pub fn set_century(&mut self, century: i32) {
        self.century = century;
    }

    // --- Date and time ---

    /// Sets the clock and starts it (clears the clock-halt bit).
    ///
    /// The year must lie within the configured century.
    pub fn set_date(&mut self, date: PrimitiveDateTime) -> Result<()> {
        let year = date.year();
        if year < self.century || year > self.century + 99 {
            return Err(value_out_of_range(
                year as f64,
                self.century as f64,
                (self.century + 99) as f64,
            ));
        }
        let data = [
            dec_to_bcd(date.second())?,
            dec_to_bcd(date.minute())?,
            dec_to_bcd(date.hour())?,
            date.weekday().number_from_sunday(),
            dec_to_bcd(date.day())?,
            dec_to_bcd(u8::from(date.month()))?,
            dec_to_bcd((year - self.century) as u8)?,
        ];
        debug!("Setting RTC date: {}", date);
        self.device.write_registers(regs::REG_SECONDS, &data)
    }

    /// Reads the current date and time.
    pub fn read_date(&mut self) -> Result<PrimitiveDateTime> {
        let mut buf = [0u8; regs::DATE_LEN];
        self.device.read_registers(regs::REG_SECONDS, &mut buf)?;
        let second = bcd_to_dec(buf[0] & !regs::CLOCK_HALT);
        let minute = bcd_to_dec(buf[1] & 0x7F);
        let hour = decode_hour(buf[2]);
        let day = bcd_to_dec(buf[4] & 0x3F);
        let month = bcd_to_dec(buf[5] & 0x1F);
        let year = self.century + bcd_to_dec(buf[6]) as i32;

        let date = Date::from_calendar_date(year, Month::try_from(month)?, day)?;
        let time = Time::from_hms(hour, minute, second)?;
        Ok(PrimitiveDateTime::new(date, time))
    }

    /// Whether the oscillator is running (clock-halt bit clear).
    pub fn is_running(&mut self) -> Result<bool> {
        let seconds = self.device.read_register(regs::REG_SECONDS)?;
        Ok(seconds & regs::CLOCK_HALT == 0)
    }

    // --- Square-wave output ---

    /// Enables the square-wave output pin.
    pub fn enable_output(&mut self) -> Result<()> {
        let mask = regs::CONTROL_OUT | regs::CONTROL_SQWE;
        debug!("Enabling RTC square-wave output");
        self.device.write_masked(regs::REG_CONTROL, mask, mask)?;
        Ok(())
    }

    /// Disables the square-wave output pin (driven low).
    pub fn disable_output(&mut self) -> Result<()> {
        let mask = regs::CONTROL_OUT | regs::CONTROL_SQWE;
        debug!("Disabling RTC square-wave output");
        self.device.write_masked(regs::REG_CONTROL, mask, 0)?;
        Ok(())
    }

    /// Selects the square-wave frequency.
    pub fn set_frequency(&mut self, frequency: SquareWave) -> Result<()> {
        debug!("Setting RTC square-wave frequency: {:?}", frequency);
        self.device.write_masked(
            regs::REG_CONTROL,
            regs::CONTROL_RS_MASK,
            frequency.rate_select(),
        )?;
        Ok(())
    }

    /// Last value written to the control register.
    pub fn control_register(&self) -> u8 {
        self.device.shadow(regs::REG_CONTROL)
    }

    // --- Battery-backed RAM ---

    fn check_memory(address: u8, len: usize) -> Result<()> {
        let end = address as usize + len.max(1) - 1;
        if address < regs::RAM_START || address > regs::RAM_END {
            return Err(out_of_range(
                "memory address",
                address as u32,
                regs::RAM_START as u32,
                regs::RAM_END as u32,
            ));
        }
        if end > regs::RAM_END as usize {
            return Err(out_of_range(
                "memory address",
                end as u32,
                regs::RAM_START as u32,
                regs::RAM_END as u32,
            ));
        }
        Ok(())
    }

    /// Reads RAM starting at `address` (0x08-0x3F).
    pub fn read_memory(&mut self, address: u8, buffer: &mut [u8]) -> Result<()> {
        Self::check_memory(address, buffer.len())?;
        if buffer.is_empty() {
            return Ok(());
        }
        self.device.read_registers(address, buffer)
    }

    /// Writes RAM starting at `address` (0x08-0x3F).
    pub fn write_memory(&mut self, address: u8, data: &[u8]) -> Result<()> {
        Self::check_memory(address, data.len())?;
        if data.is_empty() {
            return Ok(());
        }
        self.device.write_registers(address, data)
    }
}

// Hours register in either 24-hour or 12-hour (AM/PM) format
fn decode_hour(value: u8) -> u8 {
    if value & regs::HOUR_12 != 0 {
        let hour = bcd_to_dec(value & 0x1F) % 12;
        if value & regs::HOUR_PM != 0 {
            hour + 12
        } else {
            hour
        }
    } else {
        bcd_to_dec(value & 0x3F)
    }
}
