//! Conversions between raw register bits and engineering units.
//!
//! ADC and DAC conversions are linear: `voltage = raw * vref / (2^bits - 1)`.
//! Values that cannot be represented are rejected, never wrapped or clamped.

use crate::error::{out_of_range, value_out_of_range, Error, Result};
use crate::gpio::{GpioLevel, Polarity};

/// Largest supported converter resolution.
pub const MAX_BITS: u8 = 24;

/// Largest raw code of a `bits`-bit converter (`2^bits - 1`).
pub fn full_scale(bits: u8) -> Result<u32> {
    if bits == 0 || bits > MAX_BITS {
        return Err(Error::Configuration(format!(
            "Converter resolution {} bits not supported (1-{})",
            bits, MAX_BITS
        )));
    }
    Ok((1u32 << bits) - 1)
}

pub(crate) fn check_vref(vref: f64) -> Result<()> {
    if vref.is_finite() && vref > 0.0 {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "Reference voltage {} must be positive",
            vref
        )))
    }
}

/// Converts an unsigned raw code to volts.
pub fn raw_to_voltage(raw: u32, bits: u8, vref: f64) -> Result<f64> {
    let max = full_scale(bits)?;
    check_vref(vref)?;
    if raw > max {
        return Err(out_of_range("raw value", raw, 0, max));
    }
    Ok(raw as f64 * vref / max as f64)
}

/// Converts volts to the nearest unsigned raw code.
///
/// Fails with [`Error::ValueOutOfRange`] outside `0.0..=vref`.
pub fn voltage_to_raw(voltage: f64, bits: u8, vref: f64) -> Result<u32> {
    let max = full_scale(bits)?;
    check_vref(vref)?;
    // Allow for rounding in a preceding raw_to_voltage of full scale
    let limit = vref + vref * f64::EPSILON * 4.0;
    if !voltage.is_finite() || voltage < 0.0 || voltage > limit {
        return Err(value_out_of_range(voltage, 0.0, vref));
    }
    let raw = (voltage * max as f64 / vref).round() as u32;
    Ok(raw.min(max))
}

/// Sign-extends a `bits`-wide two's complement code.
pub fn signed_from_raw(raw: u32, bits: u8) -> Result<i32> {
    let max = full_scale(bits)?;
    let raw = raw & max;
    let sign = 1u32 << (bits - 1);
    Ok(if raw & sign != 0 {
        raw as i32 - (1i64 << bits) as i32
    } else {
        raw as i32
    })
}

/// Converts a signed code of a `bits`-wide bipolar converter to volts.
///
/// One bit is the sign, so full scale is `2^(bits-1) - 1`.
pub fn signed_to_voltage(value: i32, bits: u8, vref: f64) -> Result<f64> {
    if bits < 2 {
        return Err(Error::Configuration(format!(
            "Signed conversion needs at least 2 bits, got {}",
            bits
        )));
    }
    let max = full_scale(bits - 1)?;
    check_vref(vref)?;
    let min = -(max as i64) - 1;
    if (value as i64) < min || value as i64 > max as i64 {
        return Err(Error::OutOfRange {
            what: "signed raw value",
            index: value.unsigned_abs(),
            min: 0,
            max,
        });
    }
    Ok(value as f64 * vref / max as f64)
}

/// Interprets a register bit as a line level under `polarity`.
#[inline]
pub fn level_from_bit(bit: bool, polarity: Polarity) -> GpioLevel {
    match polarity {
        Polarity::ActiveHigh => GpioLevel::from(bit),
        Polarity::ActiveLow => GpioLevel::from(!bit),
    }
}

/// Register bit that produces `level` under `polarity`.
#[inline]
pub fn bit_from_level(level: GpioLevel, polarity: Polarity) -> bool {
    match polarity {
        Polarity::ActiveHigh => level.is_high(),
        Polarity::ActiveLow => !level.is_high(),
    }
}

/// Decodes a packed BCD byte.
#[inline]
pub fn bcd_to_dec(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Encodes 0-99 as packed BCD.
pub fn dec_to_bcd(value: u8) -> Result<u8> {
    if value > 99 {
        return Err(value_out_of_range(value as f64, 0.0, 99.0));
    }
    Ok(((value / 10) << 4) | (value % 10))
}
