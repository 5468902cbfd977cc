//! Pin-level types and the GPIO line collaborator used for reset and
//! output-enable lines.

use crate::error::{out_of_range, Error, Result};
use embedded_hal::digital::OutputPin;
use log::trace;

/// Direction of an expander pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    Input,
    Output,
}

/// Logic level of a pin or line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioLevel {
    Low,
    High,
}

impl GpioLevel {
    /// Returns `true` for [`GpioLevel::High`].
    #[inline]
    pub fn is_high(self) -> bool {
        self == GpioLevel::High
    }
}

impl From<bool> for GpioLevel {
    fn from(high: bool) -> Self {
        if high {
            GpioLevel::High
        } else {
            GpioLevel::Low
        }
    }
}

/// Polarity of a pin or output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Register bit 1 means the line is high.
    #[default]
    ActiveHigh,
    /// Register bit 1 means the line is low.
    ActiveLow,
}

/// Drives the auxiliary GPIO lines some chips need (reset, output enable).
///
/// Lines are addressed by a small board-specific id.
pub trait OutputLines {
    /// Drives line `id` to `level`.
    fn set_line(&mut self, id: u8, level: GpioLevel) -> Result<()>;
}

impl<T: OutputLines + ?Sized> OutputLines for &mut T {
    fn set_line(&mut self, id: u8, level: GpioLevel) -> Result<()> {
        (**self).set_line(id, level)
    }
}

/// Placeholder for drivers constructed without any auxiliary lines.
///
/// Every call fails with [`Error::Configuration`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLines;

impl OutputLines for NoLines {
    fn set_line(&mut self, id: u8, _level: GpioLevel) -> Result<()> {
        Err(Error::Configuration(format!(
            "GPIO line {} requested but no output lines are attached",
            id
        )))
    }
}

/// [`OutputLines`] over a list of `embedded-hal` output pins; line `id`
/// is the index into the list.
#[derive(Debug)]
pub struct HalLines<P> {
    pins: Vec<P>,
}

impl<P: OutputPin> HalLines<P> {
    pub fn new(pins: Vec<P>) -> Self {
        Self { pins }
    }

    /// Consumes the adapter and returns the pins.
    pub fn release(self) -> Vec<P> {
        self.pins
    }
}

impl<P: OutputPin> OutputLines for HalLines<P> {
    fn set_line(&mut self, id: u8, level: GpioLevel) -> Result<()> {
        let count = self.pins.len() as u32;
        let pin = self
            .pins
            .get_mut(id as usize)
            .ok_or_else(|| out_of_range("line", id as u32, 0, count.saturating_sub(1)))?;
        trace!("Setting GPIO line {} {:?}", id, level);
        let result = match level {
            GpioLevel::High => pin.set_high(),
            GpioLevel::Low => pin.set_low(),
        };
        result.map_err(|e| Error::Line {
            line: id,
            message: format!("{:?}", e),
        })
    }
}
