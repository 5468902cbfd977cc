use thiserror::Error;

/// Errors that can occur when driving a Pi board peripheral.
///
/// Every error is returned synchronously to the caller. Nothing is retried
/// or recovered inside the drivers; the application decides whether to
/// retry, abort, or degrade.
#[derive(Error, Debug)]
pub enum Error {
    /// Failure reported by the bus transport (NACK, timeout, arbitration loss).
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),
    /// A logical channel, pin, port or memory address is outside the valid range.
    #[error("{what} {index} out of range ({min}-{max})")]
    OutOfRange {
        /// The kind of index that was rejected (e.g. "channel", "pin").
        what: &'static str,
        /// The rejected index as supplied by the caller.
        index: u32,
        /// Lowest valid index.
        min: u32,
        /// Highest valid index.
        max: u32,
    },
    /// An engineering value (volts, servo position, frequency) cannot be represented.
    #[error("Value {value} out of range ({min} to {max})")]
    ValueOutOfRange {
        /// The rejected value.
        value: f64,
        /// Lowest accepted value.
        min: f64,
        /// Highest accepted value.
        max: f64,
    },
    /// The requested operation conflicts with the current chip configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// An auxiliary GPIO line (reset, output enable) could not be driven.
    #[error("GPIO line {line} error: {message}")]
    Line {
        /// Board-specific line id.
        line: u8,
        /// Description from the GPIO implementation.
        message: String,
    },
    /// I2C address outside the 7-bit range.
    #[error("Invalid I2C address 0x{0:02X} (must be 0x00-0x7F)")]
    InvalidAddress(u8),
    /// The RTC returned a calendar date that does not exist.
    #[error("RTC date/time component out of range: {0}")]
    DateTime(#[from] time::error::ComponentRange),
}

/// Failures reported by a [`BusTransport`](crate::BusTransport).
///
/// Each variant carries the 7-bit address of the device that was being
/// accessed when the failure occurred.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The device did not acknowledge its address or a data byte.
    #[error("No acknowledge from device at 0x{address:02X}")]
    Nack {
        /// The device address that sent the NACK.
        address: u8,
    },
    /// Another bus master won arbitration during the transaction.
    #[error("Arbitration lost while accessing device at 0x{address:02X}")]
    ArbitrationLost {
        /// The device address being accessed.
        address: u8,
    },
    /// The transaction or conversion did not complete in time.
    #[error("Timeout while accessing device at 0x{address:02X}")]
    Timeout {
        /// The device address being accessed.
        address: u8,
    },
    /// Any other transport failure.
    #[error("Transport error at 0x{address:02X}: {message}")]
    Other {
        /// The device address being accessed.
        address: u8,
        /// Transport-specific description.
        message: String,
    },
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// Helpers for the errors every board raises the same way
pub(crate) fn out_of_range(what: &'static str, index: u32, min: u32, max: u32) -> Error {
    Error::OutOfRange {
        what,
        index,
        min,
        max,
    }
}

pub(crate) fn value_out_of_range(value: f64, min: f64, max: f64) -> Error {
    Error::ValueOutOfRange { value, min, max }
}
