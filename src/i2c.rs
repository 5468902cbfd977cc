//! I2C addressing and the bus transport contract the drivers are built on.

use crate::error::{BusError, Error, Result};
use embedded_hal::i2c::{ErrorKind, I2c};
use log::trace;
use std::cell::RefCell;
use std::fmt;

/// A validated 7-bit I2C device address.
/// Use `I2cAddress::new(addr)` to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct I2cAddress(u8);

impl I2cAddress {
    /// Creates a 7-bit address, checking validity (0-127).
    pub fn new(addr: u8) -> Result<Self> {
        if addr <= 0x7F {
            Ok(I2cAddress(addr))
        } else {
            Err(Error::InvalidAddress(addr))
        }
    }

    /// Returns the raw 7-bit address.
    #[inline]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Byte-oriented bus transport consumed by every I2C board driver.
///
/// Implementors provide the three raw transactions; the register-level
/// helpers are built on top of them. Each call must complete a whole
/// transaction (address phase through data phase) before returning.
/// Retry policy, if any, belongs to the implementor.
pub trait BusTransport {
    /// Writes `data` to the device at `address` in one transaction.
    fn write(&mut self, address: u8, data: &[u8]) -> std::result::Result<(), BusError>;

    /// Reads `buffer.len()` bytes from the device at `address`.
    fn read(&mut self, address: u8, buffer: &mut [u8]) -> std::result::Result<(), BusError>;

    /// Writes `data` then reads into `buffer` with a repeated start.
    fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buffer: &mut [u8],
    ) -> std::result::Result<(), BusError>;

    /// Reads a single register.
    fn read_byte(&mut self, address: u8, register: u8) -> std::result::Result<u8, BusError> {
        let mut buf = [0u8; 1];
        self.write_read(address, &[register], &mut buf)?;
        Ok(buf[0])
    }

    /// Writes a single register.
    fn write_byte(
        &mut self,
        address: u8,
        register: u8,
        value: u8,
    ) -> std::result::Result<(), BusError> {
        self.write(address, &[register, value])
    }

    /// Reads consecutive registers starting at `register`.
    fn read_block(
        &mut self,
        address: u8,
        register: u8,
        buffer: &mut [u8],
    ) -> std::result::Result<(), BusError> {
        self.write_read(address, &[register], buffer)
    }

    /// Writes consecutive registers starting at `register`.
    fn write_block(
        &mut self,
        address: u8,
        register: u8,
        data: &[u8],
    ) -> std::result::Result<(), BusError> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(register);
        frame.extend_from_slice(data);
        self.write(address, &frame)
    }
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    fn write(&mut self, address: u8, data: &[u8]) -> std::result::Result<(), BusError> {
        (**self).write(address, data)
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> std::result::Result<(), BusError> {
        (**self).read(address, buffer)
    }

    fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buffer: &mut [u8],
    ) -> std::result::Result<(), BusError> {
        (**self).write_read(address, data, buffer)
    }
}

// Shared transport: the borrow spans exactly one transaction, so calls from
// several drivers never interleave partial transactions.
impl<T: BusTransport + ?Sized> BusTransport for &RefCell<T> {
    fn write(&mut self, address: u8, data: &[u8]) -> std::result::Result<(), BusError> {
        shared_borrow(*self, address)?.write(address, data)
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> std::result::Result<(), BusError> {
        shared_borrow(*self, address)?.read(address, buffer)
    }

    fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buffer: &mut [u8],
    ) -> std::result::Result<(), BusError> {
        shared_borrow(*self, address)?.write_read(address, data, buffer)
    }
}

fn shared_borrow<'a, T: ?Sized>(
    cell: &'a RefCell<T>,
    address: u8,
) -> std::result::Result<std::cell::RefMut<'a, T>, BusError> {
    cell.try_borrow_mut().map_err(|_| BusError::Other {
        address,
        message: "transport is already in use by another transaction".to_string(),
    })
}

/// [`BusTransport`] adapter for any `embedded-hal` 1.0 I2C bus
/// (e.g. `rppal::i2c::I2c` with the `hal` feature).
#[derive(Debug)]
pub struct HalI2c<I> {
    i2c: I,
}

impl<I: I2c> HalI2c<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Consumes the adapter and returns the I2C peripheral.
    pub fn release(self) -> I {
        self.i2c
    }
}

fn map_hal_error<E: embedded_hal::i2c::Error>(address: u8, err: E) -> BusError {
    match err.kind() {
        ErrorKind::NoAcknowledge(_) => BusError::Nack { address },
        ErrorKind::ArbitrationLoss => BusError::ArbitrationLost { address },
        other => BusError::Other {
            address,
            message: format!("{:?} ({:?})", other, err),
        },
    }
}

impl<I: I2c> BusTransport for HalI2c<I> {
    fn write(&mut self, address: u8, data: &[u8]) -> std::result::Result<(), BusError> {
        trace!("I2C write 0x{:02X}: {:02X?}", address, data);
        self.i2c
            .write(address, data)
            .map_err(|e| map_hal_error(address, e))
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> std::result::Result<(), BusError> {
        self.i2c
            .read(address, buffer)
            .map_err(|e| map_hal_error(address, e))?;
        trace!("I2C read 0x{:02X}: {:02X?}", address, buffer);
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        data: &[u8],
        buffer: &mut [u8],
    ) -> std::result::Result<(), BusError> {
        self.i2c
            .write_read(address, data, buffer)
            .map_err(|e| map_hal_error(address, e))?;
        trace!(
            "I2C write_read 0x{:02X}: {:02X?} -> {:02X?}",
            address,
            data,
            buffer
        );
        Ok(())
    }
}
