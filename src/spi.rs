//! SPI transport used by the MCP3202, MCP3208 and MCP4822 converters.

use crate::error::BusError;
use embedded_hal::spi::SpiDevice;
use log::trace;
use std::cell::RefCell;

/// Full-duplex SPI transport bound to one chip select.
///
/// `transfer` shifts `buffer` out and replaces it in place with the bytes
/// clocked in, asserting chip select for the whole transfer.
pub trait SpiTransport {
    fn transfer(&mut self, buffer: &mut [u8]) -> std::result::Result<(), BusError>;
}

impl<T: SpiTransport + ?Sized> SpiTransport for &mut T {
    fn transfer(&mut self, buffer: &mut [u8]) -> std::result::Result<(), BusError> {
        (**self).transfer(buffer)
    }
}

impl<T: SpiTransport + ?Sized> SpiTransport for &RefCell<T> {
    fn transfer(&mut self, buffer: &mut [u8]) -> std::result::Result<(), BusError> {
        self.try_borrow_mut()
            .map_err(|_| BusError::Other {
                address: 0,
                message: "SPI transport is already in use by another transaction".to_string(),
            })?
            .transfer(buffer)
    }
}

/// [`SpiTransport`] adapter for any `embedded-hal` 1.0 SPI device.
#[derive(Debug)]
pub struct HalSpi<D> {
    device: D,
}

impl<D: SpiDevice> HalSpi<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Consumes the adapter and returns the SPI device.
    pub fn release(self) -> D {
        self.device
    }
}

impl<D: SpiDevice> SpiTransport for HalSpi<D> {
    fn transfer(&mut self, buffer: &mut [u8]) -> std::result::Result<(), BusError> {
        trace!("SPI out: {:02X?}", buffer);
        self.device
            .transfer_in_place(buffer)
            .map_err(|e| BusError::Other {
                address: 0,
                message: format!("SPI transfer failed: {:?}", e),
            })?;
        trace!("SPI in: {:02X?}", buffer);
        Ok(())
    }
}
