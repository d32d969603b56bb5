//! Bridge from `embedded-hal` blocking I2C peripherals to [`I2c`].
//!
//! Platform HALs (rp2040-hal, esp-hal, linux-embedded-hal, ...) expose their
//! buses through `embedded_hal::i2c::I2c`. Wrapping one in [`EmbeddedHalBus`]
//! lets the expander driver use it directly.

use embedded_hal::i2c::{Error as _, ErrorKind};

use super::i2c::{I2c, I2cError};
use super::Result;
use crate::tracing::prelude::*;

/// Adapter owning an `embedded-hal` I2C bus.
pub struct EmbeddedHalBus<T> {
    inner: T,
}

impl<T> EmbeddedHalBus<T>
where
    T: embedded_hal::i2c::I2c,
{
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Give back the wrapped peripheral.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn map_kind(addr: u8, kind: ErrorKind) -> I2cError {
    match kind {
        ErrorKind::NoAcknowledge(_) => I2cError::NoAck(addr),
        ErrorKind::ArbitrationLoss => I2cError::ArbitrationLost,
        ErrorKind::Bus => I2cError::BusError,
        other => I2cError::Other(format!("{:?}", other)),
    }
}

impl<T> I2c for EmbeddedHalBus<T>
where
    T: embedded_hal::i2c::I2c,
{
    fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        self.inner.write(addr, data).map_err(|e| {
            let err = map_kind(addr, e.kind());
            trace!(addr = %format!("{:#04x}", addr), error = %err, "I2C write failed");
            err.into()
        })
    }

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()> {
        self.inner.read(addr, buffer).map_err(|e| {
            let err = map_kind(addr, e.kind());
            trace!(addr = %format!("{:#04x}", addr), error = %err, "I2C read failed");
            err.into()
        })
    }

    fn write_read(&mut self, addr: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        self.inner.write_read(addr, write, read).map_err(|e| {
            let err = map_kind(addr, e.kind());
            trace!(addr = %format!("{:#04x}", addr), error = %err, "I2C write_read failed");
            err.into()
        })
    }
}
