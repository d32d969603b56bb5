//! I2C hardware abstraction trait.

use super::Result;

/// First non-reserved 7-bit address probed by [`I2c::scan`].
pub const SCAN_FIRST: u8 = 0x08;

/// Last non-reserved 7-bit address probed by [`I2c::scan`].
pub const SCAN_LAST: u8 = 0x77;

/// I2C-specific errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum I2cError {
    /// No acknowledgment from device
    #[error("No acknowledgment from device at address 0x{0:02x}")]
    NoAck(u8),

    /// Bus arbitration lost
    #[error("Bus arbitration lost")]
    ArbitrationLost,

    /// Bus error
    #[error("Bus error")]
    BusError,

    /// Other I2C error
    #[error("I2C error: {0}")]
    Other(String),
}

/// Blocking I2C bus abstraction.
///
/// Every call performs exactly one bus transaction and returns once it has
/// completed. Implementations are expected to serialize access themselves if
/// the bus is shared.
pub trait I2c {
    /// Write data to an I2C device.
    fn write(&mut self, addr: u8, data: &[u8]) -> Result<()>;

    /// Read data from an I2C device.
    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()>;

    /// Write data then read from an I2C device (repeated start).
    fn write_read(&mut self, addr: u8, write: &[u8], read: &mut [u8]) -> Result<()>;

    /// List the 7-bit addresses that acknowledge on the bus.
    ///
    /// The default probes 0x08..=0x77 with an empty write. A `NoAck` marks the
    /// address absent; any other failure aborts the scan.
    fn scan(&mut self) -> Result<Vec<u8>> {
        let mut found = Vec::new();
        for addr in SCAN_FIRST..=SCAN_LAST {
            match self.write(addr, &[]) {
                Ok(()) => found.push(addr),
                Err(e) if e.is_no_ack() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(found)
    }
}

impl<T: I2c + ?Sized> I2c for &mut T {
    fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        (**self).write(addr, data)
    }

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()> {
        (**self).read(addr, buffer)
    }

    fn write_read(&mut self, addr: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        (**self).write_read(addr, write, read)
    }

    fn scan(&mut self) -> Result<Vec<u8>> {
        (**self).scan()
    }
}

impl<T: I2c + ?Sized> I2c for Box<T> {
    fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        (**self).write(addr, data)
    }

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()> {
        (**self).read(addr, buffer)
    }

    fn write_read(&mut self, addr: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        (**self).write_read(addr, write, read)
    }

    fn scan(&mut self) -> Result<Vec<u8>> {
        (**self).scan()
    }
}
