//! Simulated I2C bus populated with PCF8574 devices.
//!
//! Stands in for real hardware in tests and demos. Each attached device has
//! an output latch (power-on 0xFF) and a set of pins held low by external
//! circuitry. A read returns what a real chip would report: a pin reads 1 only
//! if its latch is 1 and nothing outside pulls it down.

use std::collections::BTreeMap;

use crate::hw_trait::{HwError, I2c, I2cError, Result};
use crate::tracing::prelude::*;

#[derive(Debug, Clone, Copy)]
struct SimDevice {
    latch: u8,
    pulled_low: u8,
}

impl SimDevice {
    fn pins(&self) -> u8 {
        self.latch & !self.pulled_low
    }
}

/// In-memory bus with zero or more PCF8574s attached.
#[derive(Debug, Default)]
pub struct SimBus {
    devices: BTreeMap<u8, SimDevice>,
    transactions: usize,
    fail_next: Option<I2cError>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a device at `address` in its power-on state.
    pub fn attach(&mut self, address: u8) {
        self.devices.insert(
            address,
            SimDevice {
                latch: 0xff,
                pulled_low: 0x00,
            },
        );
    }

    pub fn detach(&mut self, address: u8) {
        self.devices.remove(&address);
    }

    /// Drive an input from outside the chip. `high == false` ties the pin to
    /// ground, `high == true` releases it.
    ///
    /// # Panics
    ///
    /// If no device is attached at `address` or `pin > 7`.
    pub fn set_input(&mut self, address: u8, pin: u8, high: bool) {
        assert!(pin <= 7, "pin {} out of range", pin);
        let device = self
            .devices
            .get_mut(&address)
            .unwrap_or_else(|| panic!("no simulated device at 0x{:02x}", address));
        if high {
            device.pulled_low &= !(1 << pin);
        } else {
            device.pulled_low |= 1 << pin;
        }
    }

    /// Current output latch of the device at `address`.
    pub fn latch(&self, address: u8) -> Option<u8> {
        self.devices.get(&address).map(|d| d.latch)
    }

    /// Number of bus transactions seen, including failed ones.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// Make the next transaction fail with `error`.
    pub fn fail_next(&mut self, error: I2cError) {
        self.fail_next = Some(error);
    }

    fn begin(&mut self, addr: u8) -> Result<&mut SimDevice> {
        self.transactions += 1;
        if let Some(err) = self.fail_next.take() {
            return Err(err.into());
        }
        self.devices
            .get_mut(&addr)
            .ok_or(HwError::I2c(I2cError::NoAck(addr)))
    }
}

impl I2c for SimBus {
    fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        let device = self.begin(addr)?;
        // The chip latches every byte it receives; the last one sticks.
        if let Some(&last) = data.last() {
            device.latch = last;
        }
        trace!(addr = %format!("{:#04x}", addr), data = ?data, "sim write");
        Ok(())
    }

    fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()> {
        let device = self.begin(addr)?;
        let pins = device.pins();
        buffer.fill(pins);
        trace!(addr = %format!("{:#04x}", addr), data = ?buffer, "sim read");
        Ok(())
    }

    fn write_read(&mut self, addr: u8, write: &[u8], read: &mut [u8]) -> Result<()> {
        let device = self.begin(addr)?;
        if let Some(&last) = write.last() {
            device.latch = last;
        }
        let pins = device.pins();
        read.fill(pins);
        Ok(())
    }

    fn scan(&mut self) -> Result<Vec<u8>> {
        self.transactions += 1;
        if let Some(err) = self.fail_next.take() {
            return Err(err.into());
        }
        Ok(self.devices.keys().copied().collect())
    }
}
