//! PCF8574 8-bit I2C I/O expander driver.
//!
//! The PCF8574 has no registers: a one-byte write sets the output latch of all
//! eight pins, and a one-byte read returns the level on all eight pins. Pins
//! are quasi-bidirectional. Writing 1 releases the pin to a weak pull-up so it
//! can be used as an input, writing 0 drives it low.
//!
//! Reading the port also clears the chip's interrupt output, so reads are
//! never cached.
//!
//! # Shadow buffer
//!
//! The driver keeps one byte holding the value last read from or written to
//! the port. Single-pin writes and toggles modify this byte and write it back
//! without re-reading the hardware first. Consequences:
//!
//! - If another bus master changed the latch, a pin write overwrites that
//!   change with the driver's view.
//! - An input bit that reads 1 is only accurate in the shadow right after
//!   [`Pcf8574::get_port`] or [`Pcf8574::get_pin`].
//! - A failed write leaves the shadow at the intended value. Call
//!   [`Pcf8574::get_port`] to resynchronize.
//! - The shadow starts at 0x00 while the chip powers up with every pin high
//!   (0xFF). A pin write or toggle before the first read drives the other
//!   seven pins low.
//!
//! Datasheet: <https://www.ti.com/lit/ds/symlink/pcf8574.pdf>

pub mod sim;

use thiserror::Error;

use crate::config::{ExpanderConfig, Variant};
use crate::hw_trait::{HwError, I2c};
use crate::tracing::prelude::*;

/// Default I2C address for PCF8574 (A0=A1=A2=low)
pub const DEFAULT_ADDRESS: u8 = Variant::Pcf8574.base_address();

/// Highest valid pin index
pub const MAX_PIN: u8 = 7;

/// Highest 7-bit I2C address
const MAX_ADDRESS: u8 = 0x7f;

#[derive(Error, Debug)]
pub enum Pcf8574Error {
    #[error("Invalid pin {0}, use 0-7")]
    InvalidPin(u8),

    #[error("Invalid I2C address 0x{0:02x}, must be 7-bit")]
    InvalidAddress(u8),

    #[error("PCF8574 not found at I2C address 0x{0:02x}")]
    DeviceNotFound(u8),

    #[error("I2C transfer failed: {0}")]
    Bus(#[from] HwError),
}

impl Pcf8574Error {
    /// True for errors raised before touching the bus.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Pcf8574Error::InvalidPin(_) | Pcf8574Error::InvalidAddress(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Pcf8574Error>;

/// PCF8574 driver
///
/// Pass `&mut bus` to keep ownership of the bus, or move the bus in and get it
/// back with [`Pcf8574::release`].
pub struct Pcf8574<I: I2c> {
    i2c: I,
    address: u8,
    port: [u8; 1],
}

impl<I: I2c> Pcf8574<I> {
    /// Create a new PCF8574 driver with default address
    pub fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
            port: [0],
        }
    }

    /// Create a new PCF8574 driver with custom address
    ///
    /// Only checks that the address fits in 7 bits. Does not talk to the bus.
    pub fn new_with_address(i2c: I, address: u8) -> Result<Self> {
        if address > MAX_ADDRESS {
            return Err(Pcf8574Error::InvalidAddress(address));
        }
        Ok(Self {
            i2c,
            address,
            port: [0],
        })
    }

    /// Create a driver for a configured expander.
    pub fn from_config(i2c: I, config: &ExpanderConfig) -> Result<Self> {
        Self::new_with_address(i2c, config.address)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I {
        self.i2c
    }

    /// Verify that the device answers at its address.
    pub fn check(&mut self) -> Result<()> {
        let present = self.i2c.scan()?;
        debug!(
            address = %format!("{:#04x}", self.address),
            devices = ?present,
            "Scanned I2C bus"
        );
        if present.contains(&self.address) {
            Ok(())
        } else {
            warn!("PCF8574 not found at 0x{:02X}", self.address);
            Err(Pcf8574Error::DeviceNotFound(self.address))
        }
    }

    /// Read all eight pins.
    pub fn get_port(&mut self) -> Result<u8> {
        self.read()?;
        Ok(self.port[0])
    }

    /// Write all eight pins at once.
    pub fn set_port(&mut self, value: u8) -> Result<()> {
        self.port[0] = value;
        self.write()
    }

    /// Last value read from or written to the port. No bus traffic.
    pub fn shadow(&self) -> u8 {
        self.port[0]
    }

    /// Read one pin. Refreshes the whole shadow buffer from the device.
    pub fn get_pin(&mut self, pin: u8) -> Result<bool> {
        let pin = validate_pin(pin)?;
        self.read()?;
        Ok((self.port[0] >> pin) & 1 == 1)
    }

    /// Set one pin in the shadow buffer and write the buffer out.
    pub fn set_pin(&mut self, pin: u8, value: bool) -> Result<()> {
        let pin = validate_pin(pin)?;
        if value {
            self.port[0] |= 1 << pin;
        } else {
            self.port[0] &= !(1 << pin);
        }
        self.write()
    }

    /// Flip one pin in the shadow buffer and write the buffer out.
    pub fn toggle_pin(&mut self, pin: u8) -> Result<()> {
        let pin = validate_pin(pin)?;
        self.port[0] ^= 1 << pin;
        self.write()
    }

    // Bus transfers

    fn read(&mut self) -> Result<()> {
        self.i2c.read(self.address, &mut self.port)?;
        trace!("PCF8574 0x{:02X} read port=0x{:02X}", self.address, self.port[0]);
        Ok(())
    }

    fn write(&mut self) -> Result<()> {
        trace!("PCF8574 0x{:02X} write port=0x{:02X}", self.address, self.port[0]);
        self.i2c.write(self.address, &self.port)?;
        Ok(())
    }
}

fn validate_pin(pin: u8) -> Result<u8> {
    if pin > MAX_PIN {
        return Err(Pcf8574Error::InvalidPin(pin));
    }
    Ok(pin)
}

#[cfg(test)]
mod tests {
    use super::sim::SimBus;
    use super::*;
    use crate::hw_trait::I2cError;

    fn bus_with_device() -> SimBus {
        let mut bus = SimBus::new();
        bus.attach(DEFAULT_ADDRESS);
        bus
    }

    #[test]
    fn test_construction_does_not_touch_bus() {
        let mut bus = SimBus::new();

        let pcf = Pcf8574::new(&mut bus);
        assert_eq!(pcf.address(), 0x20);
        assert_eq!(pcf.shadow(), 0x00);

        let pcf = Pcf8574::new_with_address(&mut bus, 0x7f).unwrap();
        assert_eq!(pcf.address(), 0x7f);

        assert_eq!(bus.transactions(), 0);
    }

    #[test]
    fn test_construction_rejects_8bit_address() {
        let mut bus = SimBus::new();

        let err = Pcf8574::new_with_address(&mut bus, 0x80).err().unwrap();
        assert!(matches!(err, Pcf8574Error::InvalidAddress(0x80)));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_from_config() {
        let mut bus = SimBus::new();
        let config = ExpanderConfig::from_pins(Variant::Pcf8574A, true, false, true);

        let pcf = Pcf8574::from_config(&mut bus, &config).unwrap();
        assert_eq!(pcf.address(), 0x3d);
    }

    #[test]
    fn test_check() {
        let mut bus = bus_with_device();
        bus.attach(0x4c);

        let mut pcf = Pcf8574::new(&mut bus);
        assert!(pcf.check().is_ok());

        let mut pcf = Pcf8574::new_with_address(&mut bus, 0x21).unwrap();
        let err = pcf.check().unwrap_err();
        assert!(matches!(err, Pcf8574Error::DeviceNotFound(0x21)));
    }

    #[test]
    fn test_check_propagates_bus_fault() {
        let mut bus = bus_with_device();
        bus.fail_next(I2cError::BusError);

        let mut pcf = Pcf8574::new(&mut bus);
        let err = pcf.check().unwrap_err();
        assert!(matches!(err, Pcf8574Error::Bus(HwError::I2c(I2cError::BusError))));
    }

    #[test]
    fn test_port_round_trip() {
        let mut bus = bus_with_device();
        let mut pcf = Pcf8574::new(&mut bus);

        for value in 0..=u8::MAX {
            pcf.set_port(value).unwrap();
            assert_eq!(pcf.get_port().unwrap(), value);
        }
    }

    #[test]
    fn test_pin_round_trip() {
        let mut bus = bus_with_device();
        let mut pcf = Pcf8574::new(&mut bus);

        for pin in 0..=MAX_PIN {
            for value in [false, true] {
                pcf.set_pin(pin, value).unwrap();
                assert_eq!(pcf.get_pin(pin).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_toggle_twice_restores_pin() {
        let mut bus = bus_with_device();
        let mut pcf = Pcf8574::new(&mut bus);
        pcf.set_port(0b1010_0110).unwrap();

        for pin in 0..=MAX_PIN {
            let before = pcf.get_port().unwrap();

            pcf.toggle_pin(pin).unwrap();
            let once = pcf.get_port().unwrap();
            assert_eq!(once, before ^ (1 << pin));

            pcf.toggle_pin(pin).unwrap();
            assert_eq!(pcf.get_port().unwrap(), before);
        }
    }

    #[test]
    fn test_first_pin_write_starts_from_cleared_shadow() {
        let mut bus = bus_with_device();
        {
            let mut pcf = Pcf8574::new(&mut bus);
            pcf.toggle_pin(0).unwrap();
        }
        assert_eq!(bus.latch(DEFAULT_ADDRESS), Some(0x01));

        {
            let mut pcf = Pcf8574::new(&mut bus);
            pcf.set_pin(3, true).unwrap();
        }
        assert_eq!(bus.latch(DEFAULT_ADDRESS), Some(0x08));
    }

    #[test]
    fn test_invalid_pin_issues_no_transactions() {
        let mut bus = bus_with_device();
        {
            let mut pcf = Pcf8574::new(&mut bus);
            for pin in [8, 9, 0x7f, 255] {
                assert!(matches!(pcf.get_pin(pin), Err(Pcf8574Error::InvalidPin(p)) if p == pin));
                assert!(matches!(
                    pcf.set_pin(pin, true),
                    Err(Pcf8574Error::InvalidPin(_))
                ));
                assert!(matches!(
                    pcf.toggle_pin(pin),
                    Err(Pcf8574Error::InvalidPin(_))
                ));
            }
            assert_eq!(pcf.shadow(), 0x00);
        }
        assert_eq!(bus.transactions(), 0);
    }

    #[test]
    fn test_scenario_clear_pin_three() {
        let mut bus = bus_with_device();
        let mut pcf = Pcf8574::new(&mut bus);

        pcf.set_port(0xff).unwrap();
        assert_eq!(pcf.get_port().unwrap(), 255);

        pcf.set_pin(3, false).unwrap();
        assert!(!pcf.get_pin(3).unwrap());
        assert_eq!(pcf.get_port().unwrap(), 0xf7);
    }

    #[test]
    fn test_every_read_hits_the_bus() {
        let mut bus = bus_with_device();
        {
            let mut pcf = Pcf8574::new(&mut bus);
            pcf.get_port().unwrap();
            pcf.get_port().unwrap();
            pcf.get_pin(0).unwrap();
            assert_eq!(pcf.shadow(), 0xff);
        }
        assert_eq!(bus.transactions(), 3);
    }

    #[test]
    fn test_external_input_seen_on_read() {
        let mut bus = bus_with_device();
        bus.set_input(DEFAULT_ADDRESS, 7, false);

        let mut pcf = Pcf8574::new(&mut bus);
        pcf.set_port(0xff).unwrap();
        assert!(!pcf.get_pin(7).unwrap());
        assert_eq!(pcf.shadow(), 0x7f);
    }

    #[test]
    fn test_pin_write_uses_shadow_not_hardware() {
        let mut bus = bus_with_device();
        let mut pcf = Pcf8574::new(&mut bus);
        pcf.set_port(0xf0).unwrap();

        // Another master rewrites the latch behind the driver's back.
        pcf.i2c.write(DEFAULT_ADDRESS, &[0x0f]).unwrap();

        pcf.set_pin(0, true).unwrap();
        assert_eq!(pcf.get_port().unwrap(), 0xf1);
    }

    #[test]
    fn test_failed_write_keeps_intended_shadow() {
        let mut bus = bus_with_device();
        let mut pcf = Pcf8574::new(&mut bus);
        pcf.set_port(0x00).unwrap();

        pcf.i2c.fail_next(I2cError::NoAck(DEFAULT_ADDRESS));
        let err = pcf.set_pin(2, true).unwrap_err();
        assert!(matches!(err, Pcf8574Error::Bus(_)));
        assert_eq!(pcf.shadow(), 0x04);

        // Re-reading resynchronizes with what the device actually holds.
        assert_eq!(pcf.get_port().unwrap(), 0x00);
        assert_eq!(pcf.shadow(), 0x00);
    }

    #[test]
    fn test_failed_read_propagates() {
        let mut bus = SimBus::new();
        let mut pcf = Pcf8574::new(&mut bus);

        let err = pcf.get_port().unwrap_err();
        assert!(matches!(
            err,
            Pcf8574Error::Bus(HwError::I2c(I2cError::NoAck(0x20)))
        ));
    }

    #[test]
    fn test_release_returns_bus() {
        let pcf = Pcf8574::new(bus_with_device());
        let mut bus = pcf.release();
        assert_eq!(bus.scan().unwrap(), vec![DEFAULT_ADDRESS]);
    }
}
