//! Driver for the PCF8574 and PCF8574A 8-bit I2C I/O expanders.
//!
//! ```
//! use pcf8574::peripheral::pcf8574::{sim::SimBus, Pcf8574};
//!
//! let mut bus = SimBus::new();
//! bus.attach(0x20);
//!
//! let mut pcf = Pcf8574::new(&mut bus);
//! pcf.check()?;
//! pcf.set_port(0xff)?;
//! pcf.set_pin(3, false)?;
//! assert_eq!(pcf.get_port()?, 0xf7);
//! # Ok::<(), pcf8574::Pcf8574Error>(())
//! ```

pub mod config;
pub mod hw_trait;
pub mod peripheral;
pub mod tracing;

pub use config::{ExpanderConfig, Variant};
pub use hw_trait::{EmbeddedHalBus, HwError, I2c, I2cError};
pub use peripheral::pcf8574::{Pcf8574, Pcf8574Error};
