//! Drivers for devices hanging off the I2C bus.

pub mod pcf8574;
