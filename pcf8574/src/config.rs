//! Expander addressing and configuration.
//!
//! The PCF8574 family has two address blocks selected by part number, with
//! the low three bits set by the A0..A2 strap pins on the board. The driver
//! itself accepts any 7-bit address; checking that an address actually
//! belongs to the family happens here.

use std::ops::RangeInclusive;

use thiserror::Error;

/// Environment variable holding the expander address.
pub const ADDRESS_ENV: &str = "PCF8574_ADDRESS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Address 0x{0:02x} is not a PCF8574 (0x20-0x27) or PCF8574A (0x38-0x3f) address")]
    AddressOutOfRange(u8),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Part number, which fixes the address block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// PCF8574, addresses 0x20..=0x27
    Pcf8574,
    /// PCF8574A, addresses 0x38..=0x3F
    Pcf8574A,
}

impl Variant {
    /// Address with all strap pins tied low.
    pub const fn base_address(self) -> u8 {
        match self {
            Variant::Pcf8574 => 0x20,
            Variant::Pcf8574A => 0x38,
        }
    }

    pub fn address_range(self) -> RangeInclusive<u8> {
        let base = self.base_address();
        base..=base | 0b111
    }

    /// Which part answers at `address`, if any.
    pub fn from_address(address: u8) -> Option<Variant> {
        [Variant::Pcf8574, Variant::Pcf8574A]
            .into_iter()
            .find(|v| v.address_range().contains(&address))
    }
}

/// Where to find one expander on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpanderConfig {
    pub variant: Variant,
    pub address: u8,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            variant: Variant::Pcf8574,
            address: Variant::Pcf8574.base_address(),
        }
    }
}

impl ExpanderConfig {
    /// Build the address from the strap pin levels.
    pub fn from_pins(variant: Variant, a0: bool, a1: bool, a2: bool) -> Self {
        let address = variant.base_address() | (a2 as u8) << 2 | (a1 as u8) << 1 | (a0 as u8);
        Self { variant, address }
    }

    /// Use an explicit address, inferring the part from its block.
    pub fn with_address(address: u8) -> Result<Self, ConfigError> {
        let variant =
            Variant::from_address(address).ok_or(ConfigError::AddressOutOfRange(address))?;
        Ok(Self { variant, address })
    }

    /// Parse configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PCF8574_ADDRESS`: device address, hex with `0x` prefix or decimal
    ///   (default: 0x20)
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(ADDRESS_ENV) {
            Ok(value) => {
                let address = parse_address(&value).ok_or_else(|| ConfigError::InvalidValue {
                    var: ADDRESS_ENV,
                    value: value.clone(),
                })?;
                Self::with_address(address)
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

fn parse_address(s: &str) -> Option<u8> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
