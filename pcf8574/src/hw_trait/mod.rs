//! Hardware abstraction layer traits.
//!
//! This module defines the bus interface the expander driver talks to, so the
//! driver works the same over a platform I2C peripheral (through
//! [`embedded::EmbeddedHalBus`]) or a simulated bus in tests.

pub mod embedded;
pub mod i2c;

// Re-export traits
pub use embedded::EmbeddedHalBus;
pub use i2c::{I2c, I2cError};

/// Common error type for hardware operations
#[derive(Debug, thiserror::Error)]
pub enum HwError {
    /// Failed I2C transaction
    #[error(transparent)]
    I2c(#[from] I2cError),

    /// Operation not supported by hardware
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl HwError {
    /// True if the error means "nobody answered at this address".
    pub fn is_no_ack(&self) -> bool {
        matches!(self, HwError::I2c(I2cError::NoAck(_)))
    }
}

pub type Result<T> = std::result::Result<T, HwError>;
