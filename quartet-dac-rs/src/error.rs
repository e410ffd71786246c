//! Error types for the DAC driver.

use core::fmt;

/// Errors that can occur when driving the converter.
#[derive(Debug)]
pub enum DacError<E> {
    /// Underlying SPI bus error.
    Spi(E),

    /// Channel index out of valid range (must be 0–3).
    InvalidChannel,
}

// Allow ergonomic `?` propagation from raw SPI errors.
impl<E> From<E> for DacError<E> {
    fn from(error: E) -> Self {
        DacError::Spi(error)
    }
}

impl<E: fmt::Debug> fmt::Display for DacError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DacError::Spi(e) => write!(f, "SPI error: {:?}", e),
            DacError::InvalidChannel => write!(f, "Invalid channel index (must be 0-3)"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for DacError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            DacError::Spi(e) => defmt::write!(f, "SPI error: {}", e),
            DacError::InvalidChannel => defmt::write!(f, "Invalid channel index"),
        }
    }
}
