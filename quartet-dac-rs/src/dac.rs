//! High-level interface for the DAC8564 quad converter.
//!
//! [`QuadDac`] wraps the low-level frame driver with input validation and
//! a synchronized all-channel update method.

use embedded_hal_async::spi::SpiDevice;

use crate::commands::{CHANNEL_COUNT, LOAD_ALL, LOAD_INPUT, LOAD_SINGLE};
use crate::driver::DacBus;
use crate::error::DacError;

/// Validated async interface to the quad converter.
pub struct QuadDac<SPI> {
    bus: DacBus<SPI>,
}

impl<SPI> QuadDac<SPI>
where
    SPI: SpiDevice,
{
    /// Create a new converter interface.
    ///
    /// # Arguments
    /// * `spi` — SPI device (takes ownership; chip select is managed by
    ///   the `SpiDevice` implementation)
    pub fn new(spi: SPI) -> Self {
        Self {
            bus: DacBus::new(spi),
        }
    }

    /// Write one output code and update that channel immediately.
    ///
    /// # Errors
    /// * [`DacError::InvalidChannel`] if `channel >= 4`
    /// * [`DacError::Spi`] on bus failure
    pub async fn write_code(
        &mut self,
        channel: usize,
        code: u16,
    ) -> Result<(), DacError<SPI::Error>> {
        if channel >= CHANNEL_COUNT {
            return Err(DacError::InvalidChannel);
        }
        self.bus.write_frame(LOAD_SINGLE, channel as u8, code).await
    }

    /// Write all four channels and update their outputs on the same
    /// internal load edge.
    ///
    /// The first three codes go to the input registers only; the final
    /// frame uses the load-all mode so every output steps at once — the
    /// four CVs never show a partially-updated chord.
    pub async fn write_all(&mut self, codes: [u16; 4]) -> Result<(), DacError<SPI::Error>> {
        for (channel, &code) in codes.iter().enumerate().take(CHANNEL_COUNT - 1) {
            self.bus.write_frame(LOAD_INPUT, channel as u8, code).await?;
        }
        self.bus
            .write_frame(LOAD_ALL, (CHANNEL_COUNT - 1) as u8, codes[CHANNEL_COUNT - 1])
            .await
    }
}
