//! Low-level DAC8564 protocol driver.
//!
//! Encodes 24-bit command frames and puts them on the wire. This module is
//! crate-private — consumers interact with [`QuadDac`](crate::QuadDac) in
//! `dac.rs` instead.

use embedded_hal_async::spi::SpiDevice;

use crate::commands::CHANNEL_SHIFT;
use crate::error::DacError;

/// Build one 24-bit frame: control byte, then the code MSB first.
pub(crate) fn frame(load_mode: u8, channel: u8, code: u16) -> [u8; 3] {
    let ctrl = load_mode | (channel << CHANNEL_SHIFT);
    let code = code.to_be_bytes();
    [ctrl, code[0], code[1]]
}

/// Owns the SPI device and writes command frames.
pub(crate) struct DacBus<SPI> {
    spi: SPI,
}

impl<SPI> DacBus<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Transfer one frame. The `SpiDevice` implementation asserts chip
    /// select around the transaction.
    pub async fn write_frame(
        &mut self,
        load_mode: u8,
        channel: u8,
        code: u16,
    ) -> Result<(), DacError<SPI::Error>> {
        self.spi.write(&frame(load_mode, channel, code)).await?;
        Ok(())
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
