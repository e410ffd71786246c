//! SSD1306 lifecycle wrapper in async buffered-graphics mode.

use display_interface_i2c::I2CInterface;
use embedded_hal::i2c::I2c as BlockingI2c;
use embedded_hal_async::i2c::I2c;
use ssd1306::{
    mode::BufferedGraphicsModeAsync, prelude::*, I2CDisplayInterface, Ssd1306Async,
};

use crate::error::OledError;

/// Concrete display type used internally by [`OledDriver`].
type Display<I2C> = Ssd1306Async<
    I2CInterface<I2C>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

/// Async driver for an SSD1306 128×64 OLED over I2C.
///
/// Construction generates no I2C traffic; [`init`](Self::init) must run
/// once before the first flush. Rendering happens against the in-memory
/// frame buffer via [`draw_target`](Self::draw_target) and reaches the
/// panel on [`flush`](Self::flush).
pub struct OledDriver<I2C> {
    display: Display<I2C>,
    initialized: bool,
}

impl<I2C> OledDriver<I2C>
where
    I2C: I2c + BlockingI2c,
{
    /// Construct an uninitialised driver.
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (takes ownership for exclusive access).
    /// * `address` — 7-bit device address, typically `0x3C` or `0x3D`.
    pub fn new(i2c: I2C, address: u8) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let display = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self {
            display,
            initialized: false,
        }
    }

    /// Send the panel initialisation sequence. Must succeed once before
    /// any flush.
    pub async fn init(&mut self) -> Result<(), OledError> {
        self.display
            .init()
            .await
            .map_err(|_| OledError::InitFailed)?;
        self.initialized = true;
        Ok(())
    }

    /// `true` after a successful [`init`](Self::init).
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Blank the in-memory frame buffer. No I2C traffic.
    pub fn clear_buffer(&mut self) {
        self.display.clear_buffer();
    }

    /// The frame buffer as an `embedded-graphics` draw target.
    ///
    /// Returns `None` until [`init`](Self::init) has succeeded, so nothing
    /// can draw into an uninitialised controller's buffer.
    pub fn draw_target(&mut self) -> Option<&mut Display<I2C>> {
        if self.initialized {
            Some(&mut self.display)
        } else {
            None
        }
    }

    /// Transfer the frame buffer to the panel (about 20 ms of I2C traffic
    /// at 400 kHz). Fails with [`OledError::InitFailed`] if the panel was
    /// never initialised.
    pub async fn flush(&mut self) -> Result<(), OledError> {
        if !self.initialized {
            return Err(OledError::InitFailed);
        }
        self.display.flush().await?;
        Ok(())
    }
}
