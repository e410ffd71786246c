//! Periodic display update loop.
//!
//! Reads the shared [`StatusFrame`] snapshot the control tick publishes,
//! and redraws the panel whenever it changes. The snapshot mutex is held
//! only for the copy-out — never across rendering or the I2C flush.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::i2c::I2c;

use quartet::autotune::StatusFrame;

use crate::driver::OledDriver;
use crate::layout::{render_status, DisplayConfig};

/// Display update loop.
///
/// A plain `async fn`, not an Embassy `#[task]` — tasks cannot be
/// generic, so the firmware wraps this in a thin concrete adapter.
///
/// # Control flow
///
/// 1. Initialise the panel; on failure log and exit (the module keeps
///    running without a screen).
/// 2. Loop at `config.update_frequency_hz`:
///    - copy the status frame out of the mutex,
///    - skip the cycle if it matches the previous frame,
///    - clear, render, flush.
pub async fn display_update_task<I2C>(
    mut driver: OledDriver<I2C>,
    status: &'static Mutex<CriticalSectionRawMutex, StatusFrame>,
    config: DisplayConfig,
) where
    I2C: I2c,
{
    if let Err(_e) = driver.init().await {
        #[cfg(feature = "defmt")]
        defmt::error!("OLED init failed: {}", _e);
        return;
    }

    #[cfg(feature = "defmt")]
    defmt::info!("OLED initialised");

    let period = embassy_time::Duration::from_millis(config.update_period_ms());
    let mut last_frame: Option<StatusFrame> = None;

    loop {
        embassy_time::Timer::after(period).await;

        let frame = *status.lock().await;

        if last_frame == Some(frame) {
            continue;
        }

        driver.clear_buffer();
        if let Some(display) = driver.draw_target() {
            if let Err(_e) = render_status(display, &frame, &config) {
                #[cfg(feature = "defmt")]
                defmt::error!("render failed");
                continue;
            }
        } else {
            // Cannot happen after a successful init(), but guard anyway.
            continue;
        }

        if let Err(_e) = driver.flush().await {
            #[cfg(feature = "defmt")]
            defmt::error!("flush failed: {}", _e);
            continue;
        }

        last_frame = Some(frame);
    }
}
