//! Async OLED status display for the Quartet autotuner (SSD1306 128×64).
//!
//! This crate renders the autotune engine's status snapshots: an overview
//! of the four channels while the module idles, and a detail view —
//! octave progress, measured against target frequency, fault or
//! completion banner — while a channel calibrates.
//!
//! The crate provides [`OledDriver`], a wrapper around the [`ssd1306`]
//! crate in async buffered-graphics mode, and [`display_update_task`], a
//! periodic update loop that reads a shared [`StatusFrame`] snapshot and
//! flushes changed frames to the display.
//!
//! Embassy tasks cannot be generic, so callers wrap the task in a thin
//! concrete adapter:
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn oled_task(
//!     driver: OledDriver<MyI2cType>,
//!     status: &'static Mutex<CriticalSectionRawMutex, StatusFrame>,
//!     config: DisplayConfig,
//! ) {
//!     display_update_task(driver, status, config).await;
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`task`** — the Embassy display task (pulls in `embassy-time` and
//!   `embassy-sync`; firmware targets enable it).
//! - **`defmt`** — structured logging via [`defmt`].
//!
//! [`StatusFrame`]: quartet::autotune::StatusFrame

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "task")]
pub mod display_task;
pub mod driver;
pub mod error;
pub mod layout;

// ── Re-exports for convenience ───────────────────────────────────────

#[cfg(feature = "task")]
pub use display_task::display_update_task;
pub use driver::OledDriver;
pub use error::OledError;
pub use layout::{render_status, screen_channel, DisplayConfig};
