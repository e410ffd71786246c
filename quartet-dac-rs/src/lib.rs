//! Async driver for the DAC8564 quad 16-bit SPI DAC, plus the per-channel
//! pitch calibration banks of the Quartet CV reference generator.
//!
//! # Architecture
//!
//! The crate is split into three layers:
//!
//! - **`driver`** (crate-private) — Low-level DAC8564 frame encoding and
//!   SPI transfers.
//! - **[`QuadDac`]** (public) — Validated, high-level API for writing
//!   output codes.
//! - **[`CalibratedDac`]** (public) — The calibration banks (factory and
//!   learned per-octave anchors, live-table selector, semitone
//!   interpolation) layered over the converter, with the latched write
//!   interface the control tick drives.
//!
//! # Quick start
//!
//! ```ignore
//! use dac_driver::CalibratedDac;
//!
//! // Construct with any `embedded-hal-async` SPI device
//! let mut dac = CalibratedDac::new(spi);
//!
//! // Control tick: latch codes, then flush once per tick
//! dac.latch_pitch(0, 4, 7);
//! dac.flush().await?;
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on error types
//!   for embedded logging.

#![cfg_attr(not(test), no_std)]

pub use calibration::{CalibratedDac, CalibrationBank, ChannelCalibration, DEFAULT_OCTAVE_CODES};
pub use dac::QuadDac;
pub use error::DacError;

mod calibration;
mod commands;
mod dac;
mod driver;
mod error;
