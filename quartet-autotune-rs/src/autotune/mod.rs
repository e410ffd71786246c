//! Per-channel VCO auto-calibration.
//!
//! The module drives one DAC channel through a fixed ladder of octave
//! voltages, measures the VCO frequency the channel produces, and learns a
//! signed DAC correction per octave so the VCO lands on exact musical
//! octaves. The learned corrections are committed to the DAC driver's
//! auto-calibration table, which the normal pitch-output path then plays
//! from.
//!
//! # Architecture
//!
//! ```text
//! FrequencyMeter ──▶ FrequencyAverager ──▶ SarLoop ──▶ correction table
//!                          │                  │
//!                          └── TunerChannel ◀─┘  (state machine)
//!                                   │
//!                            AutotuneHost  (4 channels, one active)
//! ```
//!
//! - [`FrequencyAverager`] smooths raw period counts into one frequency
//!   sample per averaging window and keeps a short scrolling history.
//! - [`TargetTable`] derives the eleven octave target frequencies from the
//!   measured 0 V baseline and the channel's [`Scaling`].
//! - [`SarLoop`] is the successive-approximation correction loop: each
//!   sign reversal halves the step until unit resolution, then dithering
//!   around the target proves convergence.
//! - [`TunerChannel`] sequences arming, baseline measurement, the octave
//!   steps, and the table commit; faults latch until the channel is reset.
//! - [`AutotuneHost`] owns the four channels and guarantees at most one is
//!   calibrating at a time (the frequency meter input is shared).
//!
//! All per-tick work is bounded and non-blocking: the host's
//! [`tick`](AutotuneHost::tick) is designed to run from a fixed-rate
//! control loop alongside the real-time DAC updates.

mod averager;
mod channel;
mod error;
mod host;
mod sar;
mod targets;
mod traits;

#[cfg(test)]
pub(crate) mod sim;

pub use averager::FrequencyAverager;
pub use channel::{TunerChannel, TunerState, TunerStatus};
pub use error::{AutotuneFault, HostError};
pub use host::{AutotuneHost, StatusFrame};
pub use sar::SarLoop;
pub use targets::{Scaling, TargetTable};
pub use traits::{CalibrationSource, DacInterface, FrequencyMeter};

/// Number of DAC channels on the module.
pub const DAC_CHANNELS: usize = 4;

/// Octave span of the calibrated range (−3 V through +7 V at 1 V/oct).
pub const OCTAVES: usize = 10;

/// Number of calibration anchors, one per whole volt including both
/// endpoints.
pub const CALIBRATION_POINTS: usize = OCTAVES + 1;

/// Anchor index of the 0 V point within the calibrated range.
pub const ZERO_VOLT_INDEX: usize = 3;

/// Number of octave steps the autotuner actually measures (−3 V … +6 V).
/// The top anchor sits at the DAC rail where the VCO would exceed the
/// measurable range; it is committed with zero correction.
pub const MEASUREMENT_STEPS: usize = 10;

/// Depth of the scrolling history used to smooth settled readings.
pub const HISTORY_DEPTH: usize = 10;

/// Nominal averaging window in control ticks.
pub const FREQ_MEASURE_TIMEOUT: u32 = 512;

/// Ticks without a fresh frequency sample before the channel faults.
pub const ERROR_TIMEOUT: u32 = FREQ_MEASURE_TIMEOUT * 16;

/// Cap on convergence-loop passes per octave step.
pub const MAX_NUM_PASSES: u32 = 1500;

/// Unit-step corrections required in each direction before a step counts
/// as converged.
pub const CONVERGE_PASSES: u32 = 5;

/// Initial magnitude of the SAR correction step.
pub const INITIAL_STEP_FACTOR: u32 = 0xFF;

/// Ticks between successive table writes during the commit phase. One
/// word-sized store per write, so the output path can read the table
/// concurrently.
pub const COMMIT_INTERVAL: u32 = 2000;
