//! Auto-calibration engine for the Quartet four-channel CV reference
//! generator.
//!
//! This crate contains the pure control logic of the module: the per-channel
//! autotuner state machine that drives a DAC channel, measures the frequency
//! of the connected VCO, and learns the per-octave DAC corrections required
//! for exact musical octaves. Hardware access goes through the
//! [`DacInterface`](autotune::DacInterface) and
//! [`FrequencyMeter`](autotune::FrequencyMeter) traits, so the whole engine
//! builds and tests on the host.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation anywhere. All storage is fixed-size arrays sized by
//! the constants in [`autotune`]. The optional `defmt` feature enables
//! structured logging for embedded targets.

#![cfg_attr(not(test), no_std)]

pub mod autotune;
