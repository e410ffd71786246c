//! Per-channel settings for the Quartet CV reference generator.
//!
//! Each of the four output channels carries the same fixed schema of
//! settings (octave, semitone, modulation, tuning reference, clock
//! resolution, volt-per-octave scaling). This crate owns the runtime
//! values, clamping, and the change-flag bookkeeping that feeds the
//! display and the CV rendering path. It knows nothing about the
//! autotuner or the hardware.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation; all storage is fixed-size arrays driven by the
//! const schema table. The optional `defmt` feature enables structured
//! logging for embedded targets.

#![cfg_attr(not(test), no_std)]

pub mod channel_settings;
