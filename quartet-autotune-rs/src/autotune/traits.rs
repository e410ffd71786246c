//! Hardware seams of the autotune engine.
//!
//! The engine never touches DAC calibration memory or timer capture
//! registers directly; it drives these two traits. The firmware implements
//! them over the real peripherals, the tests over a simulated VCO.

/// Which calibration table a DAC channel currently plays from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationSource {
    /// Factory calibration table.
    Default,
    /// Learned auto-calibration table.
    Auto,
}

/// Control surface of the quad DAC as seen by the autotuner.
///
/// `set` is a latched write: implementations record the code and transfer
/// it to the converter outside the control tick. All other operations act
/// on the per-channel calibration tables, which carry one signed code per
/// octave anchor.
pub trait DacInterface {
    /// Latch a raw output code for `channel`.
    fn set(&mut self, channel: usize, code: i32);

    /// Factory-calibrated code for an octave anchor.
    fn default_calibrated_code(&self, channel: usize, octave: usize) -> i32;

    /// Select the factory table as the channel's live calibration.
    fn set_default_channel_calibration(&mut self, channel: usize);

    /// Select the learned table as the channel's live calibration.
    fn set_auto_channel_calibration(&mut self, channel: usize);

    /// Overwrite one entry of the channel's learned table.
    fn update_auto_channel_calibration(&mut self, channel: usize, octave: usize, code: i32);

    /// Which table the channel currently plays from.
    fn calibration_data_used(&self, channel: usize) -> CalibrationSource;
}

/// Poll-style access to the VCO frequency measurement input.
///
/// The meter timestamps zero crossings of the tuning input and reports the
/// period between successive crossings in timer ticks. There is a single
/// meter for the whole module; the host guarantees only the channel being
/// calibrated reads it.
pub trait FrequencyMeter {
    /// `true` if a fresh period sample is waiting.
    fn available(&self) -> bool;

    /// Take the pending period sample, in timer ticks.
    fn read(&mut self) -> u32;

    /// Rate of the timer the period samples are counted in, in Hz.
    fn timer_rate_hz(&self) -> f32;
}
