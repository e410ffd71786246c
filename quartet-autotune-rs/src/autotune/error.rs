/// Latched calibration faults.
///
/// A fault freezes the channel in the [`Error`](super::TunerState::Error)
/// state until the user resets it; it is surfaced through
/// [`TunerStatus`](super::TunerStatus), never propagated as a `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AutotuneFault {
    /// No fresh frequency sample arrived within the liveness timeout —
    /// nothing is connected to the tuning input, or the VCO is dead.
    NoSignal,
    /// The measured frequency failed to roughly double between octave
    /// steps — the VCO is not tracking the CV.
    NotTracking,
}

/// Errors returned by the [`AutotuneHost`](super::AutotuneHost) control
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostError {
    /// Channel index out of range (must be < `DAC_CHANNELS`).
    InvalidChannel,
    /// Another channel is already calibrating, or this channel must be
    /// reset before it can be armed again.
    CalibrationBusy,
    /// `run` was called on a channel that is not armed.
    NotArmed,
}
