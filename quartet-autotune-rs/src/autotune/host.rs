//! Four-channel autotune host.
//!
//! Owns one [`TunerChannel`] per DAC channel and enforces the module-wide
//! rule that at most one channel calibrates at a time — the frequency
//! meter input is a single jack, so whichever channel is non-idle owns it.
//! The host is driven from the fixed-rate control tick; the UI talks to it
//! through `arm`/`run`/`reset` and reads back status snapshots.

use super::channel::{TunerChannel, TunerStatus};
use super::error::HostError;
use super::targets::Scaling;
use super::traits::{DacInterface, FrequencyMeter};
use super::{DAC_CHANNELS, TunerState};

/// Status of all four channels, in one copyable frame for the display
/// task.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusFrame {
    pub channels: [TunerStatus; DAC_CHANNELS],
}

/// The four per-channel autotuners.
pub struct AutotuneHost {
    channels: [TunerChannel; DAC_CHANNELS],
}

impl Default for AutotuneHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AutotuneHost {
    pub const fn new() -> Self {
        Self {
            channels: [
                TunerChannel::new(0),
                TunerChannel::new(1),
                TunerChannel::new(2),
                TunerChannel::new(3),
            ],
        }
    }

    /// The channel currently calibrating (any non-idle state, including a
    /// latched fault or an unacknowledged completion), if one exists.
    pub fn active_channel(&self) -> Option<usize> {
        self.channels.iter().position(|ch| !ch.is_idle())
    }

    /// Arm a channel for calibration.
    ///
    /// Refused while any channel — this one included — is non-idle: a
    /// faulted or completed run must be acknowledged with
    /// [`reset`](Self::reset) first.
    pub fn arm<D: DacInterface>(
        &mut self,
        channel: usize,
        scaling: Scaling,
        dac: &mut D,
    ) -> Result<(), HostError> {
        if channel >= DAC_CHANNELS {
            return Err(HostError::InvalidChannel);
        }
        if self.active_channel().is_some() {
            return Err(HostError::CalibrationBusy);
        }
        self.channels[channel].arm(dac, scaling);
        Ok(())
    }

    /// Start the calibration run on an armed channel.
    pub fn run<D: DacInterface>(&mut self, channel: usize, dac: &mut D) -> Result<(), HostError> {
        if channel >= DAC_CHANNELS {
            return Err(HostError::InvalidChannel);
        }
        if self.channels[channel].state() != TunerState::Arm {
            return Err(HostError::NotArmed);
        }
        self.channels[channel].run(dac);
        Ok(())
    }

    /// Abort a run or acknowledge a completion/fault. Always permitted.
    pub fn reset(&mut self, channel: usize) -> Result<(), HostError> {
        if channel >= DAC_CHANNELS {
            return Err(HostError::InvalidChannel);
        }
        self.channels[channel].reset();
        Ok(())
    }

    /// Snapshot one channel.
    pub fn status(&self, channel: usize) -> Result<TunerStatus, HostError> {
        self.channels
            .get(channel)
            .map(TunerChannel::status)
            .ok_or(HostError::InvalidChannel)
    }

    /// Snapshot all four channels for the display task.
    pub fn status_frame(&self) -> StatusFrame {
        let mut frame = StatusFrame::default();
        for (slot, ch) in frame.channels.iter_mut().zip(&self.channels) {
            *slot = ch.status();
        }
        frame
    }

    /// One control tick: run the active channel's state machine, if any.
    ///
    /// The caller renders the normal pitch path for the idle channels
    /// before invoking this, so the DAC write for the calibrating channel
    /// always lands last.
    pub fn tick<D, M>(&mut self, dac: &mut D, meter: &mut M)
    where
        D: DacInterface,
        M: FrequencyMeter,
    {
        if let Some(idx) = self.active_channel() {
            self.channels[idx].tick(dac, meter);
        }
    }
}

// ── End-to-end Tests ─────────────────────────────────────────────────
