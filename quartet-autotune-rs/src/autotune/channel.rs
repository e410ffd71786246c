//! Per-channel calibration state machine.
//!
//! A channel steps through a fixed sequence: arm on the 0 V default code,
//! measure the baseline and derive the octave targets, then walk the octave
//! ladder running the correction loop at each step, and finally commit the
//! learned table to the DAC driver. Faults latch the channel in `Error`
//! until it is reset; a step that refuses to converge stores its best
//! offset and moves on.

use super::averager::FrequencyAverager;
use super::error::AutotuneFault;
use super::sar::SarLoop;
use super::targets::{Scaling, TargetTable};
use super::traits::{DacInterface, FrequencyMeter};
use super::{
    CALIBRATION_POINTS, COMMIT_INTERVAL, ERROR_TIMEOUT, FREQ_MEASURE_TIMEOUT, HISTORY_DEPTH,
    MEASUREMENT_STEPS, OCTAVES, ZERO_VOLT_INDEX,
};

/// Slack factor for the octave-doubling check. Between successive steps the
/// measured frequency must grow by at least this much, well under the ×2 a
/// tracking VCO produces but above anything jitter can explain away.
const DOUBLING_SLACK: f32 = 1.25;

/// Calibration states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TunerState {
    /// Not calibrating; the normal pitch-output path owns the channel.
    #[default]
    Idle,
    /// Holding the 0 V default code, waiting for the run command. The
    /// averager is polled and its output discarded so measurement starts
    /// warm.
    Arm,
    /// Measuring the 0 V frequency and building the target table.
    Baseline,
    /// Running the correction loop on one octave anchor.
    Octave,
    /// Writing the learned table into the DAC driver, one entry at a time.
    Commit,
    /// Finished; the learned table is live.
    Done,
    /// A fault latched; frozen until reset.
    Error,
}

impl TunerState {
    /// Short display label for the status screen.
    pub fn label(self) -> &'static str {
        match self {
            TunerState::Idle => "idle",
            TunerState::Arm => "armed",
            TunerState::Baseline => "baseline",
            TunerState::Octave => "tuning",
            TunerState::Commit => "commit",
            TunerState::Done => "done",
            TunerState::Error => "error",
        }
    }
}

/// Snapshot of a channel for the UI and display.
///
/// Every field is a single word, so a reader on another task sees at worst
/// a mix of adjacent ticks, never a torn value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TunerStatus {
    pub channel: u8,
    pub state: TunerState,
    /// Current octave anchor (measurement or commit position).
    pub octave: u8,
    /// Latest averaged frequency, Hz.
    pub frequency: f32,
    /// Target frequency of the current octave step, Hz. Zero outside the
    /// octave states.
    pub target: f32,
    pub fault: Option<AutotuneFault>,
    pub completed: bool,
}

/// One DAC channel's autotuner.
#[derive(Debug, Clone, Copy)]
pub struct TunerChannel {
    channel: usize,
    state: TunerState,
    scaling: Scaling,
    /// Octave anchor currently being measured or committed.
    octave: usize,
    /// Learned signed corrections, one per anchor.
    corrections: [i32; CALIBRATION_POINTS],
    targets: TargetTable,
    averager: FrequencyAverager,
    sar: SarLoop,
    /// Latest averaged frequency.
    frequency: f32,
    /// Settled frequency of the last completed step (baseline included).
    last_settled: f32,
    /// Emits seen since entering `Baseline`.
    baseline_emits: u32,
    /// Ticks since the last commit write.
    commit_wait: u32,
    fault: Option<AutotuneFault>,
    completed: bool,
}

impl TunerChannel {
    /// An idle channel.
    pub const fn new(channel: usize) -> Self {
        Self {
            channel,
            state: TunerState::Idle,
            scaling: Scaling::V1,
            octave: 0,
            corrections: [0; CALIBRATION_POINTS],
            targets: TargetTable::empty(),
            averager: FrequencyAverager::new(),
            sar: SarLoop::new(),
            frequency: 0.0,
            last_settled: 0.0,
            baseline_emits: 0,
            commit_wait: 0,
            fault: None,
            completed: false,
        }
    }

    pub fn state(&self) -> TunerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TunerState::Idle
    }

    /// Learned correction for an octave anchor.
    pub fn correction(&self, octave: usize) -> i32 {
        self.corrections[octave]
    }

    /// Snapshot for the UI.
    pub fn status(&self) -> TunerStatus {
        let target = match self.state {
            TunerState::Octave => self.targets.get(self.octave),
            _ => 0.0,
        };
        TunerStatus {
            channel: self.channel as u8,
            state: self.state,
            octave: self.octave as u8,
            frequency: self.frequency,
            target,
            fault: self.fault,
            completed: self.completed,
        }
    }

    /// Arm the channel: hold the 0 V default code and start the averager
    /// warming up with the wide measurement window.
    pub fn arm<D: DacInterface>(&mut self, dac: &mut D, scaling: Scaling) {
        self.scaling = scaling;
        self.averager.reset();
        self.sar.reset();
        self.sar.prime();
        dac.set(
            self.channel,
            dac.default_calibrated_code(self.channel, ZERO_VOLT_INDEX),
        );
        self.state = TunerState::Arm;

        #[cfg(feature = "defmt")]
        defmt::debug!("tuner {}: armed ({})", self.channel, scaling.label());
    }

    /// Start the calibration run. Only meaningful from `Arm`.
    pub fn run<D: DacInterface>(&mut self, dac: &mut D) {
        // Measure the baseline against the factory table.
        dac.set_default_channel_calibration(self.channel);
        dac.set(
            self.channel,
            dac.default_calibrated_code(self.channel, ZERO_VOLT_INDEX),
        );
        self.averager.reset();
        self.baseline_emits = 0;
        self.state = TunerState::Baseline;

        #[cfg(feature = "defmt")]
        defmt::info!("tuner {}: baseline measurement", self.channel);
    }

    /// Abort or acknowledge: clear every learned value and return to idle.
    ///
    /// The live-table selector is untouched — it only ever flips to the
    /// learned table on a completed run, so a reset mid-commit leaves the
    /// factory table live.
    pub fn reset(&mut self) {
        let channel = self.channel;
        *self = Self::new(channel);

        #[cfg(feature = "defmt")]
        defmt::debug!("tuner {}: reset", channel);
    }

    /// One control tick. Bounded work, no blocking.
    pub fn tick<D, M>(&mut self, dac: &mut D, meter: &mut M)
    where
        D: DacInterface,
        M: FrequencyMeter,
    {
        match self.state {
            TunerState::Idle | TunerState::Done | TunerState::Error => {}

            TunerState::Arm => {
                dac.set(
                    self.channel,
                    dac.default_calibrated_code(self.channel, ZERO_VOLT_INDEX),
                );
                // Discard emits: this only primes the averager.
                let _ = self.averager.poll(meter, self.window());
            }

            TunerState::Baseline => {
                if self.signal_lost() {
                    return;
                }
                dac.set(
                    self.channel,
                    dac.default_calibrated_code(self.channel, ZERO_VOLT_INDEX),
                );
                if let Some(f) = self.averager.poll(meter, self.window()) {
                    self.frequency = f;
                    self.baseline_emits += 1;
                    if self.baseline_emits >= HISTORY_DEPTH as u32 {
                        let baseline = 0.5 * (f + self.averager.history_mean());
                        self.last_settled = baseline;
                        self.targets = TargetTable::build(baseline, self.scaling);
                        self.enter_octave(0);

                        #[cfg(feature = "defmt")]
                        defmt::info!(
                            "tuner {}: baseline {} Hz",
                            self.channel,
                            baseline
                        );
                    }
                }
            }

            TunerState::Octave => {
                if self.signal_lost() {
                    return;
                }
                dac.set(
                    self.channel,
                    dac.default_calibrated_code(self.channel, self.octave) + self.sar.offset(),
                );
                if let Some(f) = self.averager.poll(meter, self.window()) {
                    self.frequency = f;
                    if self.sar.exhausted() {
                        self.advance_octave(f);
                    } else {
                        self.sar.observe(f, self.targets.get(self.octave));
                    }
                }
            }

            TunerState::Commit => {
                self.commit_wait += 1;
                if self.commit_wait < COMMIT_INTERVAL {
                    return;
                }
                self.commit_wait = 0;

                let code = dac.default_calibrated_code(self.channel, self.octave)
                    + self.corrections[self.octave];
                dac.set(self.channel, code);
                dac.update_auto_channel_calibration(self.channel, self.octave, code);

                self.octave += 1;
                if self.octave > OCTAVES {
                    dac.set_auto_channel_calibration(self.channel);
                    self.completed = true;
                    self.state = TunerState::Done;

                    #[cfg(feature = "defmt")]
                    defmt::info!("tuner {}: calibration complete", self.channel);
                }
            }
        }
    }

    /// Averaging window for the current correction resolution: a quarter of
    /// the nominal timeout while the loop takes coarse steps, four times
    /// the nominal timeout once it is down to unit corrections.
    fn window(&self) -> u32 {
        if self.sar.fine() {
            FREQ_MEASURE_TIMEOUT << 2
        } else {
            FREQ_MEASURE_TIMEOUT >> 2
        }
    }

    /// Latch the no-signal fault when the averager has been starved past
    /// the liveness timeout.
    fn signal_lost(&mut self) -> bool {
        if self.averager.ticks_since_emit() > ERROR_TIMEOUT {
            self.fault = Some(AutotuneFault::NoSignal);
            self.state = TunerState::Error;

            #[cfg(feature = "defmt")]
            defmt::warn!("tuner {}: no signal on tuning input", self.channel);

            true
        } else {
            false
        }
    }

    fn enter_octave(&mut self, octave: usize) {
        self.octave = octave;
        self.sar.reset();
        self.averager.reset();
        self.state = TunerState::Octave;
    }

    /// Close out the current octave step: verify the VCO kept tracking,
    /// store the settled frequency and the learned correction, and move to
    /// the next step or to the commit phase.
    fn advance_octave(&mut self, f: f32) {
        // From the second step on, the frequency must have grown roughly an
        // octave since the previous settled reading. The first step sits
        // three octaves below the baseline, so it is exempt.
        if self.octave >= 1 && self.last_settled * DOUBLING_SLACK > f {
            self.fault = Some(AutotuneFault::NotTracking);
            self.state = TunerState::Error;

            #[cfg(feature = "defmt")]
            defmt::warn!(
                "tuner {}: VCO not tracking at octave {}",
                self.channel,
                self.octave
            );
            return;
        }

        self.last_settled = 0.5 * (f + self.averager.history_mean());
        self.corrections[self.octave] = self.sar.offset();

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "tuner {}: octave {} correction {}",
            self.channel,
            self.octave,
            self.corrections[self.octave]
        );

        if self.octave + 1 < MEASUREMENT_STEPS {
            self.enter_octave(self.octave + 1);
        } else {
            self.octave = 0;
            self.commit_wait = 0;
            self.state = TunerState::Commit;
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autotune::sim::{SimDac, SimVco};

    fn armed_channel(dac: &mut SimDac) -> TunerChannel {
        let mut ch = TunerChannel::new(0);
        ch.arm(dac, Scaling::V1);
        ch
    }

    #[test]
    fn new_channel_is_idle() {
        let ch = TunerChannel::new(2);
        assert!(ch.is_idle());
        let status = ch.status();
        assert_eq!(status.channel, 2);
        assert_eq!(status.state, TunerState::Idle);
        assert_eq!(status.frequency, 0.0);
        assert!(status.fault.is_none());
        assert!(!status.completed);
    }

    #[test]
    fn arm_holds_zero_volt_code() {
        let mut dac = SimDac::new();
        let ch = armed_channel(&mut dac);
        assert_eq!(ch.state(), TunerState::Arm);
        assert_eq!(dac.latched[0], dac.default_calibrated_code(0, ZERO_VOLT_INDEX));
    }

    #[test]
    fn arm_primes_wide_window() {
        let mut dac = SimDac::new();
        let ch = armed_channel(&mut dac);
        assert_eq!(ch.window(), FREQ_MEASURE_TIMEOUT << 2);
    }

    #[test]
    fn baseline_needs_history_depth_emits() {
        let mut dac = SimDac::new();
        let mut vco = SimVco::perfect(100.0);
        let mut ch = armed_channel(&mut dac);
        ch.run(&mut dac);

        let mut emits = 0;
        while ch.state() == TunerState::Baseline {
            vco.step(dac.latched[0]);
            let before = ch.baseline_emits;
            ch.tick(&mut dac, &mut vco);
            if ch.baseline_emits != before {
                emits += 1;
            }
        }
        assert_eq!(emits, HISTORY_DEPTH as u32);
        assert_eq!(ch.state(), TunerState::Octave);
        assert_eq!(ch.status().octave, 0);
        // Baseline of a perfect 100 Hz VCO: first target is 100/8.
        assert_eq!(ch.targets.get(0), 12.5);
        assert_eq!(ch.targets.get(ZERO_VOLT_INDEX), 100.0);
    }

    #[test]
    fn reset_clears_corrections_and_frequencies() {
        let mut dac = SimDac::new();
        let mut ch = armed_channel(&mut dac);
        ch.run(&mut dac);
        ch.frequency = 123.0;
        ch.last_settled = 456.0;
        ch.corrections[4] = -17;

        ch.reset();

        assert!(ch.is_idle());
        assert_eq!(ch.corrections, [0; CALIBRATION_POINTS]);
        assert_eq!(ch.frequency, 0.0);
        assert_eq!(ch.last_settled, 0.0);
        assert!(ch.fault.is_none());
        assert!(!ch.completed);
    }

    #[test]
    fn status_target_only_in_octave_state() {
        let mut dac = SimDac::new();
        let mut ch = armed_channel(&mut dac);
        assert_eq!(ch.status().target, 0.0);

        ch.targets = TargetTable::build(100.0, Scaling::V1);
        ch.enter_octave(3);
        assert_eq!(ch.status().target, 100.0);
    }
}
