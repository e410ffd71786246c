//! Simulated hardware for the engine tests: a quad DAC with calibration
//! banks and a VCO tracking the latched DAC code, with configurable
//! tracking defects.

use super::traits::{CalibrationSource, DacInterface, FrequencyMeter};
use super::{CALIBRATION_POINTS, DAC_CHANNELS, ZERO_VOLT_INDEX};

/// Capture-timer rate of the simulated frequency meter. High enough that
/// period quantisation stays below one DAC code of frequency error at the
/// top measured octave.
pub const TIMER_RATE_HZ: f32 = 100_000_000.0;

/// DAC codes per volt in the simulated converter.
pub const CODES_PER_VOLT: f32 = 6000.0;

fn anchor(octave: usize) -> i32 {
    octave as i32 * CODES_PER_VOLT as i32
}

/// Simulated quad DAC: latched output codes plus per-channel calibration
/// banks.
pub struct SimDac {
    pub latched: [i32; DAC_CHANNELS],
    pub auto_table: [[i32; CALIBRATION_POINTS]; DAC_CHANNELS],
    pub live: [CalibrationSource; DAC_CHANNELS],
    /// Learned-table writes observed, all channels.
    pub auto_writes: usize,
}

impl SimDac {
    pub fn new() -> Self {
        Self {
            latched: [0; DAC_CHANNELS],
            auto_table: [[0; CALIBRATION_POINTS]; DAC_CHANNELS],
            live: [CalibrationSource::Default; DAC_CHANNELS],
            auto_writes: 0,
        }
    }
}

impl DacInterface for SimDac {
    fn set(&mut self, channel: usize, code: i32) {
        self.latched[channel] = code.clamp(0, 0xFFFF);
    }

    fn default_calibrated_code(&self, _channel: usize, octave: usize) -> i32 {
        anchor(octave)
    }

    fn set_default_channel_calibration(&mut self, channel: usize) {
        self.live[channel] = CalibrationSource::Default;
    }

    fn set_auto_channel_calibration(&mut self, channel: usize) {
        self.live[channel] = CalibrationSource::Auto;
    }

    fn update_auto_channel_calibration(&mut self, channel: usize, octave: usize, code: i32) {
        self.auto_table[channel][octave] = code;
        self.auto_writes += 1;
    }

    fn calibration_data_used(&self, channel: usize) -> CalibrationSource {
        self.live[channel]
    }
}

/// Simulated VCO + frequency meter.
///
/// Call [`step`](SimVco::step) once per control tick with the code the DAC
/// is currently playing; every `sample_interval` ticks it converts the
/// resulting frequency into a period sample for the engine to drain.
pub struct SimVco {
    /// Frequency at the 0 V anchor code.
    base_hz: f32,
    /// Volts the VCO needs for one octave (1.0 = Eurorack).
    volts_per_octave: f32,
    /// Converter error, in codes per volt of ideal position. Models a DAC
    /// whose gain is slightly off so the error grows across the range.
    drift_codes_per_volt: f32,
    /// Output frequency ignoring the CV entirely (a VCO that is not
    /// tracking), if set.
    fixed_hz: Option<f32>,
    /// Produces no samples at all (nothing connected), if set.
    silent: bool,
    sample_interval: u32,
    tick: u32,
    pending: Option<u32>,
}

impl SimVco {
    fn base(base_hz: f32) -> Self {
        Self {
            base_hz,
            volts_per_octave: 1.0,
            drift_codes_per_volt: 0.0,
            fixed_hz: None,
            silent: false,
            sample_interval: 32,
            tick: 0,
            pending: None,
        }
    }

    /// Ideal 1 V/oct VCO on an ideal converter.
    pub fn perfect(base_hz: f32) -> Self {
        Self::base(base_hz)
    }

    /// Ideal VCO needing `volts_per_octave` per octave.
    pub fn perfect_scaled(base_hz: f32, volts_per_octave: f32) -> Self {
        Self {
            volts_per_octave,
            ..Self::base(base_hz)
        }
    }

    /// Ideal VCO on a converter with a linear gain error.
    pub fn with_drift(base_hz: f32, drift_codes_per_volt: f32) -> Self {
        Self {
            drift_codes_per_volt,
            ..Self::base(base_hz)
        }
    }

    /// VCO stuck at a fixed frequency regardless of CV.
    pub fn fixed(hz: f32) -> Self {
        Self {
            fixed_hz: Some(hz),
            ..Self::base(hz)
        }
    }

    /// Nothing connected to the tuning input.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::base(0.0)
        }
    }

    /// Frequency the VCO produces for a DAC code.
    pub fn frequency_for(&self, code: i32) -> f32 {
        if let Some(hz) = self.fixed_hz {
            return hz;
        }
        let volts = (code - anchor(ZERO_VOLT_INDEX)) as f32 / CODES_PER_VOLT;
        let effective_volts = volts + self.drift_codes_per_volt * volts / CODES_PER_VOLT;
        self.base_hz * (effective_volts / self.volts_per_octave).exp2()
    }

    /// Advance one control tick with the DAC playing `code`.
    pub fn step(&mut self, code: i32) {
        if self.silent {
            return;
        }
        self.tick += 1;
        if self.tick % self.sample_interval == 0 {
            let f = self.frequency_for(code);
            self.pending = Some((TIMER_RATE_HZ / f).round() as u32);
        }
    }
}

impl FrequencyMeter for SimVco {
    fn available(&self) -> bool {
        self.pending.is_some()
    }

    fn read(&mut self) -> u32 {
        self.pending.take().unwrap_or(0)
    }

    fn timer_rate_hz(&self) -> f32 {
        TIMER_RATE_HZ
    }
}
