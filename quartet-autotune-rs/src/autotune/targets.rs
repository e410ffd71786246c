//! Octave target frequencies.
//!
//! After the baseline measurement the channel knows the frequency its VCO
//! produces at 0 V. Every octave anchor then has an exact target: the
//! baseline scaled by `2^(volts / scale)`. The exponentials are unrolled
//! into per-scaling constant tables — no `pow` in the control loop.

use super::CALIBRATION_POINTS;

/// Volt-per-octave convention of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scaling {
    /// 1 V per octave (Eurorack).
    #[default]
    V1,
    /// 1.2 V per octave (Buchla).
    V1_2,
    /// 2 V per octave.
    V2,
}

/// `2^v` for v = −3 … +7.
const V1_MULTIPLIERS: [f32; CALIBRATION_POINTS] = [
    0.125, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0,
];

/// `2^(v / 1.2)` for v = −3 … +7.
const V1_2_MULTIPLIERS: [f32; CALIBRATION_POINTS] = [
    0.176_776_70,
    0.314_980_26,
    0.561_231_02,
    1.0,
    1.781_797_4,
    3.174_802_1,
    5.656_854_2,
    10.079_368,
    17.959_393,
    32.0,
    57.017_518,
];

/// `2^(v / 2)` for v = −3 … +7.
const V2_MULTIPLIERS: [f32; CALIBRATION_POINTS] = [
    0.353_553_39,
    0.5,
    0.707_106_78,
    1.0,
    1.414_213_6,
    2.0,
    2.828_427_1,
    4.0,
    5.656_854_2,
    8.0,
    11.313_708,
];

impl Scaling {
    /// Display label for menus and the status screen.
    pub fn label(self) -> &'static str {
        match self {
            Scaling::V1 => "1V/oct",
            Scaling::V1_2 => "1.2V/oct",
            Scaling::V2 => "2V/oct",
        }
    }

    fn multipliers(self) -> &'static [f32; CALIBRATION_POINTS] {
        match self {
            Scaling::V1 => &V1_MULTIPLIERS,
            Scaling::V1_2 => &V1_2_MULTIPLIERS,
            Scaling::V2 => &V2_MULTIPLIERS,
        }
    }
}

/// Target frequency per octave anchor.
#[derive(Debug, Clone, Copy)]
pub struct TargetTable {
    targets: [f32; CALIBRATION_POINTS],
}

impl Default for TargetTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl TargetTable {
    /// All-zero table, the state before a baseline has been measured.
    pub const fn empty() -> Self {
        Self {
            targets: [0.0; CALIBRATION_POINTS],
        }
    }

    /// Derive the targets from the measured 0 V frequency.
    pub fn build(baseline_hz: f32, scaling: Scaling) -> Self {
        let mut targets = [0.0; CALIBRATION_POINTS];
        for (target, multiplier) in targets.iter_mut().zip(scaling.multipliers()) {
            *target = baseline_hz * multiplier;
        }
        Self { targets }
    }

    /// Target frequency for anchor `octave` (0 = −3 V).
    pub fn get(&self, octave: usize) -> f32 {
        self.targets[octave]
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// One musical cent, as a frequency ratio.
    const ONE_CENT: f32 = 1.000_577_8;

    fn assert_within_one_cent(actual: f32, expected: f32) {
        let ratio = actual / expected;
        assert!(
            ratio < ONE_CENT && ratio > 1.0 / ONE_CENT,
            "{actual} vs {expected}: off by ratio {ratio}"
        );
    }

    #[test]
    fn one_volt_per_octave_from_100_hz() {
        let table = TargetTable::build(100.0, Scaling::V1);
        let expected = [
            12.5, 25.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1600.0, 3200.0, 6400.0, 12800.0,
        ];
        for (k, &e) in expected.iter().enumerate() {
            assert_eq!(table.get(k), e, "anchor {k}");
        }
    }

    #[test]
    fn v1_2_multipliers_within_one_cent() {
        let table = TargetTable::build(100.0, Scaling::V1_2);
        for k in 0..CALIBRATION_POINTS {
            let volts = k as f32 - 3.0;
            let exact = 100.0 * 2.0_f32.powf(volts / 1.2);
            assert_within_one_cent(table.get(k), exact);
        }
    }

    #[test]
    fn v2_multipliers_within_one_cent() {
        let table = TargetTable::build(440.0, Scaling::V2);
        for k in 0..CALIBRATION_POINTS {
            let volts = k as f32 - 3.0;
            let exact = 440.0 * 2.0_f32.powf(volts / 2.0);
            assert_within_one_cent(table.get(k), exact);
        }
    }

    #[test]
    fn empty_table_is_all_zero() {
        let table = TargetTable::empty();
        for k in 0..CALIBRATION_POINTS {
            assert_eq!(table.get(k), 0.0);
        }
    }

    #[test]
    fn scaling_labels() {
        assert_eq!(Scaling::V1.label(), "1V/oct");
        assert_eq!(Scaling::V1_2.label(), "1.2V/oct");
        assert_eq!(Scaling::V2.label(), "2V/oct");
        assert_eq!(Scaling::default(), Scaling::V1);
    }
}
