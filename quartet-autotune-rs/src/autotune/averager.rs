//! Frequency averaging and the scrolling history.
//!
//! Raw period samples from the frequency meter are noisy — the VCO jitters
//! and the capture timer quantises. The averager accumulates every sample
//! that arrives during an averaging window and emits a single smoothed
//! frequency when the window elapses. Settled readings are smoothed further
//! against a short scrolling history of previous emits.

use super::traits::FrequencyMeter;
use super::HISTORY_DEPTH;

/// Accumulating frequency averager with a fixed-depth scrolling history.
///
/// Embedded in each [`TunerChannel`](super::TunerChannel); reset at every
/// state transition so no stale samples leak across steps.
#[derive(Debug, Clone, Copy)]
pub struct FrequencyAverager {
    /// Sum of period samples accumulated this window, in timer ticks.
    period_sum: u64,
    /// Number of samples in `period_sum`.
    sample_count: u32,
    /// Control ticks since the last emit.
    ticks_since_emit: u32,
    /// Scrolling ring of the last emitted frequencies.
    history: [f32; HISTORY_DEPTH],
    /// Write position within `history`.
    head: usize,
    /// Number of valid entries in `history` (saturates at the depth).
    len: usize,
}

impl Default for FrequencyAverager {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyAverager {
    /// A fresh, empty averager.
    pub const fn new() -> Self {
        Self {
            period_sum: 0,
            sample_count: 0,
            ticks_since_emit: 0,
            history: [0.0; HISTORY_DEPTH],
            head: 0,
            len: 0,
        }
    }

    /// Clear the accumulator, the emit timer, and the history.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Run one control tick of the averager.
    ///
    /// Drains a pending period sample from the meter if one is waiting.
    /// Once at least one sample has accumulated **and** more than `window`
    /// ticks have passed since the last emit, converts the mean period to a
    /// frequency, pushes it onto the history, clears the accumulator, and
    /// returns `Some(frequency)`.
    ///
    /// The caller widens `window` while the correction loop is in its fine
    /// phase to trade latency for variance.
    pub fn poll<M: FrequencyMeter>(&mut self, meter: &mut M, window: u32) -> Option<f32> {
        self.ticks_since_emit = self.ticks_since_emit.saturating_add(1);

        if meter.available() {
            let period = meter.read();
            // A zero period is a capture glitch, not a signal.
            if period > 0 {
                self.period_sum += u64::from(period);
                self.sample_count += 1;
            }
        }

        if self.sample_count >= 1 && self.ticks_since_emit > window {
            let mean = self.period_sum as f32 / self.sample_count as f32;
            let frequency = meter.timer_rate_hz() / mean;

            self.push(frequency);
            self.period_sum = 0;
            self.sample_count = 0;
            self.ticks_since_emit = 0;

            Some(frequency)
        } else {
            None
        }
    }

    /// Control ticks since the last emit — the liveness input for the
    /// no-signal fault check.
    pub fn ticks_since_emit(&self) -> u32 {
        self.ticks_since_emit
    }

    /// Number of emits currently held in the history.
    pub fn history_len(&self) -> usize {
        self.len
    }

    /// Mean of the emits in the history, or `0.0` while it is empty.
    pub fn history_mean(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        let sum: f32 = self.history[..self.len].iter().sum();
        sum / self.len as f32
    }

    fn push(&mut self, frequency: f32) {
        self.history[self.head] = frequency;
        self.head = (self.head + 1) % HISTORY_DEPTH;
        if self.len < HISTORY_DEPTH {
            self.len += 1;
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Meter that hands out one scripted period sample per poll.
    struct ScriptMeter {
        periods: Vec<u32>,
        next: usize,
        rate: f32,
    }

    impl ScriptMeter {
        fn constant(period: u32, rate: f32) -> Self {
            Self {
                periods: vec![period; 10_000],
                next: 0,
                rate,
            }
        }

        fn silent() -> Self {
            Self {
                periods: Vec::new(),
                next: 0,
                rate: 1_000_000.0,
            }
        }
    }

    impl FrequencyMeter for ScriptMeter {
        fn available(&self) -> bool {
            self.next < self.periods.len()
        }

        fn read(&mut self) -> u32 {
            let p = self.periods[self.next];
            self.next += 1;
            p
        }

        fn timer_rate_hz(&self) -> f32 {
            self.rate
        }
    }

    // ── Emit gating ──────────────────────────────────────────────────

    #[test]
    fn no_emit_before_window_elapses() {
        let mut avg = FrequencyAverager::new();
        let mut meter = ScriptMeter::constant(1000, 1_000_000.0);

        for _ in 0..16 {
            assert!(avg.poll(&mut meter, 16).is_none());
        }
        // Tick 17: window exceeded, samples present.
        assert_eq!(avg.poll(&mut meter, 16), Some(1000.0));
    }

    #[test]
    fn no_emit_without_samples() {
        let mut avg = FrequencyAverager::new();
        let mut meter = ScriptMeter::silent();

        for _ in 0..100 {
            assert!(avg.poll(&mut meter, 16).is_none());
        }
        assert_eq!(avg.ticks_since_emit(), 100);
    }

    #[test]
    fn emit_resets_tick_counter() {
        let mut avg = FrequencyAverager::new();
        let mut meter = ScriptMeter::constant(500, 1_000_000.0);

        while avg.poll(&mut meter, 8).is_none() {}
        assert_eq!(avg.ticks_since_emit(), 0);
    }

    // ── Fairness ─────────────────────────────────────────────────────

    #[test]
    fn constant_input_emits_constant_frequency() {
        let mut avg = FrequencyAverager::new();
        // 2500 ticks at 1 MHz = 400 Hz.
        let mut meter = ScriptMeter::constant(2500, 1_000_000.0);

        let mut emits = 0;
        for _ in 0..1000 {
            if let Some(f) = avg.poll(&mut meter, 16) {
                assert_eq!(f, 400.0);
                emits += 1;
            }
        }
        assert!(emits > 10);
        assert_eq!(avg.history_mean(), 400.0);
    }

    #[test]
    fn zero_periods_are_ignored() {
        let mut avg = FrequencyAverager::new();
        let mut meter = ScriptMeter {
            periods: vec![0, 0, 0, 2000, 0, 2000],
            next: 0,
            rate: 1_000_000.0,
        };

        let mut last = None;
        for _ in 0..20 {
            if let Some(f) = avg.poll(&mut meter, 4) {
                last = Some(f);
            }
        }
        // Only the two 2000-tick periods count: 500 Hz.
        assert_eq!(last, Some(500.0));
    }

    // ── History ──────────────────────────────────────────────────────

    #[test]
    fn history_fills_to_depth_and_scrolls() {
        let mut avg = FrequencyAverager::new();
        let mut meter = ScriptMeter::constant(1000, 1_000_000.0);

        let mut emits = 0;
        while emits < HISTORY_DEPTH + 5 {
            if avg.poll(&mut meter, 2).is_some() {
                emits += 1;
            }
        }
        assert_eq!(avg.history_len(), HISTORY_DEPTH);
    }

    #[test]
    fn history_mean_empty_is_zero() {
        let avg = FrequencyAverager::new();
        assert_eq!(avg.history_mean(), 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut avg = FrequencyAverager::new();
        let mut meter = ScriptMeter::constant(1000, 1_000_000.0);

        for _ in 0..100 {
            let _ = avg.poll(&mut meter, 4);
        }
        avg.reset();

        assert_eq!(avg.history_len(), 0);
        assert_eq!(avg.ticks_since_emit(), 0);
        assert_eq!(avg.history_mean(), 0.0);
    }
}
