//! Successive-approximation correction loop.
//!
//! One [`SarLoop`] runs per octave step. Every averaged frequency sample
//! moves the signed DAC offset towards the target by the current step
//! factor; each sign reversal halves the factor (floored at one). Once the
//! factor reaches unit resolution the offset dithers around the target, and
//! counting enough unit corrections in *both* directions proves the result
//! straddles the target instead of overshooting monotonically.

use super::{CONVERGE_PASSES, INITIAL_STEP_FACTOR, MAX_NUM_PASSES};

/// Per-step convergence state.
#[derive(Debug, Clone, Copy)]
pub struct SarLoop {
    /// Signed DAC correction added to the anchor's default code.
    offset: i32,
    /// Current step magnitude.
    factor: u32,
    /// `true` if the last correction was positive.
    direction_up: bool,
    /// Unit-step corrections applied upward.
    up_count: u32,
    /// Unit-step corrections applied downward.
    down_count: u32,
    /// Total observations this step.
    passes: u32,
}

impl Default for SarLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl SarLoop {
    /// A fresh loop with the full step factor.
    pub const fn new() -> Self {
        Self {
            offset: 0,
            factor: INITIAL_STEP_FACTOR,
            direction_up: true,
            up_count: 0,
            down_count: 0,
            passes: 0,
        }
    }

    /// Restart the loop for a new octave step.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Force the factor to unit resolution without touching anything else.
    ///
    /// Used while the channel is armed but not yet running: a unit factor
    /// widens the averaging window immediately, so the baseline that
    /// follows is measured with the low-variance window from the start.
    pub fn prime(&mut self) {
        self.factor = 1;
    }

    /// Current signed correction.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Current step magnitude.
    pub fn factor(&self) -> u32 {
        self.factor
    }

    /// `true` once the loop has reached unit resolution.
    pub fn fine(&self) -> bool {
        self.factor == 1
    }

    /// `true` once this step has used up its pass budget (or converged,
    /// which spends the budget deliberately).
    pub fn exhausted(&self) -> bool {
        self.passes > MAX_NUM_PASSES
    }

    /// Feed one averaged frequency observation against the step target.
    ///
    /// An observation exactly on target applies no correction but still
    /// consumes a pass.
    pub fn observe(&mut self, measured_hz: f32, target_hz: f32) {
        if measured_hz < target_hz {
            if !self.direction_up {
                self.factor = (self.factor >> 1) | 1;
            }
            self.direction_up = true;
            self.offset += self.factor as i32;
            if self.factor == 1 {
                self.up_count += 1;
            }
        } else if measured_hz > target_hz {
            if self.direction_up {
                self.factor = (self.factor >> 1) | 1;
            }
            self.direction_up = false;
            self.offset -= self.factor as i32;
            if self.factor == 1 {
                self.down_count += 1;
            }
        }

        self.passes += 1;

        if self.up_count > CONVERGE_PASSES && self.down_count > CONVERGE_PASSES {
            // Converged: spend the remaining budget so the channel advances
            // on the next emit.
            self.passes = MAX_NUM_PASSES + 1;
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
