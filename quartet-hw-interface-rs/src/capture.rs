//! VCO frequency capture.
//!
//! The tuning input carries a squared-up copy of the VCO output. The
//! capture task timestamps rising edges with the Embassy clock and hands
//! the period between successive edges to the engine through a bounded
//! channel; [`CaptureMeter`] adapts the channel's consumer side to the
//! engine's [`FrequencyMeter`] poll interface.

use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;

use quartet::autotune::FrequencyMeter;

/// Queue depth for period samples. The engine drains one sample per
/// control tick, so a short queue rides out burst jitter without letting
/// stale periods pile up.
pub const PERIOD_QUEUE_DEPTH: usize = 16;

type PeriodChannel = Channel<CriticalSectionRawMutex, u32, PERIOD_QUEUE_DEPTH>;

/// Edge-timestamping capture loop.
///
/// When the queue is full the sample is dropped — the averager would
/// rather lose a period than read one late.
#[embassy_executor::task]
pub async fn capture_task(mut input: Input<'static>, periods: &'static PeriodChannel) {
    let mut last_edge: Option<Instant> = None;

    loop {
        input.wait_for_rising_edge().await;
        let now = Instant::now();

        if let Some(prev) = last_edge {
            let ticks = (now - prev).as_ticks();
            // Periods beyond u32 ticks mean sub-audio input; the engine's
            // liveness timeout covers that case.
            if let Ok(ticks) = u32::try_from(ticks) {
                let _ = periods.try_send(ticks);
            }
        }
        last_edge = Some(now);
    }
}

/// The engine-facing side of the capture channel.
pub struct CaptureMeter {
    periods: &'static PeriodChannel,
}

impl CaptureMeter {
    pub fn new(periods: &'static PeriodChannel) -> Self {
        Self { periods }
    }
}

impl FrequencyMeter for CaptureMeter {
    fn available(&self) -> bool {
        !self.periods.is_empty()
    }

    fn read(&mut self) -> u32 {
        // A race against the capture task can only make the queue fuller;
        // an empty read maps to the zero-period glitch the averager drops.
        self.periods.try_receive().unwrap_or(0)
    }

    fn timer_rate_hz(&self) -> f32 {
        embassy_time::TICK_HZ as f32
    }
}
