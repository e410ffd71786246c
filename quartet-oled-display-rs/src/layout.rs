//! Status-screen layout and rendering.
//!
//! Two views share the panel: an overview row per channel while the
//! module idles, and a detail view for the channel being calibrated.
//! Rendering works against any `embedded-graphics` draw target; the pure
//! helpers (view selection, value formatting) carry the unit tests.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Text},
};
use heapless::String;

use quartet::autotune::{AutotuneFault, StatusFrame, TunerState, MEASUREMENT_STEPS, OCTAVES};

// ── DisplayConfig ────────────────────────────────────────────────────

/// Geometry and cadence of the status screen.
///
/// All layout coordinates live here; [`DisplayConfig::default()`]
/// reproduces the panel design (128×64, 30 Hz).
pub struct DisplayConfig {
    /// Refresh rate in Hz. Default: 30.
    pub update_frequency_hz: u32,
    /// Total display width in pixels. Default: 128.
    pub display_width: u32,
    /// Baseline of the centred header line. Default: 10.
    pub header_y: i32,
    /// Baseline of the octave-progress line (detail view). Default: 26.
    pub progress_y: i32,
    /// Baseline of the measured-frequency line. Default: 38.
    pub measured_y: i32,
    /// Baseline of the target-frequency line. Default: 50.
    pub target_y: i32,
    /// Baseline of the fault/completion banner. Default: 62.
    pub banner_y: i32,
    /// Baseline of the first overview row. Default: 24.
    pub overview_start_y: i32,
    /// Pitch between overview rows. Default: 12.
    pub overview_row_pitch: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            update_frequency_hz: 30,
            display_width: 128,
            header_y: 10,
            progress_y: 26,
            measured_y: 38,
            target_y: 50,
            banner_y: 62,
            overview_start_y: 24,
            overview_row_pitch: 12,
        }
    }
}

impl DisplayConfig {
    /// Timer period for the update task, in milliseconds.
    pub fn update_period_ms(&self) -> u64 {
        1000 / u64::from(self.update_frequency_hz)
    }
}

// ── View selection and formatting ────────────────────────────────────

/// The channel the screen should detail: whichever one is calibrating.
/// `None` selects the overview.
pub fn screen_channel(frame: &StatusFrame) -> Option<usize> {
    frame
        .channels
        .iter()
        .position(|ch| ch.state != TunerState::Idle)
}

/// A frequency for the screen: one decimal and a unit, `"---"` before
/// anything has been measured.
pub fn format_hz(hz: f32) -> String<16> {
    let mut s: String<16> = String::new();
    if hz <= 0.0 {
        let _ = s.push_str("---");
    } else {
        let _ = write!(s, "{:.1} Hz", hz);
    }
    s
}

/// Banner text for a latched fault.
pub fn fault_label(fault: AutotuneFault) -> &'static str {
    match fault {
        AutotuneFault::NoSignal => "no signal",
        AutotuneFault::NotTracking => "VCO not tracking",
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// Render one status frame into a draw target.
///
/// The caller clears the buffer first and flushes afterwards; this
/// function only draws.
pub fn render_status<D>(
    display: &mut D,
    frame: &StatusFrame,
    config: &DisplayConfig,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let centre_x = config.display_width as i32 / 2;

    match screen_channel(frame) {
        Some(idx) => {
            let status = &frame.channels[idx];

            // Header: channel and state.
            let mut header: String<24> = String::new();
            let _ = write!(header, "CH{} {}", status.channel + 1, status.state.label());
            Text::with_alignment(
                &header,
                Point::new(centre_x, config.header_y),
                style,
                Alignment::Center,
            )
            .draw(display)?;

            // Octave progress, phrased per phase.
            let mut progress: String<24> = String::new();
            match status.state {
                TunerState::Octave => {
                    let _ = write!(
                        progress,
                        "octave {}/{}",
                        status.octave + 1,
                        MEASUREMENT_STEPS
                    );
                }
                TunerState::Commit => {
                    let _ = write!(progress, "write {}/{}", status.octave + 1, OCTAVES + 1);
                }
                _ => {}
            }
            if !progress.is_empty() {
                Text::with_alignment(
                    &progress,
                    Point::new(centre_x, config.progress_y),
                    style,
                    Alignment::Center,
                )
                .draw(display)?;
            }

            // Measured and target frequency.
            let mut measured: String<24> = String::new();
            let _ = write!(measured, "f {}", format_hz(status.frequency));
            Text::new(&measured, Point::new(2, config.measured_y), style).draw(display)?;

            let mut target: String<24> = String::new();
            let _ = write!(target, "t {}", format_hz(status.target));
            Text::new(&target, Point::new(2, config.target_y), style).draw(display)?;

            // Banner: fault wins over completion.
            let banner = match (status.fault, status.completed) {
                (Some(fault), _) => Some(fault_label(fault)),
                (None, true) => Some("complete"),
                (None, false) => None,
            };
            if let Some(text) = banner {
                Text::with_alignment(
                    text,
                    Point::new(centre_x, config.banner_y),
                    style,
                    Alignment::Center,
                )
                .draw(display)?;
            }
        }
        None => {
            Text::with_alignment(
                "QUARTET",
                Point::new(centre_x, config.header_y),
                style,
                Alignment::Center,
            )
            .draw(display)?;

            for (i, status) in frame.channels.iter().enumerate() {
                let mut row: String<24> = String::new();
                let _ = write!(row, "CH{} {}", i + 1, status.state.label());
                let y = config.overview_start_y + i as i32 * config.overview_row_pitch;
                Text::new(&row, Point::new(2, y), style).draw(display)?;
            }
        }
    }

    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_selected_while_all_idle() {
        let frame = StatusFrame::default();
        assert_eq!(screen_channel(&frame), None);
    }

    #[test]
    fn detail_selects_the_calibrating_channel() {
        let mut frame = StatusFrame::default();
        frame.channels[2].state = TunerState::Baseline;
        assert_eq!(screen_channel(&frame), Some(2));
    }

    #[test]
    fn detail_prefers_first_non_idle() {
        // Cannot happen live (the host enforces a single active channel),
        // but the screen should still pick deterministically.
        let mut frame = StatusFrame::default();
        frame.channels[1].state = TunerState::Done;
        frame.channels[3].state = TunerState::Error;
        assert_eq!(screen_channel(&frame), Some(1));
    }

    #[test]
    fn format_hz_one_decimal() {
        assert_eq!(format_hz(440.0).as_str(), "440.0 Hz");
        assert_eq!(format_hz(12.55).as_str(), "12.6 Hz");
    }

    #[test]
    fn format_hz_placeholder_before_measurement() {
        assert_eq!(format_hz(0.0).as_str(), "---");
        assert_eq!(format_hz(-1.0).as_str(), "---");
    }

    #[test]
    fn fault_labels() {
        assert_eq!(fault_label(AutotuneFault::NoSignal), "no signal");
        assert_eq!(fault_label(AutotuneFault::NotTracking), "VCO not tracking");
    }

    #[test]
    fn default_config_values() {
        let c = DisplayConfig::default();
        assert_eq!(c.update_frequency_hz, 30);
        assert_eq!(c.display_width, 128);
        assert_eq!(c.update_period_ms(), 33);
    }

    #[test]
    fn update_period_scales_with_frequency() {
        let c = DisplayConfig {
            update_frequency_hz: 20,
            ..DisplayConfig::default()
        };
        assert_eq!(c.update_period_ms(), 50);
    }
}
