//! Per-channel pitch calibration.
//!
//! Each channel carries two tables of eleven per-octave anchor codes: the
//! factory table burned in at production test, and the learned table the
//! autotuner fills in against the user's VCO. A live selector picks which
//! table the output path plays from. Pitch rendering interpolates
//! linearly between adjacent anchors for the twelve semitones.

use embedded_hal_async::spi::SpiDevice;

use quartet::autotune::{CalibrationSource, DacInterface, CALIBRATION_POINTS, OCTAVES};

use crate::commands::CHANNEL_COUNT;
use crate::dac::QuadDac;
use crate::error::DacError;

/// Factory anchor codes: the calibrated range spread evenly across the
/// 16-bit code space, one anchor per volt.
pub const DEFAULT_OCTAVE_CODES: [i32; CALIBRATION_POINTS] = [
    0, 6554, 13107, 19661, 26214, 32768, 39321, 45875, 52428, 58982, 65535,
];

/// Semitones per octave.
const SEMITONES: i32 = 12;

/// Calibration state of one channel.
#[derive(Debug, Clone, Copy)]
pub struct ChannelCalibration {
    default_codes: [i32; CALIBRATION_POINTS],
    auto_codes: [i32; CALIBRATION_POINTS],
    source: CalibrationSource,
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelCalibration {
    /// Factory state: learned table mirrors the factory table, factory
    /// table live.
    pub const fn new() -> Self {
        Self {
            default_codes: DEFAULT_OCTAVE_CODES,
            auto_codes: DEFAULT_OCTAVE_CODES,
            source: CalibrationSource::Default,
        }
    }

    /// Which table the channel plays from.
    pub fn source(&self) -> CalibrationSource {
        self.source
    }

    /// Anchor code from the live table.
    pub fn live_code(&self, octave: usize) -> i32 {
        self.anchors()[octave]
    }

    /// Anchor code from the factory table.
    pub fn default_code(&self, octave: usize) -> i32 {
        self.default_codes[octave]
    }

    /// Output code for a pitch, interpolating between the live anchors.
    ///
    /// `octave` indexes the anchor table (0 = the bottom of the range);
    /// `semitone` is 0–11 above that anchor. Above the top anchor the last
    /// interval's slope extends the line; the result clamps to the code
    /// space either way.
    pub fn code_for_pitch(&self, octave: usize, semitone: u8) -> u16 {
        let anchors = self.anchors();
        let octave = octave.min(OCTAVES);
        let low = anchors[octave];
        let span = if octave < OCTAVES {
            anchors[octave + 1] - low
        } else {
            low - anchors[octave - 1]
        };
        let code = low + span * i32::from(semitone) / SEMITONES;
        code.clamp(0, 0xFFFF) as u16
    }

    fn anchors(&self) -> &[i32; CALIBRATION_POINTS] {
        match self.source {
            CalibrationSource::Default => &self.default_codes,
            CalibrationSource::Auto => &self.auto_codes,
        }
    }
}

/// The four calibration banks plus the per-channel latched output codes.
///
/// This is the [`DacInterface`] the autotune engine and the pitch path
/// drive from the control tick: every write latches, and the owning
/// [`CalibratedDac`] transfers latched codes to the converter after the
/// tick's logic has run.
pub struct CalibrationBank {
    channels: [ChannelCalibration; CHANNEL_COUNT],
    pending: [Option<u16>; CHANNEL_COUNT],
}

impl Default for CalibrationBank {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationBank {
    pub const fn new() -> Self {
        Self {
            channels: [ChannelCalibration::new(); CHANNEL_COUNT],
            pending: [None; CHANNEL_COUNT],
        }
    }

    /// Calibration state of one channel.
    pub fn calibration(&self, channel: usize) -> &ChannelCalibration {
        &self.channels[channel]
    }

    /// Latch the output code for a pitch on a channel.
    pub fn latch_pitch(&mut self, channel: usize, octave: usize, semitone: u8) {
        if channel >= CHANNEL_COUNT {
            return;
        }
        self.pending[channel] = Some(self.channels[channel].code_for_pitch(octave, semitone));
    }

    /// Take the pending code for a channel, if any.
    pub fn take_pending(&mut self, channel: usize) -> Option<u16> {
        self.pending[channel].take()
    }
}

impl DacInterface for CalibrationBank {
    fn set(&mut self, channel: usize, code: i32) {
        if channel >= CHANNEL_COUNT {
            return;
        }
        self.pending[channel] = Some(code.clamp(0, 0xFFFF) as u16);
    }

    fn default_calibrated_code(&self, channel: usize, octave: usize) -> i32 {
        self.channels[channel].default_codes[octave]
    }

    fn set_default_channel_calibration(&mut self, channel: usize) {
        self.channels[channel].source = CalibrationSource::Default;
    }

    fn set_auto_channel_calibration(&mut self, channel: usize) {
        self.channels[channel].source = CalibrationSource::Auto;
    }

    fn update_auto_channel_calibration(&mut self, channel: usize, octave: usize, code: i32) {
        self.channels[channel].auto_codes[octave] = code;
    }

    fn calibration_data_used(&self, channel: usize) -> CalibrationSource {
        self.channels[channel].source
    }
}

/// Converter plus calibration banks: the complete DAC stack the firmware
/// owns.
pub struct CalibratedDac<SPI> {
    dac: QuadDac<SPI>,
    /// Calibration banks and latched codes — hand `&mut bank` to the
    /// control logic, then [`flush`](Self::flush).
    pub bank: CalibrationBank,
}

impl<SPI> CalibratedDac<SPI>
where
    SPI: SpiDevice,
{
    pub fn new(spi: SPI) -> Self {
        Self {
            dac: QuadDac::new(spi),
            bank: CalibrationBank::new(),
        }
    }

    /// Transfer every latched code to the converter.
    ///
    /// Runs after the control tick's logic so each output reflects the
    /// tick's final decision exactly once.
    pub async fn flush(&mut self) -> Result<(), DacError<SPI::Error>> {
        for channel in 0..CHANNEL_COUNT {
            if let Some(code) = self.bank.take_pending(channel) {
                self.dac.write_code(channel, code).await?;
            }
        }
        Ok(())
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
