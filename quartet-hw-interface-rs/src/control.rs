//! The 4 kHz control tick.
//!
//! One task owns every piece of engine state: the autotune host, the DAC
//! calibration banks, and the latched output codes. UI tasks only enqueue
//! commands, so there is a single writer and the tick body needs no
//! locking beyond the brief settings read and status publish.
//!
//! The pitch CVs are event-driven: a channel's code is latched at boot,
//! whenever one of its CV-relevant settings changes, and when it returns
//! to the normal output path after a calibration. Between events the DAC
//! holds its outputs, so the SPI bus only carries real updates.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Ticker};
use embedded_hal_async::spi::SpiDevice;

use dac_driver::{CalibratedDac, CalibrationBank};
use quartet::autotune::{AutotuneHost, Scaling, StatusFrame, TunerState, DAC_CHANNELS};
use quartet_settings::channel_settings::{SettingId, SettingsStore};

use crate::capture::CaptureMeter;
use crate::ui::UiCommand;

/// Control tick rate. Fast enough that the slowest averaging window still
/// spans under a second; slow enough to leave the bus idle between ticks.
pub const CONTROL_TICK_HZ: u64 = 4_000;

/// Status snapshots publish every N ticks (100 Hz — comfortably above the
/// display refresh).
const STATUS_DIVIDER: u32 = 40;

/// Map the V/oct scaling setting to the engine's scaling mode.
fn scaling_from_setting(value: i32) -> Scaling {
    match value {
        1 => Scaling::V1_2,
        2 => Scaling::V2,
        _ => Scaling::V1,
    }
}

/// Latch a channel's pitch code from its octave and semitone settings.
fn latch_pitch_from(bank: &mut CalibrationBank, settings: &SettingsStore, channel: usize) {
    let octave = settings.get(channel, SettingId::Octave).unwrap_or(0);
    let semitone = settings.get(channel, SettingId::Semitone).unwrap_or(0);
    // Octave setting is in volts (−3 … +7); anchors index from the bottom
    // of the range.
    let anchor = (octave + 3).clamp(0, 10) as usize;
    bank.latch_pitch(channel, anchor, semitone as u8);
}

/// The control loop body.
///
/// A plain `async fn` — the firmware wraps it in a concrete task because
/// Embassy tasks cannot be generic over the SPI device.
pub async fn control_loop<SPI>(
    mut dac: CalibratedDac<SPI>,
    mut meter: CaptureMeter,
    commands: &'static Channel<CriticalSectionRawMutex, UiCommand, 8>,
    settings: &'static Mutex<CriticalSectionRawMutex, SettingsStore>,
    status: &'static Mutex<CriticalSectionRawMutex, StatusFrame>,
) where
    SPI: SpiDevice,
{
    let mut host = AutotuneHost::new();
    let mut ticker = Ticker::every(Duration::from_hz(CONTROL_TICK_HZ));
    let mut ticks_until_publish = STATUS_DIVIDER;

    // Initial CV render: every channel starts on its settings pitch.
    {
        let s = settings.lock().await;
        for channel in 0..DAC_CHANNELS {
            latch_pitch_from(&mut dac.bank, &s, channel);
        }
    }

    loop {
        ticker.next().await;

        // ── UI commands ──────────────────────────────────────────────
        while let Ok(command) = commands.try_receive() {
            let result = match command {
                UiCommand::Arm(channel) => {
                    let scaling = {
                        let s = settings.lock().await;
                        scaling_from_setting(s.get(channel, SettingId::Scaling).unwrap_or(0))
                    };
                    host.arm(channel, scaling, &mut dac.bank)
                }
                UiCommand::Run(channel) => host.run(channel, &mut dac.bank),
                UiCommand::Reset(channel) => {
                    let result = host.reset(channel);
                    if result.is_ok() {
                        // Back on the normal output path: restore the
                        // settings pitch the calibration displaced.
                        let s = settings.lock().await;
                        latch_pitch_from(&mut dac.bank, &s, channel);
                    }
                    result
                }
            };
            if let Err(_e) = result {
                defmt::warn!("command {} refused: {}", command, _e);
            }
        }

        // ── Settings edits → pitch updates for idle channels ─────────
        {
            let mut s = settings.lock().await;
            let (changes, count) = s.take_cv_changes();
            for change in changes[..count].iter().flatten() {
                let idle = host
                    .status(change.channel)
                    .map(|st| st.state == TunerState::Idle)
                    .unwrap_or(false);
                if idle {
                    latch_pitch_from(&mut dac.bank, &s, change.channel);
                }
            }
        }

        // ── Autotune engine ──────────────────────────────────────────
        host.tick(&mut dac.bank, &mut meter);

        // ── Hardware flush ───────────────────────────────────────────
        if dac.flush().await.is_err() {
            defmt::warn!("DAC flush failed");
        }

        // ── Status publish ───────────────────────────────────────────
        ticks_until_publish -= 1;
        if ticks_until_publish == 0 {
            ticks_until_publish = STATUS_DIVIDER;
            *status.lock().await = host.status_frame();
        }
    }
}
