//! Button handling.
//!
//! Two buttons drive the whole module:
//!
//! - **SELECT** cycles the addressed channel; a long press bumps the
//!   channel's octave setting.
//! - **TUNE** advances the addressed channel's autotuner: arm from idle,
//!   start from armed, acknowledge a completion or fault. A long press
//!   aborts whatever is running.
//!
//! The button tasks never touch engine state directly — they translate
//! presses into [`UiCommand`]s for the control tick, keeping the engine
//! single-writer.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_time::{with_timeout, Duration, Timer};

use quartet::autotune::{StatusFrame, TunerState};
use quartet_settings::channel_settings::{SettingId, SettingsStore, N_CHANNELS};

/// Commands from the UI to the control tick.
#[derive(Debug, Clone, Copy, Format)]
pub enum UiCommand {
    Arm(usize),
    Run(usize),
    Reset(usize),
}

/// Contact settle time after an edge.
const DEBOUNCE: Duration = Duration::from_millis(30);

/// Hold time that turns a TUNE press into an abort.
const LONG_PRESS: Duration = Duration::from_millis(800);

/// Wait for a clean active-low press, returning `true` for a long press.
async fn wait_press(input: &mut Input<'static>) -> bool {
    loop {
        input.wait_for_low().await;
        Timer::after(DEBOUNCE).await;
        if input.is_low() {
            break;
        }
        // Bounce — rearm.
    }

    let long = with_timeout(LONG_PRESS, input.wait_for_high())
        .await
        .is_err();
    if long {
        // Consume the rest of the hold so release does not retrigger.
        input.wait_for_high().await;
    }
    Timer::after(DEBOUNCE).await;
    long
}

/// SELECT button: short press cycles the addressed channel, long press
/// bumps its octave setting (wrapping at the top of the range).
#[embassy_executor::task]
pub async fn select_task(
    mut button: Input<'static>,
    settings: &'static Mutex<CriticalSectionRawMutex, SettingsStore>,
    status: &'static Mutex<CriticalSectionRawMutex, StatusFrame>,
) {
    loop {
        let long = wait_press(&mut button).await;

        // Selection is frozen while a calibration runs — the active
        // channel owns the tuning input and the screen.
        let busy = status
            .lock()
            .await
            .channels
            .iter()
            .any(|ch| ch.state != TunerState::Idle);
        if busy {
            debug!("select ignored: calibration active");
            continue;
        }

        let mut s = settings.lock().await;
        if long {
            let channel = s.selected_channel();
            let spec = SettingsStore::spec(SettingId::Octave);
            let octave = s.get(channel, SettingId::Octave).unwrap_or(spec.default);
            let next = if octave >= spec.max { spec.min } else { octave + 1 };
            // The channel index comes from the store itself, so the error
            // arm is unreachable.
            let _ = s.set(channel, SettingId::Octave, next);
            info!("channel {} octave {}", channel + 1, next);
        } else {
            let next = (s.selected_channel() + 1) % N_CHANNELS;
            let _ = s.select_channel(next);
            info!("channel {} selected", next + 1);
        }
    }
}

/// TUNE button: drive the addressed channel's autotuner.
#[embassy_executor::task]
pub async fn tune_task(
    mut button: Input<'static>,
    commands: &'static Channel<CriticalSectionRawMutex, UiCommand, 8>,
    settings: &'static Mutex<CriticalSectionRawMutex, SettingsStore>,
    status: &'static Mutex<CriticalSectionRawMutex, StatusFrame>,
) {
    loop {
        let long = wait_press(&mut button).await;

        let channel = settings.lock().await.selected_channel();
        let state = status.lock().await.channels[channel].state;

        let command = if long {
            Some(UiCommand::Reset(channel))
        } else {
            match state {
                TunerState::Idle => Some(UiCommand::Arm(channel)),
                TunerState::Arm => Some(UiCommand::Run(channel)),
                TunerState::Done | TunerState::Error => Some(UiCommand::Reset(channel)),
                // Mid-run a short press means nothing; abort is the long
                // press.
                _ => None,
            }
        };

        if let Some(command) = command {
            debug!("UI command: {}", command);
            if commands.try_send(command).is_err() {
                warn!("command queue full");
            }
        }
    }
}
