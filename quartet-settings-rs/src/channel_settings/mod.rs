//! Channel settings schema and storage.
//!
//! Every channel carries the same ordered list of settings, described once
//! in the const [`SCHEMA`] table. The runtime [`SettingsStore`] is derived
//! from the table — adding or re-ranging a setting is a table edit, no
//! other code changes.
//!
//! # Change Tracking
//!
//! Each setting value carries two independent change flags:
//!
//! - **`changed_display`** — the screen needs to redraw this setting. Set
//!   by edits and by restores from persistent storage.
//! - **`changed_cv`** — the CV rendering path must recompute the channel's
//!   output code. Set only by edits (a restore is applied wholesale at
//!   boot, before the output path runs).
//!
//! Consumers call [`SettingsStore::take_display_changes()`] or
//! [`SettingsStore::take_cv_changes()`] to read and clear their flags.

mod channel;
mod error;
mod setting;
mod values;

pub use channel::ChannelSettings;
pub use error::SettingsError;
pub use setting::{Setting, SettingSpec};
pub use values::{SettingChange, SettingsStore};

/// Number of output channels.
pub const N_CHANNELS: usize = 4;

/// Number of settings per channel (the length of [`SCHEMA`]).
pub const SETTINGS_PER_CHANNEL: usize = 9;

/// Positions within a channel's settings, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingId {
    Octave = 0,
    Semitone = 1,
    ModRange = 2,
    ModRate = 3,
    NotesOrBpm = 4,
    A4Integer = 5,
    A4Mantissa = 6,
    Ppqn = 7,
    Scaling = 8,
}

/// The per-channel settings schema.
///
/// `labels` is empty for numeric settings; enumerated settings index into
/// it with their value.
///
/// **Invariant:** `SCHEMA.len() == SETTINGS_PER_CHANNEL`, and the order
/// matches [`SettingId`].
pub const SCHEMA: [SettingSpec; SETTINGS_PER_CHANNEL] = [
    SettingSpec {
        name: "Octave",
        min: -3,
        max: 7,
        default: 0,
        labels: &[],
    },
    SettingSpec {
        name: "Semitone",
        min: 0,
        max: 11,
        default: 0,
        labels: &[],
    },
    SettingSpec {
        name: "Mod Range",
        min: 0,
        max: 12,
        default: 0,
        labels: &[],
    },
    SettingSpec {
        name: "Mod Rate",
        min: 1,
        max: 64,
        default: 8,
        labels: &[],
    },
    SettingSpec {
        name: "Mode",
        min: 0,
        max: 1,
        default: 0,
        labels: &["Notes", "BPM"],
    },
    SettingSpec {
        name: "A4",
        min: 400,
        max: 480,
        default: 440,
        labels: &[],
    },
    SettingSpec {
        name: "A4 Frac",
        min: 0,
        max: 99,
        default: 0,
        labels: &[],
    },
    SettingSpec {
        name: "PPQN",
        min: 0,
        max: 4,
        default: 1,
        labels: &["1", "4", "24", "48", "96"],
    },
    SettingSpec {
        name: "V/Oct",
        min: 0,
        max: 2,
        default: 0,
        labels: &["1V", "1.2V", "2V"],
    },
];
