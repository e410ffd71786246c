use super::channel::ChannelSettings;
use super::error::SettingsError;
use super::setting::SettingSpec;
use super::{SettingId, N_CHANNELS, SCHEMA, SETTINGS_PER_CHANNEL};

/// Describes a single setting change, returned by the change consumption
/// methods.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingChange {
    /// Static display name of the setting (from [`SCHEMA`]).
    pub name: &'static str,
    /// Current value after the change.
    pub value: i32,
    /// Channel index (0-based).
    pub channel: usize,
    /// Setting index within the channel (schema order).
    pub setting: usize,
}

/// Total number of setting slots across all channels.
const TOTAL_SLOTS: usize = N_CHANNELS * SETTINGS_PER_CHANNEL;

/// Settings storage for all four channels.
///
/// Tracks the channel the editing UI currently points at, applies clamped
/// edits and persisted-value restores, and hands pending changes to the
/// display and CV consumers.
pub struct SettingsStore {
    /// Per-channel settings, indexed 0 to `N_CHANNELS - 1`.
    pub channels: [ChannelSettings; N_CHANNELS],
    /// Channel the editing UI currently addresses.
    selected: usize,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    /// All channels at schema defaults, channel 0 selected.
    pub fn new() -> Self {
        Self {
            channels: [ChannelSettings::default(); N_CHANNELS],
            selected: 0,
        }
    }

    /// Schema entry for a setting.
    pub fn spec(id: SettingId) -> &'static SettingSpec {
        &SCHEMA[id as usize]
    }

    // ── Channel selection ────────────────────────────────────────────

    /// Channel the editing UI currently addresses.
    pub fn selected_channel(&self) -> usize {
        self.selected
    }

    /// Point the editing UI at another channel.
    ///
    /// Returns [`SettingsError::InvalidChannel`] if `channel >= N_CHANNELS`.
    pub fn select_channel(&mut self, channel: usize) -> Result<(), SettingsError> {
        if channel >= N_CHANNELS {
            return Err(SettingsError::InvalidChannel);
        }
        self.selected = channel;
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Current value of a setting.
    pub fn get(&self, channel: usize, id: SettingId) -> Result<i32, SettingsError> {
        if channel >= N_CHANNELS {
            return Err(SettingsError::InvalidChannel);
        }
        Ok(self.channels[channel].settings[id as usize].value)
    }

    /// Display label for an enumerated setting's current value, or `None`
    /// for numeric settings.
    pub fn label(&self, channel: usize, id: SettingId) -> Option<&'static str> {
        let spec = Self::spec(id);
        if spec.labels.is_empty() {
            return None;
        }
        let value = self.channels.get(channel)?.settings[id as usize].value;
        spec.labels.get((value - spec.min) as usize).copied()
    }

    // ── Edits ────────────────────────────────────────────────────────

    /// Apply an encoder delta to a setting on the **selected channel**.
    ///
    /// The result clamps to the schema range. Out-of-bounds setting
    /// indices are a silent no-op (logged via `defmt` when that feature is
    /// enabled) so a stale UI cursor cannot corrupt state.
    pub fn nudge(&mut self, setting_idx: usize, delta: i32) {
        if setting_idx >= SETTINGS_PER_CHANNEL {
            #[cfg(feature = "defmt")]
            defmt::warn!("nudge: setting index {} out of bounds", setting_idx);
            return;
        }
        let spec = &SCHEMA[setting_idx];
        let slot = &mut self.channels[self.selected].settings[setting_idx];
        slot.edit(spec, slot.value + delta);
    }

    /// Set a setting to an absolute value (clamped), marking both
    /// consumers.
    pub fn set(&mut self, channel: usize, id: SettingId, value: i32) -> Result<(), SettingsError> {
        if channel >= N_CHANNELS {
            return Err(SettingsError::InvalidChannel);
        }
        let spec = Self::spec(id);
        self.channels[channel].settings[id as usize].edit(spec, value);
        Ok(())
    }

    /// Restore a value from persistent storage.
    ///
    /// Unlike [`set`](Self::set), a restore rejects out-of-range values
    /// instead of clamping them — a corrupt storage record must not
    /// silently become a legal-looking setting — and marks only the
    /// display consumer.
    pub fn restore(
        &mut self,
        channel: usize,
        id: SettingId,
        value: i32,
    ) -> Result<(), SettingsError> {
        if channel >= N_CHANNELS {
            return Err(SettingsError::InvalidChannel);
        }
        let spec = Self::spec(id);
        if value < spec.min || value > spec.max {
            return Err(SettingsError::ValueOutOfRange);
        }
        self.channels[channel].settings[id as usize].restore(value);
        Ok(())
    }

    // ── Change consumption ───────────────────────────────────────────

    /// Collect all settings whose display flag is set, then clear those
    /// flags.
    ///
    /// Returns a fixed-size array and a count of valid entries. Callers
    /// should iterate `&result.0[..result.1]`. Only clears
    /// `changed_display`; the CV flag is left intact.
    pub fn take_display_changes(&mut self) -> ([Option<SettingChange>; TOTAL_SLOTS], usize) {
        self.take_changes(|s| {
            let was = s.changed_display;
            s.changed_display = false;
            was
        })
    }

    /// Collect all settings whose CV flag is set, then clear those flags.
    ///
    /// Only clears `changed_cv`; the display flag is left intact.
    pub fn take_cv_changes(&mut self) -> ([Option<SettingChange>; TOTAL_SLOTS], usize) {
        self.take_changes(|s| {
            let was = s.changed_cv;
            s.changed_cv = false;
            was
        })
    }

    fn take_changes(
        &mut self,
        mut take_flag: impl FnMut(&mut super::Setting) -> bool,
    ) -> ([Option<SettingChange>; TOTAL_SLOTS], usize) {
        let mut result = [None; TOTAL_SLOTS];
        let mut count = 0;

        for (channel_idx, channel) in self.channels.iter_mut().enumerate() {
            for (setting_idx, slot) in channel.settings.iter_mut().enumerate() {
                if take_flag(slot) {
                    result[count] = Some(SettingChange {
                        name: SCHEMA[setting_idx].name,
                        value: slot.value,
                        channel: channel_idx,
                        setting: setting_idx,
                    });
                    count += 1;
                }
            }
        }

        (result, count)
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Default state ────────────────────────────────────────────────

    #[test]
    fn defaults_follow_schema() {
        let store = SettingsStore::new();
        assert_eq!(store.selected_channel(), 0);

        for ch in 0..N_CHANNELS {
            assert_eq!(store.get(ch, SettingId::Octave).unwrap(), 0);
            assert_eq!(store.get(ch, SettingId::A4Integer).unwrap(), 440);
            assert_eq!(store.get(ch, SettingId::ModRate).unwrap(), 8);
            assert_eq!(store.get(ch, SettingId::Scaling).unwrap(), 0);
        }
    }

    #[test]
    fn no_pending_changes_at_boot() {
        let mut store = SettingsStore::new();
        let (_, display) = store.take_display_changes();
        let (_, cv) = store.take_cv_changes();
        assert_eq!(display, 0);
        assert_eq!(cv, 0);
    }

    // ── Channel selection ────────────────────────────────────────────

    #[test]
    fn select_channel_bounds() {
        let mut store = SettingsStore::new();
        assert!(store.select_channel(3).is_ok());
        assert_eq!(store.selected_channel(), 3);

        assert_eq!(store.select_channel(4), Err(SettingsError::InvalidChannel));
        assert_eq!(store.selected_channel(), 3);
    }

    // ── Edits ────────────────────────────────────────────────────────

    #[test]
    fn nudge_targets_selected_channel() {
        let mut store = SettingsStore::new();
        store.select_channel(2).unwrap();
        store.nudge(SettingId::Octave as usize, 3);

        assert_eq!(store.get(2, SettingId::Octave).unwrap(), 3);
        assert_eq!(store.get(0, SettingId::Octave).unwrap(), 0);
    }

    #[test]
    fn nudge_clamps_to_schema_range() {
        let mut store = SettingsStore::new();
        store.nudge(SettingId::Octave as usize, 100);
        assert_eq!(store.get(0, SettingId::Octave).unwrap(), 7);

        store.nudge(SettingId::Octave as usize, -100);
        assert_eq!(store.get(0, SettingId::Octave).unwrap(), -3);
    }

    #[test]
    fn nudge_out_of_bounds_is_noop() {
        let mut store = SettingsStore::new();
        store.nudge(SETTINGS_PER_CHANNEL, 1);
        store.nudge(100, 1);

        let (_, count) = store.take_display_changes();
        assert_eq!(count, 0);
    }

    #[test]
    fn edit_marks_both_consumers() {
        let mut store = SettingsStore::new();
        store.set(1, SettingId::Semitone, 7).unwrap();

        let slot = &store.channels[1].settings[SettingId::Semitone as usize];
        assert_eq!(slot.value, 7);
        assert!(slot.changed_display);
        assert!(slot.changed_cv);
    }

    // ── Restore ──────────────────────────────────────────────────────

    #[test]
    fn restore_marks_only_display() {
        let mut store = SettingsStore::new();
        store.restore(0, SettingId::A4Integer, 442).unwrap();

        let slot = &store.channels[0].settings[SettingId::A4Integer as usize];
        assert_eq!(slot.value, 442);
        assert!(slot.changed_display);
        assert!(!slot.changed_cv);
    }

    #[test]
    fn restore_rejects_out_of_range() {
        let mut store = SettingsStore::new();
        assert_eq!(
            store.restore(0, SettingId::A4Integer, 999),
            Err(SettingsError::ValueOutOfRange)
        );
        // Value untouched.
        assert_eq!(store.get(0, SettingId::A4Integer).unwrap(), 440);
    }

    #[test]
    fn restore_invalid_channel() {
        let mut store = SettingsStore::new();
        assert_eq!(
            store.restore(7, SettingId::Octave, 0),
            Err(SettingsError::InvalidChannel)
        );
    }

    // ── Labels ───────────────────────────────────────────────────────

    #[test]
    fn labels_for_enumerated_settings() {
        let mut store = SettingsStore::new();
        assert_eq!(store.label(0, SettingId::Scaling), Some("1V"));

        store.set(0, SettingId::Scaling, 1).unwrap();
        assert_eq!(store.label(0, SettingId::Scaling), Some("1.2V"));

        store.set(0, SettingId::Ppqn, 2).unwrap();
        assert_eq!(store.label(0, SettingId::Ppqn), Some("24"));
    }

    #[test]
    fn numeric_settings_have_no_label() {
        let store = SettingsStore::new();
        assert_eq!(store.label(0, SettingId::Octave), None);
        assert_eq!(store.label(0, SettingId::A4Integer), None);
    }

    // ── Change consumption ───────────────────────────────────────────

    #[test]
    fn take_display_changes_returns_name_and_value() {
        let mut store = SettingsStore::new();
        store.nudge(SettingId::Octave as usize, 2);

        let (changes, count) = store.take_display_changes();
        assert_eq!(count, 1);

        let change = changes[0].unwrap();
        assert_eq!(change.name, "Octave");
        assert_eq!(change.value, 2);
        assert_eq!(change.channel, 0);
        assert_eq!(change.setting, SettingId::Octave as usize);
    }

    #[test]
    fn take_display_changes_clears_flags() {
        let mut store = SettingsStore::new();
        store.nudge(SettingId::Octave as usize, 1);

        let (_, first) = store.take_display_changes();
        assert_eq!(first, 1);
        let (_, second) = store.take_display_changes();
        assert_eq!(second, 0);
    }

    #[test]
    fn display_and_cv_flags_are_independent() {
        let mut store = SettingsStore::new();
        store.nudge(SettingId::Semitone as usize, 5); // sets both flags

        let (_, cv_count) = store.take_cv_changes();
        assert_eq!(cv_count, 1);

        // Display flag survives the CV consumption.
        let (changes, display_count) = store.take_display_changes();
        assert_eq!(display_count, 1);
        assert_eq!(changes[0].unwrap().name, "Semitone");

        // And vice versa: nothing left for either.
        let (_, cv_again) = store.take_cv_changes();
        assert_eq!(cv_again, 0);
    }

    #[test]
    fn changes_across_channels_report_channel_index() {
        let mut store = SettingsStore::new();
        store.set(0, SettingId::Octave, 1).unwrap();
        store.set(3, SettingId::Scaling, 2).unwrap();

        let (changes, count) = store.take_cv_changes();
        assert_eq!(count, 2);
        assert_eq!(changes[0].unwrap().channel, 0);
        assert_eq!(changes[1].unwrap().channel, 3);
        assert_eq!(changes[1].unwrap().name, "V/Oct");
    }

    // ── Schema sanity ────────────────────────────────────────────────

    #[test]
    fn schema_defaults_within_ranges() {
        for spec in &SCHEMA {
            assert!(spec.min <= spec.default && spec.default <= spec.max, "{}", spec.name);
            if !spec.labels.is_empty() {
                assert_eq!(
                    spec.labels.len() as i32,
                    spec.max - spec.min + 1,
                    "{}: label count must cover the range",
                    spec.name
                );
            }
        }
    }
}
