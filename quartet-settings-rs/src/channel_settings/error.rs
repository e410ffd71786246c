/// Errors that can occur when working with settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Channel index is out of bounds (must be < N_CHANNELS).
    InvalidChannel,
    /// Setting index is out of bounds (must be < SETTINGS_PER_CHANNEL).
    InvalidSetting,
    /// A restored value lies outside the setting's schema range.
    ValueOutOfRange,
}
