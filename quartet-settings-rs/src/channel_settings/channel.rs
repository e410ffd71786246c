use super::setting::Setting;
use super::{SCHEMA, SETTINGS_PER_CHANNEL};

/// All settings of one output channel, in schema order.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSettings {
    /// Setting values indexed by [`SettingId`](super::SettingId).
    pub settings: [Setting; SETTINGS_PER_CHANNEL],
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            settings: core::array::from_fn(|i| Setting::from_spec(&SCHEMA[i])),
        }
    }
}
