//! Error types for the OLED status display.

use display_interface::DisplayError;

/// Errors that can occur during display operations.
///
/// The `ssd1306` crate folds all bus-level failures into
/// [`DisplayError`], so this enum is non-generic.
#[derive(Debug)]
pub enum OledError {
    /// Bus or interface failure reported by the display stack.
    Display(DisplayError),
    /// The panel did not accept its initialisation sequence.
    InitFailed,
}

impl From<DisplayError> for OledError {
    fn from(e: DisplayError) -> Self {
        OledError::Display(e)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OledError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OledError::Display(_) => defmt::write!(f, "display interface error"),
            OledError::InitFailed => defmt::write!(f, "display init failed"),
        }
    }
}
