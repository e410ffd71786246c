//! DAC8564 command-word constants.
//!
//! The converter takes 24-bit frames: one control byte followed by the
//! 16-bit output code, MSB first.
//!
//! Control byte layout:
//!
//! ```text
//! bit 7..6   A1 A0   chip address (strapped to 0 on this board)
//! bit 5..4   LD1 LD0 load mode
//! bit 3      ─       don't care
//! bit 2..1   SEL1 SEL0 channel select
//! bit 0      PD0     power-down flag (0 = normal operation)
//! ```

/// Store the code in the channel's input register without updating the
/// output. Used for synchronized multi-channel updates.
pub const LOAD_INPUT: u8 = 0b0000_0000;

/// Write the channel's input register and update its output immediately.
pub const LOAD_SINGLE: u8 = 0b0001_0000;

/// Write the channel's input register and update **all** outputs from
/// their input registers. Terminates a synchronized update sequence.
pub const LOAD_ALL: u8 = 0b0010_0000;

/// Channel select field position within the control byte.
pub const CHANNEL_SHIFT: u8 = 1;

/// Number of converter channels.
pub const CHANNEL_COUNT: usize = 4;
