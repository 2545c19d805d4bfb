//! MS2000 wire constants and record geometry.

/// Korg device id byte for the MS2000 family.
pub const DEVICE_ID: u8 = 0x58;

/// Current program data dump: one 254-byte record.
pub const FUNC_CURRENT_PROGRAM: u8 = 0x40;
/// Program data dump: the full 128-slot bank in a single message.
pub const FUNC_PROGRAM_DATA: u8 = 0x4C;

/// Decoded program record length.
pub const PATCH_SIZE: usize = 254;
/// Programs per bank dump.
pub const BANK_CAPACITY: usize = 128;

/// Start of the two timbre parameter blocks inside a record.
pub const TIMBRE1_OFFSET: usize = 38;
pub const TIMBRE2_OFFSET: usize = 134;

/// Human-readable voice mode for listings.
pub fn voice_mode_name(value: i64) -> &'static str {
    match value {
        0 => "Single",
        1 => "Split",
        2 => "Layer",
        3 => "Vocoder",
        _ => "Unknown",
    }
}
