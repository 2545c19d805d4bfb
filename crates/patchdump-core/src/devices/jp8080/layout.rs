//! JP-8080 wire constants and record geometry.

use crate::bulk::TransferProfile;

/// Roland model id bytes for the JP-8080.
pub const MODEL_ID: [u8; 2] = [0x00, 0x06];

/// Data Set 1: the one-way parameter transfer command.
pub const CMD_DT1: u8 = 0x12;

/// Factory default device id.
pub const DEFAULT_DEVICE_ID: u8 = 0x10;

/// Decoded patch record length.
pub const PATCH_SIZE: usize = 248;
/// The JP-8000 sends the same layout minus the nine trailing bytes.
pub const SHORT_PATCH_SIZE: usize = 239;
/// Bulk dumps split a patch at this offset into a main and tail message.
pub const BULK_SPLIT: usize = 242;

/// Decoded base address of user patch storage.
pub const USER_PATCH_BASE: u32 = 0x0200_0000;

/// Patches per user bank pair (A and B, 64 each).
pub const BANK_CAPACITY: usize = 128;

/// Address stride between consecutive user patch slots.
pub const PATCH_STRIDE: u32 = 0x200;

/// Decoded base address of a 0-based user patch slot.
pub fn user_patch_address(slot: usize) -> u32 {
    USER_PATCH_BASE + slot as u32 * PATCH_STRIDE
}

/// Message grouping profile for bulk dumps.
pub const TRANSFER: TransferProfile = TransferProfile {
    device: "jp8080",
    record_len: PATCH_SIZE,
    short_len: Some(SHORT_PATCH_SIZE),
    split_at: &[BULK_SPLIT],
};
