//! SysEx envelope handling: markers, headers, checksums.
//!
//! A wire message is `F0, header, body[, checksum], F7`. Two header
//! families are supported: Korg (`42 3n device function`, no checksum;
//! integrity rests on exact length and the terminator) and Roland
//! (`41 device model[2] command address[4] ... checksum`, with the
//! documented running checksum over address and body). Parsers validate
//! expected identifier bytes and report mismatches with the expected and
//! actual values; builders are their exact inverses.

use thiserror::Error;

pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_END: u8 = 0xF7;

pub const KORG_MANUFACTURER: u8 = 0x42;
pub const ROLAND_MANUFACTURER: u8 = 0x41;

/// Korg channel byte is `0x30 | global_channel`.
const KORG_CHANNEL_BASE: u8 = 0x30;

const KORG_HEADER_LEN: usize = 5;
/// `F0 41 dev mm mm cmd a a a a sum F7` is the shortest Roland DT1.
const ROLAND_MIN_LEN: usize = 12;

/// A parsed wire message: validated header plus raw body bytes.
///
/// The body is still in transport form (7-bit packed for Korg); the
/// transcoder and reassembler run after framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub header: MessageHeader,
    pub body: Vec<u8>,
}

/// The device-identifying prefix of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHeader {
    Korg {
        channel: u8,
        device_id: u8,
        function: u8,
    },
    Roland {
        device_id: u8,
        model_id: [u8; 2],
        command: u8,
        /// Decoded 28-bit target address (7 bits per wire byte).
        address: u32,
    },
}

/// Framing failures: markers, headers, truncation, checksum.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("message too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("missing SysEx start marker: expected F0, got {actual:02X}")]
    MissingStart { actual: u8 },
    #[error("missing SysEx terminator: expected F7, got {actual:02X}")]
    MissingTerminator { actual: u8 },
    #[error("unterminated SysEx message starting at offset {offset}")]
    Unterminated { offset: usize },
    #[error("{field} mismatch at offset {offset}: expected {expected:02X}, got {actual:02X}")]
    HeaderMismatch {
        field: &'static str,
        offset: usize,
        expected: u8,
        actual: u8,
    },
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
}

/// A stored checksum that does not match the recomputed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("checksum mismatch: computed {computed:02X}, stored {stored:02X}")]
pub struct ChecksumError {
    pub computed: u8,
    pub stored: u8,
}

/// Split a byte stream into individual `F0 .. F7` messages.
///
/// Bytes between messages are skipped (bulk dump files sometimes carry
/// stray padding); a start marker without a terminator is an error.
pub fn split_messages(stream: &[u8]) -> Result<Vec<&[u8]>, FramingError> {
    let mut messages = Vec::new();
    let mut pos = 0;
    while pos < stream.len() {
        if stream[pos] != SYSEX_START {
            pos += 1;
            continue;
        }
        let end = stream[pos..]
            .iter()
            .position(|&b| b == SYSEX_END)
            .ok_or(FramingError::Unterminated { offset: pos })?;
        messages.push(&stream[pos..pos + end + 1]);
        pos += end + 1;
    }
    Ok(messages)
}

fn expect_byte(
    bytes: &[u8],
    offset: usize,
    expected: u8,
    field: &'static str,
) -> Result<(), FramingError> {
    let actual = bytes[offset];
    if actual != expected {
        return Err(FramingError::HeaderMismatch {
            field,
            offset,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_markers(bytes: &[u8], min_len: usize) -> Result<(), FramingError> {
    if bytes.len() < min_len {
        return Err(FramingError::TooShort {
            needed: min_len,
            actual: bytes.len(),
        });
    }
    if bytes[0] != SYSEX_START {
        return Err(FramingError::MissingStart { actual: bytes[0] });
    }
    let last = bytes[bytes.len() - 1];
    if last != SYSEX_END {
        return Err(FramingError::MissingTerminator { actual: last });
    }
    Ok(())
}

/// Parse a Korg message, checking the manufacturer and device bytes.
pub fn parse_korg(bytes: &[u8], expected_device: u8) -> Result<RawMessage, FramingError> {
    check_markers(bytes, KORG_HEADER_LEN + 1)?;
    expect_byte(bytes, 1, KORG_MANUFACTURER, "manufacturer id")?;
    expect_byte(bytes, 3, expected_device, "device id")?;
    Ok(RawMessage {
        header: MessageHeader::Korg {
            channel: bytes[2] & 0x0F,
            device_id: bytes[3],
            function: bytes[4],
        },
        body: bytes[KORG_HEADER_LEN..bytes.len() - 1].to_vec(),
    })
}

/// Build a Korg message. The body must already be 7-bit clean.
pub fn build_korg(channel: u8, device_id: u8, function: u8, body: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(KORG_HEADER_LEN + body.len() + 1);
    message.push(SYSEX_START);
    message.push(KORG_MANUFACTURER);
    message.push(KORG_CHANNEL_BASE | (channel & 0x0F));
    message.push(device_id);
    message.push(function);
    message.extend_from_slice(body);
    message.push(SYSEX_END);
    message
}

/// Parse a Roland DT1-style message, verifying model id and checksum.
pub fn parse_roland(bytes: &[u8], expected_model: [u8; 2]) -> Result<RawMessage, FramingError> {
    check_markers(bytes, ROLAND_MIN_LEN)?;
    expect_byte(bytes, 1, ROLAND_MANUFACTURER, "manufacturer id")?;
    expect_byte(bytes, 3, expected_model[0], "model id")?;
    expect_byte(bytes, 4, expected_model[1], "model id")?;

    let address_bytes = [bytes[6], bytes[7], bytes[8], bytes[9]];
    let body = &bytes[10..bytes.len() - 2];
    let stored = bytes[bytes.len() - 2];
    let computed = roland_checksum_parts(&address_bytes, body);
    if stored != computed {
        return Err(ChecksumError { computed, stored }.into());
    }

    Ok(RawMessage {
        header: MessageHeader::Roland {
            device_id: bytes[2],
            model_id: expected_model,
            command: bytes[5],
            address: decode_address(address_bytes),
        },
        body: body.to_vec(),
    })
}

/// Build a Roland DT1-style message with a freshly computed checksum.
pub fn build_roland(
    device_id: u8,
    model_id: [u8; 2],
    command: u8,
    address: u32,
    body: &[u8],
) -> Vec<u8> {
    let address_bytes = encode_address(address);
    let checksum = roland_checksum_parts(&address_bytes, body);

    let mut message = Vec::with_capacity(ROLAND_MIN_LEN + body.len());
    message.push(SYSEX_START);
    message.push(ROLAND_MANUFACTURER);
    message.push(device_id);
    message.extend_from_slice(&model_id);
    message.push(command);
    message.extend_from_slice(&address_bytes);
    message.extend_from_slice(body);
    message.push(checksum);
    message.push(SYSEX_END);
    message
}

/// Roland running checksum: `(128 - sum(bytes) mod 128) & 0x7F`.
pub fn roland_checksum(payload: &[u8]) -> u8 {
    let total: u32 = payload.iter().map(|&b| u32::from(b)).sum();
    (128 - (total % 128) as u8) & 0x7F
}

fn roland_checksum_parts(address: &[u8; 4], body: &[u8]) -> u8 {
    let total: u32 = address
        .iter()
        .chain(body.iter())
        .map(|&b| u32::from(b))
        .sum();
    (128 - (total % 128) as u8) & 0x7F
}

/// Split a decoded 28-bit address into four 7-bit wire bytes.
pub fn encode_address(address: u32) -> [u8; 4] {
    [
        ((address >> 21) & 0x7F) as u8,
        ((address >> 14) & 0x7F) as u8,
        ((address >> 7) & 0x7F) as u8,
        (address & 0x7F) as u8,
    ]
}

/// Compose four 7-bit wire bytes into the decoded 28-bit address.
///
/// The decoded value is linear in bytes, so address arithmetic (segment
/// offsets within a patch block) is plain integer addition.
pub fn decode_address(bytes: [u8; 4]) -> u32 {
    (u32::from(bytes[0]) << 21)
        | (u32::from(bytes[1]) << 14)
        | (u32::from(bytes[2]) << 7)
        | u32::from(bytes[3])
}
