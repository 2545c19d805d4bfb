//! Multi-message patch reassembly and splitting.
//!
//! Some devices transmit one logical patch as several wire messages: the
//! JP-8080 bulk dump sends a 242-byte primary segment plus a 6-byte tail,
//! and the related JP-8000 omits nine trailing parameters entirely. The
//! reassembler concatenates unpacked message bodies in order into the
//! device's fixed-size record; the splitter is its inverse over the
//! documented segment boundaries.

use log::warn;
use thiserror::Error;

/// How one device carries a record across wire messages.
///
/// Shared read-only, like a schema: one profile per device.
#[derive(Debug, Clone, Copy)]
pub struct TransferProfile {
    /// Device identifier used in log output.
    pub device: &'static str,
    /// Full decoded record length.
    pub record_len: usize,
    /// Record length of a related shorter model, when one exists. A group
    /// totalling this length is padded up to `record_len` with zeros.
    pub short_len: Option<usize>,
    /// Record offsets where a split transfer starts a new message.
    pub split_at: &'static [usize],
}

/// Wrong shape for a multi-message group.
#[derive(Debug, Error)]
pub enum ReassemblyError {
    #[error("no messages to reassemble")]
    Empty,
    #[error("reassembled record for {device} is {actual} bytes, expected {expected}")]
    Length {
        device: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Join the unpacked bodies of one message group into a full record.
///
/// Bodies are concatenated in message order; the group invariant is no
/// gaps and no overlap, so the total must equal the record length (or the
/// short-variant length, which is padded with documented defaults rather
/// than left uninitialized).
pub fn reassemble(bodies: &[&[u8]], profile: &TransferProfile) -> Result<Vec<u8>, ReassemblyError> {
    if bodies.is_empty() {
        return Err(ReassemblyError::Empty);
    }
    let mut record: Vec<u8> = Vec::with_capacity(profile.record_len);
    for body in bodies {
        record.extend_from_slice(body);
    }
    if record.len() == profile.record_len {
        return Ok(record);
    }
    if profile.short_len == Some(record.len()) {
        warn!(
            "{}: short-variant record ({} bytes), padding {} trailing bytes with defaults",
            profile.device,
            record.len(),
            profile.record_len - record.len()
        );
        record.resize(profile.record_len, 0);
        return Ok(record);
    }
    Err(ReassemblyError::Length {
        device: profile.device,
        expected: profile.record_len,
        actual: record.len(),
    })
}

/// Split a full record into `(offset, segment)` pairs at the profile's
/// documented boundaries. The inverse of [`reassemble`].
pub fn split_record<'a>(
    record: &'a [u8],
    profile: &TransferProfile,
) -> Result<Vec<(usize, &'a [u8])>, ReassemblyError> {
    if record.len() != profile.record_len {
        return Err(ReassemblyError::Length {
            device: profile.device,
            expected: profile.record_len,
            actual: record.len(),
        });
    }
    let mut segments = Vec::with_capacity(profile.split_at.len() + 1);
    let mut start = 0;
    for &boundary in profile.split_at {
        segments.push((start, &record[start..boundary]));
        start = boundary;
    }
    segments.push((start, &record[start..]));
    Ok(segments)
}
