//! Multi-picture object (MPO) support.
//!
//! An MPO file is a JPEG whose APP2 segment carries an `MPF` index, followed
//! by further complete JPEG streams. The `image` crate only decodes the first
//! one, so the individual streams are located here by walking JPEG markers.

use std::ops::Range;

use crate::error::{Error, Result};

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP2: u8 = 0xE2;
const MPF_IDENTIFIER: &[u8] = b"MPF\0";

/// Whether `data` is a JPEG stream whose header carries an MPF segment.
pub fn is_mpo(data: &[u8]) -> bool {
    if !starts_with_soi(data, 0) {
        return false;
    }

    let mut pos = 2;
    while let Some((marker, segment_start, next)) = read_segment(data, pos) {
        match marker {
            SOS | EOI => return false,
            APP2 if data[segment_start..next].starts_with(MPF_IDENTIFIER) => return true,
            _ => pos = next,
        }
    }
    false
}

/// Byte ranges of every JPEG stream stored back to back in `data`.
///
/// # Errors
///
/// Returns [`Error::MalformedContainer`] if the first stream is truncated.
pub fn split_streams(data: &[u8]) -> Result<Vec<Range<usize>>> {
    let first_end = stream_end(data, 0).ok_or_else(|| Error::MalformedContainer {
        reason: "MPO primary image is truncated".to_string(),
    })?;

    let mut streams = vec![0..first_end];
    let mut pos = first_end;
    while let Some(start) = find_soi(data, pos) {
        // A trailing partial stream is ignored, the same as trailing garbage.
        let Some(end) = stream_end(data, start) else {
            tracing::debug!("Ignoring truncated MPO image at offset {start}");
            break;
        };
        streams.push(start..end);
        pos = end;
    }

    Ok(streams)
}

fn starts_with_soi(data: &[u8], pos: usize) -> bool {
    data.get(pos..pos + 3) == Some(&[0xFF, SOI, 0xFF])
}

fn find_soi(data: &[u8], from: usize) -> Option<usize> {
    (from..data.len()).find(|&pos| starts_with_soi(data, pos))
}

/// Read the marker at `pos`. Returns (marker, payload start, position after segment).
fn read_segment(data: &[u8], mut pos: usize) -> Option<(u8, usize, usize)> {
    if *data.get(pos)? != 0xFF {
        return None;
    }
    // Fill bytes
    while *data.get(pos + 1)? == 0xFF {
        pos += 1;
    }
    let marker = data[pos + 1];
    pos += 2;

    match marker {
        EOI | 0x01 | 0xD0..=0xD7 => Some((marker, pos, pos)),
        _ => {
            let len = usize::from(u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]));
            if len < 2 || pos + len > data.len() {
                return None;
            }
            Some((marker, pos + 2, pos + len))
        }
    }
}

/// Skip entropy-coded data starting at `pos`, returning the next marker position.
fn skip_entropy(data: &[u8], mut pos: usize) -> Option<usize> {
    while pos + 1 < data.len() {
        if data[pos] == 0xFF {
            match data[pos + 1] {
                0x00 | 0xD0..=0xD7 => pos += 2,
                _ => return Some(pos),
            }
        } else {
            pos += 1;
        }
    }
    None
}

/// Position just past the EOI of the JPEG stream starting at `start`.
fn stream_end(data: &[u8], start: usize) -> Option<usize> {
    if !starts_with_soi(data, start) {
        return None;
    }

    let mut pos = start + 2;
    loop {
        let (marker, _, next) = read_segment(data, pos)?;
        pos = match marker {
            EOI => return Some(next),
            SOS => skip_entropy(data, next)?,
            _ => next,
        };
    }
}
