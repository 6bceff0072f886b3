//! Resize and splice primitives over the raw bytes of a stream buffer.
//!
//! These functions know nothing about cursors, modes or encodings; callers
//! pass the position explicitly and store whatever position comes back.

use crate::error::{Result, StreamError};

/// Largest buffer length and cursor position a stream supports.
pub const MAX_LENGTH: usize = 0x7FFF_FFFF;

fn too_big() -> StreamError {
    StreamError::invalid_argument("string size too big")
}

/// Fails when `a + b` would exceed [`MAX_LENGTH`].
pub(crate) fn checked_end(a: usize, b: usize) -> Result<usize> {
    a.checked_add(b)
        .filter(|&end| end <= MAX_LENGTH)
        .ok_or_else(too_big)
}

/// Overwrites `buf[pos..pos + src.len()]` with `src`, growing the buffer as
/// needed. A gap between the old end and `pos` is zero-filled.
///
/// Returns the position just past the written bytes.
pub(crate) fn write_at(buf: &mut Vec<u8>, pos: usize, src: &[u8]) -> Result<usize> {
    let end = checked_end(pos, src.len())?;
    if pos == buf.len() {
        buf.extend_from_slice(src);
    } else {
        if end > buf.len() {
            buf.resize(end, 0);
        }
        buf[pos..end].copy_from_slice(src);
    }
    Ok(end)
}

/// Sets the length to exactly `len`, zero-filling growth.
pub(crate) fn resize_zeroed(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    if len > MAX_LENGTH {
        return Err(too_big());
    }
    buf.resize(len, 0);
    Ok(())
}

/// Makes `src` the bytes immediately before the cursor and returns the new
/// cursor, which points at the first pushed-back byte.
///
/// When `src` is longer than `pos` the bytes at and after the cursor are
/// shifted right so nothing unread is lost. When the cursor is past the end
/// the gap is zero-filled first.
pub(crate) fn unget(buf: &mut Vec<u8>, pos: usize, src: &[u8]) -> Result<usize> {
    let cl = src.len();
    let len = buf.len();

    let at = if cl > pos {
        if pos < len {
            let grown = checked_end(len, cl - pos)?;
            buf.resize(grown, 0);
            buf.copy_within(pos..len, cl);
        } else {
            // Nothing unread to preserve; whatever lay before the cursor is
            // overwritten or zero-filled.
            resize_zeroed(buf, cl)?;
        }
        0
    } else {
        if pos > len {
            resize_zeroed(buf, pos)?;
        }
        pos - cl
    };
    buf[at..at + cl].copy_from_slice(src);
    Ok(at)
}
