//! Record scanner: finds the next separator-delimited span in a byte window.
//!
//! The scanner is a pure function of the buffer, the cursor and the line
//! options. It returns offsets only; the stream slices, copies and moves the
//! cursor.
//!
//! Separator modes, in priority order:
//! - [`Separator::None`]: the whole (limit-clamped) window is one record.
//! - [`Separator::Paragraph`]: leading newlines are skipped and the record
//!   ends after the first blank line plus any newlines that follow it.
//! - A one-byte separator: `memchr`.
//! - A longer separator: a naive scan for short windows, Horspool for windows
//!   of [`HORSPOOL_THRESHOLD`] bytes or more.
//!
//! A record that runs out of window before finding its separator ends at the
//! window end; that is not an error.

#[cfg(test)]
mod tests;

use bstr::BString;
use memchr::memchr;
use tracing::trace;

use crate::encoding::EncodingRef;

/// Windows at least this long use the Horspool search for multi-byte
/// separators.
pub const HORSPOOL_THRESHOLD: usize = 1024;

/// What terminates a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Separator {
    /// No separator: read to the end of the window.
    None,
    /// Blank-line separated paragraphs.
    Paragraph,
    /// A literal byte sequence, never empty.
    Bytes(BString),
}

impl Separator {
    /// An empty sequence selects paragraph mode.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        if bytes.is_empty() {
            Separator::Paragraph
        } else {
            Separator::Bytes(BString::from(bytes))
        }
    }
}

impl Default for Separator {
    fn default() -> Self {
        Separator::Bytes(BString::from("\n"))
    }
}

impl From<&str> for Separator {
    fn from(s: &str) -> Self {
        Separator::from_bytes(s)
    }
}

impl From<&[u8]> for Separator {
    fn from(b: &[u8]) -> Self {
        Separator::from_bytes(b)
    }
}

impl<T: Into<Separator>> From<Option<T>> for Separator {
    fn from(sep: Option<T>) -> Self {
        sep.map_or(Separator::None, Into::into)
    }
}

/// Offsets of one extracted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Record {
    /// First byte of the record; past any skipped paragraph newlines.
    pub start: usize,
    /// End of the returned bytes, after chomping.
    pub end: usize,
    /// Where the cursor goes next; the end of the record before chomping.
    pub next: usize,
}

/// Extracts the record starting at `pos`.
///
/// `limit` caps the record at that many bytes, moved forward to the next
/// character boundary of `enc`; `Some(0)` means no cap here and must be
/// handled by the caller. Returns `None` when `pos` is at or past the end,
/// or when paragraph mode finds nothing but newlines.
pub(crate) fn getline(
    bytes: &[u8],
    pos: usize,
    sep: &Separator,
    limit: Option<usize>,
    chomp: bool,
    enc: EncodingRef,
) -> Option<Record> {
    if pos >= bytes.len() {
        return None;
    }
    let s = pos;
    let mut e = bytes.len();
    if let Some(limit) = limit.filter(|&l| l > 0) {
        if limit < e - s {
            e = enc.right_adjust_char_head(bytes, s, s + limit, e);
        }
    }

    let record = match sep {
        Separator::None => {
            let w = if chomp {
                chomp_newline_width(&bytes[s..e])
            } else {
                0
            };
            Record {
                start: s,
                end: e - w,
                next: e,
            }
        }
        Separator::Paragraph => paragraph(bytes, s, e, chomp)?,
        Separator::Bytes(sep) if sep.len() == 1 => {
            let (end, next) = match memchr(sep[0], &bytes[s..e]) {
                Some(i) => {
                    let p = s + i;
                    let mut w = 0;
                    if chomp {
                        w = 1;
                        if sep[0] == b'\n' && p > s && bytes[p - 1] == b'\r' {
                            w = 2;
                        }
                    }
                    (p + 1 - w, p + 1)
                }
                None => (e, e),
            };
            Record {
                start: s,
                end,
                next,
            }
        }
        Separator::Bytes(sep) => {
            let window = &bytes[s..e];
            let found = if sep.len() > window.len() {
                None
            } else if window.len() < HORSPOOL_THRESHOLD || sep.len() == window.len() {
                find_naive(window, sep)
            } else {
                trace!(window = window.len(), separator = sep.len(), "horspool scan");
                find_horspool(window, sep)
            };
            match found {
                Some(i) => {
                    let next = s + i + sep.len();
                    Record {
                        start: s,
                        end: if chomp { s + i } else { next },
                        next,
                    }
                }
                None => Record {
                    start: s,
                    end: e,
                    next: e,
                },
            }
        }
    };
    Some(record)
}

fn paragraph(bytes: &[u8], s: usize, e: usize, chomp: bool) -> Option<Record> {
    let s = s + bytes[s..e].iter().position(|&b| b != b'\n')?;
    let is_newline_at = |p: usize| {
        (p < e && bytes[p] == b'\n') || (p + 1 < e && bytes[p] == b'\r' && bytes[p + 1] == b'\n')
    };

    let mut p = s;
    let mut e = e;
    let mut paragraph_end = None;
    while let Some(i) = memchr(b'\n', &bytes[p..e]) {
        p += i + 1;
        if !is_newline_at(p) {
            continue;
        }
        // The record's own line ending starts here. `bytes[s]` is not a
        // newline, so `p - 2 >= s`.
        paragraph_end = Some(if bytes[p - 2] == b'\r' {
            p - 2
        } else {
            p - 1
        });
        while is_newline_at(p) {
            p += if bytes[p] == b'\r' { 2 } else { 1 };
        }
        e = p;
        break;
    }

    let end = match paragraph_end {
        Some(end) if chomp => end,
        _ => e,
    };
    Some(Record {
        start: s,
        end,
        next: e,
    })
}

/// Width of a trailing `"\r\n"` or `"\n"`, else zero.
pub(crate) fn chomp_newline_width(bytes: &[u8]) -> usize {
    if bytes.ends_with(b"\r\n") {
        2
    } else if bytes.ends_with(b"\n") {
        1
    } else {
        0
    }
}

/// Offset of the first occurrence of `needle` in `haystack`, comparing at
/// every start offset.
#[must_use]
pub fn find_naive(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Horspool bad-character table: the pattern length by default, else the
/// distance from the byte's last occurrence (ignoring the final byte) to the
/// end of the pattern.
#[derive(Clone)]
pub struct SkipTable([usize; 256]);

impl SkipTable {
    #[must_use]
    pub fn new(needle: &[u8]) -> Self {
        let m = needle.len();
        let mut skip = [m; 256];
        for (i, &b) in needle.iter().take(m.saturating_sub(1)).enumerate() {
            skip[usize::from(b)] = m - 1 - i;
        }
        SkipTable(skip)
    }

    #[must_use]
    pub fn get(&self, byte: u8) -> usize {
        self.0[usize::from(byte)]
    }
}

/// Offset of the first occurrence of `needle` in `haystack`, using
/// Boyer-Moore-Horspool.
#[must_use]
pub fn find_horspool(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    let m = needle.len();
    if m == 0 {
        return Some(0);
    }
    let skip = SkipTable::new(needle);
    let mut i = m - 1;
    while i < haystack.len() {
        let start = i + 1 - m;
        if haystack[start..=i] == *needle {
            return Some(start);
        }
        i += skip.get(haystack[i]);
    }
    None
}
