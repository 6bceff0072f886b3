//! Character encodings as an injected capability.
//!
//! The stream core never inspects encoded text directly. Everything it needs
//! to know about characters (how long the one at a given offset is, where the
//! next character boundary lies, how to turn a codepoint into bytes) goes
//! through the [`Encoding`] trait. The built-in variants cover UTF-8,
//! US-ASCII, BINARY and the fixed-endian UTF-16/UTF-32 forms; tests may plug
//! in their own.
//!
//! Encodings are handled as `&'static dyn Encoding` ([`EncodingRef`]) and
//! compared by [`Encoding::name`].

mod builtin;

#[cfg(test)]
mod tests;

use core::fmt;

use thiserror::Error;

pub use builtin::{Binary, UsAscii, Utf8, Utf16, Utf32};

/// A shared handle to an encoding implementation.
pub type EncodingRef = &'static dyn Encoding;

pub static UTF_8: EncodingRef = &Utf8;
pub static US_ASCII: EncodingRef = &UsAscii;
/// Raw bytes (`ASCII-8BIT`); every byte is one character.
pub static BINARY: EncodingRef = &Binary;
pub static UTF_16BE: EncodingRef = &Utf16 { big_endian: true };
pub static UTF_16LE: EncodingRef = &Utf16 { big_endian: false };
pub static UTF_32BE: EncodingRef = &Utf32 { big_endian: true };
pub static UTF_32LE: EncodingRef = &Utf32 { big_endian: false };

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("invalid byte sequence in {encoding} at offset {offset}")]
    InvalidByteSequence {
        encoding: &'static str,
        offset: usize,
    },
    #[error("{codepoint:#x} out of char range for {encoding}")]
    InvalidCodepoint {
        codepoint: u32,
        encoding: &'static str,
    },
    #[error("{codepoint:#x} from {from} to {to} is undefined")]
    Undefined {
        codepoint: u32,
        from: &'static str,
        to: &'static str,
    },
}

/// The character-level operations the stream consumes.
///
/// Implementations must be cheap to call repeatedly; the scanner calls
/// [`codepoint_len`](Encoding::codepoint_len) once per character when
/// clamping a record limit.
pub trait Encoding: fmt::Debug + Send + Sync {
    /// Canonical upper-case name, unique among registered encodings.
    fn name(&self) -> &'static str;

    /// Nominal byte length of the character whose first byte is
    /// `bytes[offset]`.
    ///
    /// The length may exceed what is left in `bytes` when the sequence is
    /// truncated. Errors when `bytes[offset]` cannot start a character.
    ///
    /// # Errors
    ///
    /// [`EncodingError::InvalidByteSequence`] for a byte that is not a valid
    /// lead unit.
    fn codepoint_len(&self, bytes: &[u8], offset: usize) -> Result<usize, EncodingError>;

    /// Decodes the character at `bytes[offset]`, returning the codepoint and
    /// its byte length.
    ///
    /// # Errors
    ///
    /// [`EncodingError::InvalidByteSequence`] for malformed or truncated
    /// input.
    fn decode_codepoint(&self, bytes: &[u8], offset: usize) -> Result<(u32, usize), EncodingError>;

    /// Appends the encoded form of `codepoint` to `out`, returning the number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// [`EncodingError::InvalidCodepoint`] when the codepoint has no
    /// representation in this encoding.
    fn encode_codepoint(&self, codepoint: u32, out: &mut Vec<u8>) -> Result<usize, EncodingError>;

    fn is_binary(&self) -> bool {
        false
    }

    /// Whether bytes `0x00..=0x7F` encode the ASCII characters as themselves.
    fn is_ascii_compatible(&self) -> bool {
        true
    }

    /// Byte length of the character at `offset`, never running past `end`.
    ///
    /// A byte that cannot start a character counts as a one-byte character,
    /// and a multi-byte sequence cut short by `end` is as long as the bytes
    /// that are actually present.
    fn char_len_clamped(&self, bytes: &[u8], offset: usize, end: usize) -> usize {
        let nominal = self.codepoint_len(&bytes[..end], offset).unwrap_or(1);
        nominal.clamp(1, end - offset)
    }

    /// First character boundary at or after `proposed_end`, counting
    /// characters from `start` and never exceeding `end`.
    fn right_adjust_char_head(
        &self,
        bytes: &[u8],
        start: usize,
        proposed_end: usize,
        end: usize,
    ) -> usize {
        let mut p = start;
        while p < proposed_end && p < end {
            p += self.char_len_clamped(bytes, p, end);
        }
        p.min(end)
    }
}

/// Two encodings are the same when their names match.
#[must_use]
pub fn same(a: EncodingRef, b: EncodingRef) -> bool {
    a.name() == b.name()
}

/// Looks up a built-in encoding by name or common alias, ignoring case.
#[must_use]
pub fn find(name: &str) -> Option<EncodingRef> {
    match name.to_ascii_uppercase().as_str() {
        "UTF-8" | "UTF8" | "CP65001" => Some(UTF_8),
        "US-ASCII" | "ASCII" | "ANSI_X3.4-1968" | "646" => Some(US_ASCII),
        "ASCII-8BIT" | "BINARY" => Some(BINARY),
        "UTF-16BE" | "UCS-2BE" => Some(UTF_16BE),
        "UTF-16LE" => Some(UTF_16LE),
        "UTF-32BE" | "UCS-4BE" => Some(UTF_32BE),
        "UTF-32LE" | "UCS-4LE" => Some(UTF_32LE),
        _ => None,
    }
}

/// Re-encodes `bytes` from `from` to `to`, one codepoint at a time.
///
/// # Errors
///
/// Fails on malformed input in `from`, or when a codepoint has no
/// representation in `to` ([`EncodingError::Undefined`]).
pub fn transcode(bytes: &[u8], from: EncodingRef, to: EncodingRef) -> Result<Vec<u8>, EncodingError> {
    if same(from, to) {
        return Ok(bytes.to_vec());
    }
    let mut out = Vec::with_capacity(bytes.len());
    let mut offset = 0;
    while offset < bytes.len() {
        let (codepoint, len) = from.decode_codepoint(bytes, offset)?;
        to.encode_codepoint(codepoint, &mut out)
            .map_err(|_| EncodingError::Undefined {
                codepoint,
                from: from.name(),
                to: to.name(),
            })?;
        offset += len;
    }
    Ok(out)
}

/// Stand-ins for the host runtime's process-wide default encodings.
#[derive(Debug, Clone, Copy)]
pub struct EncodingDefaults {
    /// Tag for buffers the stream allocates itself.
    ///
    /// # Default
    ///
    /// UTF-8
    pub external: EncodingRef,

    /// Reported by [`Stream::internal_encoding`](crate::Stream::internal_encoding)
    /// only as a configuration echo; the stream never converts to it.
    ///
    /// # Default
    ///
    /// `None`
    pub internal: Option<EncodingRef>,
}

impl Default for EncodingDefaults {
    fn default() -> Self {
        Self {
            external: UTF_8,
            internal: None,
        }
    }
}
