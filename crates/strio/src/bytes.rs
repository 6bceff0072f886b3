//! Encoding-tagged byte strings.
//!
//! [`ByteString`] is both the backing buffer of a stream and the value handed
//! back by every text-returning read. [`Encoded`] is its borrowed counterpart,
//! accepted wherever a stream takes bytes as input.

use core::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::encoding::{self, BINARY, EncodingRef, UTF_8};

/// An owned byte string tagged with an [`Encoding`](crate::Encoding).
///
/// The bytes need not be valid in the tagged encoding. A frozen string is
/// externally immutable: a stream opened over it is read-only, and no
/// operation on the stream changes its bytes.
#[derive(Clone)]
pub struct ByteString {
    bytes: BString,
    encoding: EncodingRef,
    frozen: bool,
}

impl ByteString {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>, encoding: EncodingRef) -> Self {
        Self {
            bytes: BString::from(bytes.into()),
            encoding,
            frozen: false,
        }
    }

    #[must_use]
    pub fn empty(encoding: EncodingRef) -> Self {
        Self::new(Vec::new(), encoding)
    }

    /// Raw bytes tagged `ASCII-8BIT`.
    #[must_use]
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, BINARY)
    }

    /// Marks the string as externally immutable.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Builder form of [`freeze`](Self::freeze).
    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    #[must_use]
    pub fn as_bstr(&self) -> &BStr {
        self.bytes.as_bstr()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn encoding(&self) -> EncodingRef {
        self.encoding
    }

    /// Retags the bytes without converting them.
    pub fn force_encoding(&mut self, encoding: EncodingRef) {
        self.encoding = encoding;
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into()
    }

    /// Lossy UTF-8 view, for display.
    #[must_use]
    pub fn to_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        self.bytes.to_str_lossy()
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }

    pub(crate) fn as_encoded(&self) -> Encoded<'_> {
        Encoded {
            bytes: self.as_bytes(),
            encoding: self.encoding,
        }
    }
}

impl Default for ByteString {
    fn default() -> Self {
        Self::empty(UTF_8)
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_bstr())?;
        write!(f, " ({})", self.encoding.name())?;
        if self.frozen {
            f.write_str(" frozen")?;
        }
        Ok(())
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_bstr(), f)
    }
}

/// Equality compares bytes and encoding; the frozen bit is not part of the
/// value.
impl PartialEq for ByteString {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes && encoding::same(self.encoding, other.encoding)
    }
}

impl Eq for ByteString {}

// Comparisons with plain Rust strings look at the bytes only.
impl PartialEq<[u8]> for ByteString {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for ByteString {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for ByteString {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_bytes() == other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteString {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == *other
    }
}

impl PartialEq<str> for ByteString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        Self::new(s, UTF_8)
    }
}

impl From<String> for ByteString {
    fn from(s: String) -> Self {
        Self::new(s, UTF_8)
    }
}

impl From<&[u8]> for ByteString {
    fn from(b: &[u8]) -> Self {
        Self::binary(b)
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(b: Vec<u8>) -> Self {
        Self::binary(b)
    }
}

impl From<ByteString> for Vec<u8> {
    fn from(s: ByteString) -> Self {
        s.into_bytes()
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ByteString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut st = serializer.serialize_struct("ByteString", 2)?;
        st.serialize_field("encoding", self.encoding.name())?;
        st.serialize_field("bytes", &self.to_str_lossy())?;
        st.end()
    }
}

/// Borrowed bytes plus the encoding they are in.
///
/// `&str` converts as UTF-8 and `&[u8]` as binary, so most call sites pass
/// plain Rust values.
#[derive(Debug, Clone, Copy)]
pub struct Encoded<'a> {
    pub bytes: &'a [u8],
    pub encoding: EncodingRef,
}

impl<'a> Encoded<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8], encoding: EncodingRef) -> Self {
        Self { bytes, encoding }
    }
}

impl<'a> From<&'a str> for Encoded<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes(), UTF_8)
    }
}

impl<'a> From<&'a String> for Encoded<'a> {
    fn from(s: &'a String) -> Self {
        Self::new(s.as_bytes(), UTF_8)
    }
}

impl<'a> From<&'a [u8]> for Encoded<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::new(b, BINARY)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Encoded<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Self::new(b, BINARY)
    }
}

impl<'a> From<&'a Vec<u8>> for Encoded<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Self::new(b, BINARY)
    }
}

impl<'a> From<&'a ByteString> for Encoded<'a> {
    fn from(s: &'a ByteString) -> Self {
        s.as_encoded()
    }
}
