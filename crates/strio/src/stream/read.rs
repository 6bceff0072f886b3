use tracing::debug;

use crate::{
    ByteString, Encoded, LineOptions, Stream,
    buffer,
    encoding::{self, BINARY, EncodingRef},
    error::{Result, StreamError},
    guard::StreamData,
};

fn length_arg(len: i64) -> Result<usize> {
    usize::try_from(len)
        .map_err(|_| StreamError::invalid_argument(format!("negative length {len} given")))
}

/// Places `bytes` before the cursor; a detached buffer swallows them.
fn unget_in(d: &mut StreamData, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Ok(());
    }
    let pos = d.pos;
    let Some(string) = d.string.as_mut() else {
        return Ok(());
    };
    d.pos = buffer::unget(string.bytes_mut(), pos, bytes)?;
    Ok(())
}

impl Stream {
    /// Reads one character in the active encoding.
    ///
    /// A sequence cut short by the end of the buffer, or a byte that cannot
    /// start a character, comes back as is. Returns `None` at the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`].
    pub fn getc(&self) -> Result<Option<ByteString>> {
        let shared = self.check_readable()?;
        Ok(shared.with(|d| {
            if d.is_end() {
                return None;
            }
            let enc = self.active_encoding(d);
            let bytes = d.bytes();
            let len = enc.char_len_clamped(bytes, d.pos, bytes.len());
            let ch = ByteString::new(&bytes[d.pos..d.pos + len], enc);
            d.pos += len;
            Some(ch)
        }))
    }

    /// Reads one byte, or `None` at the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`].
    pub fn getbyte(&self) -> Result<Option<u8>> {
        let shared = self.check_readable()?;
        Ok(shared.with(|d| {
            let byte = d.bytes().get(d.pos).copied()?;
            d.pos += 1;
            Some(byte)
        }))
    }

    /// Copies bytes from the cursor into `out` and advances past them.
    /// Returns the encoding to tag the result with, or `None` for end of
    /// stream.
    fn read_bytes(&self, len: Option<i64>, out: &mut Vec<u8>) -> Result<Option<EncodingRef>> {
        let shared = self.check_readable()?;
        let len = len.map(length_arg).transpose()?;
        out.clear();
        Ok(shared.with(|d| {
            if d.string.is_none() {
                return None;
            }
            let remaining = d.bytes().get(d.pos..).unwrap_or_default();
            let enc = match len {
                Some(n) if n > 0 && remaining.is_empty() => return None,
                Some(n) => {
                    out.extend_from_slice(&remaining[..n.min(remaining.len())]);
                    BINARY
                }
                None => {
                    out.extend_from_slice(remaining);
                    self.active_encoding(d)
                }
            };
            d.pos += out.len();
            Some(enc)
        }))
    }

    /// Reads up to `len` bytes, or everything left when `len` is `None`.
    ///
    /// With an explicit length the result is raw `ASCII-8BIT` bytes, and
    /// `None` is returned when a positive length finds nothing left. Without
    /// a length the result carries the active encoding and is empty, never
    /// `None`, at the end.
    ///
    /// ```rust
    /// use strio::Stream;
    ///
    /// let io = Stream::from_string("ab");
    /// assert_eq!(io.read(Some(5)).unwrap().unwrap(), "ab");
    /// assert_eq!(io.read(None).unwrap().unwrap(), "");
    /// assert!(io.read(Some(1)).unwrap().is_none());
    /// ```
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`], and [`StreamError::InvalidArgument`] for
    /// a negative length.
    pub fn read(&self, len: Option<i64>) -> Result<Option<ByteString>> {
        let mut out = Vec::new();
        Ok(self
            .read_bytes(len, &mut out)?
            .map(|enc| ByteString::new(out, enc)))
    }

    /// [`read`](Self::read) into an existing string, which is replaced and
    /// retagged. At the end of the stream `buf` is left empty. Returns the
    /// number of bytes copied, or `None` where `read` returns `None`.
    ///
    /// # Errors
    ///
    /// As [`read`](Self::read), plus [`StreamError::ImmutableTarget`] when
    /// `buf` is frozen.
    pub fn read_into(&self, len: Option<i64>, buf: &mut ByteString) -> Result<Option<usize>> {
        if buf.is_frozen() {
            return Err(StreamError::ImmutableTarget);
        }
        let enc = self.read_bytes(len, buf.bytes_mut())?;
        Ok(enc.map(|enc| {
            buf.force_encoding(enc);
            buf.len()
        }))
    }

    fn pread_bytes(&self, len: i64, offset: i64, out: &mut Vec<u8>) -> Result<()> {
        let shared = self.check_readable()?;
        let len = usize::try_from(len).map_err(|_| {
            StreamError::invalid_argument(format!("negative string size (or size too big): {len}"))
        })?;
        out.clear();
        if len == 0 {
            return Ok(());
        }
        let offset = usize::try_from(offset)
            .map_err(|_| StreamError::invalid_argument("pread: Invalid offset argument"))?;
        shared.with(|d| {
            let bytes = d.bytes();
            if offset >= bytes.len() {
                return Err(StreamError::EndOfFile);
            }
            let end = offset + len.min(bytes.len() - offset);
            out.extend_from_slice(&bytes[offset..end]);
            Ok(())
        })
    }

    /// Reads up to `len` bytes at `offset` without moving the cursor.
    /// The result is `ASCII-8BIT`.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfFile`] when `offset` is at or past the end,
    /// [`StreamError::InvalidArgument`] for a negative length or offset. A
    /// zero length succeeds with an empty result whatever the offset.
    pub fn pread(&self, len: i64, offset: i64) -> Result<ByteString> {
        let mut out = Vec::new();
        self.pread_bytes(len, offset, &mut out)?;
        Ok(ByteString::binary(out))
    }

    /// [`pread`](Self::pread) into an existing string. Returns the number of
    /// bytes copied.
    ///
    /// # Errors
    ///
    /// As [`pread`](Self::pread), plus [`StreamError::ImmutableTarget`] when
    /// `buf` is frozen.
    pub fn pread_into(&self, len: i64, offset: i64, buf: &mut ByteString) -> Result<usize> {
        if buf.is_frozen() {
            return Err(StreamError::ImmutableTarget);
        }
        self.pread_bytes(len, offset, buf.bytes_mut())?;
        buf.force_encoding(BINARY);
        Ok(buf.len())
    }

    /// Pushes `c` back so the next read returns it first.
    ///
    /// Text in another encoding is converted to the active one unless either
    /// side is binary; text that does not convert is pushed back as raw
    /// bytes. Pushing back more than lies before the cursor grows the buffer
    /// at the front.
    ///
    /// # Errors
    ///
    /// [`StreamError::FrozenObject`], [`StreamError::ImmutableTarget`], then
    /// [`StreamError::NotReadable`].
    pub fn ungetc<'a>(&self, c: impl Into<Encoded<'a>>) -> Result<()> {
        let c = c.into();
        let shared = self.check_modifiable()?;
        self.check_readable()?;
        shared.with(|d| {
            let enc = self.active_encoding(d);
            if encoding::same(enc, c.encoding) || enc.is_binary() || c.encoding.is_binary() {
                return unget_in(d, c.bytes);
            }
            match encoding::transcode(c.bytes, c.encoding, enc) {
                Ok(converted) => unget_in(d, &converted),
                Err(err) => {
                    debug!(%err, "pushing back unconverted bytes");
                    unget_in(d, c.bytes)
                }
            }
        })
    }

    /// Pushes back the character `codepoint`, encoded in the active encoding.
    ///
    /// # Errors
    ///
    /// As [`ungetc`](Self::ungetc), plus [`StreamError::InvalidCodepoint`]
    /// when the encoding cannot represent `codepoint`.
    pub fn ungetc_codepoint(&self, codepoint: u32) -> Result<()> {
        let shared = self.check_modifiable()?;
        self.check_readable()?;
        shared.with(|d| {
            let mut bytes = Vec::with_capacity(4);
            self.active_encoding(d)
                .encode_codepoint(codepoint, &mut bytes)?;
            unget_in(d, &bytes)
        })
    }

    /// Pushes back one raw byte.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`], then [`StreamError::FrozenObject`] or
    /// [`StreamError::ImmutableTarget`].
    pub fn ungetbyte(&self, byte: u8) -> Result<()> {
        self.unget_bytes(&[byte])
    }

    /// Pushes back raw bytes without any conversion.
    ///
    /// # Errors
    ///
    /// As [`ungetbyte`](Self::ungetbyte).
    pub fn unget_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.check_readable()?;
        let shared = self.check_modifiable()?;
        shared.with(|d| unget_in(d, bytes))
    }

    /// [`getc`](Self::getc), failing at the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfFile`] at the end.
    pub fn readchar(&self) -> Result<ByteString> {
        self.getc()?.ok_or(StreamError::EndOfFile)
    }

    /// [`getbyte`](Self::getbyte), failing at the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfFile`] at the end.
    pub fn readbyte(&self) -> Result<u8> {
        self.getbyte()?.ok_or(StreamError::EndOfFile)
    }

    /// [`gets`](Self::gets), failing at the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfFile`] at the end.
    pub fn readline(&self, options: &LineOptions) -> Result<ByteString> {
        self.gets(options)?.ok_or(StreamError::EndOfFile)
    }

    /// [`read`](Self::read), failing where it would return `None`.
    ///
    /// # Errors
    ///
    /// [`StreamError::EndOfFile`] when a positive length finds nothing left.
    pub fn sysread(&self, len: Option<i64>) -> Result<ByteString> {
        self.read(len)?.ok_or(StreamError::EndOfFile)
    }

    /// Alias of [`sysread`](Self::sysread).
    ///
    /// # Errors
    ///
    /// As [`sysread`](Self::sysread).
    pub fn readpartial(&self, len: Option<i64>) -> Result<ByteString> {
        self.sysread(len)
    }
}
