use std::{borrow::Cow, fmt};

use tracing::debug;

use crate::{
    Encoded, Stream,
    buffer,
    encoding::{self, BINARY, EncodingRef, US_ASCII},
    error::{Result, StreamError},
    mode::ModeFlags,
};

/// Converts `data` to the stream encoding `enc` where that is meaningful.
///
/// Binary on either side, or a US-ASCII stream, takes the bytes verbatim.
/// US-ASCII text that fails to convert is also written verbatim.
fn convert_for_write<'a>(data: Encoded<'a>, enc: EncodingRef) -> Result<Cow<'a, [u8]>> {
    if encoding::same(enc, data.encoding)
        || enc.is_binary()
        || encoding::same(enc, US_ASCII)
        || data.encoding.is_binary()
    {
        return Ok(Cow::Borrowed(data.bytes));
    }
    match encoding::transcode(data.bytes, data.encoding, enc) {
        Ok(converted) => Ok(Cow::Owned(converted)),
        Err(_) if encoding::same(data.encoding, US_ASCII) => Ok(Cow::Borrowed(data.bytes)),
        Err(err) => {
            debug!(%err, "write source does not convert");
            Err(StreamError::EncodingIncompatible {
                from: data.encoding.name(),
                to: enc.name(),
            })
        }
    }
}

impl Stream {
    /// Writes `data` at the cursor, overwriting what is there and growing
    /// the buffer as needed, and returns the number of bytes written.
    ///
    /// In append mode the cursor first moves to the end. A cursor past the
    /// end leaves a zero-filled gap. Text in another encoding is converted
    /// to the stream's encoding first.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotWritable`], [`StreamError::EncodingIncompatible`],
    /// then [`StreamError::FrozenObject`] or [`StreamError::ImmutableTarget`]
    /// unless `data` is empty.
    pub fn write<'a>(&self, data: impl Into<Encoded<'a>>) -> Result<usize> {
        let data = data.into();
        let shared = self.check_writable()?;
        let _guard = shared.lock();
        let Some(enc) = shared.with(|d| d.encoding()) else {
            return Ok(0);
        };
        let bytes = convert_for_write(data, enc)?;
        if bytes.is_empty() {
            return Ok(0);
        }
        self.check_modifiable()?;
        shared.with(|d| {
            if d.flags.contains(ModeFlags::APPEND) {
                d.pos = d.len();
            }
            let pos = d.pos;
            let Some(string) = d.string.as_mut() else {
                return Ok(0);
            };
            d.pos = buffer::write_at(string.bytes_mut(), pos, &bytes)?;
            Ok(bytes.len())
        })
    }

    /// Writes each part in order, as one atomic operation, and returns the
    /// total number of bytes written.
    ///
    /// # Errors
    ///
    /// As [`write`](Self::write); parts before the failing one stay written.
    pub fn write_parts(&self, parts: &[Encoded<'_>]) -> Result<usize> {
        let shared = self.check_writable()?;
        let _guard = shared.lock();
        parts
            .iter()
            .try_fold(0, |total, part| -> Result<usize> {
                Ok(total + self.write(*part)?)
            })
    }

    /// Alias of [`write`](Self::write).
    ///
    /// # Errors
    ///
    /// As [`write`](Self::write).
    pub fn syswrite<'a>(&self, data: impl Into<Encoded<'a>>) -> Result<usize> {
        self.write(data)
    }

    /// Writes a single byte and returns it.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotWritable`], [`StreamError::FrozenObject`],
    /// [`StreamError::ImmutableTarget`].
    pub fn putc(&self, byte: u8) -> Result<u8> {
        self.check_writable()?;
        self.check_modifiable()?;
        self.write(Encoded::new(&[byte], BINARY))?;
        Ok(byte)
    }

    /// Writes the first character of `s`.
    ///
    /// # Errors
    ///
    /// As [`putc`](Self::putc).
    pub fn putc_str<'a>(&self, s: impl Into<Encoded<'a>>) -> Result<()> {
        let s = s.into();
        self.check_writable()?;
        self.check_modifiable()?;
        if s.bytes.is_empty() {
            return Ok(());
        }
        let len = s.encoding.char_len_clamped(s.bytes, 0, s.bytes.len());
        self.write(Encoded::new(&s.bytes[..len], s.encoding))?;
        Ok(())
    }

    /// Resizes the buffer to exactly `len` bytes, zero-filling growth. The
    /// cursor does not move.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotWritable`], [`StreamError::InvalidArgument`] for a
    /// negative length, [`StreamError::FrozenObject`] or
    /// [`StreamError::ImmutableTarget`].
    pub fn truncate(&self, len: i64) -> Result<()> {
        let shared = self.check_writable()?;
        let len =
            usize::try_from(len).map_err(|_| StreamError::invalid_argument("negative length"))?;
        self.check_modifiable()?;
        shared.with(|d| match d.string.as_mut() {
            Some(string) => buffer::resize_zeroed(string.bytes_mut(), len),
            None => Ok(()),
        })
    }

    /// Writes each argument in turn.
    ///
    /// # Errors
    ///
    /// As [`write`](Self::write).
    pub fn print(&self, args: &[Encoded<'_>]) -> Result<()> {
        self.write_parts(args)?;
        Ok(())
    }

    /// Writes each argument followed by a newline unless it already ends with
    /// one. With no arguments, writes a single newline.
    ///
    /// ```rust
    /// use strio::Stream;
    ///
    /// let io = Stream::new();
    /// io.puts(&["a".into(), "b\n".into()]).unwrap();
    /// io.puts(&[]).unwrap();
    /// assert_eq!(io.string().unwrap(), "a\nb\n\n");
    /// ```
    ///
    /// # Errors
    ///
    /// As [`write`](Self::write).
    pub fn puts(&self, args: &[Encoded<'_>]) -> Result<()> {
        let shared = self.check_writable()?;
        let _guard = shared.lock();
        if args.is_empty() {
            self.write("\n")?;
            return Ok(());
        }
        for arg in args {
            self.write(*arg)?;
            if !arg.bytes.ends_with(b"\n") {
                self.write("\n")?;
            }
        }
        Ok(())
    }

    /// Writes `data` and returns the stream, for chaining.
    ///
    /// # Errors
    ///
    /// As [`write`](Self::write).
    pub fn push<'a>(&self, data: impl Into<Encoded<'a>>) -> Result<&Self> {
        self.write(data)?;
        Ok(self)
    }

    /// Formatted write, so `write!` works on a `&Stream`.
    ///
    /// # Errors
    ///
    /// As [`write`](Self::write).
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> Result<()> {
        match args.as_str() {
            Some(s) => self.write(s)?,
            None => self.write(&args.to_string())?,
        };
        Ok(())
    }
}
