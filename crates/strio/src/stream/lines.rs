//! Record, character, byte and codepoint iteration.
//!
//! The callback forms hold the stream lock for the whole loop, so no other
//! thread interleaves with them; the callback itself may use the stream.
//! The iterator forms take the lock once per item.

use crate::{
    ByteString, LineOptions, Stream,
    error::{Result, StreamError},
    guard::StreamData,
    scanner,
};

impl Stream {
    /// Extracts the next record and advances past it.
    fn getline_in(&self, d: &mut StreamData, options: &LineOptions) -> Option<ByteString> {
        let enc = self.active_encoding(d);
        let bytes = d.bytes();
        let record = scanner::getline(
            bytes,
            d.pos,
            &options.separator,
            options.limit,
            options.chomp,
            enc,
        )?;
        let line = ByteString::new(&bytes[record.start..record.end], enc);
        d.pos = record.next;
        d.lineno = d.lineno.wrapping_add(1);
        Some(line)
    }

    fn next_line(&self, options: &LineOptions) -> Result<Option<ByteString>> {
        let shared = self.check_readable()?;
        Ok(shared.with(|d| self.getline_in(d, options)))
    }

    fn next_codepoint(&self) -> Result<Option<u32>> {
        let shared = self.check_readable()?;
        shared.with(|d| {
            if d.is_end() {
                return Ok(None);
            }
            let enc = self.active_encoding(d);
            let (codepoint, len) = enc.decode_codepoint(d.bytes(), d.pos)?;
            d.pos += len;
            Ok(Some(codepoint))
        })
    }

    /// Reads the next record, or `None` at the end.
    ///
    /// A limit of zero returns an empty string without moving the cursor.
    /// Each record read bumps [`lineno`](Self::lineno).
    ///
    /// ```rust
    /// use strio::{LineOptions, Stream};
    ///
    /// let io = Stream::from_string("a\r\nb");
    /// assert_eq!(io.gets(&LineOptions::chomped()).unwrap().unwrap(), "a");
    /// assert_eq!(io.gets(&LineOptions::default()).unwrap().unwrap(), "b");
    /// assert!(io.gets(&LineOptions::default()).unwrap().is_none());
    /// assert_eq!(io.lineno().unwrap(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`].
    pub fn gets(&self, options: &LineOptions) -> Result<Option<ByteString>> {
        let shared = self.check_readable()?;
        if options.limit == Some(0) {
            return Ok(shared.with(|d| {
                d.string
                    .is_some()
                    .then(|| ByteString::empty(self.active_encoding(d)))
            }));
        }
        Ok(shared.with(|d| self.getline_in(d, options)))
    }

    /// Calls `f` with each remaining record.
    ///
    /// Returns at once when the cursor is past the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidArgument`] for a zero limit,
    /// [`StreamError::NotReadable`] (checked before every record), and any
    /// error `f` returns, which stops the iteration.
    pub fn each_line(
        &self,
        options: &LineOptions,
        mut f: impl FnMut(ByteString) -> Result<()>,
    ) -> Result<()> {
        let shared = self.shared()?;
        let _guard = shared.lock();
        if shared.with(|d| d.string.is_none() || d.pos > d.len()) {
            return Ok(());
        }
        if options.limit == Some(0) {
            return Err(StreamError::invalid_argument(
                "invalid limit: 0 for each_line",
            ));
        }
        while let Some(line) = self.next_line(options)? {
            f(line)?;
        }
        Ok(())
    }

    /// Collects the remaining records.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`], [`StreamError::InvalidArgument`] for a
    /// zero limit.
    pub fn readlines(&self, options: &LineOptions) -> Result<Vec<ByteString>> {
        let shared = self.check_readable()?;
        if options.limit == Some(0) {
            return Err(StreamError::invalid_argument(
                "invalid limit: 0 for readlines",
            ));
        }
        Ok(shared.with(|d| {
            let mut lines = Vec::new();
            while let Some(line) = self.getline_in(d, options) {
                lines.push(line);
            }
            lines
        }))
    }

    /// Calls `f` with each remaining byte.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`] (checked before every byte) and any
    /// error `f` returns.
    pub fn each_byte(&self, mut f: impl FnMut(u8) -> Result<()>) -> Result<()> {
        let shared = self.shared()?;
        let _guard = shared.lock();
        while let Some(byte) = self.getbyte()? {
            f(byte)?;
        }
        Ok(())
    }

    /// Calls `f` with each remaining character.
    ///
    /// # Errors
    ///
    /// As [`each_byte`](Self::each_byte).
    pub fn each_char(&self, mut f: impl FnMut(ByteString) -> Result<()>) -> Result<()> {
        let shared = self.shared()?;
        let _guard = shared.lock();
        while let Some(ch) = self.getc()? {
            f(ch)?;
        }
        Ok(())
    }

    /// Calls `f` with each remaining codepoint of the active encoding.
    ///
    /// # Errors
    ///
    /// As [`each_byte`](Self::each_byte), plus
    /// [`StreamError::InvalidByteSequence`] on malformed input; the cursor
    /// stays on the offending byte.
    pub fn each_codepoint(&self, mut f: impl FnMut(u32) -> Result<()>) -> Result<()> {
        let shared = self.shared()?;
        let _guard = shared.lock();
        while let Some(codepoint) = self.next_codepoint()? {
            f(codepoint)?;
        }
        Ok(())
    }

    /// Iterator over the remaining records.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`], and
    /// [`StreamError::InvalidArgument`] for a zero limit.
    pub fn lines(&self, options: LineOptions) -> Result<Lines<'_>> {
        self.shared()?;
        if options.limit == Some(0) {
            return Err(StreamError::invalid_argument(
                "invalid limit: 0 for each_line",
            ));
        }
        Ok(Lines {
            stream: self,
            options,
            done: false,
        })
    }

    /// Iterator over the remaining bytes.
    #[must_use]
    pub fn bytes(&self) -> Bytes<'_> {
        Bytes {
            stream: self,
            done: false,
        }
    }

    /// Iterator over the remaining characters.
    #[must_use]
    pub fn chars(&self) -> Chars<'_> {
        Chars {
            stream: self,
            done: false,
        }
    }

    /// Iterator over the remaining codepoints.
    #[must_use]
    pub fn codepoints(&self) -> Codepoints<'_> {
        Codepoints {
            stream: self,
            done: false,
        }
    }
}

/// Yields the first error once, then stops.
fn step<T>(done: &mut bool, next: Result<Option<T>>) -> Option<Result<T>> {
    match next {
        Ok(Some(item)) => Some(Ok(item)),
        Ok(None) => {
            *done = true;
            None
        }
        Err(err) => {
            *done = true;
            Some(Err(err))
        }
    }
}

/// Returned by [`Stream::lines`].
#[derive(Debug)]
pub struct Lines<'a> {
    stream: &'a Stream,
    options: LineOptions,
    done: bool,
}

impl Iterator for Lines<'_> {
    type Item = Result<ByteString>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        step(&mut self.done, self.stream.next_line(&self.options))
    }
}

/// Returned by [`Stream::bytes`].
#[derive(Debug)]
pub struct Bytes<'a> {
    stream: &'a Stream,
    done: bool,
}

impl Iterator for Bytes<'_> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        step(&mut self.done, self.stream.getbyte())
    }
}

/// Returned by [`Stream::chars`].
#[derive(Debug)]
pub struct Chars<'a> {
    stream: &'a Stream,
    done: bool,
}

impl Iterator for Chars<'_> {
    type Item = Result<ByteString>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        step(&mut self.done, self.stream.getc())
    }
}

/// Returned by [`Stream::codepoints`].
#[derive(Debug)]
pub struct Codepoints<'a> {
    stream: &'a Stream,
    done: bool,
}

impl Iterator for Codepoints<'_> {
    type Item = Result<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        step(&mut self.done, self.stream.next_codepoint())
    }
}
