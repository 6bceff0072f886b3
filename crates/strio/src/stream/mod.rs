//! The stream handle: construction, lifecycle, cursor and encoding state.
//!
//! Every operation takes `&self`. The buffer, cursor and mode live behind a
//! shared, reentrant lock (see [`guard`](crate::guard)), so a closure handed
//! to an iterating method may call back into the same stream, and duplicates
//! made with [`Stream::duplicate`] observe each other's writes and seeks.
//! Whether *this handle* may read or write is tracked per handle, so closing
//! a duplicate leaves the original open.

mod access;
mod io;
mod lines;
mod read;
mod write;


use std::sync::Arc;

use tracing::debug;

pub use lines::{Bytes, Chars, Codepoints, Lines};

use crate::{
    ByteString,
    bom::detect_bom,
    buffer::MAX_LENGTH,
    encoding::{BINARY, EncodingDefaults, EncodingRef},
    error::{Result, StreamError},
    guard::{ObjectFlags, ObjectState, Shared, StreamData},
    mode::{Mode, ModeFlags},
    options::OpenOptions,
};

/// Reference point for [`Stream::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whence {
    /// From the start of the buffer.
    #[default]
    Start,
    /// From the cursor.
    Current,
    /// From the end of the buffer.
    End,
}

impl TryFrom<i32> for Whence {
    type Error = StreamError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(StreamError::invalid_argument("invalid whence")),
        }
    }
}

/// An in-memory, seekable byte stream over a [`ByteString`].
///
/// ```rust
/// use strio::{LineOptions, Stream, Whence};
///
/// let io = Stream::from_string("one\ntwo\n");
/// assert_eq!(io.gets(&LineOptions::default()).unwrap().unwrap(), "one\n");
/// io.seek(0, Whence::End).unwrap();
/// io.write("three\n").unwrap();
/// assert_eq!(io.string().unwrap(), "one\ntwo\nthree\n");
/// ```
#[derive(Debug)]
pub struct Stream {
    shared: Option<Arc<Shared>>,
    state: ObjectState,
    defaults: EncodingDefaults,
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Stream {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

/// Everything a (re)open computes before anything is committed.
struct Init {
    data: StreamData,
    detect_bom: bool,
}

fn prepare(string: Option<ByteString>, options: &OpenOptions) -> Result<Init> {
    let resolved = options.mode.as_ref().map(Mode::resolve).transpose()?;
    let (mut flags, mode_encoding) = match resolved {
        Some(r) => (r.flags, r.encoding),
        None => (ModeFlags::READABLE, None),
    };
    if mode_encoding.is_some() && options.encoding.is_some() {
        return Err(StreamError::invalid_argument("encoding specified twice"));
    }

    let mut string = string.unwrap_or_else(|| ByteString::empty(options.defaults.external));
    if string.is_frozen() {
        if flags.contains(ModeFlags::WRITABLE) {
            return Err(StreamError::PermissionDenied);
        }
    } else if options.mode.is_none() {
        flags |= ModeFlags::WRITABLE;
    }
    if flags.contains(ModeFlags::TRUNCATE) && !string.is_frozen() {
        string.bytes_mut().clear();
    }

    // Without an override the string's own tag applies.
    let enc = options.encoding.or(mode_encoding);

    Ok(Init {
        data: StreamData {
            string: Some(string),
            enc,
            pos: 0,
            lineno: 0,
            flags,
        },
        detect_bom: flags.contains(ModeFlags::SET_ENCODING_BY_BOM),
    })
}

impl Stream {
    /// An empty read-write stream.
    #[must_use]
    pub fn new() -> Self {
        Self::from_init(None, OpenOptions::default())
    }

    /// A stream over `string`: read-write, or read-only when the string is
    /// frozen.
    #[must_use]
    pub fn from_string(string: impl Into<ByteString>) -> Self {
        Self::from_init(Some(string.into()), OpenOptions::default())
    }

    fn from_init(string: Option<ByteString>, options: OpenOptions) -> Self {
        // Without a mode, preparation has no failure path.
        let frozen = string.as_ref().is_some_and(ByteString::is_frozen);
        let mut flags = ModeFlags::READABLE;
        if !frozen {
            flags |= ModeFlags::WRITABLE;
        }
        let string = string.unwrap_or_else(|| ByteString::empty(options.defaults.external));
        let stream = Stream {
            shared: Some(Arc::new(Shared::new(StreamData {
                string: Some(string),
                enc: None,
                pos: 0,
                lineno: 0,
                flags,
            }))),
            state: ObjectState::default(),
            defaults: options.defaults,
        };
        stream.state.insert(ObjectFlags::from_mode(flags));
        debug!(?flags, "stream opened");
        stream
    }

    /// A stream over `string` opened with `mode`.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidArgument`] for a malformed mode and
    /// [`StreamError::PermissionDenied`] for a writable mode over a frozen
    /// string.
    pub fn open(string: impl Into<ByteString>, mode: impl Into<Mode>) -> Result<Self> {
        Self::with_options(Some(string.into()), OpenOptions::mode(mode))
    }

    /// Opens with full options. Without a string, a fresh empty one tagged
    /// with the default external encoding is used.
    ///
    /// # Errors
    ///
    /// As [`open`](Self::open), plus [`StreamError::InvalidArgument`] when
    /// both the mode string and the options name an encoding.
    pub fn with_options(string: Option<ByteString>, options: OpenOptions) -> Result<Self> {
        let mut stream = Self::uninitialized();
        stream.defaults = options.defaults;
        stream.init(string, &options)?;
        Ok(stream)
    }

    /// A handle with no buffer; every guarded operation fails with
    /// [`StreamError::UninitializedStream`] until it is reopened.
    #[must_use]
    pub fn uninitialized() -> Self {
        Stream {
            shared: None,
            state: ObjectState::default(),
            defaults: EncodingDefaults::default(),
        }
    }

    /// Opens a stream, runs `f` on it and then detaches the buffer and
    /// closes the handle, whether or not `f` succeeded.
    ///
    /// # Errors
    ///
    /// Fails if the stream cannot be opened.
    pub fn open_with<R>(
        string: Option<ByteString>,
        options: OpenOptions,
        f: impl FnOnce(&Stream) -> R,
    ) -> Result<R> {
        struct Detach<'a>(&'a Stream);

        impl Drop for Detach<'_> {
            fn drop(&mut self) {
                if let Some(shared) = &self.0.shared {
                    shared.with(|d| d.string = None);
                }
                self.0.state.remove(ObjectFlags::READWRITE);
            }
        }

        let stream = Self::with_options(string, options)?;
        let detach = Detach(&stream);
        Ok(f(detach.0))
    }

    fn init(&mut self, string: Option<ByteString>, options: &OpenOptions) -> Result<()> {
        let Init { data, detect_bom } = prepare(string, options)?;
        let flags = data.flags;
        if let Some(shared) = &self.shared {
            shared.with(|d| *d = data);
        } else {
            self.shared = Some(Arc::new(Shared::new(data)));
        }
        self.state.insert(ObjectFlags::from_mode(flags));
        debug!(?flags, "stream initialized");
        if detect_bom {
            self.set_encoding_by_bom()?;
        }
        Ok(())
    }

    /// Resets to a fresh empty read-write buffer.
    ///
    /// # Errors
    ///
    /// [`StreamError::FrozenObject`] on a frozen handle.
    pub fn reopen(&mut self) -> Result<()> {
        if self.state.contains(ObjectFlags::FROZEN) {
            return Err(StreamError::FrozenObject);
        }
        self.init(None, &OpenOptions {
            defaults: self.defaults,
            ..OpenOptions::default()
        })
    }

    /// Re-runs construction in place over `string`. Duplicates sharing this
    /// stream's buffer see the new one.
    ///
    /// # Errors
    ///
    /// [`StreamError::FrozenObject`] on a frozen handle, then as
    /// [`with_options`](Self::with_options).
    pub fn reopen_with(&mut self, string: Option<ByteString>, options: OpenOptions) -> Result<()> {
        if self.state.contains(ObjectFlags::FROZEN) {
            return Err(StreamError::FrozenObject);
        }
        self.defaults = options.defaults;
        self.init(string, &options)
    }

    /// Makes this handle share `other`'s buffer and copies its read/write
    /// enablement.
    ///
    /// # Errors
    ///
    /// [`StreamError::FrozenObject`] on a frozen handle.
    pub fn reopen_from(&mut self, other: &Stream) -> Result<()> {
        if self.state.contains(ObjectFlags::FROZEN) {
            return Err(StreamError::FrozenObject);
        }
        let same = match (&self.shared, &other.shared) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        if !same {
            self.shared.clone_from(&other.shared);
            self.copy_access_from(other);
            debug!("stream reopened from another handle");
        }
        Ok(())
    }

    fn copy_access_from(&self, other: &Stream) {
        self.state.remove(ObjectFlags::READWRITE);
        self.state
            .insert(other.state.get() & ObjectFlags::READWRITE);
    }

    /// A second handle over the same buffer and cursor.
    #[must_use]
    pub fn duplicate(&self) -> Stream {
        let dup = Stream {
            shared: self.shared.clone(),
            state: ObjectState::default(),
            defaults: self.defaults,
        };
        dup.copy_access_from(self);
        dup
    }

    /// Whether `self` and `other` share one buffer.
    #[must_use]
    pub fn shares_buffer_with(&self, other: &Stream) -> bool {
        match (&self.shared, &other.shared) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Freezes this handle: seeking and every mutation fail with
    /// [`StreamError::FrozenObject`] from now on.
    pub fn freeze(&self) {
        self.state.insert(ObjectFlags::FROZEN);
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.state.contains(ObjectFlags::FROZEN)
    }

    /// Disables both reading and writing on this handle.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn close(&self) -> Result<()> {
        let shared = self.shared()?;
        if !self.closed_in(shared) {
            self.state.remove(ObjectFlags::READWRITE);
        }
        Ok(())
    }

    /// Disables reading on this handle.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`] when the stream was never opened for
    /// reading.
    pub fn close_read(&self) -> Result<()> {
        let shared = self.shared()?;
        if !shared.with(|d| d.flags.contains(ModeFlags::READABLE)) {
            return Err(StreamError::NotReadable);
        }
        self.state.remove(ObjectFlags::READABLE);
        Ok(())
    }

    /// Disables writing on this handle.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotWritable`] when the stream was never opened for
    /// writing.
    pub fn close_write(&self) -> Result<()> {
        let shared = self.shared()?;
        if !shared.with(|d| d.flags.contains(ModeFlags::WRITABLE)) {
            return Err(StreamError::NotWritable);
        }
        self.state.remove(ObjectFlags::WRITABLE);
        Ok(())
    }

    /// Neither readable nor writable.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn is_closed(&self) -> Result<bool> {
        let shared = self.shared()?;
        Ok(self.closed_in(shared))
    }

    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn is_closed_read(&self) -> Result<bool> {
        let shared = self.shared()?;
        Ok(!self.readable_in(shared))
    }

    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn is_closed_write(&self) -> Result<bool> {
        let shared = self.shared()?;
        Ok(!self.writable_in(shared))
    }

    /// Current byte offset; may be past the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn pos(&self) -> Result<usize> {
        Ok(self.shared()?.with(|d| d.pos))
    }

    /// Alias of [`pos`](Self::pos).
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn tell(&self) -> Result<usize> {
        self.pos()
    }

    /// Moves the cursor to an absolute offset, possibly past the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidSeek`] for a negative offset,
    /// [`StreamError::InvalidArgument`] beyond [`MAX_LENGTH`].
    pub fn set_pos(&self, pos: i64) -> Result<()> {
        let shared = self.shared()?;
        let pos = usize::try_from(pos).map_err(|_| StreamError::InvalidSeek(pos))?;
        if pos > MAX_LENGTH {
            return Err(StreamError::invalid_argument(
                "position beyond the maximum stream length",
            ));
        }
        shared.with(|d| d.pos = pos);
        Ok(())
    }

    /// Moves the cursor relative to `whence`.
    ///
    /// # Errors
    ///
    /// [`StreamError::FrozenObject`], [`StreamError::Closed`], and
    /// [`StreamError::InvalidSeek`] when the target is negative.
    pub fn seek(&self, offset: i64, whence: Whence) -> Result<()> {
        let shared = self.check_frozen()?;
        self.check_open(shared)?;
        shared.with(|d| {
            let base = match whence {
                Whence::Start => 0,
                Whence::Current => d.pos,
                Whence::End => d.len(),
            };
            // Both terms are bounded by MAX_LENGTH, which fits an i64.
            #[allow(clippy::cast_possible_wrap)]
            let target = offset.saturating_add(base as i64);
            let pos = usize::try_from(target).map_err(|_| StreamError::InvalidSeek(target))?;
            if pos > MAX_LENGTH {
                return Err(StreamError::invalid_argument(
                    "position beyond the maximum stream length",
                ));
            }
            d.pos = pos;
            Ok(())
        })
    }

    /// Resets the cursor and the line number to zero.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn rewind(&self) -> Result<()> {
        self.shared()?.with(|d| {
            d.pos = 0;
            d.lineno = 0;
        });
        Ok(())
    }

    /// Records read so far by the line-oriented methods.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn lineno(&self) -> Result<u32> {
        Ok(self.shared()?.with(|d| d.lineno))
    }

    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn set_lineno(&self, lineno: u32) -> Result<()> {
        self.shared()?.with(|d| d.lineno = lineno);
        Ok(())
    }

    /// Buffer length in bytes; zero once the buffer is detached.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn length(&self) -> Result<usize> {
        Ok(self.shared()?.with(|d| d.len()))
    }

    /// Alias of [`length`](Self::length).
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn size(&self) -> Result<usize> {
        self.length()
    }

    /// A copy of the underlying string, if any.
    #[must_use]
    pub fn string(&self) -> Option<ByteString> {
        self.shared.as_ref()?.with(|d| d.string.clone())
    }

    /// Replaces the underlying string and resets the cursor. The mode becomes
    /// read-write, or read-only for a frozen string; this handle's own
    /// enablement is kept.
    ///
    /// # Errors
    ///
    /// [`StreamError::FrozenObject`], [`StreamError::UninitializedStream`].
    pub fn set_string(&self, string: impl Into<ByteString>) -> Result<()> {
        let shared = self.check_frozen()?;
        let string = string.into();
        shared.with(|d| {
            d.flags = if string.is_frozen() {
                ModeFlags::READABLE
            } else {
                ModeFlags::READWRITE
            };
            d.pos = 0;
            d.lineno = 0;
            d.string = Some(string);
        });
        Ok(())
    }

    /// Sets the encoding override; `None` restores the default external
    /// encoding. A writable stream also retags its string.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn set_encoding(&self, encoding: Option<EncodingRef>) -> Result<()> {
        let shared = self.shared()?;
        let enc = encoding.unwrap_or(self.defaults.external);
        let writable = self.writable_in(shared);
        shared.with(|d| {
            d.enc = Some(enc);
            if writable {
                if let Some(string) = d.string.as_mut() {
                    string.force_encoding(enc);
                }
            }
        });
        Ok(())
    }

    /// Detects a byte-order mark at the start of the buffer. On a match the
    /// cursor moves past it and the detected encoding becomes the override;
    /// otherwise the override is cleared.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn set_encoding_by_bom(&self) -> Result<Option<EncodingRef>> {
        let shared = self.shared()?;
        let writable = self.writable_in(shared);
        let detected = shared.with(|d| {
            let detected = detect_bom(d.bytes());
            if let Some((enc, bom_len)) = detected {
                d.pos = bom_len;
                if writable {
                    if let Some(string) = d.string.as_mut() {
                        string.force_encoding(enc);
                    }
                }
            }
            d.enc = detected.map(|(enc, _)| enc);
            detected
        });
        match detected {
            Some((enc, len)) => debug!(encoding = enc.name(), len, "byte-order mark detected"),
            None => debug!("no byte-order mark"),
        }
        Ok(detected.map(|(enc, _)| enc))
    }

    /// The encoding reads are tagged with.
    #[must_use]
    pub fn external_encoding(&self) -> Option<EncodingRef> {
        self.shared.as_ref()?.with(|d| d.encoding())
    }

    /// The configured default internal encoding. The stream never converts
    /// to it.
    #[must_use]
    pub fn internal_encoding(&self) -> Option<EncodingRef> {
        self.defaults.internal
    }

    /// Switches to `ASCII-8BIT`.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn binmode(&self) -> Result<()> {
        let shared = self.shared()?;
        let writable = self.writable_in(shared);
        shared.with(|d| {
            d.enc = Some(BINARY);
            if writable {
                if let Some(string) = d.string.as_mut() {
                    string.force_encoding(BINARY);
                }
            }
        });
        Ok(())
    }

    /// Whether the cursor is at or past the end.
    ///
    /// # Errors
    ///
    /// [`StreamError::NotReadable`].
    pub fn eof(&self) -> Result<bool> {
        Ok(self.check_readable()?.with(|d| d.is_end()))
    }

    /// Runs `f` with the stream's lock held, so the operations inside are
    /// not interleaved with those of other threads. Operations in `f`
    /// re-enter the lock.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn exclusive<R>(&self, f: impl FnOnce(&Stream) -> R) -> Result<R> {
        let shared = self.shared()?;
        let _guard = shared.lock();
        Ok(f(self))
    }

    /// No-op; there is nothing to flush.
    pub fn flush(&self) -> &Self {
        self
    }

    /// Always `0`.
    #[must_use]
    pub fn fsync(&self) -> i32 {
        0
    }

    /// Always `true`.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn sync(&self) -> Result<bool> {
        self.shared()?;
        Ok(true)
    }

    /// Accepts and returns `sync`; a memory stream is always in sync.
    ///
    /// # Errors
    ///
    /// [`StreamError::UninitializedStream`].
    pub fn set_sync(&self, sync: bool) -> Result<bool> {
        self.shared()?;
        Ok(sync)
    }

    #[must_use]
    pub fn isatty(&self) -> bool {
        false
    }

    /// A memory stream has no descriptor.
    #[must_use]
    pub fn fileno(&self) -> Option<i32> {
        None
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        None
    }
}
