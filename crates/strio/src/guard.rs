//! Shared stream state and the lock around it.
//!
//! The mutable part of a stream (buffer, cursor, mode) lives in a
//! [`StreamData`] behind a `parking_lot::ReentrantMutex`. The owning thread
//! may re-enter the lock at any depth, which is what lets a callback running
//! inside an iteration call back into the same stream; any other thread
//! blocks until the holder is done.
//!
//! The `RefCell` inside the mutex is borrowed only for the duration of a
//! primitive. Callers never run user code while holding the borrow.

use core::sync::atomic::{AtomicU8, Ordering};
use std::cell::RefCell;

use bitflags::bitflags;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::trace;

use crate::{ByteString, encoding::EncodingRef, mode::ModeFlags};

/// Buffer, cursor and mode, shared by every handle of one stream.
#[derive(Debug)]
pub(crate) struct StreamData {
    /// `None` once a scoped open has detached the buffer.
    pub string: Option<ByteString>,
    /// Encoding override; the string's own tag applies when absent.
    pub enc: Option<EncodingRef>,
    pub pos: usize,
    pub lineno: u32,
    pub flags: ModeFlags,
}

impl StreamData {
    /// Encoding reads and writes use, if any can be determined.
    pub fn encoding(&self) -> Option<EncodingRef> {
        self.enc
            .or_else(|| self.string.as_ref().map(ByteString::encoding))
    }

    pub fn len(&self) -> usize {
        self.string.as_ref().map_or(0, ByteString::len)
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.len()
    }

    pub fn bytes(&self) -> &[u8] {
        self.string
            .as_ref()
            .map(ByteString::as_bytes)
            .unwrap_or_default()
    }
}

pub(crate) type DataGuard<'a> = ReentrantMutexGuard<'a, RefCell<StreamData>>;

#[derive(Debug)]
pub(crate) struct Shared {
    inner: ReentrantMutex<RefCell<StreamData>>,
}

impl Shared {
    pub fn new(data: StreamData) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(data)),
        }
    }

    /// Acquires the lock, re-entering it when this thread already holds it.
    pub fn lock(&self) -> DataGuard<'_> {
        if let Some(guard) = self.inner.try_lock() {
            return guard;
        }
        trace!("stream lock contended");
        self.inner.lock()
    }

    /// Runs `f` with exclusive access to the data.
    pub fn with<R>(&self, f: impl FnOnce(&mut StreamData) -> R) -> R {
        let guard = self.lock();
        let mut data = guard.borrow_mut();
        f(&mut data)
    }
}

bitflags! {
    /// Per-handle bits, separate from the shared mode: closing one handle
    /// leaves its duplicates open.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct ObjectFlags: u8 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const READWRITE = Self::READABLE.bits() | Self::WRITABLE.bits();
        const FROZEN = 1 << 2;
    }
}

impl ObjectFlags {
    /// The object bits a set of mode flags enables.
    pub fn from_mode(mode: ModeFlags) -> Self {
        let mut flags = ObjectFlags::empty();
        flags.set(ObjectFlags::READABLE, mode.contains(ModeFlags::READABLE));
        flags.set(ObjectFlags::WRITABLE, mode.contains(ModeFlags::WRITABLE));
        flags
    }
}

/// Atomically updated [`ObjectFlags`], so `close` can take `&self`.
#[derive(Debug, Default)]
pub(crate) struct ObjectState(AtomicU8);

impl ObjectState {
    pub fn get(&self) -> ObjectFlags {
        ObjectFlags::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    pub fn contains(&self, flags: ObjectFlags) -> bool {
        self.get().contains(flags)
    }

    pub fn insert(&self, flags: ObjectFlags) {
        self.0.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    pub fn remove(&self, flags: ObjectFlags) {
        self.0.fetch_and(!flags.bits(), Ordering::AcqRel);
    }
}

impl Clone for ObjectState {
    fn clone(&self) -> Self {
        ObjectState(AtomicU8::new(self.get().bits()))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;
    use crate::encoding::UTF_8;

    fn data(s: &str) -> StreamData {
        StreamData {
            string: Some(ByteString::from(s)),
            enc: None,
            pos: 0,
            lineno: 0,
            flags: ModeFlags::READWRITE,
        }
    }

    #[test]
    fn lock_is_reentrant_on_one_thread() {
        let shared = Shared::new(data("abc"));
        let outer = shared.lock();
        let inner = shared.lock();
        inner.borrow_mut().pos = 2;
        drop(inner);
        assert_eq!(outer.borrow().pos, 2);
    }

    #[test]
    fn other_threads_wait_for_the_holder() {
        let shared = Arc::new(Shared::new(data("")));
        let guard = shared.lock();
        let worker = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.with(|d| d.pos += 1))
        };
        // The worker cannot finish while we hold the lock.
        guard.borrow_mut().pos = 10;
        drop(guard);
        worker.join().unwrap();
        assert_eq!(shared.with(|d| d.pos), 11);
    }

    #[test]
    fn encoding_falls_back_to_string_tag() {
        let mut d = data("x");
        assert_eq!(d.encoding().map(|e| e.name()), Some("UTF-8"));
        d.string = None;
        assert!(d.encoding().is_none());
        d.enc = Some(UTF_8);
        assert!(d.encoding().is_some());
    }

    #[test]
    fn object_state_bits() {
        let state = ObjectState::default();
        state.insert(ObjectFlags::from_mode(ModeFlags::READWRITE));
        state.remove(ObjectFlags::READABLE);
        assert_eq!(state.get(), ObjectFlags::WRITABLE);
        assert_eq!(state.clone().get(), ObjectFlags::WRITABLE);
    }
}
