//! Gating checks run before an operation touches the buffer.

use crate::{
    ByteString, Stream,
    encoding::EncodingRef,
    error::{Result, StreamError},
    guard::{ObjectFlags, Shared, StreamData},
    mode::ModeFlags,
};

impl Stream {
    /// The shared state, or `UninitializedStream`.
    pub(crate) fn shared(&self) -> Result<&Shared> {
        self.shared
            .as_deref()
            .ok_or(StreamError::UninitializedStream)
    }

    fn mode_flags(shared: &Shared) -> ModeFlags {
        shared.with(|d| d.flags)
    }

    pub(crate) fn readable_in(&self, shared: &Shared) -> bool {
        self.state.contains(ObjectFlags::READABLE)
            && Self::mode_flags(shared).contains(ModeFlags::READABLE)
    }

    pub(crate) fn writable_in(&self, shared: &Shared) -> bool {
        self.state.contains(ObjectFlags::WRITABLE)
            && Self::mode_flags(shared).contains(ModeFlags::WRITABLE)
    }

    pub(crate) fn closed_in(&self, shared: &Shared) -> bool {
        !(self.readable_in(shared) || self.writable_in(shared))
    }

    pub(crate) fn check_readable(&self) -> Result<&Shared> {
        let shared = self.shared()?;
        if !self.readable_in(shared) {
            return Err(StreamError::NotReadable);
        }
        Ok(shared)
    }

    pub(crate) fn check_writable(&self) -> Result<&Shared> {
        let shared = self.shared()?;
        if !self.writable_in(shared) {
            return Err(StreamError::NotWritable);
        }
        Ok(shared)
    }

    /// Fails on a frozen stream object, then on an uninitialized one.
    pub(crate) fn check_frozen(&self) -> Result<&Shared> {
        if self.state.contains(ObjectFlags::FROZEN) {
            return Err(StreamError::FrozenObject);
        }
        self.shared()
    }

    /// [`check_frozen`](Self::check_frozen), plus the buffer must not be a
    /// frozen string.
    pub(crate) fn check_modifiable(&self) -> Result<&Shared> {
        let shared = self.check_frozen()?;
        let frozen = shared.with(|d| d.string.as_ref().is_some_and(ByteString::is_frozen));
        if frozen {
            return Err(StreamError::ImmutableTarget);
        }
        Ok(shared)
    }

    pub(crate) fn check_open(&self, shared: &Shared) -> Result<()> {
        if self.closed_in(shared) {
            return Err(StreamError::Closed);
        }
        Ok(())
    }

    /// The encoding reads are tagged with and writes are converted to.
    pub(crate) fn active_encoding(&self, data: &StreamData) -> EncodingRef {
        data.encoding().unwrap_or(self.defaults.external)
    }
}
