use std::{borrow::Cow, io};

use thiserror::Error;

use crate::encoding::EncodingError;

/// Failures reported by [`Stream`](crate::Stream) operations.
///
/// Every variant is local and synchronous: the caller either fixes the
/// argument or the operation cannot proceed in the stream's current state.
/// Running out of data during a non-positional read is not an error; those
/// operations return `None` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("uninitialized stream")]
    UninitializedStream,
    #[error("not opened for reading")]
    NotReadable,
    #[error("not opened for writing")]
    NotWritable,
    #[error("closed stream")]
    Closed,
    #[error("can't modify frozen stream")]
    FrozenObject,
    #[error("not modifiable string")]
    ImmutableTarget,
    #[error("invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),
    #[error("invalid seek value: {0}")]
    InvalidSeek(i64),
    #[error("end of file reached")]
    EndOfFile,
    #[error("permission denied: read-only string")]
    PermissionDenied,
    #[error("incompatible character encodings: {from} and {to}")]
    EncodingIncompatible {
        from: &'static str,
        to: &'static str,
    },
    #[error("invalid byte sequence in {encoding}")]
    InvalidByteSequence { encoding: &'static str },
    #[error("{codepoint:#x} out of char range for {encoding}")]
    InvalidCodepoint {
        codepoint: u32,
        encoding: &'static str,
    },
}

impl StreamError {
    pub(crate) fn invalid_argument(msg: impl Into<Cow<'static, str>>) -> Self {
        StreamError::InvalidArgument(msg.into())
    }
}

impl From<EncodingError> for StreamError {
    fn from(err: EncodingError) -> Self {
        match err {
            EncodingError::InvalidByteSequence { encoding, .. } => {
                StreamError::InvalidByteSequence { encoding }
            }
            EncodingError::InvalidCodepoint {
                codepoint,
                encoding,
            } => StreamError::InvalidCodepoint {
                codepoint,
                encoding,
            },
            EncodingError::Undefined { from, to, .. } => {
                StreamError::EncodingIncompatible { from, to }
            }
        }
    }
}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        let kind = match &err {
            StreamError::EndOfFile => io::ErrorKind::UnexpectedEof,
            StreamError::PermissionDenied
            | StreamError::NotReadable
            | StreamError::NotWritable
            | StreamError::FrozenObject
            | StreamError::ImmutableTarget => io::ErrorKind::PermissionDenied,
            StreamError::InvalidArgument(_) | StreamError::InvalidSeek(_) => {
                io::ErrorKind::InvalidInput
            }
            StreamError::EncodingIncompatible { .. }
            | StreamError::InvalidByteSequence { .. }
            | StreamError::InvalidCodepoint { .. } => io::ErrorKind::InvalidData,
            StreamError::UninitializedStream | StreamError::Closed => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = StreamError> = core::result::Result<T, E>;
