//! In-memory, seekable byte streams over encoding-tagged strings.
//!
//! A [`Stream`] wraps a [`ByteString`] and gives it a file-like interface:
//! a cursor, read/write/seek, character and record reads that respect the
//! string's encoding, push-back with `ungetc`, and open modes that can make
//! either side unavailable.
//!
//! ```rust
//! use strio::{LineOptions, Stream};
//!
//! let io = Stream::new();
//! io.puts(&["alpha".into(), "beta".into()]).unwrap();
//! io.rewind().unwrap();
//!
//! let lines = io.readlines(&LineOptions::chomped()).unwrap();
//! assert_eq!(lines, ["alpha", "beta"]);
//! ```
//!
//! Record splitting is controlled by [`LineOptions`]: a separator (a byte
//! string, paragraph mode, or none at all), a byte limit that never splits a
//! character, and whether to strip the separator.
//!
//! Handles made with [`Stream::duplicate`] share one buffer and cursor.
//! Every operation takes `&self` and runs under a per-buffer reentrant lock,
//! so callbacks given to the iterating methods may use the stream they are
//! iterating.

mod bom;
mod buffer;
mod bytes;
pub mod encoding;
mod error;
mod guard;
mod mode;
mod options;
mod scanner;
mod stream;

pub use buffer::MAX_LENGTH;
pub use bytes::{ByteString, Encoded};
pub use encoding::{Encoding, EncodingDefaults, EncodingRef};
pub use error::{Result, StreamError};
pub use mode::{Mode, ModeFlags, OpenFlags};
pub use options::{LineOptions, OpenOptions};
pub use scanner::Separator;
pub use stream::{Bytes, Chars, Codepoints, Lines, Stream, Whence};

/// Raw record-search routines, exposed for fuzzing and benchmarks.
#[cfg(any(feature = "fuzzing", feature = "bench"))]
#[doc(hidden)]
pub mod search {
    pub use crate::scanner::{HORSPOOL_THRESHOLD, SkipTable, find_horspool, find_naive};
}
