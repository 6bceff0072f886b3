//! Open modes: numeric `O_*` flags or `fopen`-style mode strings, resolved
//! once into a [`ModeFlags`] set.

use bitflags::bitflags;
use tracing::warn;

use crate::{
    encoding::{self, BINARY, EncodingRef},
    error::{Result, StreamError},
};

bitflags! {
    /// Canonical per-stream mode bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModeFlags: u16 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const READWRITE = Self::READABLE.bits() | Self::WRITABLE.bits();
        const BINARY = 1 << 2;
        const APPEND = 1 << 3;
        const CREATE = 1 << 4;
        const EXCLUSIVE = 1 << 5;
        const TRUNCATE = 1 << 6;
        const TEXT = 1 << 7;
        /// Detect the encoding from a byte-order mark when opening.
        const SET_ENCODING_BY_BOM = 1 << 8;
    }
}

bitflags! {
    /// POSIX-style open flags, for callers that speak `O_*`.
    ///
    /// `O_RDONLY` is the empty set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenFlags: u32 {
        const WRONLY = 0o1;
        const RDWR = 0o2;
        const CREAT = 0o100;
        const EXCL = 0o200;
        const TRUNC = 0o1000;
        const APPEND = 0o2000;
    }
}

impl OpenFlags {
    pub const RDONLY: Self = Self::empty();
    const ACCMODE: u32 = 0o3;
}

/// How a stream is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Numeric(OpenFlags),
    /// A mode string such as `"r"`, `"a+"`, `"wb"` or `"r:BOM|utf-8"`.
    Spec(String),
}

impl From<&str> for Mode {
    fn from(s: &str) -> Self {
        Mode::Spec(s.to_owned())
    }
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        Mode::Spec(s)
    }
}

impl From<OpenFlags> for Mode {
    fn from(flags: OpenFlags) -> Self {
        Mode::Numeric(flags)
    }
}

/// A mode after parsing.
#[derive(Debug, Clone, Copy)]
pub struct Resolved {
    pub flags: ModeFlags,
    /// External encoding named by the mode, if any.
    pub encoding: Option<EncodingRef>,
}

impl Mode {
    /// Parses the mode.
    ///
    /// # Errors
    ///
    /// [`StreamError::InvalidArgument`] for a malformed mode string.
    pub fn resolve(&self) -> Result<Resolved> {
        match self {
            Mode::Numeric(flags) => Ok(Resolved {
                flags: numeric_flags(*flags),
                encoding: None,
            }),
            Mode::Spec(spec) => parse_spec(spec),
        }
    }
}

fn numeric_flags(oflags: OpenFlags) -> ModeFlags {
    let mut flags = match oflags.bits() & OpenFlags::ACCMODE {
        0 => ModeFlags::READABLE,
        0o1 => ModeFlags::WRITABLE,
        0o2 => ModeFlags::READWRITE,
        _ => ModeFlags::empty(),
    };
    for (o, m) in [
        (OpenFlags::APPEND, ModeFlags::APPEND),
        (OpenFlags::TRUNC, ModeFlags::TRUNCATE),
        (OpenFlags::CREAT, ModeFlags::CREATE),
        (OpenFlags::EXCL, ModeFlags::EXCLUSIVE),
    ] {
        if oflags.contains(o) {
            flags |= m;
        }
    }
    flags
}

fn invalid_mode(spec: &str) -> StreamError {
    StreamError::invalid_argument(format!("invalid access mode {spec}"))
}

fn parse_spec(spec: &str) -> Result<Resolved> {
    let (access, encodings) = match spec.split_once(':') {
        Some((access, rest)) => (access, Some(rest)),
        None => (spec, None),
    };

    let mut chars = access.chars();
    let mut flags = match chars.next() {
        Some('r') => ModeFlags::READABLE,
        Some('w') => ModeFlags::WRITABLE | ModeFlags::TRUNCATE | ModeFlags::CREATE,
        Some('a') => ModeFlags::WRITABLE | ModeFlags::APPEND | ModeFlags::CREATE,
        _ => return Err(invalid_mode(spec)),
    };
    for c in chars {
        match c {
            'b' => flags |= ModeFlags::BINARY,
            't' => flags |= ModeFlags::TEXT,
            '+' => flags |= ModeFlags::READWRITE,
            'x' if access.starts_with('w') => flags |= ModeFlags::EXCLUSIVE,
            _ => return Err(invalid_mode(spec)),
        }
    }
    if flags.contains(ModeFlags::BINARY | ModeFlags::TEXT) {
        return Err(StreamError::invalid_argument("both binmode and textmode are specified"));
    }

    let mut encoding = None;
    if let Some(encodings) = encodings {
        let external = encodings.split(':').next().unwrap_or_default();
        let (bom, name) = match external.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("BOM|") => (true, &external[4..]),
            _ => (false, external),
        };
        match encoding::find(name) {
            Some(enc) => {
                if bom {
                    if enc.name().starts_with("UTF-") {
                        flags |= ModeFlags::SET_ENCODING_BY_BOM;
                    } else {
                        warn!(encoding = enc.name(), "BOM with non-UTF encoding is nonsense");
                    }
                }
                encoding = Some(enc);
            }
            None if name == "-" || name.is_empty() => {}
            None => warn!(encoding = name, "unsupported encoding ignored"),
        }
    }
    if encoding.is_none() && flags.contains(ModeFlags::BINARY) {
        encoding = Some(BINARY);
    }

    Ok(Resolved { flags, encoding })
}
