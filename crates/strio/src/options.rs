use crate::{
    encoding::{EncodingDefaults, EncodingRef},
    mode::Mode,
    scanner::Separator,
};

/// Configuration for opening or reopening a [`Stream`](crate::Stream).
///
/// # Examples
///
/// ```rust
/// use strio::{OpenOptions, Stream, encoding::US_ASCII};
///
/// let stream = Stream::with_options(
///     Some("hello".into()),
///     OpenOptions {
///         mode: Some("r".into()),
///         encoding: Some(US_ASCII),
///         ..Default::default()
///     },
/// )
/// .unwrap();
/// assert_eq!(stream.external_encoding().unwrap().name(), "US-ASCII");
/// ```
///
/// # Default
///
/// No mode, no encoding, UTF-8 as the default external encoding.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Access mode.
    ///
    /// When absent the stream is read-write, or read-only over a frozen
    /// string.
    ///
    /// # Default
    ///
    /// `None`
    pub mode: Option<Mode>,

    /// Encoding the stream reads and writes in, overriding the string's own
    /// tag.
    ///
    /// Giving an encoding here and in a mode string is an error.
    ///
    /// # Default
    ///
    /// `None`
    pub encoding: Option<EncodingRef>,

    /// Process-wide encoding defaults the stream falls back to.
    pub defaults: EncodingDefaults,
}

impl OpenOptions {
    #[must_use]
    pub fn mode(mode: impl Into<Mode>) -> Self {
        Self {
            mode: Some(mode.into()),
            ..Self::default()
        }
    }
}

/// How record-oriented reads split the buffer.
///
/// # Default
///
/// Split on `"\n"`, no length limit, keep the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineOptions {
    /// Record terminator.
    ///
    /// # Default
    ///
    /// `"\n"`
    pub separator: Separator,

    /// Maximum record length in bytes, rounded up to a character boundary.
    ///
    /// `Some(0)` yields empty records from
    /// [`gets`](crate::Stream::gets) and is rejected by the iterating forms.
    ///
    /// # Default
    ///
    /// `None`
    pub limit: Option<usize>,

    /// Strip the separator from each record.
    ///
    /// # Default
    ///
    /// `false`
    pub chomp: bool,
}

impl LineOptions {
    #[must_use]
    pub fn separator(separator: impl Into<Separator>) -> Self {
        Self {
            separator: separator.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Split on `"\n"` and strip line endings.
    #[must_use]
    pub fn chomped() -> Self {
        Self {
            chomp: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_chomp(mut self, chomp: bool) -> Self {
        self.chomp = chomp;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
