// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use crate::byte_source::ByteSource;
use crate::config::{self, Config};
use crate::parse_error::{ErrorKind, ParseError};

/// Reusable allocations carried between sessions by [`IterPool`](crate::IterPool).
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    pub chars: Vec<u8>,
    pub window: Vec<u8>,
    pub field: String,
}

/// A pull-based JSON parsing session.
///
/// The session reads values one at a time from either a fixed byte slice or
/// a [`Read`] source. Both modes share the same read API; in stream mode the
/// window is refilled, compacted and grown transparently, so a token may span
/// any number of reads.
///
/// Zero-copy results such as [`JsonStr::Borrowed`](crate::JsonStr) borrow the
/// session, so they cannot outlive the next read.
///
/// A session is not meant to be shared between threads while parsing. Run one
/// session per document and recycle them through an [`IterPool`](crate::IterPool)
/// if allocation matters.
///
/// # Example
/// ```
/// use pulljson::JsonIter;
///
/// let mut iter = JsonIter::from_text(r#"{"id": 7, "tags": ["a", "b"]}"#);
/// let mut id = 0;
/// let mut tags = Vec::new();
/// while let Some(field) = iter.read_object()? {
///     match field.as_str() {
///         "id" => id = iter.read_int()?,
///         "tags" => {
///             while iter.read_array()? {
///                 tags.push(iter.read_string()?.unwrap_or_default());
///             }
///         }
///         _ => iter.skip()?,
///     }
/// }
/// assert_eq!(id, 7);
/// assert_eq!(tags, ["a", "b"]);
/// # Ok::<(), pulljson::ParseError>(())
/// ```
pub struct JsonIter<'a> {
    pub(crate) src: ByteSource<'a>,
    /// Assembly buffer for unescaped strings and number literals.
    pub(crate) chars: Vec<u8>,
    /// Field name buffer lent to object callbacks.
    pub(crate) field: String,
    pub(crate) config: Config,
}

impl<'a> JsonIter<'a> {
    /// Parses a whole byte slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::from_range(bytes, 0, bytes.len())
    }

    /// Parses `bytes[start..end]`. Offsets in errors stay relative to `bytes`.
    pub fn from_range(bytes: &'a [u8], start: usize, end: usize) -> Self {
        Self::from_scratch(Scratch::default(), bytes, start, end)
    }

    /// Parses a string's UTF-8 bytes.
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }

    /// Parses a stream, starting with a window of `capacity` bytes.
    ///
    /// The window grows when a single token does not fit, so `capacity` only
    /// sets how much is read per refill.
    pub fn from_reader<R: Read + 'a>(reader: R, capacity: usize) -> Self {
        Self {
            src: ByteSource::stream(Box::new(reader), capacity, Vec::new()),
            chars: Vec::with_capacity(32),
            field: String::new(),
            config: config::current(),
        }
    }

    pub(crate) fn from_scratch(scratch: Scratch, bytes: &'a [u8], start: usize, end: usize) -> Self {
        let Scratch {
            mut chars,
            window,
            mut field,
        } = scratch;
        chars.clear();
        field.clear();
        Self {
            src: ByteSource::fixed(bytes, start, end, window),
            chars,
            field,
            config: config::current(),
        }
    }

    /// Overrides the configuration copied at construction.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The configuration this session decodes with.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Re-points the session at a new slice, keeping its allocations.
    pub fn reset(&mut self, bytes: &'a [u8]) {
        self.reset_range(bytes, 0, bytes.len());
    }

    /// Re-points the session at `bytes[start..end]`, keeping its allocations.
    pub fn reset_range(&mut self, bytes: &'a [u8], start: usize, end: usize) {
        let window = self.take_window();
        self.src = ByteSource::fixed(bytes, start, end, window);
        self.chars.clear();
    }

    /// Re-points the session at a new stream, reusing its window allocation.
    pub fn reset_reader<R: Read + 'a>(&mut self, reader: R, capacity: usize) {
        let window = self.take_window();
        self.src = ByteSource::stream(Box::new(reader), capacity, window);
        self.chars.clear();
    }

    fn take_window(&mut self) -> Vec<u8> {
        let old = std::mem::replace(&mut self.src, ByteSource::fixed(&[], 0, 0, Vec::new()));
        old.into_window()
    }

    pub(crate) fn into_scratch(self) -> Scratch {
        Scratch {
            chars: self.chars,
            window: self.src.into_window(),
            field: self.field,
        }
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.src.position()
    }

    /// Recent input around the cursor, for diagnostics.
    pub fn current_buffer(&self) -> String {
        format!("head: {}, peek: {}", self.position(), self.src.snippet())
    }

    pub(crate) fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        self.src.error(kind, message)
    }

    /// Error for a byte that does not fit the grammar at this point.
    pub(crate) fn unexpected(&self, expected: &str, found: u8) -> ParseError {
        self.error(
            ErrorKind::UnexpectedToken,
            format!("expected {expected}, found {:?}", found as char),
        )
    }
}
