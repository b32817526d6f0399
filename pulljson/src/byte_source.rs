// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Read};

use crate::parse_error::{ErrorKind, ParseError};

/// Smallest window a streaming source will allocate.
const MIN_WINDOW: usize = 16;

/// Bytes shown on each side of the cursor in error snippets.
const SNIPPET_RADIUS: usize = 10;

/// Backing storage for the parse window.
pub(crate) enum Buffer<'a> {
    /// Caller-owned bytes, never refilled.
    Borrowed(&'a [u8]),
    /// Session-owned window refilled from a reader.
    Owned(Vec<u8>),
}

impl Buffer<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Buffer::Borrowed(bytes) => bytes,
            Buffer::Owned(window) => window,
        }
    }
}

/// ByteSource owns the window, its cursors and the optional reader behind it.
///
/// Invariant: `floor <= head <= tail <= buf.len()`. Bytes in `[head, tail)`
/// are never discarded. Compaction keeps the byte before `head` so a single
/// `unread` always succeeds after a refill, and keeps everything from an
/// active `mark` or `capture` so tokens spanning refills stay contiguous.
pub(crate) struct ByteSource<'a> {
    buf: Buffer<'a>,
    pub(crate) head: usize,
    pub(crate) tail: usize,
    floor: usize,
    reader: Option<Box<dyn Read + 'a>>,
    eof: bool,
    /// Start of the token currently being scanned.
    pub(crate) mark: Option<usize>,
    /// Start of a raw value being captured, outlives nested marks.
    pub(crate) capture: Option<usize>,
    /// Bytes dropped from the front of the window by compaction.
    discarded: usize,
    can_unread: bool,
    /// Window kept from an earlier stream while a borrowed slice is parsed.
    spare: Vec<u8>,
}

impl<'a> ByteSource<'a> {
    /// Fixed mode over `bytes[start..end]`. Out of range bounds are clamped.
    pub fn fixed(bytes: &'a [u8], start: usize, end: usize, spare: Vec<u8>) -> Self {
        let end = end.min(bytes.len());
        let start = start.min(end);
        Self {
            buf: Buffer::Borrowed(bytes),
            head: start,
            tail: end,
            floor: start,
            reader: None,
            eof: true,
            mark: None,
            capture: None,
            discarded: 0,
            can_unread: false,
            spare,
        }
    }

    /// Stream mode with an initial window of `capacity` bytes.
    pub fn stream(reader: Box<dyn Read + 'a>, capacity: usize, mut window: Vec<u8>) -> Self {
        window.clear();
        window.resize(capacity.max(MIN_WINDOW), 0);
        Self {
            buf: Buffer::Owned(window),
            head: 0,
            tail: 0,
            floor: 0,
            reader: Some(reader),
            eof: false,
            mark: None,
            capture: None,
            discarded: 0,
            can_unread: false,
            spare: Vec::new(),
        }
    }

    /// Hands back the owned window, whichever mode the source is in.
    pub fn into_window(self) -> Vec<u8> {
        match self.buf {
            Buffer::Owned(window) => window,
            Buffer::Borrowed(_) => self.spare,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        self.buf.bytes()
    }

    /// The unread part of the window.
    pub fn available(&self) -> &[u8] {
        self.buf.bytes().get(self.head..self.tail).unwrap_or(&[])
    }

    /// Absolute offset of `head` from the start of the input.
    pub fn position(&self) -> usize {
        self.discarded + self.head
    }

    /// Next byte without consuming it, refilling if needed. `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<u8>, ParseError> {
        if self.head >= self.tail && !self.refill()? {
            return Ok(None);
        }
        Ok(self.buf.bytes().get(self.head).copied())
    }

    /// Consumes one byte previously returned by `peek`.
    pub fn advance(&mut self) {
        if self.head < self.tail {
            self.head += 1;
            self.can_unread = true;
        }
    }

    /// Consumes `n` bytes already known to be in the window.
    pub fn advance_by(&mut self, n: usize) {
        self.head = (self.head + n).min(self.tail);
        self.can_unread = false;
    }

    /// Consumes and returns the next byte; end of input is `PrematureEnd`.
    pub fn read_byte(&mut self) -> Result<u8, ParseError> {
        match self.peek()? {
            Some(byte) => {
                self.advance();
                Ok(byte)
            }
            None => Err(self.error(ErrorKind::PrematureEnd, "unexpected end of input")),
        }
    }

    /// Pushes the last consumed byte back. Only one byte of lookahead exists.
    pub fn unread(&mut self) -> Result<(), ParseError> {
        if !self.can_unread || self.head <= self.floor {
            return Err(self.error(ErrorKind::UnreadUnderflow, "unread too many bytes"));
        }
        self.head -= 1;
        self.can_unread = false;
        Ok(())
    }

    /// Pulls more bytes from the reader into the tail of the window.
    ///
    /// Compacts consumed bytes out of the window first and doubles the
    /// window when a retained token already fills it. Returns false at end
    /// of input, and always in fixed mode.
    pub fn refill(&mut self) -> Result<bool, ParseError> {
        if self.eof {
            return Ok(false);
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(false);
        };
        let Buffer::Owned(window) = &mut self.buf else {
            return Ok(false);
        };

        let keep = [self.mark, self.capture]
            .into_iter()
            .flatten()
            .fold(self.head.saturating_sub(1), usize::min);
        if keep > 0 {
            window.copy_within(keep..self.tail, 0);
            self.head -= keep;
            self.tail -= keep;
            self.mark = self.mark.map(|m| m - keep);
            self.capture = self.capture.map(|c| c - keep);
            self.discarded += keep;
            log::trace!("compacted {keep} bytes, {} retained", self.tail);
        }
        if self.tail == window.len() {
            let grown = (window.len() * 2).max(MIN_WINDOW);
            log::trace!("growing window from {} to {grown} bytes", window.len());
            window.resize(grown, 0);
        }

        loop {
            match reader.read(&mut window[self.tail..]) {
                Ok(0) => {
                    log::debug!("end of stream after {} bytes", self.discarded + self.tail);
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    log::trace!("refilled {n} bytes");
                    self.tail += n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ParseError::Io {
                        offset: self.discarded + self.head,
                        source,
                    })
                }
            }
        }
    }

    /// Builds a grammar error carrying the cursor offset and a snippet.
    pub fn error(&self, kind: ErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            kind,
            offset: self.position(),
            message: message.into(),
            snippet: self.snippet(),
        }
    }

    /// Lossily decoded bytes around the cursor.
    pub fn snippet(&self) -> String {
        let start = self.head.saturating_sub(SNIPPET_RADIUS).max(self.floor);
        let end = (self.head + SNIPPET_RADIUS).min(self.tail);
        let bytes = self.buf.bytes().get(start..end).unwrap_or(&[]);
        String::from_utf8_lossy(bytes).into_owned()
    }
}
