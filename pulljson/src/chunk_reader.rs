// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`Read`] that hands out data in fixed-size chunks.
//!
//! [`ChunkReader`] simulates a slow stream so stream-mode parsing can be
//! exercised against the exact same bytes as a fixed buffer. Real inputs such
//! as files or sockets already implement [`Read`] and need no adapter.
//!
//! ```rust
//! use pulljson::{ChunkReader, JsonIter};
//!
//! let json = br#"{"large": "document with lots of data..."}"#;
//! // Only 4 bytes reach the session per read
//! let mut iter = JsonIter::from_reader(ChunkReader::new(json, 4), 16);
//! assert_eq!(iter.read_object()?.as_deref(), Some("large"));
//! # Ok::<(), pulljson::ParseError>(())
//! ```

use std::io::{self, Read};

/// A [`Read`] over a byte slice that returns at most `chunk_size` bytes per call.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> ChunkReader<'a> {
    /// Each `read()` returns at most `chunk_size` bytes (minimum 1).
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// A reader that fills as much of the caller's buffer as it can.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: usize::MAX,
        }
    }
}

impl Read for ChunkReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.get(self.pos..).unwrap_or(&[]);
        let to_copy = remaining.len().min(buf.len()).min(self.chunk_size);
        buf[..to_copy].copy_from_slice(&remaining[..to_copy]);
        self.pos += to_copy;
        Ok(to_copy)
    }
}
