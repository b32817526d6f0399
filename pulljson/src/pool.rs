// SPDX-License-Identifier: Apache-2.0

use std::io::Read;
use std::sync::{Mutex, PoisonError};

use crate::iter::Scratch;
use crate::JsonIter;

/// Recycles session scratch buffers across parses.
///
/// `borrow` and `give_back` may be called from any thread. A borrowed
/// session belongs to its caller alone until it is given back; only its
/// allocations are pooled, never its position or input.
///
/// ```
/// use pulljson::IterPool;
///
/// let pool = IterPool::new(4);
/// let mut iter = pool.borrow(b"[1, 2]");
/// let mut total = 0;
/// while iter.read_array()? {
///     total += iter.read_int()?;
/// }
/// pool.give_back(iter);
/// assert_eq!(total, 3);
/// assert_eq!(pool.idle(), 1);
/// # Ok::<(), pulljson::ParseError>(())
/// ```
#[derive(Debug)]
pub struct IterPool {
    idle: Mutex<Vec<Scratch>>,
    max_idle: usize,
}

impl IterPool {
    /// A pool holding at most `max_idle` scratch sets between uses.
    pub const fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    fn take(&self) -> Scratch {
        let scratch = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match scratch {
            Some(scratch) => {
                log::debug!("reusing pooled session scratch");
                scratch
            }
            None => {
                log::debug!("pool empty, allocating session scratch");
                Scratch::default()
            }
        }
    }

    /// A session over `bytes`, built on pooled scratch when available.
    pub fn borrow<'a>(&self, bytes: &'a [u8]) -> JsonIter<'a> {
        JsonIter::from_scratch(self.take(), bytes, 0, bytes.len())
    }

    /// A session over `bytes[start..end]`.
    pub fn borrow_range<'a>(&self, bytes: &'a [u8], start: usize, end: usize) -> JsonIter<'a> {
        JsonIter::from_scratch(self.take(), bytes, start, end)
    }

    /// A stream session whose window reuses a pooled allocation.
    pub fn borrow_reader<'a, R: Read + 'a>(&self, reader: R, capacity: usize) -> JsonIter<'a> {
        let mut iter = JsonIter::from_scratch(self.take(), &[], 0, 0);
        iter.reset_reader(reader, capacity);
        iter
    }

    /// Returns a session's allocations to the pool. The session itself,
    /// including its input, is dropped.
    pub fn give_back(&self, iter: JsonIter<'_>) {
        let scratch = iter.into_scratch();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.max_idle {
            idle.push(scratch);
            log::debug!("session returned to pool, {} idle", idle.len());
        } else {
            log::debug!("pool full, dropping session scratch");
        }
    }

    /// Scratch sets currently waiting for reuse.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for IterPool {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Pool behind the top-level `deserialize` functions.
pub(crate) static SHARED_POOL: IterPool = IterPool::new(16);
