// SPDX-License-Identifier: Apache-2.0

//! Session configuration and the process-wide default.
//!
//! Every [`JsonIter`](crate::JsonIter) copies a [`Config`] when it is
//! constructed and never looks at the default again, so changing the default
//! only affects sessions created afterwards. Set it once at startup, before
//! any parsing begins.

use std::sync::{PoisonError, RwLock};

/// How much the engine trusts input once a token has been recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodingMode {
    /// Every byte of `true`, `false` and `null` is checked.
    #[default]
    Strict,
    /// After the first byte of a literal matches, the rest is consumed
    /// unchecked. Reads never go out of bounds, but `nxxx` decodes as null.
    Trusting,
}

/// Per-session decoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Literal validation policy.
    pub mode: DecodingMode,
    /// Deepest nesting `read` and `read_any` will materialize.
    pub max_depth: usize,
}

impl Config {
    /// Strict literals and a nesting limit of 128.
    pub const fn new() -> Self {
        Self {
            mode: DecodingMode::Strict,
            max_depth: 128,
        }
    }

    pub const fn with_mode(mut self, mode: DecodingMode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_CONFIG: RwLock<Option<Config>> = RwLock::new(None);

/// Replaces the configuration new sessions start with.
pub fn set_default(config: Config) {
    log::debug!("default config set to {config:?}");
    *DEFAULT_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(config);
}

/// Restores the built-in default.
pub fn reset_default() {
    *DEFAULT_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner) = None;
}

/// The configuration a session constructed now would use.
pub fn current() -> Config {
    DEFAULT_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .unwrap_or_default()
}
