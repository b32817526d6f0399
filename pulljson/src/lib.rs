// SPDX-License-Identifier: Apache-2.0

//! A pull-based JSON tokenizer and primitive decoder.
//!
//! [`JsonIter`] reads one value at a time from a byte slice or any
//! [`std::io::Read`], with zero-copy strings where the input allows it.
//! The top-level [`deserialize`] family parses a complete document and
//! rejects anything but whitespace after it.

mod byte_source;

mod iter;
pub use iter::JsonIter;

mod tokenizer;
pub use tokenizer::ValueType;

mod number;

mod string;
pub use string::JsonStr;

mod composite;

mod skip;

mod value;
pub use value::{Any, LazyValue, Value};

mod decode;
pub use decode::Decode;

mod pool;
pub use pool::IterPool;

pub mod config;
pub use config::{Config, DecodingMode};

mod parse_error;
pub use parse_error::{ErrorKind, ParseError};

mod chunk_reader;
pub use chunk_reader::ChunkReader;

use pool::SHARED_POOL;
use tokenizer::is_whitespace;

/// Parses a complete document into a [`Value`] tree.
pub fn deserialize(input: impl AsRef<[u8]>) -> Result<Value, ParseError> {
    deserialize_with_config(input, config::current())
}

/// Like [`deserialize`], decoding under `config` instead of the process default.
pub fn deserialize_with_config(
    input: impl AsRef<[u8]>,
    config: Config,
) -> Result<Value, ParseError> {
    parse_document(input.as_ref(), config, |iter| iter.read())
}

/// Parses a complete document with `T`'s [`Decode`] binding.
pub fn deserialize_as<T: Decode>(input: impl AsRef<[u8]>) -> Result<T, ParseError> {
    deserialize_as_with_config(input, config::current())
}

pub fn deserialize_as_with_config<T: Decode>(
    input: impl AsRef<[u8]>,
    config: Config,
) -> Result<T, ParseError> {
    parse_document(input.as_ref(), config, |iter| T::decode(iter))
}

/// Parses a complete document, leaving nested containers lazy.
pub fn deserialize_any(input: impl AsRef<[u8]>) -> Result<Any, ParseError> {
    deserialize_any_with_config(input, config::current())
}

pub fn deserialize_any_with_config(
    input: impl AsRef<[u8]>,
    config: Config,
) -> Result<Any, ParseError> {
    parse_document(input.as_ref(), config, |iter| iter.read_any())
}

/// Runs `read` over the document without its trailing whitespace and
/// requires it to stop exactly at the end.
fn parse_document<T, F>(bytes: &[u8], config: Config, read: F) -> Result<T, ParseError>
where
    F: FnOnce(&mut JsonIter<'_>) -> Result<T, ParseError>,
{
    let end = bytes
        .iter()
        .rposition(|&b| !is_whitespace(b))
        .map_or(0, |last| last + 1);
    let mut iter = SHARED_POOL.borrow_range(bytes, 0, end).with_config(config);
    let result = read(&mut iter).and_then(|value| {
        if iter.position() == end {
            Ok(value)
        } else {
            Err(iter.error(
                ErrorKind::TrailingGarbage,
                "only whitespace may follow the value",
            ))
        }
    });
    SHARED_POOL.give_back(iter);
    result
}
