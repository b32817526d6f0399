// SPDX-License-Identifier: Apache-2.0

//! Owned value trees.
//!
//! [`Value`] is the eager tree built by [`JsonIter::read`]. [`Any`] is built
//! by [`JsonIter::read_any`]: scalars are decoded at once, while arrays and
//! objects are captured as raw bytes and decoded only when forced.

use indexmap::IndexMap;

use crate::config::Config;
use crate::parse_error::ParseError;
use crate::tokenizer::ValueType;
use crate::JsonIter;

/// A fully materialized JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// An integral number within 32 bits.
    Int(i32),
    /// An integral number within 64 bits but not 32.
    Long(i64),
    /// Any other number.
    Double(f64),
    String(String),
    Array(Vec<Value>),
    /// Fields in document order; a repeated key keeps its last value.
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Boolean,
            Value::Int(_) | Value::Long(_) | Value::Double(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// Looks up a field of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(value) => Some(i64::from(value)),
            Value::Long(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(value) => Some(f64::from(value)),
            Value::Long(value) => Some(value as f64),
            Value::Double(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }
}

/// Raw bytes of an array or object that has not been decoded yet.
///
/// The capturing session's [`Config`] travels with the bytes, so forcing
/// decodes under the same literal and depth rules as the original read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyValue {
    raw: Vec<u8>,
    kind: ValueType,
    config: Config,
}

impl LazyValue {
    /// The captured JSON text, from the opening bracket to the closing one.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn kind(&self) -> ValueType {
        self.kind
    }

    pub fn config(&self) -> Config {
        self.config
    }

    fn session(&self) -> JsonIter<'_> {
        JsonIter::new(&self.raw).with_config(self.config)
    }

    /// Decodes one level. Nested containers stay lazy. Error offsets are
    /// relative to [`raw`](Self::raw).
    pub fn force(&self) -> Result<Any, ParseError> {
        let mut iter = self.session();
        match self.kind {
            ValueType::Object => {
                let mut fields = IndexMap::new();
                while let Some(name) = iter.read_object()? {
                    let value = iter.read_any()?;
                    fields.insert(name, value);
                }
                Ok(Any::Object(fields))
            }
            _ => {
                let mut items = Vec::new();
                while iter.read_array()? {
                    items.push(iter.read_any()?);
                }
                Ok(Any::Array(items))
            }
        }
    }
}

/// A JSON value whose containers may still be undecoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Any {
    Null,
    Bool(bool),
    /// An integral number within 64 bits.
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<Any>),
    Object(IndexMap<String, Any>),
    Lazy(LazyValue),
}

impl Any {
    pub fn value_type(&self) -> ValueType {
        match self {
            Any::Null => ValueType::Null,
            Any::Bool(_) => ValueType::Boolean,
            Any::Int(_) | Any::Float(_) => ValueType::Number,
            Any::Text(_) => ValueType::String,
            Any::Array(_) => ValueType::Array,
            Any::Object(_) => ValueType::Object,
            Any::Lazy(lazy) => lazy.kind,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Any::Lazy(_))
    }

    /// Decodes a lazy container by one level; other values are returned as is.
    pub fn force(self) -> Result<Any, ParseError> {
        match self {
            Any::Lazy(lazy) => lazy.force(),
            other => Ok(other),
        }
    }

    /// Decodes everything that is still lazy into a [`Value`] tree.
    pub fn into_value(self) -> Result<Value, ParseError> {
        Ok(match self {
            Any::Null => Value::Null,
            Any::Bool(value) => Value::Bool(value),
            Any::Int(value) => i32::try_from(value).map_or(Value::Long(value), Value::Int),
            Any::Float(value) => Value::Double(value),
            Any::Text(text) => Value::String(text),
            Any::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(Any::into_value)
                    .collect::<Result<_, _>>()?,
            ),
            Any::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| value.into_value().map(|value| (name, value)))
                    .collect::<Result<_, _>>()?,
            ),
            Any::Lazy(lazy) => lazy.session().read()?,
        })
    }
}

impl JsonIter<'_> {
    /// Reads the next value, deferring the decoding of arrays and objects.
    ///
    /// A container is validated structurally by [`skip`](Self::skip) and its
    /// bytes copied into an [`Any::Lazy`].
    pub fn read_any(&mut self) -> Result<Any, ParseError> {
        match self.what_is_next()? {
            ValueType::String => Ok(Any::Text(self.read_str()?.as_str().to_owned())),
            ValueType::Number => Ok(match self.read_number_any()? {
                Ok(value) => Any::Int(value),
                Err(value) => Any::Float(value),
            }),
            ValueType::Boolean => self.read_boolean().map(Any::Bool),
            ValueType::Null => {
                self.read_null()?;
                Ok(Any::Null)
            }
            kind @ (ValueType::Array | ValueType::Object) => {
                // what_is_next left the cursor on the opening bracket
                self.src.capture = Some(self.src.head);
                let skipped = self.skip();
                let start = self.src.capture.take().unwrap_or(self.src.head);
                skipped?;
                let raw = self
                    .src
                    .bytes()
                    .get(start..self.src.head)
                    .unwrap_or_default()
                    .to_vec();
                Ok(Any::Lazy(LazyValue {
                    raw,
                    kind,
                    config: self.config,
                }))
            }
            ValueType::Invalid => {
                let found = self.next_token()?;
                Err(self.unexpected("a value", found))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkReader, DecodingMode, ErrorKind};
    use test_log::test;

    #[test]
    fn test_scalars_are_eager() {
        let mut iter = JsonIter::from_text(r#"[null, true, -3, 2.5, "s", 9223372036854775807]"#);
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_any().unwrap(), Any::Null);
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_any().unwrap(), Any::Bool(true));
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_any().unwrap(), Any::Int(-3));
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_any().unwrap(), Any::Float(2.5));
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_any().unwrap(), Any::Text("s".to_owned()));
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_any().unwrap(), Any::Int(i64::MAX));
        assert!(!iter.read_array().unwrap());
    }

    #[test]
    fn test_containers_are_lazy() {
        let mut iter = JsonIter::from_text(r#" {"a": [1, 2], "b": {"c": null}} 5"#);
        let any = iter.read_any().unwrap();
        let Any::Lazy(lazy) = &any else {
            panic!("expected lazy value");
        };
        assert_eq!(lazy.kind(), ValueType::Object);
        assert_eq!(lazy.raw(), br#"{"a": [1, 2], "b": {"c": null}}"#);
        assert_eq!(iter.read_int().unwrap(), 5);

        let Any::Object(fields) = any.force().unwrap() else {
            panic!("expected object");
        };
        assert!(fields["a"].is_lazy());
        assert_eq!(fields["b"].value_type(), ValueType::Object);
        let items = fields["a"].clone().force().unwrap();
        assert_eq!(items, Any::Array(vec![Any::Int(1), Any::Int(2)]));
    }

    #[test]
    fn test_into_value_matches_read() {
        let json = br#"{"a": [1, 5000000000, {"b": "c"}], "d": -0.5, "e": []}"#;
        let eager = JsonIter::new(json).read().unwrap();
        let lazy = JsonIter::new(json).read_any().unwrap();
        assert_eq!(lazy.into_value().unwrap(), eager);
    }

    #[test]
    fn test_lazy_capture_spans_refills() {
        let json = br#"[{"long": "abcdefghijklmnopqrstuvwxyz"}, [1, 2, 3]] true"#;
        let mut iter = JsonIter::from_reader(ChunkReader::new(json, 3), 4);
        let Any::Lazy(lazy) = iter.read_any().unwrap() else {
            panic!("expected lazy value");
        };
        assert_eq!(lazy.raw(), &json[..json.len() - 5]);
        assert!(iter.read_boolean().unwrap());
    }

    #[test]
    fn test_malformed_container_fails_eagerly() {
        let mut iter = JsonIter::from_text("[1, 2");
        let err = iter.read_any().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::PrematureEnd));
    }

    #[test]
    fn test_force_keeps_session_mode() {
        let config = Config::new().with_mode(DecodingMode::Trusting);
        let mut iter = JsonIter::from_text("[nxxx, 1]").with_config(config);
        let any = iter.read_any().unwrap();
        let Any::Lazy(lazy) = &any else {
            panic!("expected lazy value");
        };
        assert_eq!(lazy.config(), config);
        assert_eq!(
            lazy.force().unwrap(),
            Any::Array(vec![Any::Null, Any::Int(1)])
        );
        assert_eq!(
            any.into_value().unwrap(),
            Value::Array(vec![Value::Null, Value::Int(1)])
        );

        // a strict session still rejects the same bytes
        let strict = Config::new().with_mode(DecodingMode::Strict);
        let err = JsonIter::from_text("[nxxx, 1]")
            .with_config(strict)
            .read_any()
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedToken));
    }

    #[test]
    fn test_into_value_keeps_session_depth() {
        let json = format!("{}{}", "[".repeat(300), "]".repeat(300));
        let deep = Config::new().with_max_depth(1000);
        let any = JsonIter::from_text(&json).with_config(deep).read_any().unwrap();
        let eager = JsonIter::from_text(&json).with_config(deep).read().unwrap();
        assert_eq!(any.into_value().unwrap(), eager);

        let shallow = Config::new().with_max_depth(100);
        let any = JsonIter::from_text(&json).with_config(shallow).read_any().unwrap();
        let err = any.into_value().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::DepthLimit));
    }

    #[test]
    fn test_value_accessors() {
        let mut iter = JsonIter::from_text(r#"{"n": 3, "s": "x"}"#);
        let value = iter.read().unwrap();
        assert_eq!(value.get("n").and_then(Value::as_i64), Some(3));
        assert_eq!(value.get("n").and_then(Value::as_f64), Some(3.0));
        assert_eq!(value.get("s").and_then(Value::as_str), Some("x"));
        assert_eq!(value.get("missing"), None);
        assert_eq!(value.value_type(), ValueType::Object);
    }
}
