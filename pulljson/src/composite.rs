// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;

use crate::parse_error::{ErrorKind, ParseError};
use crate::tokenizer::ValueType;
use crate::{JsonIter, Value};

impl JsonIter<'_> {
    /// Advances through an array one element at a time.
    ///
    /// Returns true when an element follows and the cursor is positioned on
    /// it, false when the array is finished. Call it before every element:
    /// the first call consumes `[`, later calls consume `,` or `]`. A `null`
    /// in place of the array reads as an empty array.
    pub fn read_array(&mut self) -> Result<bool, ParseError> {
        match self.next_token()? {
            b'[' => {
                if self.next_token()? == b']' {
                    return Ok(false);
                }
                self.src.unread()?;
                Ok(true)
            }
            b',' => Ok(true),
            b']' => Ok(false),
            b'n' => {
                self.skip_fixed_bytes(b"ull")?;
                Ok(false)
            }
            other => Err(self.unexpected("'[', ',', ']' or 'n'", other)),
        }
    }

    /// Calls `on_element` for each element of an array.
    ///
    /// The callback reads exactly one value and returns whether to continue.
    /// Returns true when the array was fully consumed, false when the
    /// callback stopped early (the cursor then sits after that element).
    pub fn read_array_cb<F>(&mut self, mut on_element: F) -> Result<bool, ParseError>
    where
        F: FnMut(&mut Self) -> Result<bool, ParseError>,
    {
        match self.next_token()? {
            b'[' => {}
            b'n' => {
                self.skip_fixed_bytes(b"ull")?;
                return Ok(true);
            }
            other => return Err(self.unexpected("'[' or 'n'", other)),
        }
        if self.next_token()? == b']' {
            return Ok(true);
        }
        self.src.unread()?;
        loop {
            if !on_element(self)? {
                return Ok(false);
            }
            match self.next_token()? {
                b',' => {}
                b']' => return Ok(true),
                other => return Err(self.unexpected("',' or ']'", other)),
            }
        }
    }

    /// Advances through an object one field at a time.
    ///
    /// Returns the next field name with the cursor on its value, or `None`
    /// when the object is finished. A `null` in place of the object reads as
    /// an empty object.
    pub fn read_object(&mut self) -> Result<Option<String>, ParseError> {
        match self.next_token()? {
            b'{' => match self.next_token()? {
                b'"' => self.read_field_name().map(Some),
                b'}' => Ok(None),
                other => Err(self.unexpected("'\"' or '}'", other)),
            },
            b',' => {
                self.expect_token(b'"')?;
                self.read_field_name().map(Some)
            }
            b'}' => Ok(None),
            b'n' => {
                self.skip_fixed_bytes(b"ull")?;
                Ok(None)
            }
            other => Err(self.unexpected("'{', ',', '}' or 'n'", other)),
        }
    }

    /// Reads a field name after its opening quote, then the `:`.
    fn read_field_name(&mut self) -> Result<String, ParseError> {
        let name = self.read_str_after_quote()?.as_str().to_owned();
        self.expect_token(b':')?;
        Ok(name)
    }

    /// Calls `on_field` with each field name, the cursor on the field's value.
    ///
    /// The name is lent from a buffer reused across fields. Returns true when
    /// the object was fully consumed, false when the callback stopped early.
    pub fn read_object_cb<F>(&mut self, mut on_field: F) -> Result<bool, ParseError>
    where
        F: FnMut(&mut Self, &str) -> Result<bool, ParseError>,
    {
        match self.next_token()? {
            b'{' => {}
            b'n' => {
                self.skip_fixed_bytes(b"ull")?;
                return Ok(true);
            }
            other => return Err(self.unexpected("'{' or 'n'", other)),
        }
        match self.next_token()? {
            b'"' => {}
            b'}' => return Ok(true),
            other => return Err(self.unexpected("'\"' or '}'", other)),
        }
        loop {
            let mut field = std::mem::take(&mut self.field);
            field.clear();
            field.push_str(self.read_str_after_quote()?.as_str());
            self.expect_token(b':')?;
            let keep_going = on_field(self, &field);
            self.field = field;
            if !keep_going? {
                return Ok(false);
            }
            match self.next_token()? {
                b',' => self.expect_token(b'"')?,
                b'}' => return Ok(true),
                other => return Err(self.unexpected("',' or '}'", other)),
            }
        }
    }

    /// Reads the next value into an owned [`Value`] tree.
    ///
    /// Integral numbers become [`Value::Int`] or [`Value::Long`] depending
    /// on magnitude, anything with a fraction or exponent [`Value::Double`].
    /// Nesting deeper than [`Config::max_depth`](crate::Config) fails with
    /// [`ErrorKind::DepthLimit`].
    pub fn read(&mut self) -> Result<Value, ParseError> {
        self.read_value(0)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, ParseError> {
        match self.what_is_next()? {
            ValueType::String => Ok(Value::String(self.read_str()?.as_str().to_owned())),
            ValueType::Number => self.read_number_value(),
            ValueType::Boolean => self.read_boolean().map(Value::Bool),
            ValueType::Null => {
                self.read_null()?;
                Ok(Value::Null)
            }
            ValueType::Array => {
                self.enter(depth)?;
                let mut items = Vec::new();
                while self.read_array()? {
                    items.push(self.read_value(depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            ValueType::Object => {
                self.enter(depth)?;
                let mut fields = IndexMap::new();
                while let Some(name) = self.read_object()? {
                    let value = self.read_value(depth + 1)?;
                    fields.insert(name, value);
                }
                Ok(Value::Object(fields))
            }
            ValueType::Invalid => {
                let found = self.next_token()?;
                Err(self.unexpected("a value", found))
            }
        }
    }

    /// Fails once materialized nesting reaches the configured limit.
    pub(crate) fn enter(&self, depth: usize) -> Result<(), ParseError> {
        if depth >= self.config.max_depth {
            return Err(self.error(
                ErrorKind::DepthLimit,
                format!("nesting exceeds {} levels", self.config.max_depth),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChunkReader, Config};
    use test_log::test;

    #[test]
    fn test_read_array_protocol() {
        let mut iter = JsonIter::from_text("[1, 2 ,3]");
        let mut seen = Vec::new();
        while iter.read_array().unwrap() {
            seen.push(iter.read_int().unwrap());
        }
        assert_eq!(seen, [1, 2, 3]);
    }

    #[test]
    fn test_empty_and_null_arrays() {
        let mut iter = JsonIter::from_text("[ ] null");
        assert!(!iter.read_array().unwrap());
        assert!(!iter.read_array().unwrap());
    }

    #[test]
    fn test_nested_arrays() {
        let mut iter = JsonIter::from_text("[[1,2],[],[3]]");
        let mut rows = Vec::new();
        while iter.read_array().unwrap() {
            let mut row = Vec::new();
            while iter.read_array().unwrap() {
                row.push(iter.read_int().unwrap());
            }
            rows.push(row);
        }
        assert_eq!(rows, vec![vec![1, 2], vec![], vec![3]]);
    }

    #[test]
    fn test_read_array_rejects_bad_separator() {
        let mut iter = JsonIter::from_text("[1;2]");
        assert!(iter.read_array().unwrap());
        iter.read_int().unwrap();
        let err = iter.read_array().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedToken));
    }

    #[test]
    fn test_read_object_protocol() {
        let mut iter = JsonIter::from_text(r#"{"a": 1, "b" : 2}"#);
        let mut seen = Vec::new();
        while let Some(field) = iter.read_object().unwrap() {
            seen.push((field, iter.read_int().unwrap()));
        }
        assert_eq!(seen, [("a".to_owned(), 1), ("b".to_owned(), 2)]);
    }

    #[test]
    fn test_empty_and_null_objects() {
        let mut iter = JsonIter::from_text("{} null");
        assert_eq!(iter.read_object().unwrap(), None);
        assert_eq!(iter.read_object().unwrap(), None);
    }

    #[test]
    fn test_object_missing_colon() {
        let mut iter = JsonIter::from_text(r#"{"a" 1}"#);
        let err = iter.read_object().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedToken));
    }

    #[test]
    fn test_array_callback_completes() {
        let mut iter = JsonIter::from_text("[10, 20, 30]");
        let mut sum = 0;
        let done = iter
            .read_array_cb(|iter| {
                sum += iter.read_int()?;
                Ok(true)
            })
            .unwrap();
        assert!(done);
        assert_eq!(sum, 60);
    }

    #[test]
    fn test_array_callback_stops_early() {
        let mut iter = JsonIter::from_text("[1, 2, 3] 4");
        let mut seen = Vec::new();
        let done = iter
            .read_array_cb(|iter| {
                let value = iter.read_int()?;
                seen.push(value);
                Ok(value < 2)
            })
            .unwrap();
        assert!(!done);
        assert_eq!(seen, [1, 2]);
        // resumable through the non-callback protocol
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_int().unwrap(), 3);
        assert!(!iter.read_array().unwrap());
        assert_eq!(iter.read_int().unwrap(), 4);
    }

    #[test]
    fn test_array_callback_empty_and_null() {
        let mut iter = JsonIter::from_text("[] null");
        let mut calls = 0;
        assert!(iter
            .read_array_cb(|_| {
                calls += 1;
                Ok(true)
            })
            .unwrap());
        assert!(iter
            .read_array_cb(|_| {
                calls += 1;
                Ok(true)
            })
            .unwrap());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_object_callback() {
        let mut iter = JsonIter::from_text(r#"{"x": 1, "skip": [1, {"a": 2}], "y": "two"}"#);
        let mut seen = Vec::new();
        let done = iter
            .read_object_cb(|iter, field| {
                match field {
                    "x" => seen.push(format!("x={}", iter.read_int()?)),
                    "y" => seen.push(format!("y={}", iter.read_str()?)),
                    _ => iter.skip()?,
                }
                Ok(true)
            })
            .unwrap();
        assert!(done);
        assert_eq!(seen, ["x=1", "y=two"]);
    }

    #[test]
    fn test_object_callback_stops_early() {
        let mut iter = JsonIter::from_text(r#"{"a": 1, "b": 2}"#);
        let mut fields = Vec::new();
        let done = iter
            .read_object_cb(|iter, field| {
                fields.push(field.to_owned());
                iter.skip()?;
                Ok(false)
            })
            .unwrap();
        assert!(!done);
        assert_eq!(fields, ["a"]);
    }

    #[test]
    fn test_callback_error_propagates() {
        let mut iter = JsonIter::from_text(r#"{"a": "not a number"}"#);
        let err = iter
            .read_object_cb(|iter, _| {
                iter.read_int()?;
                Ok(true)
            })
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedToken));
    }

    #[test]
    fn test_read_value_tree() {
        let mut iter = JsonIter::from_text(
            r#"{"n": null, "b": true, "i": 7, "l": 5000000000, "d": 1.5, "s": "x", "a": [1, [2]], "o": {}}"#,
        );
        let value = iter.read().unwrap();
        let Value::Object(fields) = value else {
            panic!("expected object");
        };
        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["n", "b", "i", "l", "d", "s", "a", "o"]);
        assert_eq!(fields["n"], Value::Null);
        assert_eq!(fields["b"], Value::Bool(true));
        assert_eq!(fields["i"], Value::Int(7));
        assert_eq!(fields["l"], Value::Long(5_000_000_000));
        assert_eq!(fields["d"], Value::Double(1.5));
        assert_eq!(fields["s"], Value::String("x".to_owned()));
        assert_eq!(
            fields["a"],
            Value::Array(vec![Value::Int(1), Value::Array(vec![Value::Int(2)])])
        );
        assert_eq!(fields["o"], Value::Object(IndexMap::new()));
    }

    #[test]
    fn test_read_duplicate_keys_keep_last() {
        let mut iter = JsonIter::from_text(r#"{"k": 1, "k": 2}"#);
        let Value::Object(fields) = iter.read().unwrap() else {
            panic!("expected object");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["k"], Value::Int(2));
    }

    #[test]
    fn test_read_depth_limit() {
        let config = Config::new().with_max_depth(3);
        let mut iter = JsonIter::from_text("[[[1]]]").with_config(config);
        assert!(iter.read().is_ok());
        let mut iter = JsonIter::from_text("[[[[1]]]]").with_config(config);
        let err = iter.read().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::DepthLimit));
    }

    #[test]
    fn test_read_rejects_trailing_comma() {
        let mut iter = JsonIter::from_text("[1,]");
        let err = iter.read().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedToken));
    }

    #[test]
    fn test_read_streamed() {
        let json = br#"{"list": [1, 2.5, "three", false], "nested": {"k": null}}"#;
        let fixed = JsonIter::new(json).read().unwrap();
        let mut iter = JsonIter::from_reader(ChunkReader::new(json, 1), 2);
        assert_eq!(iter.read().unwrap(), fixed);
    }
}
