// SPDX-License-Identifier: Apache-2.0

//! Per-type decoding on top of the pull API.
//!
//! [`Decode`] is the contract a generated or hand-written binding implements:
//! read exactly one value from the session and build `Self`. The impls here
//! cover the primitive and standard container types, so bindings compose.
//!
//! ```
//! use pulljson::{Decode, JsonIter, ParseError};
//!
//! #[derive(Debug, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Decode for Point {
//!     fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
//!         let mut point = Point { x: 0, y: 0 };
//!         while let Some(field) = iter.read_object()? {
//!             match field.as_str() {
//!                 "x" => point.x = iter.read_int()?,
//!                 "y" => point.y = iter.read_int()?,
//!                 _ => iter.skip()?,
//!             }
//!         }
//!         Ok(point)
//!     }
//! }
//!
//! let points: Vec<Point> = pulljson::deserialize_as(r#"[{"x": 1, "y": 2}]"#)?;
//! assert_eq!(points, [Point { x: 1, y: 2 }]);
//! # Ok::<(), ParseError>(())
//! ```

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::parse_error::{ErrorKind, ParseError};
use crate::{Any, JsonIter, Value};

/// Builds `Self` from the next value of a session.
pub trait Decode: Sized {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError>;
}

impl JsonIter<'_> {
    /// Decodes the next value as `T`.
    pub fn read_as<T: Decode>(&mut self) -> Result<T, ParseError> {
        T::decode(self)
    }
}

impl Decode for bool {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read_boolean()
    }
}

impl Decode for i16 {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read_short()
    }
}

impl Decode for i32 {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read_int()
    }
}

impl Decode for i64 {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read_long()
    }
}

macro_rules! decode_narrowed {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
                    let value = iter.read_long()?;
                    <$ty>::try_from(value).map_err(|_| {
                        iter.error(
                            ErrorKind::NumberOverflow,
                            format!("{value} is out of range for {}", stringify!($ty)),
                        )
                    })
                }
            }
        )*
    };
}

decode_narrowed!(i8, u8, u16, u32);

impl Decode for f32 {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read_float()
    }
}

impl Decode for f64 {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read_double()
    }
}

impl Decode for String {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        Ok(iter.read_str()?.as_str().to_owned())
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        if iter.read_null()? {
            return Ok(None);
        }
        T::decode(iter).map(Some)
    }
}

/// `null` decodes as an empty vector.
impl<T: Decode> Decode for Vec<T> {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        let mut items = Vec::new();
        while iter.read_array()? {
            items.push(T::decode(iter)?);
        }
        Ok(items)
    }
}

/// `null` decodes as an empty map.
impl<T: Decode> Decode for IndexMap<String, T> {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        let mut fields = IndexMap::new();
        while let Some(name) = iter.read_object()? {
            let value = T::decode(iter)?;
            fields.insert(name, value);
        }
        Ok(fields)
    }
}

impl Decode for Value {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read()
    }
}

impl Decode for Any {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        iter.read_any()
    }
}

impl Decode for BigInt {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        match iter.read_big_integer()? {
            Some(value) => Ok(value),
            None => Err(iter.error(ErrorKind::UnexpectedToken, "expected a number, found null")),
        }
    }
}

impl Decode for BigDecimal {
    fn decode(iter: &mut JsonIter<'_>) -> Result<Self, ParseError> {
        match iter.read_big_decimal()? {
            Some(value) => Ok(value),
            None => Err(iter.error(ErrorKind::UnexpectedToken, "expected a number, found null")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_primitives() {
        let mut iter = JsonIter::from_text(r#"[true, -5, 70000, 1.5, "s"]"#);
        assert!(iter.read_array().unwrap());
        assert!(iter.read_as::<bool>().unwrap());
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_as::<i8>().unwrap(), -5);
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_as::<u32>().unwrap(), 70000);
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_as::<f64>().unwrap(), 1.5);
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_as::<String>().unwrap(), "s");
    }

    #[test]
    fn test_narrowing_overflow() {
        let mut iter = JsonIter::from_text("300");
        let err = iter.read_as::<u8>().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NumberOverflow));
        let mut iter = JsonIter::from_text("-129");
        let err = iter.read_as::<i8>().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NumberOverflow));
        let mut iter = JsonIter::from_text("-1");
        let err = iter.read_as::<u16>().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NumberOverflow));
        let mut iter = JsonIter::from_text("40000");
        let err = iter.read_as::<i16>().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ShortOverflow));
    }

    #[test]
    fn test_containers() {
        let mut iter = JsonIter::from_text(r#"{"a": [1, null, 3], "b": null}"#);
        let map = iter.read_as::<IndexMap<String, Vec<Option<i32>>>>().unwrap();
        assert_eq!(map["a"], [Some(1), None, Some(3)]);
        assert!(map["b"].is_empty());
    }

    #[test]
    fn test_big_numbers() {
        let mut iter = JsonIter::from_text("[18446744073709551616, 0.1]");
        assert!(iter.read_array().unwrap());
        let int = iter.read_as::<BigInt>().unwrap();
        assert!(iter.read_array().unwrap());
        let dec = iter.read_as::<BigDecimal>().unwrap();
        assert_eq!(int.to_string(), "18446744073709551616");
        assert_eq!(dec.to_string(), "0.1");

        let mut iter = JsonIter::from_text("null");
        let err = iter.read_as::<BigInt>().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedToken));
    }
}
