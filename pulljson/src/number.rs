// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::parse_error::{ErrorKind, ParseError};
use crate::tokenizer::ValueType;
use crate::{JsonIter, Value};

/// Overflow threshold for one sign of one integer width.
///
/// Accumulating digit `d` into `m` stays within the limit iff
/// `m < max_prefix || (m == max_prefix && d <= max_last_digit)`.
#[derive(Debug, Clone, Copy)]
struct Threshold {
    max_prefix: u64,
    max_last_digit: u64,
}

impl Threshold {
    const fn of(limit: u64) -> Self {
        Self {
            max_prefix: limit / 10,
            max_last_digit: limit % 10,
        }
    }
}

/// Magnitude thresholds for a signed integer width. The negative side is
/// one larger, so the minimum value parses without a positive counterpart.
#[derive(Debug)]
struct IntWidth {
    name: &'static str,
    positive: Threshold,
    negative: Threshold,
}

const I32: IntWidth = IntWidth {
    name: "int",
    positive: Threshold::of(i32::MAX as u64),
    negative: Threshold::of(1 << 31),
};

const I64: IntWidth = IntWidth {
    name: "long",
    positive: Threshold::of(i64::MAX as u64),
    negative: Threshold::of(1 << 63),
};

/// A scanned numeric literal, held in the session's char buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NumberChars {
    pub len: usize,
    /// A fraction or exponent was present.
    pub dot_found: bool,
}

impl JsonIter<'_> {
    /// Reads a 32-bit signed integer.
    pub fn read_int(&mut self) -> Result<i32, ParseError> {
        let (negative, magnitude) = self.read_magnitude(&I32)?;
        // magnitude <= 2^31, exact in i64
        let value = magnitude as i64;
        Ok((if negative { -value } else { value }) as i32)
    }

    /// Reads a 64-bit signed integer.
    pub fn read_long(&mut self) -> Result<i64, ParseError> {
        let (negative, magnitude) = self.read_magnitude(&I64)?;
        // 2^63 casts to i64::MIN, which wrapping_neg leaves in place
        let value = magnitude as i64;
        Ok(if negative { value.wrapping_neg() } else { value })
    }

    /// Reads a 16-bit signed integer via the 32-bit path.
    pub fn read_short(&mut self) -> Result<i16, ParseError> {
        let value = self.read_int()?;
        i16::try_from(value)
            .map_err(|_| self.error(ErrorKind::ShortOverflow, format!("short overflow: {value}")))
    }

    /// Sign and magnitude of an integer literal, validated against `width`
    /// before every accumulation step.
    fn read_magnitude(&mut self, width: &IntWidth) -> Result<(bool, u64), ParseError> {
        let mut first = self.next_token()?;
        let negative = first == b'-';
        if negative {
            first = self.digit_after_sign()?;
        }
        if !first.is_ascii_digit() {
            return Err(self.unexpected("a number", first));
        }
        let threshold = if negative {
            width.negative
        } else {
            width.positive
        };

        let mut magnitude = u64::from(first - b'0');
        if magnitude != 0 {
            while let Some(next) = self.src.peek()? {
                if !next.is_ascii_digit() {
                    break;
                }
                let digit = u64::from(next - b'0');
                if magnitude > threshold.max_prefix
                    || (magnitude == threshold.max_prefix && digit > threshold.max_last_digit)
                {
                    return Err(self.error(
                        ErrorKind::NumberOverflow,
                        format!("value exceeds the {} range", width.name),
                    ));
                }
                magnitude = magnitude * 10 + digit;
                self.src.advance();
            }
        }

        match self.src.peek()? {
            Some(b'0'..=b'9') => Err(self.error(ErrorKind::InvalidNumber, "leading zero")),
            Some(b'.' | b'e' | b'E') => Err(self.error(
                ErrorKind::InvalidNumber,
                format!("expected an integer for {}, found a fraction or exponent", width.name),
            )),
            _ => Ok((negative, magnitude)),
        }
    }

    fn digit_after_sign(&mut self) -> Result<u8, ParseError> {
        match self.src.peek()? {
            Some(digit @ b'0'..=b'9') => {
                self.src.advance();
                Ok(digit)
            }
            _ => Err(self.error(ErrorKind::InvalidNumber, "bare sign")),
        }
    }

    /// Scans a complete number literal into `self.chars`, enforcing the JSON
    /// number grammar.
    pub(crate) fn scan_number(&mut self) -> Result<NumberChars, ParseError> {
        let mut first = self.next_token()?;
        self.chars.clear();
        if first == b'-' {
            self.chars.push(b'-');
            first = self.digit_after_sign()?;
        }
        match first {
            b'0' => {
                self.chars.push(b'0');
                if matches!(self.src.peek()?, Some(b'0'..=b'9')) {
                    return Err(self.error(ErrorKind::InvalidNumber, "leading zero"));
                }
            }
            b'1'..=b'9' => {
                self.chars.push(first);
                self.scan_digits()?;
            }
            other => return Err(self.unexpected("a number", other)),
        }

        let mut dot_found = false;
        if self.src.peek()? == Some(b'.') {
            self.src.advance();
            self.chars.push(b'.');
            dot_found = true;
            if self.scan_digits()? == 0 {
                return Err(self.error(ErrorKind::InvalidNumber, "expected digit after '.'"));
            }
        }
        if let Some(marker @ (b'e' | b'E')) = self.src.peek()? {
            self.src.advance();
            self.chars.push(marker);
            dot_found = true;
            if let Some(sign @ (b'+' | b'-')) = self.src.peek()? {
                self.src.advance();
                self.chars.push(sign);
            }
            if self.scan_digits()? == 0 {
                return Err(self.error(ErrorKind::InvalidNumber, "expected digit in exponent"));
            }
        }

        Ok(NumberChars {
            len: self.chars.len(),
            dot_found,
        })
    }

    /// Copies a run of digits into `self.chars`, across refills.
    fn scan_digits(&mut self) -> Result<usize, ParseError> {
        let mut count = 0;
        loop {
            let available = self.src.available();
            let len = available.len();
            let run = available.iter().take_while(|b| b.is_ascii_digit()).count();
            self.chars.extend_from_slice(&available[..run]);
            self.src.advance_by(run);
            count += run;
            if run < len || !self.src.refill()? {
                return Ok(count);
            }
        }
    }

    fn chars_as<T: FromStr>(&self) -> Option<T> {
        std::str::from_utf8(&self.chars).ok()?.parse().ok()
    }

    fn parse_chars<T: FromStr>(&self) -> Result<T, ParseError> {
        self.chars_as().ok_or_else(|| {
            self.error(
                ErrorKind::InvalidNumber,
                format!("cannot convert {:?}", String::from_utf8_lossy(&self.chars)),
            )
        })
    }

    /// Reads a number as `f32`, rounding once from the decimal literal.
    pub fn read_float(&mut self) -> Result<f32, ParseError> {
        self.scan_number()?;
        let value: f32 = self.parse_chars()?;
        if value.is_infinite() {
            return Err(self.error(ErrorKind::NumberOverflow, "value exceeds the float range"));
        }
        Ok(value)
    }

    /// Reads a number as `f64`.
    pub fn read_double(&mut self) -> Result<f64, ParseError> {
        self.scan_number()?;
        self.finite_double()
    }

    fn finite_double(&self) -> Result<f64, ParseError> {
        let value: f64 = self.parse_chars()?;
        if value.is_infinite() {
            return Err(self.error(ErrorKind::NumberOverflow, "value exceeds the double range"));
        }
        Ok(value)
    }

    /// Returns the validated text of the next number literal.
    pub fn read_number_as_string(&mut self) -> Result<String, ParseError> {
        let chars = self.scan_number()?;
        Ok(String::from_utf8_lossy(&self.chars[..chars.len]).into_owned())
    }

    /// Reads an arbitrary-precision integer, or `None` for `null`.
    pub fn read_big_integer(&mut self) -> Result<Option<BigInt>, ParseError> {
        if !self.number_or_null()? {
            return Ok(None);
        }
        if self.scan_number()?.dot_found {
            return Err(self.error(
                ErrorKind::InvalidNumber,
                "expected an integer, found a fraction or exponent",
            ));
        }
        self.parse_chars().map(Some)
    }

    /// Reads an arbitrary-precision decimal, or `None` for `null`.
    pub fn read_big_decimal(&mut self) -> Result<Option<BigDecimal>, ParseError> {
        if !self.number_or_null()? {
            return Ok(None);
        }
        self.scan_number()?;
        self.parse_chars::<BigDecimal>().map(Some)
    }

    /// True when a number follows; consumes a `null` and returns false.
    fn number_or_null(&mut self) -> Result<bool, ParseError> {
        match self.what_is_next()? {
            ValueType::Number => Ok(true),
            ValueType::Null => {
                self.read_null()?;
                Ok(false)
            }
            _ => {
                let found = self.next_token()?;
                Err(self.unexpected("a number or null", found))
            }
        }
    }

    /// Reads a number with the dynamic widening rule: integral literals
    /// become `Int` when they fit 32 bits, `Long` when they fit 64, and
    /// `Double` otherwise.
    pub(crate) fn read_number_value(&mut self) -> Result<Value, ParseError> {
        let chars = self.scan_number()?;
        if !chars.dot_found {
            if let Some(value) = self.chars_as::<i64>() {
                return Ok(i32::try_from(value).map_or(Value::Long(value), Value::Int));
            }
        }
        self.finite_double().map(Value::Double)
    }

    /// Like `read_number_value` but with a single 64-bit integer variant.
    pub(crate) fn read_number_any(&mut self) -> Result<Result<i64, f64>, ParseError> {
        let chars = self.scan_number()?;
        if !chars.dot_found {
            if let Some(value) = self.chars_as::<i64>() {
                return Ok(Ok(value));
            }
        }
        self.finite_double().map(Err)
    }
}
