// SPDX-License-Identifier: Apache-2.0

use crate::config::DecodingMode;
use crate::parse_error::{ErrorKind, ParseError};
use crate::JsonIter;

/// Kind of the next JSON value, derived from its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    /// The byte cannot start any JSON value.
    Invalid,
}

static VALUE_TYPES: [ValueType; 256] = build_value_types();

const fn build_value_types() -> [ValueType; 256] {
    let mut table = [ValueType::Invalid; 256];
    table[b'"' as usize] = ValueType::String;
    table[b'-' as usize] = ValueType::Number;
    let mut digit = b'0';
    while digit <= b'9' {
        table[digit as usize] = ValueType::Number;
        digit += 1;
    }
    table[b't' as usize] = ValueType::Boolean;
    table[b'f' as usize] = ValueType::Boolean;
    table[b'n' as usize] = ValueType::Null;
    table[b'[' as usize] = ValueType::Array;
    table[b'{' as usize] = ValueType::Object;
    table
}

impl ValueType {
    /// Classifies a value by its first significant byte.
    pub fn of(first: u8) -> Self {
        VALUE_TYPES[first as usize]
    }
}

pub(crate) const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

impl JsonIter<'_> {
    /// Consumes whitespace and returns the next significant byte.
    pub(crate) fn next_token(&mut self) -> Result<u8, ParseError> {
        loop {
            let available = self.src.available();
            match available.iter().position(|&b| !is_whitespace(b)) {
                Some(skipped) => {
                    let byte = available[skipped];
                    self.src.advance_by(skipped);
                    self.src.advance();
                    return Ok(byte);
                }
                None => {
                    let skipped = available.len();
                    self.src.advance_by(skipped);
                    if !self.src.refill()? {
                        return Err(self.error(
                            ErrorKind::PrematureEnd,
                            "expected a token, found end of input",
                        ));
                    }
                }
            }
        }
    }

    /// Consumes the next token and fails unless it is `expected`.
    pub(crate) fn expect_token(&mut self, expected: u8) -> Result<(), ParseError> {
        let found = self.next_token()?;
        if found != expected {
            return Err(self.unexpected(&format!("{:?}", expected as char), found));
        }
        Ok(())
    }

    /// Consumes the rest of a literal whose first byte the caller matched.
    ///
    /// In [`DecodingMode::Trusting`] only the byte count is honoured; in
    /// [`DecodingMode::Strict`] each byte must equal `rest`.
    pub(crate) fn skip_fixed_bytes(&mut self, rest: &[u8]) -> Result<(), ParseError> {
        let strict = self.config.mode == DecodingMode::Strict;
        for &expected in rest {
            let found = self.src.read_byte()?;
            if strict && found != expected {
                return Err(self.unexpected(&format!("{:?}", expected as char), found));
            }
        }
        Ok(())
    }

    /// Peeks at the kind of the next value without consuming it.
    pub fn what_is_next(&mut self) -> Result<ValueType, ParseError> {
        let first = self.next_token()?;
        self.src.unread()?;
        Ok(ValueType::of(first))
    }

    /// Consumes `null` and returns true, or leaves the input untouched and
    /// returns false if the next value is something else.
    pub fn read_null(&mut self) -> Result<bool, ParseError> {
        if self.next_token()? != b'n' {
            self.src.unread()?;
            return Ok(false);
        }
        self.skip_fixed_bytes(b"ull")?;
        Ok(true)
    }

    /// Reads `true` or `false`.
    pub fn read_boolean(&mut self) -> Result<bool, ParseError> {
        match self.next_token()? {
            b't' => {
                self.skip_fixed_bytes(b"rue")?;
                Ok(true)
            }
            b'f' => {
                self.skip_fixed_bytes(b"alse")?;
                Ok(false)
            }
            other => Err(self.unexpected("'t' or 'f'", other)),
        }
    }
}
