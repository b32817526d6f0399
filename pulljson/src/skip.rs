// SPDX-License-Identifier: Apache-2.0

use crate::parse_error::{ErrorKind, ParseError};
use crate::JsonIter;

/// Open containers during a skip, innermost last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

const fn in_number(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
}

impl JsonIter<'_> {
    /// Consumes exactly one value of any shape without building it.
    ///
    /// Nesting is tracked on a heap stack, so arbitrarily deep input costs
    /// memory rather than call stack.
    pub fn skip(&mut self) -> Result<(), ParseError> {
        let mut open: Vec<Container> = Vec::new();
        loop {
            match self.next_token()? {
                b'"' => self.skip_string_body()?,
                b'-' | b'0'..=b'9' => self.skip_number_run()?,
                b't' => self.skip_fixed_bytes(b"rue")?,
                b'f' => self.skip_fixed_bytes(b"alse")?,
                b'n' => self.skip_fixed_bytes(b"ull")?,
                b'[' => {
                    if self.next_token()? != b']' {
                        self.src.unread()?;
                        open.push(Container::Array);
                        continue;
                    }
                }
                b'{' => match self.next_token()? {
                    b'}' => {}
                    b'"' => {
                        self.skip_field_name()?;
                        open.push(Container::Object);
                        continue;
                    }
                    other => return Err(self.unexpected("'\"' or '}'", other)),
                },
                other => return Err(self.unexpected("a value", other)),
            }

            // A value just ended: close finished containers until one
            // expects another element.
            loop {
                let Some(&innermost) = open.last() else {
                    return Ok(());
                };
                match (self.next_token()?, innermost) {
                    (b',', Container::Array) => break,
                    (b',', Container::Object) => {
                        self.expect_token(b'"')?;
                        self.skip_field_name()?;
                        break;
                    }
                    (b']', Container::Array) | (b'}', Container::Object) => {
                        open.pop();
                    }
                    (other, Container::Array) => return Err(self.unexpected("',' or ']'", other)),
                    (other, Container::Object) => {
                        return Err(self.unexpected("',' or '}'", other))
                    }
                }
            }
        }
    }

    fn skip_field_name(&mut self) -> Result<(), ParseError> {
        self.skip_string_body()?;
        self.expect_token(b':')
    }

    /// Skips to past the closing quote; an escaped quote does not end the string.
    fn skip_string_body(&mut self) -> Result<(), ParseError> {
        loop {
            let available = self.src.available();
            match available.iter().position(|&b| b == b'"' || b == b'\\') {
                Some(run) => {
                    self.src.advance_by(run);
                    if self.string_byte()? == b'"' {
                        return Ok(());
                    }
                    self.string_byte()?;
                }
                None => {
                    let run = available.len();
                    self.src.advance_by(run);
                    if !self.src.refill()? {
                        return Err(self.error(ErrorKind::InvalidString, "unterminated string"));
                    }
                }
            }
        }
    }

    /// Consumes the maximal run of number characters after the first one.
    fn skip_number_run(&mut self) -> Result<(), ParseError> {
        loop {
            let available = self.src.available();
            let len = available.len();
            let run = available.iter().take_while(|&&b| in_number(b)).count();
            self.src.advance_by(run);
            if run < len || !self.src.refill()? {
                return Ok(());
            }
        }
    }
}
