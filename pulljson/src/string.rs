// SPDX-License-Identifier: Apache-2.0

use core::fmt;
use core::ops::Deref;

use crate::parse_error::{ErrorKind, ParseError};
use crate::JsonIter;

/// A decoded JSON string that borrows the session.
///
/// `Borrowed` points straight into the input window: the string had no
/// escapes and nothing was copied. `Unescaped` points into the session's
/// scratch buffer. Either way the value lives until the next read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStr<'s> {
    Borrowed(&'s str),
    Unescaped(&'s str),
}

impl<'s> JsonStr<'s> {
    pub fn as_str(&self) -> &'s str {
        match *self {
            JsonStr::Borrowed(text) | JsonStr::Unescaped(text) => text,
        }
    }

    /// True when the text was served from the input without copying.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, JsonStr::Borrowed(_))
    }
}

impl Deref for JsonStr<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for JsonStr<'_> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for JsonStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for JsonStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Where the escape-free scan of a string body stopped, as window indices.
enum Scan {
    /// Closing quote found; the body is `start..end`.
    Closed(usize, usize),
    /// A backslash at `end`; `start..end` is the plain prefix.
    Escaped(usize, usize),
}

const fn stops_scan(byte: u8) -> bool {
    byte == b'"' || byte == b'\\' || byte < 0x20
}

impl JsonIter<'_> {
    /// Reads a quoted string, consuming the opening quote.
    pub fn read_str(&mut self) -> Result<JsonStr<'_>, ParseError> {
        self.expect_token(b'"')?;
        self.read_str_after_quote()
    }

    /// Reads a string body and its closing quote. The opening quote must
    /// already be consumed.
    pub fn read_str_after_quote(&mut self) -> Result<JsonStr<'_>, ParseError> {
        match self.scan_plain()? {
            Scan::Closed(start, end) => self.window_str(start, end).map(JsonStr::Borrowed),
            Scan::Escaped(start, end) => {
                self.chars.clear();
                let prefix = self.src.bytes().get(start..end).unwrap_or_default();
                self.chars.extend_from_slice(prefix);
                self.unescape_rest()?;
                match std::str::from_utf8(&self.chars) {
                    Ok(text) => Ok(JsonStr::Unescaped(text)),
                    Err(_) => Err(self.error(ErrorKind::InvalidString, "invalid UTF-8 in string")),
                }
            }
        }
    }

    /// Reads an owned string, or `None` for `null`.
    pub fn read_string(&mut self) -> Result<Option<String>, ParseError> {
        match self.next_token()? {
            b'"' => self
                .read_str_after_quote()
                .map(|text| Some(text.as_str().to_owned())),
            b'n' => {
                self.skip_fixed_bytes(b"ull")?;
                Ok(None)
            }
            other => Err(self.unexpected("a string or null", other)),
        }
    }

    /// Returns the raw bytes between the quotes of an escape-free string.
    pub fn read_slice(&mut self) -> Result<&[u8], ParseError> {
        self.expect_token(b'"')?;
        match self.scan_plain()? {
            Scan::Closed(start, end) => Ok(self.src.bytes().get(start..end).unwrap_or_default()),
            Scan::Escaped(..) => Err(self.error(
                ErrorKind::InvalidString,
                "slice does not support escape char",
            )),
        }
    }

    fn window_str(&self, start: usize, end: usize) -> Result<&str, ParseError> {
        let bytes = self.src.bytes().get(start..end).unwrap_or_default();
        std::str::from_utf8(bytes)
            .map_err(|_| self.error(ErrorKind::InvalidString, "invalid UTF-8 in string"))
    }

    /// Scans to the closing quote or the first backslash. The body is held
    /// under `mark` so it stays contiguous across refills.
    fn scan_plain(&mut self) -> Result<Scan, ParseError> {
        self.src.mark = Some(self.src.head);
        let scan = self.scan_marked();
        self.src.mark = None;
        scan
    }

    fn scan_marked(&mut self) -> Result<Scan, ParseError> {
        loop {
            let available = self.src.available();
            match available.iter().position(|&b| stops_scan(b)) {
                Some(run) => {
                    let byte = available[run];
                    self.src.advance_by(run);
                    let end = self.src.head;
                    let start = self.src.mark.unwrap_or(end);
                    match byte {
                        b'"' => {
                            self.src.advance();
                            return Ok(Scan::Closed(start, end));
                        }
                        b'\\' => return Ok(Scan::Escaped(start, end)),
                        _ => {
                            return Err(
                                self.error(ErrorKind::InvalidString, "control character in string")
                            )
                        }
                    }
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

    /// Copies and decodes the rest of a string into `self.chars`, starting
    /// at a backslash and ending past the closing quote.
    fn unescape_rest(&mut self) -> Result<(), ParseError> {
        loop {
            let available = self.src.available();
            let stop = available.iter().position(|&b| stops_scan(b));
            let run = stop.unwrap_or(available.len());
            self.chars.extend_from_slice(&available[..run]);
            self.src.advance_by(run);
            if stop.is_none() {
                if !self.src.refill()? {
                    return Err(self.error(ErrorKind::InvalidString, "unterminated string"));
                }
                continue;
            }
            match self.string_byte()? {
                b'"' => return Ok(()),
                b'\\' => self.unescape()?,
                _ => {
                    return Err(self.error(ErrorKind::InvalidString, "control character in string"))
                }
            }
        }
    }

    /// Consumes a byte inside a string body; end of input is unterminated.
    pub(crate) fn string_byte(&mut self) -> Result<u8, ParseError> {
        match self.src.peek()? {
            Some(byte) => {
                self.src.advance();
                Ok(byte)
            }
            None => Err(self.error(ErrorKind::InvalidString, "unterminated string")),
        }
    }

    /// Decodes one escape sequence, the backslash already consumed.
    fn unescape(&mut self) -> Result<(), ParseError> {
        let unescaped = match self.string_byte()? {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let decoded = self.read_code_point()?;
                let mut utf8 = [0u8; 4];
                self.chars
                    .extend_from_slice(decoded.encode_utf8(&mut utf8).as_bytes());
                return Ok(());
            }
            other => {
                return Err(self.error(
                    ErrorKind::InvalidString,
                    format!("invalid escape '\\{}'", other as char),
                ))
            }
        };
        self.chars.push(unescaped);
        Ok(())
    }

    /// Decodes the hex digits of a `\u` escape, joining a surrogate pair
    /// into one code point.
    fn read_code_point(&mut self) -> Result<char, ParseError> {
        let high = self.read_hex4()?;
        let code = match high {
            0xD800..=0xDBFF => {
                if self.string_byte()? != b'\\' || self.string_byte()? != b'u' {
                    return Err(self.error(ErrorKind::InvalidString, "unpaired high surrogate"));
                }
                let low = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.error(ErrorKind::InvalidString, "unpaired high surrogate"));
                }
                0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(self.error(ErrorKind::InvalidString, "unpaired low surrogate"))
            }
            _ => u32::from(high),
        };
        char::from_u32(code)
            .ok_or_else(|| self.error(ErrorKind::InvalidString, "invalid code point"))
    }

    fn read_hex4(&mut self) -> Result<u16, ParseError> {
        let mut value = 0u16;
        for _ in 0..4 {
            let byte = self.string_byte()?;
            let digit = (byte as char).to_digit(16).ok_or_else(|| {
                self.error(ErrorKind::InvalidString, "invalid hex digit in \\u escape")
            })?;
            value = (value << 4) | digit as u16;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkReader;
    use test_log::test;

    #[test]
    fn test_plain_string_is_borrowed() {
        let input = br#"  "hello world" "#;
        let mut iter = JsonIter::new(input);
        let text = iter.read_str().unwrap();
        assert!(text.is_borrowed());
        assert_eq!(text, "hello world");
        // points into the caller's bytes
        assert_eq!(text.as_ptr(), input[3..].as_ptr());
    }

    #[test]
    fn test_simple_escapes() {
        let mut iter = JsonIter::new(br#""a\"b\\c\/d\be\ff\ng\rh\ti""#);
        let text = iter.read_str().unwrap();
        assert!(!text.is_borrowed());
        assert_eq!(text, "a\"b\\c/d\u{8}e\u{c}f\ng\rh\ti");
    }

    #[test]
    fn test_unicode_escapes() {
        let mut iter = JsonIter::new(br#""\u0041\u00e9\u4E2D""#);
        assert_eq!(iter.read_str().unwrap(), "A\u{e9}\u{4e2d}");
    }

    #[test]
    fn test_surrogate_pair_forms_one_code_point() {
        let mut iter = JsonIter::new(br#""x\uD83D\uDE00y""#);
        assert_eq!(iter.read_str().unwrap(), "x\u{1F600}y");
    }

    #[test]
    fn test_lone_surrogates_rejected() {
        for input in [
            &br#""\uD83D""#[..],
            br#""\uD83Dx""#,
            br#""\uD83DA""#,
            br#""\uDE00""#,
        ] {
            let mut iter = JsonIter::new(input);
            let err = iter.read_str().unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::InvalidString));
        }
    }

    #[test]
    fn test_invalid_escapes_rejected() {
        for input in [&br#""\x""#[..], br#""\u12G4""#, br#""\u12""#] {
            let mut iter = JsonIter::new(input);
            let err = iter.read_str().unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::InvalidString));
        }
    }

    #[test]
    fn test_unterminated_string() {
        for input in [&b"\"abc"[..], b"\"ab\\n", b"\"ab\\"] {
            let mut iter = JsonIter::new(input);
            let err = iter.read_str().unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::InvalidString));
        }
    }

    #[test]
    fn test_control_character_rejected() {
        let mut iter = JsonIter::new(b"\"a\nb\"");
        let err = iter.read_str().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidString));
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut iter = JsonIter::new(b"\"\xff\xfe\"");
        let err = iter.read_str().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidString));
    }

    #[test]
    fn test_read_string_null() {
        let mut iter = JsonIter::new(br#"[null, "x", 1]"#);
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_string().unwrap(), None);
        assert!(iter.read_array().unwrap());
        assert_eq!(iter.read_string().unwrap().as_deref(), Some("x"));
        assert!(iter.read_array().unwrap());
        let err = iter.read_string().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedToken));
    }

    #[test]
    fn test_read_slice() {
        let mut iter = JsonIter::new(br#""raw\u0041" "plain""#);
        let err = iter.read_slice().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidString));

        let mut iter = JsonIter::new(br#" "plain" "#);
        assert_eq!(iter.read_slice().unwrap(), b"plain");
    }

    #[test]
    fn test_stream_string_spans_refills() {
        let long = "a".repeat(100);
        let json = format!("\"{long}\"");
        let mut iter = JsonIter::from_reader(ChunkReader::new(json.as_bytes(), 3), 4);
        let text = iter.read_str().unwrap();
        assert!(text.is_borrowed());
        assert_eq!(text, long.as_str());
    }

    #[test]
    fn test_stream_escape_spans_refills() {
        let json = br#""ab\uD83D\uDE00cd\n""#;
        let mut iter = JsonIter::from_reader(ChunkReader::new(json, 1), 2);
        assert_eq!(iter.read_str().unwrap(), "ab\u{1F600}cd\n");
    }

    #[test]
    fn test_read_str_after_quote() {
        let mut iter = JsonIter::new(br#"abc" 1"#);
        assert_eq!(iter.read_str_after_quote().unwrap(), "abc");
        assert_eq!(iter.read_int().unwrap(), 1);
    }
}
