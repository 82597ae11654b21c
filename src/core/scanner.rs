//! Streaming byte scanner
//!
//! Sits between the buffered input and the tokenizer. Uses memchr for
//! delimiter searches inside the buffered window and keeps the
//! byte/line/column position of the next unread byte.

use memchr::{memchr, memchr3, memchr_iter, memrchr};
use std::io::Read;

use super::error::{Position, Result, XmlError};
use super::unicode::{is_name_char, is_name_start_char, is_whitespace};
use crate::reader::buffered::BufferedReader;

/// Scanner over a forward-only byte stream
pub struct Scanner<R: Read> {
    input: BufferedReader<R>,
    position: Position,
}

impl<R: Read> Scanner<R> {
    /// Create a new scanner with the given initial window size
    pub fn new(reader: R, capacity: usize) -> Self {
        Scanner {
            input: BufferedReader::with_capacity(reader, capacity),
            position: Position::start(),
        }
    }

    /// Position of the next unread byte
    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    /// Buffer at least `n` bytes if the input has them
    fn fill(&mut self, n: usize) -> Result<usize> {
        let position = self.position;
        self.input
            .ensure(n)
            .map_err(|e| XmlError::io(&e, position))
    }

    /// Peek at current byte without advancing
    pub fn peek(&mut self) -> Result<Option<u8>> {
        self.peek_at(0)
    }

    /// Peek at byte at offset from current position
    pub fn peek_at(&mut self, offset: usize) -> Result<Option<u8>> {
        self.fill(offset + 1)?;
        Ok(self.input.buffered().get(offset).copied())
    }

    /// Check if input starts with a byte sequence at current position
    pub fn starts_with(&mut self, needle: &[u8]) -> Result<bool> {
        self.fill(needle.len())?;
        Ok(self.input.buffered().starts_with(needle))
    }

    /// Consume `n` buffered bytes, updating line and column
    pub fn advance(&mut self, n: usize) {
        let consumed = &self.input.buffered()[..n.min(self.input.buffered().len())];
        self.position.byte += consumed.len();
        match memrchr(b'\n', consumed) {
            Some(last) => {
                self.position.line += memchr_iter(b'\n', consumed).count();
                self.position.column = 1 + count_chars(&consumed[last + 1..]);
            }
            None => self.position.column += count_chars(consumed),
        }
        let len = consumed.len();
        self.input.consume(len);
    }

    /// Skip whitespace characters (space, tab, newline, carriage return).
    /// Returns whether anything was skipped.
    pub fn skip_whitespace(&mut self) -> Result<bool> {
        let mut skipped = false;
        loop {
            if self.fill(1)? == 0 {
                return Ok(skipped);
            }
            let count = self
                .input
                .buffered()
                .iter()
                .take_while(|&&b| is_whitespace(b))
                .count();
            if count == 0 {
                return Ok(skipped);
            }
            let exhausted = count == self.input.buffered().len();
            self.advance(count);
            skipped = true;
            if !exhausted {
                return Ok(true);
            }
        }
    }

    /// Decode the character at the current position without consuming it.
    /// Returns the character and its encoded width.
    pub fn peek_char(&mut self) -> Result<Option<(char, usize)>> {
        let Some(lead) = self.peek()? else {
            return Ok(None);
        };
        let width = match lead {
            0x00..=0x7F => return Ok(Some((lead as char, 1))),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => {
                return Err(XmlError::encoding(
                    format!("invalid UTF-8 lead byte 0x{lead:02X}"),
                    self.position,
                ))
            }
        };
        if self.fill(width)? < width {
            return Err(XmlError::encoding(
                "truncated UTF-8 sequence at end of input",
                self.position,
            ));
        }
        match std::str::from_utf8(&self.input.buffered()[..width]) {
            Ok(s) => Ok(s.chars().next().map(|c| (c, width))),
            Err(_) => Err(XmlError::encoding("invalid UTF-8 sequence", self.position)),
        }
    }

    /// Read an XML name. Returns `None` without consuming anything when the
    /// next character cannot start a name.
    pub fn read_name(&mut self) -> Result<Option<String>> {
        match self.peek_char()? {
            Some((c, _)) if is_name_start_char(c) => {}
            _ => return Ok(None),
        }

        let mut name = String::new();
        while let Some((c, width)) = self.peek_char()? {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.advance(width);
        }
        Ok(Some(name))
    }

    /// Read character data up to (not including) the next `<`, `&` or `]`,
    /// or to the end of input.
    pub fn read_text_run(&mut self) -> Result<String> {
        let mut text = String::new();
        loop {
            let available = self.fill(1)?;
            if available == 0 {
                return Ok(text);
            }
            let buf = self.input.buffered();
            let (end, found) = match memchr3(b'<', b'&', b']', buf) {
                Some(i) => (i, true),
                None => (buf.len(), false),
            };

            let take = match std::str::from_utf8(&buf[..end]) {
                Ok(s) => {
                    text.push_str(s);
                    end
                }
                // Multi-byte character split by the window edge
                Err(e) if e.error_len().is_none() && !found => {
                    let valid = e.valid_up_to();
                    if valid == 0 {
                        if self.fill(available + 1)? == available {
                            return Err(XmlError::encoding(
                                "truncated UTF-8 sequence at end of input",
                                self.position,
                            ));
                        }
                        continue;
                    }
                    // valid_up_to guarantees a char boundary
                    text.push_str(std::str::from_utf8(&buf[..valid]).unwrap_or_default());
                    valid
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.advance(valid);
                    return Err(XmlError::encoding("invalid UTF-8 sequence", self.position));
                }
            };

            self.advance(take);
            if found {
                return Ok(text);
            }
        }
    }

    /// Read everything up to `delimiter`, consuming the delimiter as well.
    /// Returns `None` if the input ends first (all remaining input is then
    /// consumed).
    pub fn read_until(&mut self, delimiter: &[u8]) -> Result<Option<String>> {
        let start = self.position;
        let mut bytes = Vec::new();

        loop {
            if self.fill(delimiter.len())? < delimiter.len() {
                let rest = self.input.buffered().len();
                self.advance(rest);
                return Ok(None);
            }
            let buf = self.input.buffered();
            match memchr(delimiter[0], buf) {
                Some(i) if buf[i..].starts_with(delimiter) => {
                    bytes.extend_from_slice(&buf[..i]);
                    self.advance(i + delimiter.len());
                    break;
                }
                Some(i) if buf.len() - i >= delimiter.len() => {
                    bytes.extend_from_slice(&buf[..=i]);
                    self.advance(i + 1);
                }
                // Possible delimiter cut by the window edge: refill from here
                Some(i) => {
                    bytes.extend_from_slice(&buf[..i]);
                    self.advance(i);
                }
                None => {
                    let len = buf.len();
                    bytes.extend_from_slice(buf);
                    self.advance(len);
                }
            }
        }

        String::from_utf8(bytes).map(Some).map_err(|e| {
            let offset = e.utf8_error().valid_up_to();
            XmlError::encoding(
                "invalid UTF-8 sequence",
                Position {
                    byte: start.byte + offset,
                    ..start
                },
            )
        })
    }
}

/// Count UTF-8 encoded characters (non-continuation bytes)
#[inline]
fn count_chars(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b & 0xC0 != 0x80).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(input: &[u8]) -> Scanner<&[u8]> {
        Scanner::new(input, 4)
    }

    #[test]
    fn test_read_name() {
        let mut scanner = scanner(b"element-name>");
        assert_eq!(scanner.read_name().unwrap().as_deref(), Some("element-name"));
        assert_eq!(scanner.position().byte, 12);
        assert_eq!(scanner.peek().unwrap(), Some(b'>'));
    }

    #[test]
    fn test_read_name_rejects_digit_start() {
        let mut scanner = scanner(b"1abc");
        assert_eq!(scanner.read_name().unwrap(), None);
        assert_eq!(scanner.position().byte, 0);
    }

    #[test]
    fn test_unicode_name_across_window() {
        let mut scanner = scanner("名前 ".as_bytes());
        assert_eq!(scanner.read_name().unwrap().as_deref(), Some("名前"));
        assert_eq!(scanner.position().column, 3);
    }

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = scanner(b"  \t\n\n  hello");
        assert!(scanner.skip_whitespace().unwrap());
        let pos = scanner.position();
        assert_eq!(pos.byte, 7);
        assert_eq!(pos.line, 3);
        assert_eq!(pos.column, 3);
    }

    #[test]
    fn test_text_run_stops_at_markup() {
        let mut scanner = scanner("héllo wörld<a>".as_bytes());
        assert_eq!(scanner.read_text_run().unwrap(), "héllo wörld");
        assert_eq!(scanner.peek().unwrap(), Some(b'<'));
        assert_eq!(scanner.position().column, 12);
    }

    #[test]
    fn test_text_run_invalid_utf8() {
        let mut scanner = scanner(b"ab\xFFcd");
        let err = scanner.read_text_run().unwrap_err();
        assert_eq!(err.kind.name(), "encoding_error");
        assert_eq!(err.position.byte, 2);
    }

    #[test]
    fn test_read_until_delimiter_across_window() {
        let mut scanner = scanner(b" a comment - with dashes -->rest");
        assert_eq!(
            scanner.read_until(b"-->").unwrap().as_deref(),
            Some(" a comment - with dashes ")
        );
        assert!(scanner.starts_with(b"rest").unwrap());
    }

    #[test]
    fn test_read_until_eof() {
        let mut scanner = scanner(b"never closed");
        assert_eq!(scanner.read_until(b"]]>").unwrap(), None);
        assert_eq!(scanner.peek().unwrap(), None);
    }
}
