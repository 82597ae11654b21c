//! XML Encoding Detection and Conversion
//!
//! Handles detection of UTF-16 and Latin-1 input based on BOM and XML
//! declaration, once, before tokenizing starts. Everything downstream
//! of [`DecodedInput`] sees UTF-8.

use std::io::{self, Read};
use tracing::debug;

use super::attributes::parse_pseudo_attributes;
use super::error::{Position, Result, XmlError};

/// How far into the stream the XML declaration is looked for
const DECLARATION_SNIFF_LIMIT: usize = 1024;

/// Raw bytes decoded per refill for transcoded input
const TRANSCODE_CHUNK: usize = 4096;

/// Detect the encoding of XML input based on BOM or byte patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return XmlEncoding::Utf8;
        }

        match (input[0], input[1]) {
            // UTF-16 LE BOM: 0xFF 0xFE
            (0xFF, 0xFE) => XmlEncoding::Utf16Le,
            // UTF-16 BE BOM: 0xFE 0xFF
            (0xFE, 0xFF) => XmlEncoding::Utf16Be,
            // No BOM - check for UTF-16 pattern (< followed by null or null followed by <)
            (0x00, b'<') => XmlEncoding::Utf16Be,
            (b'<', 0x00) => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }

    /// Map an `encoding=` label from the XML declaration
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "us-ascii" | "ascii" => Some(XmlEncoding::Utf8),
            "utf-16" | "utf-16le" | "utf-16be" => Some(XmlEncoding::Utf16Le),
            "iso-8859-1" | "iso_8859-1" | "latin1" | "l1" => Some(XmlEncoding::Latin1),
            _ => None,
        }
    }

    fn bom_len(self, prefix: &[u8]) -> usize {
        match self {
            XmlEncoding::Utf8 if prefix.starts_with(&[0xEF, 0xBB, 0xBF]) => 3,
            XmlEncoding::Utf16Le if prefix.starts_with(&[0xFF, 0xFE]) => 2,
            XmlEncoding::Utf16Be if prefix.starts_with(&[0xFE, 0xFF]) => 2,
            _ => 0,
        }
    }
}

/// A reader that yields the input as UTF-8, whatever it was encoded in
pub struct DecodedInput<R: Read> {
    inner: R,
    encoding: XmlEncoding,
    /// Sniffed bytes not yet handed out (UTF-8) or decoded (others)
    prefix: Vec<u8>,
    prefix_pos: usize,
    /// Transcoded output not yet handed out
    out: Vec<u8>,
    out_pos: usize,
    /// Odd trailing byte of a UTF-16 chunk
    carry: Option<u8>,
    /// High surrogate waiting for its pair
    high_surrogate: Option<u16>,
    eof: bool,
}

impl<R: Read> DecodedInput<R> {
    /// Inspect the start of `inner` and set up decoding
    pub fn sniff(mut inner: R) -> Result<Self> {
        let mut prefix = Vec::with_capacity(64);
        // Enough for a BOM plus "<?xml"
        read_prefix(&mut inner, &mut prefix, 5)?;

        let mut encoding = XmlEncoding::detect(&prefix);
        let bom = encoding.bom_len(&prefix);
        prefix.drain(..bom);
        if encoding == XmlEncoding::Utf8 && bom > 0 {
            read_prefix(&mut inner, &mut prefix, 5)?;
        }

        if encoding == XmlEncoding::Utf8 && prefix.starts_with(b"<?xml") {
            read_declaration(&mut inner, &mut prefix)?;
            if let Some(label) = declared_encoding(&prefix) {
                encoding = match XmlEncoding::from_label(&label) {
                    Some(XmlEncoding::Utf8) => XmlEncoding::Utf8,
                    Some(XmlEncoding::Latin1) => XmlEncoding::Latin1,
                    Some(_) => {
                        return Err(XmlError::encoding(
                            format!("document declares '{label}' but is not UTF-16 encoded"),
                            Position::start(),
                        ))
                    }
                    None => {
                        return Err(XmlError::encoding(
                            format!("unsupported encoding '{label}'"),
                            Position::start(),
                        ))
                    }
                };
            }
        }

        debug!(target: "rustysax::encoding", ?encoding, bom, "Detected input encoding");

        Ok(DecodedInput {
            inner,
            encoding,
            prefix,
            prefix_pos: 0,
            out: Vec::new(),
            out_pos: 0,
            carry: None,
            high_surrogate: None,
            eof: false,
        })
    }

    /// Next raw chunk: sniffed prefix first, then the inner reader
    fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.prefix_pos < self.prefix.len() {
            let n = buf.len().min(self.prefix.len() - self.prefix_pos);
            buf[..n].copy_from_slice(&self.prefix[self.prefix_pos..self.prefix_pos + n]);
            self.prefix_pos += n;
            return Ok(n);
        }
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    /// Decode the next raw chunk into `out`. Returns `false` at end of input.
    fn transcode_chunk(&mut self) -> io::Result<bool> {
        let mut raw = [0u8; TRANSCODE_CHUNK];
        let n = self.read_raw(&mut raw)?;
        self.out.clear();
        self.out_pos = 0;

        if n == 0 {
            if self.carry.is_some() || self.high_surrogate.is_some() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "truncated UTF-16 sequence at end of input",
                ));
            }
            return Ok(false);
        }

        match self.encoding {
            XmlEncoding::Latin1 => {
                for &b in &raw[..n] {
                    push_char(&mut self.out, char::from(b));
                }
            }
            XmlEncoding::Utf16Le | XmlEncoding::Utf16Be => self.decode_utf16(&raw[..n])?,
            XmlEncoding::Utf8 => self.out.extend_from_slice(&raw[..n]),
        }
        Ok(true)
    }

    fn decode_utf16(&mut self, raw: &[u8]) -> io::Result<()> {
        let mut bytes = raw;
        if let Some(first) = self.carry.take() {
            self.push_unit([first, raw[0]])?;
            bytes = &raw[1..];
        }

        let mut pairs = bytes.chunks_exact(2);
        for pair in &mut pairs {
            self.push_unit([pair[0], pair[1]])?;
        }
        self.carry = pairs.remainder().first().copied();
        Ok(())
    }

    fn push_unit(&mut self, pair: [u8; 2]) -> io::Result<()> {
        let unit = match self.encoding {
            XmlEncoding::Utf16Be => u16::from_be_bytes(pair),
            _ => u16::from_le_bytes(pair),
        };

        let decoded = match (self.high_surrogate.take(), unit) {
            (None, 0xD800..=0xDBFF) => {
                self.high_surrogate = Some(unit);
                return Ok(());
            }
            (None, 0xDC00..=0xDFFF) => None,
            (None, _) => char::from_u32(u32::from(unit)),
            (Some(high), 0xDC00..=0xDFFF) => {
                let cp = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                char::from_u32(cp)
            }
            (Some(_), _) => None,
        };

        match decoded {
            Some(c) => {
                push_char(&mut self.out, c);
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "unpaired UTF-16 surrogate",
            )),
        }
    }
}

impl<R: Read> Read for DecodedInput<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.encoding == XmlEncoding::Utf8 {
            return self.read_raw(buf);
        }

        while self.out_pos >= self.out.len() {
            if self.eof || !self.transcode_chunk()? {
                self.eof = true;
                return Ok(0);
            }
        }

        let n = buf.len().min(self.out.len() - self.out_pos);
        buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
        self.out_pos += n;
        Ok(n)
    }
}

#[inline]
fn push_char(out: &mut Vec<u8>, c: char) {
    let mut utf8 = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
}

/// Read until `prefix` holds at least `want` bytes or the input ends
fn read_prefix<R: Read>(inner: &mut R, prefix: &mut Vec<u8>, want: usize) -> Result<()> {
    let mut chunk = [0u8; 256];
    while prefix.len() < want {
        let n = match inner.read(&mut chunk[..(want - prefix.len()).min(256)]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(XmlError::io(&e, Position::start())),
        };
        prefix.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

/// Extend `prefix` until it contains the end of the XML declaration
fn read_declaration<R: Read>(inner: &mut R, prefix: &mut Vec<u8>) -> Result<()> {
    while memchr::memmem::find(prefix.as_slice(), b"?>").is_none()
        && prefix.len() < DECLARATION_SNIFF_LIMIT
    {
        let before = prefix.len();
        read_prefix(inner, prefix, before + 1)?;
        if prefix.len() == before {
            break;
        }
    }
    Ok(())
}

/// The `encoding` pseudo-attribute of a sniffed XML declaration, if any.
/// Malformed declarations are left for the tokenizer to report.
fn declared_encoding(prefix: &[u8]) -> Option<String> {
    let end = memchr::memmem::find(prefix, b"?>")?;
    let body = std::str::from_utf8(&prefix[5..end]).ok()?;
    parse_pseudo_attributes(body)
        .ok()?
        .into_iter()
        .find(|(name, _)| name == "encoding")
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> Result<String> {
        let mut decoded = DecodedInput::sniff(input)?;
        let mut out = String::new();
        decoded
            .read_to_string(&mut out)
            .map_err(|e| XmlError::io(&e, Position::start()))?;
        Ok(out)
    }

    #[test]
    fn test_detect_utf8() {
        assert_eq!(XmlEncoding::detect(b"<root/>"), XmlEncoding::Utf8);
        assert_eq!(XmlEncoding::detect(b"<?xml"), XmlEncoding::Utf8);
    }

    #[test]
    fn test_detect_utf16_le_bom() {
        assert_eq!(XmlEncoding::detect(&[0xFF, 0xFE, b'<', 0x00]), XmlEncoding::Utf16Le);
    }

    #[test]
    fn test_detect_utf16_be_bom() {
        assert_eq!(XmlEncoding::detect(&[0xFE, 0xFF, 0x00, b'<']), XmlEncoding::Utf16Be);
    }

    #[test]
    fn test_utf8_bom_stripped() {
        assert_eq!(decode(b"\xEF\xBB\xBF<r/>").unwrap(), "<r/>");
    }

    #[test]
    fn test_convert_utf16_le() {
        // "<r/>" in UTF-16 LE with BOM
        let utf16_le = [
            0xFF, 0xFE, // BOM
            b'<', 0x00,
            b'r', 0x00,
            b'/', 0x00,
            b'>', 0x00,
        ];
        assert_eq!(decode(&utf16_le).unwrap(), "<r/>");
    }

    #[test]
    fn test_convert_utf16_be_surrogate_pair() {
        // "<r>😀</r>" in UTF-16 BE without BOM
        let mut input = Vec::new();
        for unit in "<r>😀</r>".encode_utf16() {
            input.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode(&input).unwrap(), "<r>😀</r>");
    }

    #[test]
    fn test_utf16_odd_length_rejected() {
        let input = [b'<', 0x00, b'r'];
        assert!(decode(&input).is_err());
    }

    #[test]
    fn test_declared_latin1() {
        let input = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r>caf\xE9</r>";
        assert_eq!(
            decode(input).unwrap(),
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r>café</r>"
        );
    }

    #[test]
    fn test_declared_unknown_encoding() {
        let err = decode(b"<?xml version=\"1.0\" encoding=\"EBCDIC\"?><r/>").unwrap_err();
        assert_eq!(err.kind.name(), "encoding_error");
    }

    #[test]
    fn test_utf8_passthrough() {
        let input = "<?xml version='1.0' encoding='utf-8'?><root>héllo</root>";
        assert_eq!(decode(input.as_bytes()).unwrap(), input);
    }
}
