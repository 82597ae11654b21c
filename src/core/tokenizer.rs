//! XML Tokenizer - State machine for XML token extraction
//!
//! Implements a pull-style lexer over a UTF-8 byte stream. Each call to
//! [`Tokenizer::next_token`] returns exactly one token:
//! - Start tags, split into open / attribute name / attribute value / close
//! - End tags
//! - Text runs and decoded entity references
//! - CDATA sections, comments and processing instructions (opaque)
//! - XML declaration and DOCTYPE
//!
//! The tokenizer knows nothing about nesting; that is the event parser's
//! job. It owns only the scan position and the small amount of state needed
//! to lex a start tag one attribute at a time.

use std::io::Read;
use tracing::trace;

use super::attributes::parse_pseudo_attributes;
use super::entities::{decode_entity, EntityError};
use super::error::{ErrorKind, Position, Result, XmlError};
use super::scanner::Scanner;
use super::unicode::{find_invalid_char, is_xml_char};
use crate::config::ParserConfig;

/// Longest reference body (`#x10FFFF` and friends fit easily)
const MAX_REFERENCE_LEN: usize = 32;

/// Current lexing state
#[derive(Debug, Clone, PartialEq, Eq)]
enum LexState {
    /// Between markup: text, references, or the next `<`
    Content,
    /// Inside a start tag, before an attribute name or the closing `>`
    InsideTag,
    /// After an attribute name, expecting `=` and a quoted value
    AfterAttributeName(String),
    /// `DocumentEnd` has been produced
    Done,
}

/// Type of XML token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `<?xml version=... ?>` at the very start of the input
    XmlDeclaration {
        version: String,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    /// `<!DOCTYPE ...>`, content kept verbatim
    DocType(String),
    /// `<name` of a start tag
    StartTagOpen(String),
    /// Attribute name inside a start tag
    AttributeName(String),
    /// Decoded attribute value and the quote character that delimited it
    AttributeValue { value: String, quote: char },
    /// `>` or `/>` ending a start tag
    StartTagClose { self_closing: bool },
    /// `</name>`
    EndTag(String),
    /// Character data; a decoded reference is its own token
    Text(String),
    /// Content of `<![CDATA[ ... ]]>`
    CData(String),
    /// Content of `<!-- ... -->`
    Comment(String),
    /// `<?target data?>`
    ProcessingInstruction { target: String, data: String },
    /// End of input
    DocumentEnd,
}

/// A token and where it started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, position: Position) -> Self {
        Token { kind, position }
    }
}

/// Forward-only XML lexer
pub struct Tokenizer<R: Read> {
    scanner: Scanner<R>,
    state: LexState,
    /// First error, replayed on every later call
    error: Option<XmlError>,
}

impl<R: Read> Tokenizer<R> {
    /// Create a tokenizer over UTF-8 input
    pub fn new(input: R) -> Self {
        Self::with_config(input, &ParserConfig::default())
    }

    pub fn with_config(input: R, config: &ParserConfig) -> Self {
        Tokenizer {
            scanner: Scanner::new(input, config.buffer_capacity),
            state: LexState::Content,
            error: None,
        }
    }

    /// Whether character data read so far is complete: the input ended,
    /// or markup other than a CDATA section comes next. Nothing is consumed.
    pub fn at_markup_boundary(&mut self) -> Result<bool> {
        if self.error.is_some() || self.state != LexState::Content {
            return Ok(false);
        }
        match self.scanner.peek()? {
            None => Ok(true),
            Some(b'<') => Ok(!self.scanner.starts_with(b"<![CDATA[")?),
            Some(_) => Ok(false),
        }
    }

    /// Get the next token. After `DocumentEnd` every call returns
    /// `DocumentEnd` again; after an error every call returns that error.
    pub fn next_token(&mut self) -> Result<Token> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let result = match std::mem::replace(&mut self.state, LexState::Content) {
            LexState::Done => {
                self.state = LexState::Done;
                Ok(Token::new(TokenKind::DocumentEnd, self.scanner.position()))
            }
            LexState::Content => self.lex_content(),
            LexState::InsideTag => self.lex_in_tag(),
            LexState::AfterAttributeName(name) => self.lex_attribute_value(name),
        };

        match result {
            Ok(token) => {
                trace!(
                    target: "rustysax::tokenizer",
                    kind = ?token.kind,
                    line = token.position.line,
                    column = token.position.column,
                    "Produced token"
                );
                Ok(token)
            }
            Err(err) => {
                self.state = LexState::Done;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn lex_content(&mut self) -> Result<Token> {
        let start = self.scanner.position();
        match self.scanner.peek()? {
            None => {
                self.state = LexState::Done;
                Ok(Token::new(TokenKind::DocumentEnd, start))
            }
            Some(b'<') => self.lex_markup(start),
            Some(b'&') => {
                let c = self.read_reference()?;
                Ok(Token::new(TokenKind::Text(c.to_string()), start))
            }
            Some(_) => self.lex_text(start),
        }
    }

    /// Character data up to the next `<`, `&` or end of input
    fn lex_text(&mut self, start: Position) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.scanner.peek()? {
                None | Some(b'<') | Some(b'&') => break,
                Some(b']') => {
                    if self.scanner.starts_with(b"]]>")? {
                        return Err(XmlError::malformed(
                            "']]>' is not allowed in character data",
                            self.scanner.position(),
                        ));
                    }
                    self.scanner.advance(1);
                    text.push(']');
                }
                Some(_) => {
                    let run_start = self.scanner.position();
                    let run = self.scanner.read_text_run()?;
                    if let Some(c) = find_invalid_char(&run) {
                        return Err(XmlError::malformed(
                            format!("invalid character U+{:04X} in content", c as u32),
                            run_start,
                        ));
                    }
                    text.push_str(&run);
                }
            }
        }
        Ok(Token::new(TokenKind::Text(normalize_newlines(text)), start))
    }

    /// `&...;` at the current position, decoded to a character
    fn read_reference(&mut self) -> Result<char> {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '&'

        let mut body = String::new();
        if self.scanner.peek()? == Some(b'#') {
            self.scanner.advance(1);
            body.push('#');
            while let Some(b) = self.scanner.peek()? {
                if !b.is_ascii_alphanumeric() || body.len() > MAX_REFERENCE_LEN {
                    break;
                }
                body.push(b as char);
                self.scanner.advance(1);
            }
        } else {
            match self.scanner.read_name()? {
                Some(name) => body = name,
                None => {
                    return Err(XmlError::malformed(
                        "'&' must start an entity or character reference",
                        start,
                    ))
                }
            }
        }

        if self.scanner.peek()? != Some(b';') {
            return Err(XmlError::malformed(
                format!("reference '&{body}' is missing its ';'"),
                start,
            ));
        }
        self.scanner.advance(1);

        decode_entity(&body).map_err(|e| match e {
            EntityError::Unknown => XmlError::new(ErrorKind::UnknownEntity { name: body }, start),
            EntityError::InvalidCharRef => {
                XmlError::malformed(format!("invalid character reference '&{body};'"), start)
            }
        })
    }

    /// Dispatch on what follows `<`
    fn lex_markup(&mut self, start: Position) -> Result<Token> {
        if self.scanner.starts_with(b"<!--")? {
            self.scanner.advance(4);
            return self.lex_comment(start);
        }
        if self.scanner.starts_with(b"<![CDATA[")? {
            self.scanner.advance(9);
            return match self.scanner.read_until(b"]]>")? {
                Some(content) => {
                    check_chars(&content, start)?;
                    Ok(Token::new(TokenKind::CData(normalize_newlines(content)), start))
                }
                None => Err(XmlError::malformed("unterminated CDATA section", start)),
            };
        }
        if self.scanner.starts_with(b"<!DOCTYPE")? {
            self.scanner.advance(9);
            return self.lex_doctype(start);
        }
        if self.scanner.starts_with(b"<!")? {
            return Err(XmlError::malformed(
                "expected comment, CDATA section or DOCTYPE after '<!'",
                start,
            ));
        }
        if self.scanner.starts_with(b"<?")? {
            self.scanner.advance(2);
            return self.lex_processing_instruction(start);
        }
        if self.scanner.starts_with(b"</")? {
            self.scanner.advance(2);
            return self.lex_end_tag(start);
        }

        self.scanner.advance(1); // Skip '<'
        match self.scanner.read_name()? {
            Some(name) => {
                self.state = LexState::InsideTag;
                Ok(Token::new(TokenKind::StartTagOpen(name), start))
            }
            None => Err(self.invalid_name_error("element name after '<'")?),
        }
    }

    /// Build the error for a missing name at the current position
    fn invalid_name_error(&mut self, what: &str) -> Result<XmlError> {
        let position = self.scanner.position();
        Ok(match self.scanner.peek_char()? {
            Some((c, _)) => {
                XmlError::malformed(format!("invalid character '{c}' in {what}"), position)
            }
            None => {
                XmlError::malformed(format!("unexpected end of input, expected {what}"), position)
            }
        })
    }

    fn lex_comment(&mut self, start: Position) -> Result<Token> {
        let content = match self.scanner.read_until(b"-->")? {
            Some(content) => content,
            None => return Err(XmlError::malformed("unterminated comment", start)),
        };
        if content.contains("--") || content.ends_with('-') {
            return Err(XmlError::malformed("'--' is not allowed inside a comment", start));
        }
        check_chars(&content, start)?;
        Ok(Token::new(TokenKind::Comment(normalize_newlines(content)), start))
    }

    fn lex_processing_instruction(&mut self, start: Position) -> Result<Token> {
        let target = match self.scanner.read_name()? {
            Some(target) => target,
            None => return Err(self.invalid_name_error("processing instruction target")?),
        };

        let data = if self.scanner.starts_with(b"?>")? {
            self.scanner.advance(2);
            String::new()
        } else {
            if !self.scanner.skip_whitespace()? {
                return Err(XmlError::malformed(
                    format!("whitespace required after processing instruction target '{target}'"),
                    self.scanner.position(),
                ));
            }
            match self.scanner.read_until(b"?>")? {
                Some(data) => data,
                None => {
                    return Err(XmlError::malformed(
                        "unterminated processing instruction",
                        start,
                    ))
                }
            }
        };
        check_chars(&data, start)?;

        if target.eq_ignore_ascii_case("xml") {
            if target == "xml" && start.byte == 0 {
                return parse_declaration(&data, start);
            }
            return Err(XmlError::malformed(
                "XML declaration is only allowed at the very start of the document",
                start,
            ));
        }

        Ok(Token::new(
            TokenKind::ProcessingInstruction {
                target,
                data: normalize_newlines(data),
            },
            start,
        ))
    }

    /// Skip a DOCTYPE declaration, tracking quotes and the internal subset
    fn lex_doctype(&mut self, start: Position) -> Result<Token> {
        if !self.scanner.skip_whitespace()? {
            return Err(XmlError::malformed("whitespace required after '<!DOCTYPE'", start));
        }

        let mut content = Vec::new();
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        loop {
            let Some(b) = self.scanner.peek()? else {
                return Err(XmlError::malformed("unterminated DOCTYPE declaration", start));
            };
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'<') if depth > 0 && self.scanner.starts_with(b"<!--")? => {
                    self.scanner.advance(4);
                    content.extend_from_slice(b"<!--");
                    match self.scanner.read_until(b"-->")? {
                        Some(comment) => content.extend_from_slice(comment.as_bytes()),
                        None => {
                            return Err(XmlError::malformed(
                                "unterminated DOCTYPE declaration",
                                start,
                            ))
                        }
                    }
                    content.extend_from_slice(b"-->");
                    continue;
                }
                (None, b'>') if depth == 0 => {
                    self.scanner.advance(1);
                    break;
                }
                _ => {}
            }
            content.push(b);
            self.scanner.advance(1);
        }

        let content = String::from_utf8(content)
            .map_err(|_| XmlError::encoding("invalid UTF-8 sequence in DOCTYPE", start))?;
        Ok(Token::new(TokenKind::DocType(content.trim_end().to_string()), start))
    }

    fn lex_end_tag(&mut self, start: Position) -> Result<Token> {
        let name = match self.scanner.read_name()? {
            Some(name) => name,
            None => return Err(self.invalid_name_error("end tag name")?),
        };
        self.scanner.skip_whitespace()?;
        match self.scanner.peek()? {
            Some(b'>') => {
                self.scanner.advance(1);
                Ok(Token::new(TokenKind::EndTag(name), start))
            }
            Some(_) => Err(XmlError::malformed(
                format!("expected '>' to close end tag '</{name}'"),
                self.scanner.position(),
            )),
            None => Err(XmlError::malformed(format!("unterminated end tag '</{name}'"), start)),
        }
    }

    /// Inside a start tag: the next attribute name, or the end of the tag
    fn lex_in_tag(&mut self) -> Result<Token> {
        let had_space = self.scanner.skip_whitespace()?;
        let start = self.scanner.position();
        match self.scanner.peek()? {
            None => Err(XmlError::malformed("unterminated start tag", start)),
            Some(b'>') => {
                self.scanner.advance(1);
                Ok(Token::new(TokenKind::StartTagClose { self_closing: false }, start))
            }
            Some(b'/') => {
                if !self.scanner.starts_with(b"/>")? {
                    return Err(XmlError::malformed("expected '>' after '/' in start tag", start));
                }
                self.scanner.advance(2);
                Ok(Token::new(TokenKind::StartTagClose { self_closing: true }, start))
            }
            Some(_) => {
                let name = match self.scanner.read_name()? {
                    Some(name) => name,
                    None => return Err(self.invalid_name_error("start tag")?),
                };
                if !had_space {
                    return Err(XmlError::malformed(
                        format!("whitespace required before attribute '{name}'"),
                        start,
                    ));
                }
                self.state = LexState::AfterAttributeName(name.clone());
                Ok(Token::new(TokenKind::AttributeName(name), start))
            }
        }
    }

    /// `= "value"` after an attribute name
    fn lex_attribute_value(&mut self, name: String) -> Result<Token> {
        self.scanner.skip_whitespace()?;
        if self.scanner.peek()? != Some(b'=') {
            return Err(XmlError::malformed(
                format!("expected '=' after attribute name '{name}'"),
                self.scanner.position(),
            ));
        }
        self.scanner.advance(1);
        self.scanner.skip_whitespace()?;

        let start = self.scanner.position();
        let quote = match self.scanner.peek()? {
            Some(q @ (b'"' | b'\'')) => q,
            None => return Err(XmlError::new(ErrorKind::UnterminatedAttribute { name }, start)),
            Some(_) => {
                return Err(XmlError::malformed(
                    format!("value of attribute '{name}' must be quoted"),
                    start,
                ))
            }
        };
        self.scanner.advance(1);

        let mut value = String::new();
        loop {
            let Some((c, width)) = self.scanner.peek_char()? else {
                return Err(XmlError::new(ErrorKind::UnterminatedAttribute { name }, start));
            };
            match c {
                _ if c == quote as char => {
                    self.scanner.advance(1);
                    break;
                }
                '<' => {
                    return Err(XmlError::malformed(
                        format!("'<' is not allowed in the value of attribute '{name}'"),
                        self.scanner.position(),
                    ))
                }
                '&' => value.push(self.read_reference()?),
                '\r' => {
                    self.scanner.advance(1);
                    if self.scanner.peek()? == Some(b'\n') {
                        self.scanner.advance(1);
                    }
                    value.push(' ');
                }
                '\t' | '\n' => {
                    self.scanner.advance(1);
                    value.push(' ');
                }
                _ if !is_xml_char(c) => {
                    return Err(XmlError::malformed(
                        format!("invalid character U+{:04X} in attribute value", c as u32),
                        self.scanner.position(),
                    ))
                }
                _ => {
                    self.scanner.advance(width);
                    value.push(c);
                }
            }
        }

        self.state = LexState::InsideTag;
        Ok(Token::new(
            TokenKind::AttributeValue {
                value,
                quote: quote as char,
            },
            start,
        ))
    }
}

/// XML end-of-line handling: `\r\n` and lone `\r` become `\n`
fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn check_chars(text: &str, position: Position) -> Result<()> {
    match find_invalid_char(text) {
        Some(c) => Err(XmlError::malformed(
            format!("invalid character U+{:04X}", c as u32),
            position,
        )),
        None => Ok(()),
    }
}

/// Turn the body of `<?xml ...?>` into a declaration token
fn parse_declaration(data: &str, start: Position) -> Result<Token> {
    let attrs = parse_pseudo_attributes(data).map_err(|msg| XmlError::malformed(msg, start))?;
    let mut attrs = attrs.into_iter().peekable();

    let version = match attrs.next() {
        Some((name, value)) if name == "version" => value,
        _ => {
            return Err(XmlError::malformed(
                "XML declaration must start with 'version'",
                start,
            ))
        }
    };
    let encoding = attrs
        .next_if(|(name, _)| name == "encoding")
        .map(|(_, value)| value);
    let standalone = match attrs.next_if(|(name, _)| name == "standalone") {
        Some((_, value)) if value == "yes" => Some(true),
        Some((_, value)) if value == "no" => Some(false),
        Some((_, value)) => {
            return Err(XmlError::malformed(
                format!("standalone must be 'yes' or 'no', found '{value}'"),
                start,
            ))
        }
        None => None,
    };
    if let Some((name, _)) = attrs.next() {
        return Err(XmlError::malformed(
            format!("unexpected '{name}' in XML declaration"),
            start,
        ));
    }

    Ok(Token::new(
        TokenKind::XmlDeclaration {
            version,
            encoding,
            standalone,
        },
        start,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_boundary() {
        let mut tokenizer = Tokenizer::new("a<![CDATA[b]]>c<!--d-->".as_bytes());
        assert!(!tokenizer.at_markup_boundary().unwrap());
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::Text("a".into()));
        assert!(!tokenizer.at_markup_boundary().unwrap());
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::CData("b".into()));
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::Text("c".into()));
        assert!(tokenizer.at_markup_boundary().unwrap());
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::Comment("d".into()));
        assert!(tokenizer.at_markup_boundary().unwrap());
    }

    fn tokens(input: &str) -> Result<Vec<TokenKind>> {
        // Tiny window so every construct crosses a refill
        let config = ParserConfig::new().with_buffer_capacity(4);
        let mut tokenizer = Tokenizer::with_config(input.as_bytes(), &config);
        let mut kinds = Vec::new();
        loop {
            let token = tokenizer.next_token()?;
            if token.kind == TokenKind::DocumentEnd {
                return Ok(kinds);
            }
            kinds.push(token.kind);
        }
    }

    fn text(s: &str) -> TokenKind {
        TokenKind::Text(s.to_string())
    }

    fn error_kind(input: &str) -> ErrorKind {
        tokens(input).unwrap_err().kind
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            tokens("<root>hello</root>").unwrap(),
            vec![
                TokenKind::StartTagOpen("root".into()),
                TokenKind::StartTagClose { self_closing: false },
                text("hello"),
                TokenKind::EndTag("root".into()),
            ]
        );
    }

    #[test]
    fn test_empty_element_with_attributes() {
        assert_eq!(
            tokens("<a x=\"1\"  y='two' />").unwrap(),
            vec![
                TokenKind::StartTagOpen("a".into()),
                TokenKind::AttributeName("x".into()),
                TokenKind::AttributeValue { value: "1".into(), quote: '"' },
                TokenKind::AttributeName("y".into()),
                TokenKind::AttributeValue { value: "two".into(), quote: '\'' },
                TokenKind::StartTagClose { self_closing: true },
            ]
        );
    }

    #[test]
    fn test_references_are_separate_text_tokens() {
        assert_eq!(
            tokens("<a>x &lt; y&#65;</a>").unwrap()[2..5].to_vec(),
            vec![text("x "), text("<"), text(" y")]
        );
    }

    #[test]
    fn test_attribute_value_decoding_and_normalization() {
        let kinds = tokens("<a v=\"&quot;a\tb\r\nc&#10;\"/>").unwrap();
        assert_eq!(
            kinds[2],
            TokenKind::AttributeValue { value: "\"a b c\n".into(), quote: '"' }
        );
    }

    #[test]
    fn test_quote_inside_other_quote() {
        let kinds = tokens("<a v='say \"hi\" > now'/>").unwrap();
        assert_eq!(
            kinds[2],
            TokenKind::AttributeValue { value: "say \"hi\" > now".into(), quote: '\'' }
        );
    }

    #[test]
    fn test_cdata_is_opaque() {
        assert_eq!(
            tokens("<a><![CDATA[<b>&amp;</b>]]></a>").unwrap()[2],
            TokenKind::CData("<b>&amp;</b>".into())
        );
    }

    #[test]
    fn test_comment() {
        assert_eq!(
            tokens("<!-- a <b> comment --><a/>").unwrap()[0],
            TokenKind::Comment(" a <b> comment ".into())
        );
    }

    #[test]
    fn test_processing_instruction() {
        assert_eq!(
            tokens("<?style href=\"a.css\"?><a/>").unwrap()[0],
            TokenKind::ProcessingInstruction {
                target: "style".into(),
                data: "href=\"a.css\"".into()
            }
        );
    }

    #[test]
    fn test_xml_declaration() {
        assert_eq!(
            tokens("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?><a/>").unwrap()[0],
            TokenKind::XmlDeclaration {
                version: "1.0".into(),
                encoding: Some("UTF-8".into()),
                standalone: Some(true),
            }
        );
    }

    #[test]
    fn test_xml_declaration_not_at_start() {
        assert!(matches!(
            error_kind(" <?xml version=\"1.0\"?><a/>"),
            ErrorKind::MalformedMarkup(_)
        ));
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        assert_eq!(
            tokens("<!DOCTYPE a [<!ENTITY e \"]>\"><!-- ] -->]><a/>").unwrap()[0],
            TokenKind::DocType("a [<!ENTITY e \"]>\"><!-- ] -->]".into())
        );
    }

    #[test]
    fn test_crlf_normalized_in_text() {
        assert_eq!(tokens("<a>1\r\n2\r3</a>").unwrap()[2], text("1\n2\n3"));
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(
            error_kind("<a>&unknown;</a>"),
            ErrorKind::UnknownEntity { name: "unknown".into() }
        );
    }

    #[test]
    fn test_bare_ampersand() {
        assert!(matches!(error_kind("<a>fish & chips</a>"), ErrorKind::MalformedMarkup(_)));
        assert!(matches!(error_kind("<a>&amp</a>"), ErrorKind::MalformedMarkup(_)));
    }

    #[test]
    fn test_unterminated_attribute() {
        assert_eq!(
            error_kind("<a x=\"never closed"),
            ErrorKind::UnterminatedAttribute { name: "x".into() }
        );
        assert_eq!(
            error_kind("<a x='mixed\">"),
            ErrorKind::UnterminatedAttribute { name: "x".into() }
        );
    }

    #[test]
    fn test_malformed_markup() {
        for input in [
            "<1a/>",
            "<a x=1/>",
            "<a x/>",
            "<a x=\"1\"y=\"2\"/>",
            "<a x=\"<\"/>",
            "</a b>",
            "<a>]]></a>",
            "<!-- a -- b -->",
            "<!-- never closed",
            "<a><![CDATA[open",
            "<!ELEMENT a ANY>",
            "<a",
            "<a>\u{1}</a>",
        ] {
            assert!(
                matches!(error_kind(input), ErrorKind::MalformedMarkup(_)),
                "expected malformed markup for {input:?}"
            );
        }
    }

    #[test]
    fn test_error_position() {
        let config = ParserConfig::default();
        let mut tokenizer = Tokenizer::with_config("<a>\n  <1/>".as_bytes(), &config);
        let err = loop {
            match tokenizer.next_token() {
                Ok(_) => continue,
                Err(err) => break err,
            }
        };
        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 4);
        assert_eq!(err.position.byte, 7);
    }

    #[test]
    fn test_error_is_sticky() {
        let mut tokenizer = Tokenizer::new("<a>&bogus;</a>".as_bytes());
        assert!(tokenizer.next_token().is_ok());
        assert!(tokenizer.next_token().is_ok());
        let first = tokenizer.next_token().unwrap_err();
        assert_eq!(tokenizer.next_token().unwrap_err(), first);
    }

    #[test]
    fn test_document_end_repeats() {
        let mut tokenizer = Tokenizer::new("".as_bytes());
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::DocumentEnd);
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::DocumentEnd);
    }
}
