//! Pull-based Event Parser
//!
//! Turns the token stream into well-formedness checked events. Tokens are
//! pulled from the tokenizer only when the caller asks for the next event,
//! so a caller that stops pulling stops all further input consumption.

use std::collections::VecDeque;
use std::io::Read;
use tracing::{debug, warn};

use super::events::{EndElement, StartElement, XmlEvent};
use crate::config::ParserConfig;
use crate::core::attributes::{Attribute, AttributeList};
use crate::core::encoding::DecodedInput;
use crate::core::error::{ErrorKind, Position, Result, XmlError};
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};

/// Where the parser is in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// `StartDocument` not yet emitted
    BeforeDocument,
    /// Before the root element
    InProlog,
    /// Inside the root element, `depth` elements open
    InElement(usize),
    /// After the root element closed
    AfterRoot,
    Failed,
    Done,
}

/// One open element on the nesting stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFrame {
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Where the start tag began
    pub position: Position,
}

/// Values of the XML declaration, if the document had one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// Streaming event reader over any byte source
pub struct EventReader<R: Read> {
    tokenizer: Tokenizer<DecodedInput<R>>,
    max_depth: Option<usize>,
    state: ParserState,
    stack: Vec<ElementFrame>,
    /// Events produced by the last token, not yet handed out
    pending: VecDeque<XmlEvent>,
    /// Character data waiting for the next markup boundary
    text: String,
    started: usize,
    ended: usize,
    seen_doctype: bool,
    declaration: Option<XmlDeclaration>,
}

impl<R: Read> EventReader<R> {
    /// Sniff the input encoding and set up a reader with default settings
    pub fn new(input: R) -> Result<Self> {
        Self::with_config(input, &ParserConfig::default())
    }

    pub fn with_config(input: R, config: &ParserConfig) -> Result<Self> {
        let decoded = DecodedInput::sniff(input)?;
        Ok(EventReader {
            tokenizer: Tokenizer::with_config(decoded, config),
            max_depth: config.max_depth,
            state: ParserState::BeforeDocument,
            stack: Vec::new(),
            pending: VecDeque::new(),
            text: String::new(),
            started: 0,
            ended: 0,
            seen_doctype: false,
            declaration: None,
        })
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Currently open elements, outermost first
    pub fn open_elements(&self) -> &[ElementFrame] {
        &self.stack
    }

    /// Number of element start events produced so far
    pub fn element_count(&self) -> usize {
        self.started
    }

    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    /// Get the next event. Returns `Ok(None)` once `EndDocument` has been
    /// handed out, and after an error has been returned.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            match self.state {
                ParserState::Done | ParserState::Failed => return Ok(None),
                ParserState::BeforeDocument => {
                    debug!(target: "rustysax::parser", "Document started");
                    self.state = ParserState::InProlog;
                    return Ok(Some(XmlEvent::StartDocument));
                }
                _ => {}
            }

            // Text is complete at the next markup boundary and goes out
            // before that markup is lexed
            if !self.text.is_empty() {
                match self.tokenizer.at_markup_boundary() {
                    Ok(true) => {
                        self.flush_text();
                        continue;
                    }
                    Ok(false) => {}
                    Err(err) => return Err(self.fail(err)),
                }
            }

            let step = self
                .tokenizer
                .next_token()
                .and_then(|token| self.handle_token(token));
            if let Err(err) = step {
                return Err(self.fail(err));
            }
        }
    }

    /// Enter the terminal failure state, attaching the nesting context
    fn fail(&mut self, err: XmlError) -> XmlError {
        self.state = ParserState::Failed;
        self.pending.clear();
        self.text.clear();
        let err = err.with_open_elements(self.stack.iter().map(|f| f.name.as_str()));
        warn!(
            target: "rustysax::parser",
            kind = err.kind.name(),
            line = err.position.line,
            column = err.position.column,
            depth = self.stack.len(),
            "Parse failed: {}",
            err.kind
        );
        err
    }

    fn handle_token(&mut self, token: Token) -> Result<()> {
        let Token { kind, position } = token;
        match kind {
            TokenKind::Text(text) => self.push_text(text, position, false),
            TokenKind::CData(text) => self.push_text(text, position, true),
            TokenKind::Comment(content) => {
                self.flush_text();
                self.pending.push_back(XmlEvent::Comment(content));
                Ok(())
            }
            TokenKind::ProcessingInstruction { target, data } => {
                self.flush_text();
                self.pending
                    .push_back(XmlEvent::ProcessingInstruction { target, data });
                Ok(())
            }
            TokenKind::XmlDeclaration {
                version,
                encoding,
                standalone,
            } => {
                debug!(
                    target: "rustysax::parser",
                    %version,
                    ?encoding,
                    ?standalone,
                    "XML declaration"
                );
                self.declaration = Some(XmlDeclaration {
                    version,
                    encoding,
                    standalone,
                });
                Ok(())
            }
            TokenKind::DocType(_) => {
                if self.state != ParserState::InProlog || self.seen_doctype {
                    return Err(XmlError::malformed(
                        "DOCTYPE is only allowed once, before the root element",
                        position,
                    ));
                }
                self.seen_doctype = true;
                Ok(())
            }
            TokenKind::StartTagOpen(name) => self.start_element(name, position),
            TokenKind::EndTag(name) => self.end_element(name, position),
            TokenKind::DocumentEnd => self.end_document(position),
            TokenKind::AttributeName(_)
            | TokenKind::AttributeValue { .. }
            | TokenKind::StartTagClose { .. } => Err(XmlError::malformed(
                "unexpected start tag fragment",
                position,
            )),
        }
    }

    fn push_text(&mut self, text: String, position: Position, cdata: bool) -> Result<()> {
        if let ParserState::InElement(_) = self.state {
            self.text.push_str(&text);
            return Ok(());
        }
        if cdata {
            return Err(XmlError::malformed(
                "CDATA section outside the root element",
                position,
            ));
        }
        if !text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) {
            return Err(XmlError::malformed(
                "character data outside the root element",
                position,
            ));
        }
        Ok(())
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.pending.push_back(XmlEvent::Text(text));
        }
    }

    /// Collect the rest of a start tag, then emit its events
    fn start_element(&mut self, name: String, position: Position) -> Result<()> {
        if self.state == ParserState::AfterRoot {
            return Err(XmlError::new(
                ErrorKind::MultipleRootElements { name },
                position,
            ));
        }

        let mut attributes = AttributeList::new();
        let self_closing = loop {
            let token = self.tokenizer.next_token()?;
            match token.kind {
                TokenKind::AttributeName(attr_name) => {
                    let value = match self.tokenizer.next_token()? {
                        Token {
                            kind: TokenKind::AttributeValue { value, .. },
                            ..
                        } => value,
                        other => {
                            return Err(XmlError::malformed(
                                format!("expected value for attribute '{attr_name}'"),
                                other.position,
                            ))
                        }
                    };
                    if let Err(dup) = attributes.push(Attribute::new(attr_name, value)) {
                        return Err(XmlError::new(
                            ErrorKind::DuplicateAttribute { name: dup.name },
                            token.position,
                        ));
                    }
                }
                TokenKind::StartTagClose { self_closing } => break self_closing,
                _ => {
                    return Err(XmlError::malformed(
                        format!("unexpected token in start tag '<{name}'"),
                        token.position,
                    ))
                }
            }
        };

        let depth = self.stack.len() + 1;
        if let Some(limit) = self.max_depth {
            if depth > limit {
                return Err(XmlError::new(ErrorKind::NestingTooDeep { limit }, position));
            }
        }

        self.flush_text();
        self.started += 1;
        let attributes = attributes.into_vec();
        self.pending.push_back(XmlEvent::StartElement(StartElement::new(
            name.clone(),
            attributes.clone(),
        )));

        if self_closing {
            self.ended += 1;
            self.pending
                .push_back(XmlEvent::EndElement(EndElement::new(name)));
            if self.stack.is_empty() {
                self.state = ParserState::AfterRoot;
            }
        } else {
            self.stack.push(ElementFrame {
                name,
                attributes,
                position,
            });
            self.state = ParserState::InElement(depth);
        }
        Ok(())
    }

    fn end_element(&mut self, name: String, position: Position) -> Result<()> {
        let Some(top) = self.stack.last() else {
            return Err(XmlError::malformed(
                format!("end tag '</{name}>' has no matching start tag"),
                position,
            ));
        };
        if top.name != name {
            return Err(XmlError::new(
                ErrorKind::MismatchedEndTag {
                    expected: top.name.clone(),
                    found: name,
                },
                position,
            ));
        }

        self.flush_text();
        self.stack.pop();
        self.ended += 1;
        self.pending
            .push_back(XmlEvent::EndElement(EndElement::new(name)));
        self.state = match self.stack.len() {
            0 => ParserState::AfterRoot,
            depth => ParserState::InElement(depth),
        };
        Ok(())
    }

    fn end_document(&mut self, position: Position) -> Result<()> {
        if let Some(open) = self.stack.last() {
            return Err(XmlError::new(
                ErrorKind::UnbalancedElements {
                    started: self.started,
                    ended: self.ended,
                    open: open.name.clone(),
                },
                position,
            ));
        }
        if self.state != ParserState::AfterRoot {
            return Err(XmlError::malformed("document has no root element", position));
        }
        if self.started != self.ended {
            return Err(XmlError::new(
                ErrorKind::UnbalancedElements {
                    started: self.started,
                    ended: self.ended,
                    open: String::new(),
                },
                position,
            ));
        }

        debug!(
            target: "rustysax::parser",
            element_count = self.started,
            "Document ended"
        );
        self.state = ParserState::Done;
        self.pending.push_back(XmlEvent::EndDocument {
            element_count: self.started,
        });
        Ok(())
    }
}

impl<R: Read> Iterator for EventReader<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
