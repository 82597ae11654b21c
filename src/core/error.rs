//! Parse Errors
//!
//! Every failure is fatal to the parse that raised it. Errors carry the
//! position of the offending construct and, once they pass through the
//! event parser, the stack of elements that were open at the time.

use std::fmt;
use std::io;
use thiserror::Error;

/// Location in the decoded (UTF-8) input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the start of the stream (0-based)
    pub byte: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column in characters (1-based)
    pub column: usize,
}

impl Position {
    /// Position of the first byte of a stream
    pub const fn start() -> Self {
        Position {
            byte: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (byte {})",
            self.line, self.column, self.byte
        )
    }
}

/// The kind of well-formedness (or input) failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Bad character, bad name or structurally invalid markup
    #[error("malformed markup: {0}")]
    MalformedMarkup(String),

    /// End of input before the closing quote of an attribute value
    #[error("unterminated value for attribute '{name}'")]
    UnterminatedAttribute { name: String },

    /// Named entity reference other than the five predefined ones
    #[error("unknown entity '&{name};'")]
    UnknownEntity { name: String },

    /// End tag does not close the innermost open element
    #[error("mismatched end tag: expected '</{expected}>', found '</{found}>'")]
    MismatchedEndTag { expected: String, found: String },

    /// Input ended while elements were still open
    #[error("unbalanced elements: {started} started, {ended} ended, '{open}' still open")]
    UnbalancedElements {
        started: usize,
        ended: usize,
        open: String,
    },

    /// A second top-level element after the root closed
    #[error("multiple root elements: unexpected '<{name}>' after the root element")]
    MultipleRootElements { name: String },

    /// Same attribute name twice on one start tag
    #[error("duplicate attribute '{name}'")]
    DuplicateAttribute { name: String },

    /// Undecodable byte sequence or unsupported declared encoding
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// Nesting exceeded the configured depth limit
    #[error("element nesting deeper than {limit}")]
    NestingTooDeep { limit: usize },

    /// The underlying reader failed
    #[error("I/O error: {message}")]
    Io { kind: io::ErrorKind, message: String },
}

impl ErrorKind {
    /// Stable snake_case name of the kind, used for atoms on the Elixir side
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::MalformedMarkup(_) => "malformed_markup",
            ErrorKind::UnterminatedAttribute { .. } => "unterminated_attribute",
            ErrorKind::UnknownEntity { .. } => "unknown_entity",
            ErrorKind::MismatchedEndTag { .. } => "mismatched_end_tag",
            ErrorKind::UnbalancedElements { .. } => "unbalanced_elements",
            ErrorKind::MultipleRootElements { .. } => "multiple_root_elements",
            ErrorKind::DuplicateAttribute { .. } => "duplicate_attribute",
            ErrorKind::EncodingError(_) => "encoding_error",
            ErrorKind::NestingTooDeep { .. } => "nesting_too_deep",
            ErrorKind::Io { .. } => "io_error",
        }
    }
}

/// A positioned parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct XmlError {
    pub kind: ErrorKind,
    pub position: Position,
    /// Names of the elements open when the error occurred, outermost first
    pub open_elements: Vec<String>,
}

impl XmlError {
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        XmlError {
            kind,
            position,
            open_elements: Vec::new(),
        }
    }

    /// Shorthand for a `MalformedMarkup` error
    pub fn malformed(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::MalformedMarkup(message.into()), position)
    }

    /// Shorthand for an `EncodingError`
    pub fn encoding(message: impl Into<String>, position: Position) -> Self {
        Self::new(ErrorKind::EncodingError(message.into()), position)
    }

    /// Wrap a reader failure. `InvalidData` comes from the transcoding
    /// layer and is reported as an encoding error.
    pub fn io(err: &io::Error, position: Position) -> Self {
        if err.kind() == io::ErrorKind::InvalidData {
            return Self::encoding(err.to_string(), position);
        }
        Self::new(
            ErrorKind::Io {
                kind: err.kind(),
                message: err.to_string(),
            },
            position,
        )
    }

    /// Attach the open-element stack, unless one is already recorded
    pub fn with_open_elements<'a, I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.open_elements.is_empty() {
            self.open_elements = names.into_iter().map(str::to_owned).collect();
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, XmlError>;
