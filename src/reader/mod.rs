//! XML Reader Module
//!
//! Pull side of the parser:
//! - BufferedReader: growable sliding window over any `Read`
//! - EventReader: nesting-checked event stream
//! - Events: owned XML event types

pub mod buffered;
pub mod event_reader;
pub mod events;

pub use event_reader::{ElementFrame, EventReader, ParserState, XmlDeclaration};
pub use events::{EndElement, StartElement, XmlEvent};
