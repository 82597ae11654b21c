//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Scanner: buffered byte window with memchr delimiter search and position tracking
//! - Tokenizer: State machine for XML token extraction
//! - Entities: predefined entity and character reference decoding
//! - Attributes: Attribute type, name splitting and uniqueness
//! - Encoding: BOM / declaration sniffing and transcoding to UTF-8
//! - Unicode: XML 1.0 Unicode character class validation
//! - Error: positioned parse errors

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod error;
pub mod scanner;
pub mod tokenizer;
pub mod unicode;

pub use attributes::Attribute;
pub use error::{ErrorKind, Position, XmlError};
