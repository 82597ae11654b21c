//! SAX (Simple API for XML) Module
//!
//! Push-style parsing on top of the pull reader.
//!
//! ## Architecture
//!
//! ```text
//! Tokenizer ---> EventReader ---> parse() ---> SaxHandler
//!                                                  |
//!                                                  v
//!                                       Collectors / Elixir Terms (via NIF)
//! ```
//!
//! Each hook returns `ControlFlow`; `Break` cancels the parse without
//! reading further input.

pub mod collector;
pub mod handler;
pub mod parser;

pub use collector::{AttributeValueCollector, ElementCounter, ElementTextCollector, EventCollector};
pub use handler::{ParseOutcome, SaxHandler};
pub use parser::{parse, parse_with_config};
