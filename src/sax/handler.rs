//! SAX Handler Trait
//!
//! Observer interface driven by [`crate::sax::parse`].

use std::ops::ControlFlow;

use crate::core::attributes::Attribute;
use crate::core::error::XmlError;

/// How a parse ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The whole document was read and `end_document` was delivered
    Completed { element_count: usize },
    /// A handler hook returned `ControlFlow::Break`
    Cancelled,
}

/// Trait for receiving parse events
///
/// Every hook is optional. Returning `ControlFlow::Break(())` from any hook
/// stops the parse: no further input is read and no further hooks are
/// called, and the parse returns [`ParseOutcome::Cancelled`].
pub trait SaxHandler {
    /// Called once, before any other event
    fn start_document(&mut self) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called when an element starts
    ///
    /// # Arguments
    /// * `name` - Qualified element name
    /// * `attributes` - All attributes of the start tag, in document order
    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> ControlFlow<()> {
        let _ = (name, attributes);
        ControlFlow::Continue(())
    }

    /// Called when an element ends. Self-closing elements get this
    /// immediately after `start_element`.
    fn end_element(&mut self, name: &str) -> ControlFlow<()> {
        let _ = name;
        ControlFlow::Continue(())
    }

    /// Called for each maximal run of character data inside the root
    /// element, with references decoded and CDATA merged in
    fn text(&mut self, content: &str) -> ControlFlow<()> {
        let _ = content;
        ControlFlow::Continue(())
    }

    /// Called for comments (content excluding `<!--` and `-->`)
    fn comment(&mut self, content: &str) -> ControlFlow<()> {
        let _ = content;
        ControlFlow::Continue(())
    }

    /// Called for processing instructions other than the XML declaration
    fn processing_instruction(&mut self, target: &str, data: &str) -> ControlFlow<()> {
        let _ = (target, data);
        ControlFlow::Continue(())
    }

    /// Called once after the root element closed and the input ended
    fn end_document(&mut self, element_count: usize) -> ControlFlow<()> {
        let _ = element_count;
        ControlFlow::Continue(())
    }

    /// Called with the fatal error before the parse returns it
    fn error(&mut self, error: &XmlError) {
        let _ = error;
    }
}
