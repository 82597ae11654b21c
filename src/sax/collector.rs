//! SAX Collectors
//!
//! Ready-made handlers: one that records every event for batch return to
//! Elixir, and small ones that pull a single kind of fact out of a document.

use std::ops::ControlFlow;

use super::handler::SaxHandler;
use crate::core::attributes::{get_attribute_value, Attribute};
use crate::reader::events::{EndElement, StartElement, XmlEvent};

/// Collector that gathers every event as an owned [`XmlEvent`]
pub struct EventCollector {
    events: Vec<XmlEvent>,
    /// Cancel once this many events have been recorded
    limit: Option<usize>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(256),
            limit: None,
        }
    }

    /// Create a collector that requests cancellation after `limit` events
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::with_capacity(limit.min(256)),
            limit: Some(limit),
        }
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[XmlEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<XmlEvent> {
        self.events
    }

    /// Get number of collected events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn push(&mut self, event: XmlEvent) -> ControlFlow<()> {
        self.events.push(event);
        match self.limit {
            Some(limit) if self.events.len() >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SaxHandler for EventCollector {
    fn start_document(&mut self) -> ControlFlow<()> {
        self.push(XmlEvent::StartDocument)
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> ControlFlow<()> {
        self.push(XmlEvent::StartElement(StartElement::new(
            name,
            attributes.to_vec(),
        )))
    }

    fn end_element(&mut self, name: &str) -> ControlFlow<()> {
        self.push(XmlEvent::EndElement(EndElement::new(name)))
    }

    fn text(&mut self, content: &str) -> ControlFlow<()> {
        self.push(XmlEvent::Text(content.to_string()))
    }

    fn comment(&mut self, content: &str) -> ControlFlow<()> {
        self.push(XmlEvent::Comment(content.to_string()))
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> ControlFlow<()> {
        self.push(XmlEvent::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        })
    }

    fn end_document(&mut self, element_count: usize) -> ControlFlow<()> {
        self.push(XmlEvent::EndDocument { element_count })
    }
}

/// Counts element start and end events
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ElementCounter {
    pub started: usize,
    pub ended: usize,
}

impl SaxHandler for ElementCounter {
    fn start_element(&mut self, _name: &str, _attributes: &[Attribute]) -> ControlFlow<()> {
        self.started += 1;
        ControlFlow::Continue(())
    }

    fn end_element(&mut self, _name: &str) -> ControlFlow<()> {
        self.ended += 1;
        ControlFlow::Continue(())
    }
}

/// Records the character data of every element with a given name
///
/// The text buffer is cleared on every element start, so for an element
/// with child elements only the text after its last child start is kept.
pub struct ElementTextCollector {
    element: String,
    buffer: String,
    texts: Vec<String>,
}

impl ElementTextCollector {
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            buffer: String::new(),
            texts: Vec::new(),
        }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn into_texts(self) -> Vec<String> {
        self.texts
    }
}

impl SaxHandler for ElementTextCollector {
    fn start_element(&mut self, _name: &str, _attributes: &[Attribute]) -> ControlFlow<()> {
        self.buffer.clear();
        ControlFlow::Continue(())
    }

    fn text(&mut self, content: &str) -> ControlFlow<()> {
        self.buffer.push_str(content);
        ControlFlow::Continue(())
    }

    fn end_element(&mut self, name: &str) -> ControlFlow<()> {
        if name == self.element {
            self.texts.push(std::mem::take(&mut self.buffer));
        }
        ControlFlow::Continue(())
    }
}

/// Records one attribute's value on every element with a given name
pub struct AttributeValueCollector {
    element: String,
    attribute: String,
    values: Vec<String>,
}

impl AttributeValueCollector {
    pub fn new(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            attribute: attribute.into(),
            values: Vec::new(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

impl SaxHandler for AttributeValueCollector {
    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> ControlFlow<()> {
        if name == self.element {
            if let Some(value) = get_attribute_value(attributes, &self.attribute) {
                self.values.push(value.to_string());
            }
        }
        ControlFlow::Continue(())
    }
}
