//! XML Event Types
//!
//! Owned event types produced by the pull reader and replayed into SAX
//! handlers.

use crate::core::attributes::{get_attribute_value, split_name, Attribute};

/// XML parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Before anything else, exactly once
    StartDocument,
    /// Start of an element: `<name attrs...>` or `<name attrs.../>`
    StartElement(StartElement),
    /// End of an element. Self-closing tags produce one immediately after
    /// their start.
    EndElement(EndElement),
    /// Coalesced character data, CDATA included
    Text(String),
    /// Comment content
    Comment(String),
    /// Processing instruction: `<?target data?>`
    ProcessingInstruction { target: String, data: String },
    /// End of document, after the root closed and the input is exhausted
    EndDocument { element_count: usize },
}

/// Start element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Full element name (may include prefix)
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        StartElement {
            name: name.into(),
            attributes,
        }
    }

    /// Local name (after colon)
    pub fn local_name(&self) -> &str {
        split_name(&self.name).1
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&str> {
        split_name(&self.name).0
    }

    /// Get an attribute value by name
    pub fn get_attribute_value(&self, name: &str) -> Option<&str> {
        get_attribute_value(&self.attributes, name)
    }
}

/// End element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement {
    /// Full element name
    pub name: String,
}

impl EndElement {
    pub fn new(name: impl Into<String>) -> Self {
        EndElement { name: name.into() }
    }

    pub fn local_name(&self) -> &str {
        split_name(&self.name).1
    }
}

impl XmlEvent {
    pub fn as_start_element(&self) -> Option<&StartElement> {
        match self {
            XmlEvent::StartElement(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlEvent::Text(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_element_accessors() {
        let e = StartElement::new(
            "svg:rect",
            vec![Attribute::new("width", "10"), Attribute::new("xlink:href", "#a")],
        );
        assert_eq!(e.local_name(), "rect");
        assert_eq!(e.prefix(), Some("svg"));
        assert_eq!(e.get_attribute_value("xlink:href"), Some("#a"));
        assert_eq!(e.get_attribute_value("height"), None);
    }

    #[test]
    fn test_event_accessors() {
        let start = XmlEvent::StartElement(StartElement::new("a", Vec::new()));
        assert_eq!(start.as_start_element().map(|e| e.name.as_str()), Some("a"));
        assert_eq!(start.as_text(), None);

        let end = XmlEvent::EndElement(EndElement::new("x:a"));
        assert_eq!(end.as_start_element(), None);
        if let XmlEvent::EndElement(e) = &end {
            assert_eq!(e.local_name(), "a");
        }

        assert_eq!(XmlEvent::Text("hi".into()).as_text(), Some("hi"));
    }
}
