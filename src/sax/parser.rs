//! SAX Driver
//!
//! Pulls events from an [`EventReader`] one at a time and hands each to a
//! [`SaxHandler`] before pulling the next.

use std::io::Read;
use std::ops::ControlFlow;
use tracing::debug;

use super::handler::{ParseOutcome, SaxHandler};
use crate::config::ParserConfig;
use crate::core::error::Result;
use crate::reader::{EventReader, XmlEvent};

/// Parse `input` with default settings, driving `handler`
pub fn parse<R: Read, H: SaxHandler + ?Sized>(input: R, handler: &mut H) -> Result<ParseOutcome> {
    parse_with_config(input, &ParserConfig::default(), handler)
}

/// Parse `input`, driving `handler`
///
/// On a well-formedness or input error, `handler.error` is called and the
/// error is returned. No other hook runs after the error.
pub fn parse_with_config<R: Read, H: SaxHandler + ?Sized>(
    input: R,
    config: &ParserConfig,
    handler: &mut H,
) -> Result<ParseOutcome> {
    let mut reader = match EventReader::with_config(input, config) {
        Ok(reader) => reader,
        Err(err) => {
            handler.error(&err);
            return Err(err);
        }
    };

    loop {
        let event = match reader.next_event() {
            Ok(Some(event)) => event,
            Ok(None) => {
                return Ok(ParseOutcome::Completed {
                    element_count: reader.element_count(),
                })
            }
            Err(err) => {
                handler.error(&err);
                return Err(err);
            }
        };

        if dispatch(handler, &event).is_break() {
            debug!(
                target: "rustysax::parser",
                depth = reader.open_elements().len(),
                "Parse cancelled by handler"
            );
            return Ok(ParseOutcome::Cancelled);
        }
    }
}

fn dispatch<H: SaxHandler + ?Sized>(handler: &mut H, event: &XmlEvent) -> ControlFlow<()> {
    match event {
        XmlEvent::StartDocument => handler.start_document(),
        XmlEvent::StartElement(e) => handler.start_element(&e.name, &e.attributes),
        XmlEvent::EndElement(e) => handler.end_element(&e.name),
        XmlEvent::Text(text) => handler.text(text),
        XmlEvent::Comment(content) => handler.comment(content),
        XmlEvent::ProcessingInstruction { target, data } => {
            handler.processing_instruction(target, data)
        }
        XmlEvent::EndDocument { element_count } => handler.end_document(*element_count),
    }
}
