//! Parallel Batch Parsing
//!
//! Uses Rayon to parse independent documents concurrently. Every document
//! gets its own reader and parser state; nothing is shared between them.

use rayon::prelude::*;

use crate::core::error::XmlError;
use crate::sax::{parse, ElementCounter, ParseOutcome};

/// Parse each document in parallel, returning its element count or the
/// first error it hit. Results are in input order.
pub fn parse_batch(documents: &[&[u8]]) -> Vec<Result<usize, XmlError>> {
    documents
        .par_iter()
        .map(|doc| count_elements(doc))
        .collect()
}

/// Parse one document to completion and return its element count
pub fn count_elements(input: &[u8]) -> Result<usize, XmlError> {
    let mut counter = ElementCounter::default();
    match parse(input, &mut counter)? {
        ParseOutcome::Completed { element_count } => Ok(element_count),
        // ElementCounter never cancels
        ParseOutcome::Cancelled => Ok(counter.started),
    }
}
