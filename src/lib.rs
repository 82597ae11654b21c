//! RustySax - Streaming, strictly well-formed SAX parsing for XML
//!
//! Layers:
//! - core: encoding sniffing, scanner and tokenizer (the lexer)
//! - reader: pull-based event parser with nesting checks
//! - sax: handler trait, push driver and stock collectors
//! - strategy: parallel parsing of independent documents
//!
//! The crate builds both as a plain Rust library and as the NIF module
//! `Elixir.RustySax.Native`.

use rustler::{Binary, Env, NifResult, Term};

pub mod config;
pub mod core;
pub mod reader;
pub mod sax;
pub mod strategy;
mod term;

pub use crate::config::ParserConfig;
pub use crate::core::{Attribute, ErrorKind, Position, XmlError};
pub use crate::reader::{EventReader, XmlEvent};
pub use crate::sax::{parse, parse_with_config, ParseOutcome, SaxHandler};

use sax::{AttributeValueCollector, ElementTextCollector, EventCollector};
use term::{cancelled_term, error_to_term, events_to_term, ok_term, strings_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    fn record_peak(current: usize) {
        let mut peak = PEAK_ALLOCATED.load(Ordering::Relaxed);
        while current > peak {
            match PEAK_ALLOCATED.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                record_peak(ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size());
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[cfg(feature = "memory_tracking")]
use std::sync::atomic::Ordering;

/// Bytes currently allocated by the parser
#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory() -> usize {
    tracking::ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
}

/// Reset the peak to the current value, returning `{current, old_peak}`
#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    let current = tracking::ALLOCATED.load(Ordering::SeqCst);
    let peak = tracking::PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
    (current, peak)
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    (0, 0)
}

// ============================================================================
// Event Parsing
// ============================================================================

/// Parse XML and return `{:ok, events}` or `{:error, reason}`
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_events<'a>(env: Env<'a>, input: Binary<'a>) -> Term<'a> {
    let mut collector = EventCollector::new();
    match parse(input.as_slice(), &mut collector) {
        Ok(_) => ok_term(env, events_to_term(env, collector.events())),
        Err(err) => error_to_term(env, &err),
    }
}

/// Like `parse_events/1`, but stops after `limit` events and returns
/// `{:cancelled, events}` when the document has more
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_events_limit<'a>(env: Env<'a>, input: Binary<'a>, limit: usize) -> Term<'a> {
    let mut collector = EventCollector::with_limit(limit.max(1));
    match parse(input.as_slice(), &mut collector) {
        Ok(ParseOutcome::Completed { .. }) => ok_term(env, events_to_term(env, collector.events())),
        Ok(ParseOutcome::Cancelled) => cancelled_term(env, events_to_term(env, collector.events())),
        Err(err) => error_to_term(env, &err),
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// `{:ok, element_count}` for a well-formed document
#[rustler::nif(schedule = "DirtyCpu")]
fn count_elements<'a>(env: Env<'a>, input: Binary<'a>) -> Term<'a> {
    match strategy::parallel::count_elements(input.as_slice()) {
        Ok(count) => ok_term(env, rustler::Encoder::encode(&count, env)),
        Err(err) => error_to_term(env, &err),
    }
}

/// Names that can never appear in a document are a caller bug
fn check_name(name: &str) -> NifResult<()> {
    crate::core::unicode::validate_name(name).map_err(|_| rustler::Error::BadArg)
}

/// Text content of every element named `element`
#[rustler::nif(schedule = "DirtyCpu")]
fn element_texts<'a>(env: Env<'a>, input: Binary<'a>, element: &str) -> NifResult<Term<'a>> {
    check_name(element)?;
    let mut collector = ElementTextCollector::new(element);
    Ok(match parse(input.as_slice(), &mut collector) {
        Ok(_) => ok_term(env, strings_to_term(env, collector.texts())),
        Err(err) => error_to_term(env, &err),
    })
}

/// Value of `attribute` on every element named `element` that has it
#[rustler::nif(schedule = "DirtyCpu")]
fn attribute_values<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    element: &str,
    attribute: &str,
) -> NifResult<Term<'a>> {
    check_name(element)?;
    check_name(attribute)?;
    let mut collector = AttributeValueCollector::new(element, attribute);
    Ok(match parse(input.as_slice(), &mut collector) {
        Ok(_) => ok_term(env, strings_to_term(env, collector.values())),
        Err(err) => error_to_term(env, &err),
    })
}

// ============================================================================
// Parallel Batch
// ============================================================================

/// Parse many documents in parallel; one `{:ok, count}` or
/// `{:error, reason}` per document, in input order
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_batch<'a>(env: Env<'a>, inputs: Vec<Binary<'a>>) -> Term<'a> {
    let documents: Vec<&[u8]> = inputs.iter().map(|b| b.as_slice()).collect();
    let results = strategy::parse_batch(&documents);

    let mut list = Term::list_new_empty(env);
    for result in results.iter().rev() {
        let term = match result {
            Ok(count) => ok_term(env, rustler::Encoder::encode(count, env)),
            Err(err) => error_to_term(env, err),
        };
        list = list.list_prepend(term);
    }
    list
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.RustySax.Native");
