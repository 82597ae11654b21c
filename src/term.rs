//! Elixir Term Conversion Utilities
//!
//! Converts parse events, results and errors to Elixir terms.

use rustler::{Atom, Encoder, Env, NewBinary, Term};

use crate::core::attributes::Attribute;
use crate::core::error::{ErrorKind, XmlError};
use crate::reader::events::XmlEvent;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    cancelled,
    start_document,
    start_element,
    end_element,
    text,
    comment,
    processing_instruction,
    end_document,
    malformed_markup,
    unterminated_attribute,
    unknown_entity,
    mismatched_end_tag,
    unbalanced_elements,
    multiple_root_elements,
    duplicate_attribute,
    encoding_error,
    nesting_too_deep,
    io_error,
}

fn kind_atom(kind: &ErrorKind) -> Atom {
    match kind {
        ErrorKind::MalformedMarkup(_) => malformed_markup(),
        ErrorKind::UnterminatedAttribute { .. } => unterminated_attribute(),
        ErrorKind::UnknownEntity { .. } => unknown_entity(),
        ErrorKind::MismatchedEndTag { .. } => mismatched_end_tag(),
        ErrorKind::UnbalancedElements { .. } => unbalanced_elements(),
        ErrorKind::MultipleRootElements { .. } => multiple_root_elements(),
        ErrorKind::DuplicateAttribute { .. } => duplicate_attribute(),
        ErrorKind::EncodingError(_) => encoding_error(),
        ErrorKind::NestingTooDeep { .. } => nesting_too_deep(),
        ErrorKind::Io { .. } => io_error(),
    }
}

/// `{:error, {kind, message, {byte, line, column}}}`
pub fn error_to_term<'a>(env: Env<'a>, err: &XmlError) -> Term<'a> {
    let position = (err.position.byte, err.position.line, err.position.column);
    let reason = (
        kind_atom(&err.kind),
        str_to_binary(env, &err.kind.to_string()),
        position,
    );
    (error(), reason).encode(env)
}

/// `{:ok, value}`
pub fn ok_term<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (ok(), value).encode(env)
}

/// `{:cancelled, value}`
pub fn cancelled_term<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (cancelled(), value).encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// Convert a list of strings to a list of binaries
pub fn strings_to_term<'a>(env: Env<'a>, strings: &[String]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for s in strings.iter().rev() {
        list = list.list_prepend(str_to_binary(env, s));
    }
    list
}

fn attributes_to_term<'a>(env: Env<'a>, attributes: &[Attribute]) -> Term<'a> {
    let mut attrs = Term::list_new_empty(env);
    for attr in attributes.iter().rev() {
        let tuple = (str_to_binary(env, &attr.name), str_to_binary(env, &attr.value));
        attrs = attrs.list_prepend(tuple.encode(env));
    }
    attrs
}

/// Convert events to an Elixir list
pub fn events_to_term<'a>(env: Env<'a>, events: &[XmlEvent]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for event in events.iter().rev() {
        list = list.list_prepend(event_to_term(env, event));
    }
    list
}

/// Convert a single event to an Elixir term
pub fn event_to_term<'a>(env: Env<'a>, event: &XmlEvent) -> Term<'a> {
    match event {
        XmlEvent::StartDocument => start_document().encode(env),
        XmlEvent::StartElement(e) => (
            start_element(),
            str_to_binary(env, &e.name),
            attributes_to_term(env, &e.attributes),
        )
            .encode(env),
        XmlEvent::EndElement(e) => (end_element(), str_to_binary(env, &e.name)).encode(env),
        XmlEvent::Text(content) => (text(), str_to_binary(env, content)).encode(env),
        XmlEvent::Comment(content) => (comment(), str_to_binary(env, content)).encode(env),
        XmlEvent::ProcessingInstruction { target, data } => (
            processing_instruction(),
            str_to_binary(env, target),
            str_to_binary(env, data),
        )
            .encode(env),
        XmlEvent::EndDocument { element_count } => {
            (end_document(), *element_count).encode(env)
        }
    }
}
