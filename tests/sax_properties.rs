//! Event-stream properties checked through the public API

use std::ops::ControlFlow;

use rustysax::sax::{parse, ElementCounter, EventCollector, ParseOutcome, SaxHandler};
use rustysax::{Attribute, ErrorKind, XmlError, XmlEvent};

/// Records the hook sequence as readable strings
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    errors: Vec<XmlError>,
    cancel_on_start: Option<&'static str>,
}

impl SaxHandler for Recorder {
    fn start_document(&mut self) -> ControlFlow<()> {
        self.calls.push("start_document".into());
        ControlFlow::Continue(())
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute]) -> ControlFlow<()> {
        let attrs: Vec<String> = attributes
            .iter()
            .map(|a| format!("({},{})", a.name, a.value))
            .collect();
        self.calls.push(format!("start({name},[{}])", attrs.join(",")));
        if self.cancel_on_start == Some(name) {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn end_element(&mut self, name: &str) -> ControlFlow<()> {
        self.calls.push(format!("end({name})"));
        ControlFlow::Continue(())
    }

    fn text(&mut self, content: &str) -> ControlFlow<()> {
        self.calls.push(format!("text({content})"));
        ControlFlow::Continue(())
    }

    fn end_document(&mut self, element_count: usize) -> ControlFlow<()> {
        self.calls.push(format!("end_document({element_count})"));
        ControlFlow::Continue(())
    }

    fn error(&mut self, error: &XmlError) {
        self.errors.push(error.clone());
    }
}

fn record(input: &str) -> (Result<ParseOutcome, XmlError>, Recorder) {
    let mut recorder = Recorder::default();
    let result = parse(input.as_bytes(), &mut recorder);
    (result, recorder)
}

const WELL_FORMED: &[&str] = &[
    "<a/>",
    "<root><child attr=\"1\">hi</child></root>",
    "<?xml version=\"1.0\"?>\n<!DOCTYPE r>\n<r>\n  <x y='1'/>\n  <x>t&amp;t</x>\n</r>\n",
    "<r><![CDATA[<not-a-tag>]]><!-- c --><?pi data?></r>",
    "<ns:r xmlns:ns=\"urn:x\"><ns:i ns:a=\"v\"/></ns:r>",
    "<r>\u{00e9}\u{4e2d}\u{1F600}</r>",
];

#[test]
fn start_and_end_counts_match() {
    for input in WELL_FORMED {
        let mut counter = ElementCounter::default();
        let outcome = parse(input.as_bytes(), &mut counter).unwrap();
        assert_eq!(counter.started, counter.ended, "{input}");
        assert_eq!(
            outcome,
            ParseOutcome::Completed {
                element_count: counter.started
            }
        );
    }
}

#[test]
fn parsing_twice_gives_identical_events() {
    for input in WELL_FORMED {
        let mut first = EventCollector::new();
        let mut second = EventCollector::new();
        parse(input.as_bytes(), &mut first).unwrap();
        parse(input.as_bytes(), &mut second).unwrap();
        assert_eq!(first.events(), second.events());
    }
}

#[test]
fn self_closing_tag_is_a_start_end_pair() {
    let (result, recorder) = record("<a/>");
    assert_eq!(result, Ok(ParseOutcome::Completed { element_count: 1 }));
    assert_eq!(
        recorder.calls,
        vec!["start_document", "start(a,[])", "end(a)", "end_document(1)"]
    );
}

#[test]
fn nested_document_event_sequence() {
    let (result, recorder) = record("<root><child attr=\"1\">hi</child></root>");
    assert!(result.is_ok());
    assert_eq!(
        recorder.calls,
        vec![
            "start_document",
            "start(root,[])",
            "start(child,[(attr,1)])",
            "text(hi)",
            "end(child)",
            "end(root)",
            "end_document(2)",
        ]
    );
}

#[test]
fn mismatched_end_tag_reports_error_without_end_document() {
    let (result, recorder) = record("<a><b></a>");
    let err = result.unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::MismatchedEndTag {
            expected: "b".into(),
            found: "a".into()
        }
    );
    assert_eq!(recorder.errors, vec![err]);
    assert!(!recorder.calls.iter().any(|c| c.starts_with("end_document")));
}

#[test]
fn unknown_entity_is_reported() {
    let (result, recorder) = record("<a>&unknown;</a>");
    let err = result.unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UnknownEntity {
            name: "unknown".into()
        }
    );
    assert_eq!(err.position.column, 4);
    assert_eq!(err.open_elements, vec!["a"]);
    assert_eq!(recorder.errors.len(), 1);
}

#[test]
fn duplicate_attribute_is_reported() {
    let (result, recorder) = record("<a x=\"1\" x=\"2\"/>");
    assert_eq!(
        result.unwrap_err().kind,
        ErrorKind::DuplicateAttribute { name: "x".into() }
    );
    // The start tag never completed
    assert_eq!(recorder.calls, vec!["start_document"]);
}

#[test]
fn text_is_delivered_before_an_error_in_the_next_markup() {
    let cases: &[(&str, &str)] = &[
        ("<a>hi</b>", "mismatched_end_tag"),
        ("<a>hi<b x=\"1\" x=\"2\"/></a>", "duplicate_attribute"),
        ("<a>hi<!-- x -- y --></a>", "malformed_markup"),
        ("<a>hi<?xml version=\"1.0\"?></a>", "malformed_markup"),
        ("<a>hi", "unbalanced_elements"),
    ];
    for (input, expected) in cases {
        let (result, recorder) = record(input);
        assert_eq!(result.unwrap_err().kind.name(), *expected, "{input}");
        assert_eq!(
            recorder.calls,
            vec!["start_document", "start(a,[])", "text(hi)"],
            "{input}"
        );
        assert_eq!(recorder.errors.len(), 1);
    }
}

#[test]
fn cancellation_in_start_element_stops_everything() {
    let mut recorder = Recorder {
        cancel_on_start: Some("b"),
        ..Recorder::default()
    };
    // The tail is malformed; cancellation must stop before reaching it
    let result = parse("<a><b>text</b><c></a>".as_bytes(), &mut recorder);
    assert_eq!(result, Ok(ParseOutcome::Cancelled));
    assert_eq!(
        recorder.calls,
        vec!["start_document", "start(a,[])", "start(b,[])"]
    );
    assert!(recorder.errors.is_empty());
}

#[test]
fn whitespace_between_siblings_is_delivered() {
    let (_, recorder) = record("<r>\n  <a/>\n  <b/>\n</r>");
    let texts: Vec<&str> = recorder
        .calls
        .iter()
        .filter(|c| c.starts_with("text("))
        .map(String::as_str)
        .collect();
    assert_eq!(texts, vec!["text(\n  )", "text(\n  )", "text(\n)"]);
}

#[test]
fn adjacent_text_and_references_coalesce() {
    let mut collector = EventCollector::new();
    parse("<p>a&lt;b&#62;c<![CDATA[&d]]>e</p>".as_bytes(), &mut collector).unwrap();
    let texts: Vec<&str> = collector.events().iter().filter_map(XmlEvent::as_text).collect();
    assert_eq!(texts, vec!["a<b>c&de"]);
}

#[test]
fn errors_are_fatal_and_typed() {
    let cases: &[(&str, &str)] = &[
        ("<a x=\"1>", "unterminated_attribute"),
        ("<a><b></b>", "unbalanced_elements"),
        ("<a/><b/>", "multiple_root_elements"),
        ("<a><1/></a>", "malformed_markup"),
        ("<a>x ]]> y</a>", "malformed_markup"),
        ("", "malformed_markup"),
    ];
    for (input, expected) in cases {
        let (result, recorder) = record(input);
        let err = result.unwrap_err();
        assert_eq!(err.kind.name(), *expected, "{input}");
        assert_eq!(recorder.errors.len(), 1);
        assert!(!recorder.calls.iter().any(|c| c.starts_with("end_document")));
    }
}
