use std::time::Duration;

use perfalg_model::{Concurrency, Rate, Repetition};

use super::parse;
use crate::{
    error::GrammarError,
    sequence::Sequence,
    testing::{Journal, registry, run_data},
};

fn ok(text: &str) -> Sequence {
    let run = run_data(&[("content.source.forever", "false")]);
    parse(text, &registry(&Journal::default()), &run).unwrap()
}

fn err(text: &str) -> GrammarError {
    let run = run_data(&[("content.source.forever", "false")]);
    parse(text, &registry(&Journal::default()), &run).unwrap_err()
}

fn seq(node: &crate::node::Node) -> &Sequence {
    node.as_sequence().expect("sequence")
}

#[test]
fn serial_and_parallel_with_modifiers() {
    let root = ok("{ A B }:3 [ C D ]:2::10/min");
    assert_eq!(root.concurrency(), Concurrency::Serial);
    assert_eq!(root.children().len(), 2);

    let first = seq(&root.children()[0]);
    assert_eq!(first.concurrency(), Concurrency::Serial);
    assert_eq!(first.repetition(), Repetition::Count(3));
    let names: Vec<String> = first.children().iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["A", "B"]);

    let second = seq(&root.children()[1]);
    assert_eq!(second.concurrency(), Concurrency::Parallel);
    assert_eq!(second.repetition(), Repetition::Count(2));
    assert_eq!(second.rate(), Some(Rate::per_min(10)));
    assert_eq!(second.children().len(), 2);
}

#[test]
fn labels_params_and_flags() {
    let root = ok(r#"{ "Populate" A Param(docs, 10) -B }:2>"#);
    assert_eq!(root.label(), Some("Populate"));
    assert!(root.no_child_report());
    assert_eq!(root.name(), "Populate_2");

    let param = root.children()[1].as_task().unwrap();
    assert_eq!(param.params(), Some("docs, 10"));
    assert_eq!(param.name(), "Param(docs, 10)");

    let b = root.children()[2].as_task().unwrap();
    assert!(b.disable_counting());
    assert_eq!(b.name(), "B");
}

#[test]
fn nested_params_keep_balanced_span() {
    let root = ok("Param(f(x), (y))");
    let task = root.children()[0].as_task().unwrap();
    assert_eq!(task.params(), Some("f(x), (y)"));
}

#[test]
fn empty_params_are_ignored() {
    let root = ok("A()");
    assert_eq!(root.children()[0].as_task().unwrap().params(), None);
}

#[test]
fn duration_and_exhaust() {
    let root = ok("{ A }:2.5s { Read }:*");
    assert_eq!(
        seq(&root.children()[0]).repetition(),
        Repetition::For(Duration::from_millis(2500))
    );
    assert_eq!(
        ok("{ A }:0.0001s").repetition(),
        Repetition::For(Duration::from_micros(100))
    );
    assert_eq!(
        ok("{ A }:1.0005s").repetition(),
        Repetition::For(Duration::from_micros(1_000_500))
    );
    assert_eq!(ok("{ A }:.5s").name(), "Seq_0.5s");
    assert!(err("{ A }:1.2.3s").message.contains("invalid duration"));

    let exhaust = seq(&root.children()[1]);
    assert_eq!(exhaust.repetition(), Repetition::UntilExhausted);
    assert_eq!(exhaust.name(), "Seq_Exhaust");
}

#[test]
fn bare_task_repetition_wraps() {
    let root = ok("Add:3");
    assert_eq!(root.repetition(), Repetition::Count(3));
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].name(), "Add");
    assert_eq!(root.to_string(), "{ Add }:3");
}

#[test]
fn rate_defaults_to_seconds() {
    let root = ok("{ A }:4::2");
    assert_eq!(root.rate(), Some(Rate::per_sec(2)));
    assert_eq!(root.name(), "Seq_4_2/sec");
}

#[test]
fn parallel_name_gets_suffix() {
    let root = ok(r#"[ "Searchers" A ]:4"#);
    assert_eq!(root.name(), "Searchers_4_Par");
    let root = ok(r#"[ "ParSearch" A ]:4"#);
    assert_eq!(root.name(), "ParSearch_4");
}

#[test]
fn comments_and_whitespace() {
    let root = ok("# setup\n{ A # first\n  B\n}:2 # done\n");
    assert_eq!(root.children().len(), 2);
    assert_eq!(root.repetition(), Repetition::Count(2));
}

#[test]
fn collapse_stops_at_label_and_modifiers() {
    let root = ok("{ { { A } } }");
    assert_eq!(root.children()[0].name(), "A");

    let root = ok(r#"{ "Outer" { A } }"#);
    assert_eq!(root.label(), Some("Outer"));

    let root = ok("{ { A }:2 }");
    assert_eq!(root.repetition(), Repetition::Count(2));

    let root = ok("{ { A } }:2");
    assert_eq!(root.repetition(), Repetition::Count(2));
    assert!(root.children()[0].as_sequence().is_some());
}

#[test]
fn depths_follow_nesting() {
    let root = ok("{ A { B [ C ] } }");
    assert_eq!(root.depth(), 0);
    let inner = seq(&root.children()[1]);
    assert_eq!(inner.depth(), 1);
    assert_eq!(inner.children()[0].depth(), 2);
    assert_eq!(seq(&inner.children()[1]).children()[0].depth(), 3);
}

#[test]
fn grammar_errors() {
    let cases = [
        ("{ A }}", "unmatched closing"),
        ("{ A ", "unmatched opening"),
        ("{ A ]", "expected '}'"),
        ("{ A }::5", "rate requires"),
        ("[ A ]:*", "not allowed on a parallel"),
        ("[ A ]:3s", "duration is not allowed"),
        ("{ Nope }", "unknown task"),
        ("A(x)", "bad parameters"),
        ("{ A }:2:3", "repetition already set"),
        ("{ A }:x", "expected repetition"),
        ("{ A }:1.5", "invalid repetition count"),
        ("{ A }:2::0", "greater than zero"),
        ("{ A }:2::5/hour", "rate unit"),
        (":3", "without a preceding"),
        ("{ \"\" A }", "empty sequence label"),
        ("{ \"open A }", "unterminated sequence label"),
        ("Param(x", "unterminated parameter"),
        ("A >", "'>' must follow"),
        ("A:2 - { B }", "'-' must precede"),
        ("{ A } \"x\"", "label must follow"),
    ];
    for (text, want) in cases {
        let e = err(text);
        assert!(
            e.message.contains(want),
            "{text:?}: got {:?}, want {want:?}",
            e.message
        );
    }
}

#[test]
fn exhaust_rejected_while_source_runs_forever() {
    let run = run_data(&[]);
    let e = parse("{ Read }:*", &registry(&Journal::default()), &run).unwrap_err();
    assert!(e.message.contains("content.source.forever"));
}

#[test]
fn error_reports_position() {
    let e = err("{ A }\n  { B }}\n");
    assert_eq!((e.line, e.column), (2, 8));
    assert_eq!(e.near, "}");
}

#[test]
fn canonical_rendering() {
    let root = ok(r#"{ "label" A Param(x) -C }:3::10/min>"#);
    assert_eq!(root.to_string(), r#"{ "label" A Param(x) -C }:3::10/min>"#);

    let root = ok("{ A }::5/sec".replace("::", ":1::").as_str());
    assert_eq!(root.to_string(), "{ A }:1::5/sec");
}

#[test]
fn rendering_round_trips() {
    let texts = [
        "{ A B }:3 [ C D ]:2::10/min",
        r#"{ "Rounds" { "Populate" -A Param(a=1) }:2.5s> [ B C ]:4 { Read }:* NewRound }:3"#,
        "{ A { B { C }:2 } [ D ] }",
        "Add:3 Search",
        "{ A }:0.0001s",
        "{ A }:1.0005s B",
    ];
    let texts = texts.map(|t| t.replace("NewRound", "D"));
    for text in &texts {
        let first = ok(text);
        let rendered = first.to_string();
        let second = ok(&rendered);
        assert_eq!(second.to_string(), rendered, "{text}");

        let mut a = Vec::new();
        let mut b = Vec::new();
        first.describe_into(&mut a);
        second.describe_into(&mut b);
        assert_eq!(a, b, "{text}");
    }
}
