//! End-to-end tests: event streams in, tag trees out

use std::path::PathBuf;

use indexmap::IndexMap;
use rstest::rstest;

use tagtree::application::{assemble, read_events, Event, TreeStats};
use tagtree::domain::{
    AssemblerOptions, DomainError, EventSink, HtmlTagKind, StackAssembler, Tag, TagArena,
    TextMode,
};
use tagtree::util::testing;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/events")
        .join(name)
}

fn no_attrs() -> IndexMap<String, String> {
    IndexMap::new()
}

fn assemble_default(events: Vec<Event>) -> Result<Tag<HtmlTagKind>, DomainError> {
    assemble(events, &AssemblerOptions::default())
}

// ============================================================
// Small documents
// ============================================================

#[test]
fn given_single_paragraph_when_assembled_then_root_carries_text() {
    testing::init_test_setup();
    let mut asm: StackAssembler = StackAssembler::new();

    asm.start_element("p", no_attrs()).unwrap();
    asm.characters("Hello").unwrap();
    asm.end_element("p").unwrap();
    let root = asm.finish().unwrap();

    assert_eq!(root.kind(), HtmlTagKind::P);
    assert_eq!(root.id(), 0);
    assert_eq!(root.text(), Some("Hello"));
    assert!(root.is_root());
    assert!(root.children().is_empty());
}

#[test]
fn given_nested_elements_when_assembled_then_structure_and_rendering_match() {
    let root = assemble_default(vec![
        Event::start("div", [("id", "x")]),
        Event::start("span", Vec::<(&str, &str)>::new()),
        Event::text("hi"),
        Event::end("span"),
        Event::end("div"),
    ])
    .unwrap();

    assert_eq!(root.kind(), HtmlTagKind::Div);
    assert_eq!(root.attribute("id"), Some("x"));
    let children = root.children();
    assert_eq!(children.len(), 1);
    let span = &children[0];
    assert_eq!(span.kind(), HtmlTagKind::Span);
    assert_eq!(span.text(), Some("hi"));
    assert!(span.parent().unwrap().same_node(&root));

    assert_eq!(
        root.render(3),
        "<div id=x>\n   <span>\n      hi\n   </span>\n</div>"
    );
    assert_eq!(root.to_string(), root.render(3));
}

#[rstest]
#[case("foo")]
#[case("my-widget")]
#[case("")]
fn given_unknown_element_name_when_assembled_then_kind_is_default(#[case] name: &str) {
    let root = assemble_default(vec![
        Event::start(name, Vec::<(&str, &str)>::new()),
        Event::end(name),
    ])
    .unwrap();

    assert_eq!(root.kind(), HtmlTagKind::Default);
}

#[rstest]
#[case("DIV")]
#[case("Div")]
#[case("div")]
fn given_element_name_in_any_case_when_assembled_then_kind_resolves(#[case] name: &str) {
    let root = assemble_default(vec![
        Event::start(name, Vec::<(&str, &str)>::new()),
        Event::end(name),
    ])
    .unwrap();

    assert_eq!(root.kind(), HtmlTagKind::Div);
}

#[test]
fn given_element_without_text_when_assembled_then_text_is_empty() {
    let root = assemble_default(vec![
        Event::start("br", Vec::<(&str, &str)>::new()),
        Event::end("br"),
    ])
    .unwrap();

    assert_eq!(root.text(), Some(""));
    assert_eq!(root.render(3), "<br>\n</br>");
}

// ============================================================
// Malformed streams
// ============================================================

#[test]
fn given_close_on_empty_stack_when_assembling_then_fails_with_malformed_input() {
    let mut asm: StackAssembler = StackAssembler::new();

    let result = asm.end_element("p");

    assert!(matches!(result, Err(DomainError::MalformedInput(_))));
    assert!(asm.is_aborted());
    assert_eq!(asm.open_elements(), 0);
}

#[test]
fn given_second_root_when_assembling_then_fails_with_malformed_input() {
    let result = assemble_default(vec![
        Event::start("p", Vec::<(&str, &str)>::new()),
        Event::end("p"),
        Event::start("p", Vec::<(&str, &str)>::new()),
        Event::end("p"),
    ]);

    assert!(matches!(result, Err(DomainError::MalformedInput(_))));
}

#[test]
fn given_empty_stream_when_finishing_then_fails_with_malformed_input() {
    let result = assemble_default(Vec::new());
    assert!(matches!(result, Err(DomainError::MalformedInput(_))));
}

#[test]
fn given_strict_options_when_close_mismatches_then_fails() {
    let options = AssemblerOptions {
        strict_end_tags: true,
        ..AssemblerOptions::default()
    };
    let result = assemble::<HtmlTagKind>(
        vec![
            Event::start("ul", Vec::<(&str, &str)>::new()),
            Event::end("ol"),
        ],
        &options,
    );

    assert!(matches!(result, Err(DomainError::MalformedInput(_))));
}

// ============================================================
// Deep documents
// ============================================================

#[test]
fn given_document_nested_100_000_levels_when_assembled_then_stats_and_render_succeed() {
    let levels = 100_000;
    let mut events: Vec<Event> = (0..levels)
        .map(|_| Event::start("div", Vec::<(&str, &str)>::new()))
        .collect();
    events.push(Event::text("bottom"));
    events.extend((0..levels).map(|_| Event::end("div")));

    let root = assemble_default(events).unwrap();
    let stats = TreeStats::collect(&root);
    let rendered = root.render(0);

    assert_eq!(stats.nodes, levels);
    assert_eq!(stats.depth, levels);
    assert_eq!(stats.leaves, 1);
    assert_eq!(rendered.lines().count(), 2 * levels + 1);
    assert!(rendered.starts_with("<div>\n<div>"));
    assert!(rendered.contains("<div>\nbottom\n</div>"));
    assert!(rendered.ends_with("</div>\n</div>"));
}

// ============================================================
// Options
// ============================================================

#[test]
fn given_append_mode_when_text_is_chunked_then_chunks_are_joined() {
    let options = AssemblerOptions {
        text_mode: TextMode::Append,
        ..AssemblerOptions::default()
    };
    let root = assemble::<HtmlTagKind>(
        vec![
            Event::start("p", Vec::<(&str, &str)>::new()),
            Event::text("First "),
            Event::text("paragraph."),
            Event::end("p"),
        ],
        &options,
    )
    .unwrap();

    assert_eq!(root.text(), Some("First paragraph."));
}

#[test]
fn given_shared_arena_when_assembling_two_documents_then_both_live_in_it() {
    let arena: TagArena = TagArena::new();
    let mut roots = Vec::new();
    for name in ["p", "div"] {
        let mut asm = StackAssembler::in_arena(arena.clone(), AssemblerOptions::default());
        asm.start_element(name, no_attrs()).unwrap();
        asm.end_element(name).unwrap();
        roots.push(asm.finish().unwrap());
    }

    assert_eq!(arena.len(), 2);
    assert!(roots.iter().all(|r| r.arena().same_arena(&arena)));
}

// ============================================================
// Recorded event files
// ============================================================

#[test]
fn given_stylesheet_link_when_assembled_then_attributes_keep_order_and_values() {
    testing::init_test_setup();
    let events = read_events(&fixture("stylesheet_link.jsonl")).unwrap();
    let root = assemble_default(events).unwrap();

    let head = root.children()[0].clone();
    let link = head.children()[0].clone();
    assert_eq!(head.kind(), HtmlTagKind::Head);
    assert_eq!(link.kind(), HtmlTagKind::Link);
    assert_eq!(link.attribute("rel"), Some("stylesheet"));
    assert_eq!(link.attribute("type"), Some("text/css"));
    assert_eq!(
        link.attribute("href"),
        Some("//cdn.sstatic.net/stackoverflow/all.css?v=fd40bcfb3c2e")
    );
    let keys: Vec<_> = link.attributes().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["rel", "type", "href"]);
}

#[test]
fn given_article_when_assembled_then_stats_describe_shape() {
    let events = read_events(&fixture("article.jsonl")).unwrap();
    let root = assemble_default(events).unwrap();

    let stats = TreeStats::collect(&root);

    assert_eq!(
        stats,
        TreeStats {
            nodes: 8,
            depth: 4,
            leaves: 5,
            max_children: 4,
            unknown: 1,
        }
    );
    let ids: Vec<_> = root.descendants().map(|t| t.id()).collect();
    assert_eq!(ids, (0..8).collect::<Vec<u64>>());
    let texts: Vec<_> = root
        .leaves()
        .iter()
        .map(|t| t.text().unwrap_or_default().to_string())
        .collect();
    assert_eq!(texts, vec!["Alignment", "First paragraph.", "legacy", "one", "two"]);
}

#[test]
fn given_unclosed_document_when_assembled_then_fails_with_malformed_input() {
    let events = read_events(&fixture("unclosed.jsonl")).unwrap();

    let result = assemble_default(events);

    match result {
        Err(DomainError::MalformedInput(msg)) => assert!(msg.contains("unclosed"), "{msg}"),
        other => panic!("expected MalformedInput, got {other:?}"),
    }
}

#[test]
fn given_missing_event_file_when_reading_then_fails_with_io_error() {
    let result = read_events(&fixture("does_not_exist.jsonl"));
    assert!(matches!(
        result,
        Err(tagtree::application::ApplicationError::Io { .. })
    ));
}
