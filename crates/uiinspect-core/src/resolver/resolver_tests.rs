use super::*;
use std::thread;
use std::time::Instant;

use uiinspect_backend_snapshot::{SnapshotDocument, SnapshotNode, SnapshotTree};
use uiinspect_protocols::{Attribute, BackendKind};

use crate::selector::SelectorLevel;
use crate::synthesizer::Synthesizer;

fn calculator() -> SnapshotTree {
    SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane").with_name("Desktop").with_children([
            SnapshotNode::new("Window").with_name("Notes"),
            SnapshotNode::new("Window").with_name("Calc").with_children([
                SnapshotNode::new("Pane").with_class("Display").with_child(
                    SnapshotNode::new("Text").with_name("0"),
                ),
                SnapshotNode::new("Pane").with_class("Keypad").with_children([
                    SnapshotNode::new("Button").with_name("7").with_states(["visible"]),
                    SnapshotNode::new("Button").with_name("8"),
                    SnapshotNode::new("Button").with_name("OK").with_class("X"),
                    SnapshotNode::new("Button").with_name("OK").with_class("Y"),
                    SnapshotNode::new("Button").with_name("OK").with_class("X"),
                ]),
            ]),
        ]),
    )
}

fn quick() -> ResolveOptions {
    ResolveOptions {
        poller: Poller::new(Duration::from_millis(50), Duration::from_millis(10)),
        visible_only: false,
    }
}

fn level(tag: &str, attribute: Attribute, value: &str) -> SelectorLevel {
    SelectorLevel::new(tag).with_attribute(attribute, value)
}

#[test]
fn test_every_synthesized_selector_resolves_to_its_element() {
    let tree = calculator();
    let resolver = Resolver::with_options(&tree, quick());
    let synthesizer = Synthesizer::new(&tree);
    let paths: &[&[usize]] = &[&[0], &[1], &[1, 0], &[1, 0, 0], &[1, 1], &[1, 1, 0], &[1, 1, 2], &[1, 1, 4]];

    for path in paths {
        let target = tree.node_at_path(path).unwrap();
        let selector = synthesizer.synthesize(&target).unwrap().selector();
        let found = resolver.resolve(&tree.root_id(), &selector).unwrap();
        assert_eq!(found, target, "path {:?}", path);
    }
}

#[test]
fn test_resolution_through_text() {
    let tree = calculator();
    let target = tree.node_at_path(&[1, 1, 4]).unwrap();
    let dialect = BackendKind::WindowManager.dialect();
    let text = Synthesizer::new(&tree)
        .synthesize(&target)
        .unwrap()
        .selector()
        .to_text(dialect)
        .unwrap();
    assert!(text.ends_with("<Button name='OK' cls='X' idx=2 depth=1>"));

    let found = Resolver::with_options(&tree, quick())
        .resolve_text(&tree.root_id(), &text)
        .unwrap();
    assert_eq!(found, target);
}

#[test]
fn test_depth_accounting() {
    let tree = calculator();
    let selector = Selector::new(vec![
        level("Window", Attribute::Name, "Calc"),
        level("Pane", Attribute::ClassName, "Keypad"),
        level("Button", Attribute::Name, "8"),
    ])
    .unwrap();

    let root = tree.root_id();
    let found = Resolver::new(&tree).find_once(&root, &selector).unwrap();
    assert_eq!(tree.depth(&found).unwrap(), tree.depth(&root).unwrap() + 3);
}

#[test]
fn test_relative_depth_is_exact() {
    let tree = calculator();
    // The button sits three levels below the desktop, not two.
    let selector = Selector::new(vec![
        level("Button", Attribute::Name, "7").with_relative_depth(2),
    ])
    .unwrap();
    let result = Resolver::new(&tree).find_once(&tree.root_id(), &selector);
    assert!(matches!(result, Err(ResolveError::NotFound(_))));

    let selector = Selector::new(vec![
        level("Button", Attribute::Name, "7").with_relative_depth(3),
    ])
    .unwrap();
    assert!(Resolver::new(&tree).find_once(&tree.root_id(), &selector).is_ok());
}

#[test]
fn test_zero_relative_depth_searches_whole_subtree() {
    let tree = calculator();
    let selector = Selector::new(vec![
        level("Window", Attribute::Name, "Calc"),
        level("Text", Attribute::Name, "0").with_relative_depth(0),
    ])
    .unwrap();
    let found = Resolver::new(&tree).find_once(&tree.root_id(), &selector).unwrap();
    assert_eq!(Some(found), tree.node_at_path(&[1, 0, 0]));
}

#[test]
fn test_missing_occurrence_is_not_found() {
    let tree = calculator();
    let selector = Selector::new(vec![
        level("Window", Attribute::Name, "Calc"),
        level("Pane", Attribute::ClassName, "Keypad"),
        level("Button", Attribute::Name, "7").with_occurrence_index(2),
    ])
    .unwrap();

    let err = Resolver::new(&tree)
        .find_once(&tree.root_id(), &selector)
        .unwrap_err();
    match err {
        ResolveError::NotFound(failure) => {
            assert_eq!(failure.level, 3);
            assert_eq!(failure.matches, 1);
            assert_eq!(failure.required, 2);
            assert_eq!(failure.path.len(), 2);
            assert!(failure.path[0].contains("Calc"));
        }
        other => panic!("expected not found, got {:?}", other),
    }
}

#[test]
fn test_missing_element_times_out() {
    let tree = calculator();
    let selector = Selector::new(vec![level("Window", Attribute::Name, "Paint")]).unwrap();
    let timeout = Duration::from_millis(80);
    let interval = Duration::from_millis(20);
    let resolver = Resolver::with_options(
        &tree,
        ResolveOptions {
            poller: Poller::new(timeout, interval),
            visible_only: false,
        },
    );

    let start = Instant::now();
    let err = resolver.resolve(&tree.root_id(), &selector).unwrap_err();
    let elapsed = start.elapsed();

    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + interval + Duration::from_millis(200));
    assert!(matches!(err, ResolveError::Timeout { .. }));
    assert!(matches!(err.root_cause(), ResolveError::NotFound(_)));
    assert_eq!(err.level(), Some(1));
}

#[test]
fn test_element_appearing_later_is_found() {
    let tree = calculator();
    let keypad = tree.node_at_path(&[1, 1]).unwrap();
    let selector = Selector::new(vec![
        level("Window", Attribute::Name, "Calc"),
        level("Pane", Attribute::ClassName, "Keypad"),
        level("Button", Attribute::Name, "9"),
    ])
    .unwrap();
    let resolver = Resolver::with_options(
        &tree,
        ResolveOptions {
            poller: Poller::new(Duration::from_secs(5), Duration::from_millis(10)),
            visible_only: false,
        },
    );

    let found = thread::scope(|scope| {
        scope.spawn(|| {
            thread::sleep(Duration::from_millis(50));
            tree.append_child(keypad, SnapshotNode::new("Button").with_name("9"))
                .unwrap();
        });
        resolver.resolve(&tree.root_id(), &selector)
    })
    .unwrap();
    assert_eq!(tree.name(&found).unwrap(), "9");
}

#[test]
fn test_stale_root_is_terminal() {
    let tree = calculator();
    let window = tree.node_at_path(&[1]).unwrap();
    tree.remove(window).unwrap();

    let selector = Selector::new(vec![level("Pane", Attribute::ClassName, "Keypad")]).unwrap();
    let start = Instant::now();
    let err = Resolver::new(&tree).resolve(&window, &selector).unwrap_err();

    // Default timeout is a minute; a stale root fails at once.
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(matches!(err, ResolveError::Stale(StaleFailure { level: 1, .. })));
}

#[test]
fn test_resolve_text_syntax_error_not_retried() {
    let tree = calculator();
    let start = Instant::now();
    let err = Resolver::new(&tree)
        .resolve_text(&tree.root_id(), "<Button name='OK' depth=>")
        .unwrap_err();
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(matches!(err, ResolveError::Selector(SelectorError::Syntax { line: 1, .. })));
}

#[test]
fn test_invalid_regex_is_terminal() {
    let tree = calculator();
    let selector = Selector::new(vec![
        SelectorLevel::new("Window").with_attribute(Attribute::RegexName, "(Calc"),
    ])
    .unwrap();
    let err = Resolver::new(&tree)
        .resolve(&tree.root_id(), &selector)
        .unwrap_err();
    assert!(matches!(err, ResolveError::Selector(SelectorError::InvalidRegex { .. })));

    let err = Resolver::new(&tree)
        .find_once(&tree.root_id(), &selector)
        .unwrap_err();
    assert!(matches!(err, ResolveError::Selector(SelectorError::InvalidRegex { .. })));
    assert_eq!(tree.children_calls(), 0);
}

#[test]
fn test_regex_name_resolution() {
    let tree = calculator();
    let selector = Selector::new(vec![
        SelectorLevel::new("Window").with_attribute(Attribute::RegexName, "Ca"),
    ])
    .unwrap();
    let found = Resolver::new(&tree).find_once(&tree.root_id(), &selector).unwrap();
    assert_eq!(Some(found), tree.node_at_path(&[1]));
}

#[test]
fn test_exists() {
    let tree = calculator();
    let resolver = Resolver::new(&tree);
    let root = tree.root_id();
    let present = Selector::new(vec![level("Window", Attribute::Name, "Notes")]).unwrap();
    let absent = Selector::new(vec![level("Window", Attribute::Name, "Paint")]).unwrap();

    assert!(resolver.exists(&root, &present, Duration::ZERO).unwrap());
    assert!(!resolver.exists(&root, &absent, Duration::from_millis(20)).unwrap());
}

#[test]
fn test_exists_propagates_retried_staleness() {
    let tree = calculator();
    let window = tree.node_at_path(&[1]).unwrap();
    tree.remove(window).unwrap();

    let options = ResolveOptions {
        poller: Poller::new(Duration::from_millis(30), Duration::from_millis(10))
            .with_retry_on_stale(true),
        visible_only: false,
    };
    let selector = Selector::new(vec![level("Pane", Attribute::ClassName, "Keypad")]).unwrap();
    let err = Resolver::with_options(&tree, options)
        .exists(&window, &selector, Duration::from_millis(30))
        .unwrap_err();

    assert!(matches!(err, ResolveError::Timeout { .. }));
    assert!(matches!(err.root_cause(), ResolveError::Stale(StaleFailure { level: 1, .. })));
}

#[test]
fn test_visible_only_option() {
    let tree = calculator();
    let selector = Selector::new(vec![level("Button", Attribute::Name, "7").with_relative_depth(0)])
        .unwrap();
    let visible_only = ResolveOptions {
        visible_only: true,
        ..quick()
    };

    // The windows above the button carry no visible state.
    let resolver = Resolver::with_options(&tree, visible_only);
    assert!(!resolver.exists(&tree.root_id(), &selector, Duration::ZERO).unwrap());
    assert!(Resolver::new(&tree).find_once(&tree.root_id(), &selector).is_ok());
}

#[test]
fn test_element_at() {
    let tree = SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane")
            .with_bounds(0, 0, 100, 100)
            .with_child(SnapshotNode::new("Button").with_name("Go").with_bounds(10, 10, 20, 20)),
    );
    let resolver = Resolver::new(&tree);

    let hit = resolver.element_at(Point::new(15, 15)).unwrap();
    assert_eq!(tree.name(&hit).unwrap(), "Go");

    let err = resolver.element_at(Point::new(500, 500)).unwrap_err();
    assert!(matches!(err, ResolveError::NotFound(_)));
    assert!(err.to_string().contains("point (500, 500)"));
}

fn editor() -> SnapshotTree {
    let document = SnapshotDocument::new(
        BackendKind::AccessBridge,
        SnapshotNode::new("frame")
            .with_name("Editor")
            .with_handle(7)
            .with_child(SnapshotNode::new("panel").with_children([
                SnapshotNode::new("push button").with_name("OK"),
                SnapshotNode::new("push button").with_name("OK"),
            ])),
    )
    .with_desktop_windows([7]);
    SnapshotTree::new(document)
}

#[test]
fn test_access_bridge_window_level_matches_root() {
    let tree = editor();
    let target = tree.node_at_path(&[0, 1]).unwrap();
    let text = "<java role='frame' name='Editor' depth=3>\n\
                <java role='panel' depth=2>\n\
                <java role='push button' name='OK' idx=2 depth=1>";

    let found = Resolver::with_options(&tree, quick())
        .resolve_text(&tree.root_id(), text)
        .unwrap();
    assert_eq!(found, target);
}

#[test]
fn test_access_bridge_wrong_window() {
    let tree = editor();
    let text = "<java role='frame' name='Other' depth=2>\n<java role='panel' depth=1>";
    let err = Resolver::with_options(&tree, quick())
        .resolve_text(&tree.root_id(), text)
        .map(|_| ())
        .unwrap_err();
    // Parsed fine, so the failure comes from the tree and is retried to timeout.
    assert_eq!(err.level(), Some(1));
}

#[test]
fn test_renamed_target_no_longer_matches() {
    let tree = calculator();
    let seven = tree.node_at_path(&[1, 1, 0]).unwrap();
    let selector = Synthesizer::new(&tree).synthesize(&seven).unwrap().selector();
    let resolver = Resolver::with_options(&tree, quick());

    tree.set_name(seven, "Seven").unwrap();
    let err = resolver.find_once(&tree.root_id(), &selector).unwrap_err();
    assert_eq!(err.level(), Some(selector.len()));

    tree.set_name(seven, "7").unwrap();
    assert_eq!(resolver.find_once(&tree.root_id(), &selector).unwrap(), seven);
}
