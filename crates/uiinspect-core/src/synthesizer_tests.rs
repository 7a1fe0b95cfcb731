use super::*;
use uiinspect_backend_snapshot::{SnapshotDocument, SnapshotNode, SnapshotTree};
use uiinspect_protocols::{AccessError, Attribute, BackendKind};

fn calculator() -> SnapshotTree {
    SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane").with_name("Desktop").with_child(
            SnapshotNode::new("Window").with_name("Calc").with_child(
                SnapshotNode::new("Pane").with_class("Keypad").with_children([
                    SnapshotNode::new("Button").with_name("7"),
                    SnapshotNode::new("Button").with_name("8"),
                ]),
            ),
        ),
    )
}

#[test]
fn test_calculator_levels() {
    let tree = calculator();
    let seven = tree.node_at_path(&[0, 0, 0]).unwrap();
    let synthesis = Synthesizer::new(&tree).synthesize(&seven).unwrap();

    let text = synthesis
        .selector()
        .to_text(BackendKind::WindowManager.dialect())
        .unwrap();
    assert_eq!(
        text,
        "<Window name='Calc' depth=3>\n<Pane cls='Keypad' depth=2>\n<Button name='7' depth=1>"
    );
}

#[test]
fn test_occurrence_ranks_among_matches_only() {
    let tree = SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane").with_children([
            SnapshotNode::new("Button").with_name("OK").with_class("X"),
            SnapshotNode::new("Button").with_name("OK").with_class("Y"),
            SnapshotNode::new("Button").with_name("OK").with_class("X"),
            SnapshotNode::new("Button").with_name("OK").with_class("X"),
        ]),
    );
    let target = tree.node_at_path(&[2]).unwrap();
    let synthesis = Synthesizer::new(&tree).synthesize(&target).unwrap();

    // The only level is the outermost, so look at the raw entry.
    let entry = &synthesis.levels()[0];
    assert_eq!(entry.level.attribute(Attribute::Name), Some("OK"));
    assert_eq!(entry.level.attribute(Attribute::ClassName), Some("X"));
    assert_eq!(entry.position, Some(2));
}

#[test]
fn test_occurrence_index_counts_indistinct_siblings() {
    let tree = SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane").with_child(SnapshotNode::new("Pane").with_children([
            SnapshotNode::new("Button").with_name("OK").with_class("X"),
            SnapshotNode::new("Button").with_name("OK").with_class("Y"),
            SnapshotNode::new("Button").with_name("OK").with_class("X"),
            SnapshotNode::new("Button").with_name("OK").with_class("X"),
        ])),
    );
    let target = tree.node_at_path(&[0, 2]).unwrap();
    let synthesis = Synthesizer::new(&tree).synthesize(&target).unwrap();

    let level = &synthesis.levels()[1].level;
    assert_eq!(level.occurrence_index, 2);
    assert_eq!(level.attributes.len(), 2);
}

#[test]
fn test_different_tags_do_not_count() {
    let tree = SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane").with_child(SnapshotNode::new("Pane").with_children([
            SnapshotNode::new("Text").with_name("OK"),
            SnapshotNode::new("Button").with_name("OK"),
        ])),
    );
    let target = tree.node_at_path(&[0, 1]).unwrap();
    let synthesis = Synthesizer::new(&tree).synthesize(&target).unwrap();

    let level = &synthesis.levels()[1].level;
    assert_eq!(level.occurrence_index, 1);
    assert_eq!(level.attributes.len(), 1);
}

#[test]
fn test_relative_depths_are_one() {
    let tree = calculator();
    let seven = tree.node_at_path(&[0, 0, 0]).unwrap();
    let selector = Synthesizer::new(&tree).synthesize(&seven).unwrap().selector();
    assert!(selector.levels().iter().all(|level| level.relative_depth == 1));
    assert_eq!(selector.total_depth() as usize, tree.depth(&seven).unwrap());
}

#[test]
fn test_default_check_marks() {
    let tree = SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane").with_child(
            SnapshotNode::new("Window").with_name("App").with_child(
                SnapshotNode::new("Pane").with_name("Outer").with_children([
                    SnapshotNode::new("Pane")
                        .with_name("Sidebar")
                        .with_child(SnapshotNode::new("Text")),
                    SnapshotNode::new("Pane").with_name("Main").with_child(
                        SnapshotNode::new("Group")
                            .with_name("Form")
                            .with_child(SnapshotNode::new("Edit").with_name("Email")),
                    ),
                ]),
            ),
        ),
    );
    let email = tree.node_at_path(&[0, 0, 1, 0, 0]).unwrap();
    let synthesis = Synthesizer::new(&tree).synthesize(&email).unwrap();

    // Window, Outer, Main (sibling Sidebar has children), Form, Email.
    assert_eq!(synthesis.default_mask(), vec![true, false, true, false, true]);
    assert!(synthesis.levels()[2].sibling_has_children);
    assert_eq!(synthesis.levels()[2].position, Some(1));
}

#[test]
fn test_outermost_index_normalized() {
    let tree = SnapshotTree::from_root(
        BackendKind::WindowManager,
        SnapshotNode::new("Pane").with_children([
            SnapshotNode::new("Window").with_name("Notepad"),
            SnapshotNode::new("Window")
                .with_name("Notepad")
                .with_child(SnapshotNode::new("Edit")),
        ]),
    );
    let edit = tree.node_at_path(&[1, 0]).unwrap();
    let synthesis = Synthesizer::new(&tree).synthesize(&edit).unwrap();
    assert_eq!(synthesis.levels()[0].level.occurrence_index, 1);
    assert_eq!(synthesis.levels()[0].position, Some(1));
}

#[test]
fn test_access_bridge_includes_window_level() {
    let document = SnapshotDocument::new(
        BackendKind::AccessBridge,
        SnapshotNode::new("frame")
            .with_name("Editor")
            .with_handle(0x42)
            .with_child(SnapshotNode::new("panel").with_children([
                SnapshotNode::new("push button").with_name("OK"),
                SnapshotNode::new("push button").with_name("OK"),
            ])),
    )
    .with_desktop_windows([0x10, 0x42]);
    let tree = SnapshotTree::new(document);
    let second = tree.node_at_path(&[0, 1]).unwrap();
    let synthesis = Synthesizer::new(&tree).synthesize(&second).unwrap();

    assert_eq!(synthesis.len(), 3);
    assert_eq!(synthesis.levels()[0].position, Some(1));
    let text = synthesis
        .selector()
        .to_text(BackendKind::AccessBridge.dialect())
        .unwrap();
    assert_eq!(
        text,
        "<java role='frame' name='Editor' depth=3>\n\
         <java role='panel' depth=2>\n\
         <java role='push button' name='OK' idx=2 depth=1>"
    );
}

#[test]
fn test_access_bridge_unknown_window_handle() {
    let tree = SnapshotTree::from_root(
        BackendKind::AccessBridge,
        SnapshotNode::new("frame").with_name("Editor"),
    );
    let synthesis = Synthesizer::new(&tree).synthesize(&tree.root_id()).unwrap();
    assert_eq!(synthesis.len(), 1);
    assert_eq!(synthesis.levels()[0].position, None);
}

#[test]
fn test_round_trip_of_synthesized_selector() {
    let tree = calculator();
    let eight = tree.node_at_path(&[0, 0, 1]).unwrap();
    let selector = Synthesizer::new(&tree).synthesize(&eight).unwrap().selector();
    let dialect = BackendKind::WindowManager.dialect();
    let text = selector.to_text(dialect).unwrap();
    assert_eq!(Selector::parse(&text, dialect).unwrap(), selector);
}

#[test]
fn test_root_has_no_levels() {
    let tree = calculator();
    let result = Synthesizer::new(&tree).synthesize(&tree.root_id());
    assert_eq!(result, Err(SynthesisError::NoLevels("Pane".to_string())));
}

#[test]
fn test_stale_target_aborts() {
    let tree = calculator();
    let keypad = tree.node_at_path(&[0, 0]).unwrap();
    let seven = tree.node_at_path(&[0, 0, 0]).unwrap();
    tree.remove(keypad).unwrap();

    let result = Synthesizer::new(&tree).synthesize(&seven);
    assert!(matches!(
        result,
        Err(SynthesisError::Access(AccessError::Stale(_)))
    ));
}
