//! Property tables for display.

use std::fmt;

use uiinspect_protocols::{AccessResult, BackendKind, ElementAccess};

#[derive(Debug, Clone, Copy)]
enum Field {
    Role,
    AutomationId,
    Name,
    Secondary,
    Depth,
    States,
    Bounds,
}

const WINDOW_MANAGER_FIELDS: &[(&str, Field)] = &[
    ("Control Type", Field::Role),
    ("AutomationId", Field::AutomationId),
    ("Name", Field::Name),
    ("Cls", Field::Secondary),
    ("Depth", Field::Depth),
    ("States", Field::States),
    ("Bounds", Field::Bounds),
];

const ACCESS_BRIDGE_FIELDS: &[(&str, Field)] = &[
    ("Role", Field::Role),
    ("Name", Field::Name),
    ("Description", Field::Secondary),
    ("Depth", Field::Depth),
    ("States", Field::States),
    ("Bounds", Field::Bounds),
];

/// Ordered label/value rows describing one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementProperties {
    rows: Vec<(&'static str, String)>,
}

impl ElementProperties {
    pub fn collect<A: ElementAccess + ?Sized>(
        access: &A,
        element: &A::Element,
    ) -> AccessResult<Self> {
        let fields = match access.dialect().kind {
            BackendKind::WindowManager => WINDOW_MANAGER_FIELDS,
            BackendKind::AccessBridge => ACCESS_BRIDGE_FIELDS,
        };

        let mut rows = Vec::with_capacity(fields.len());
        for (label, field) in fields {
            let value = match field {
                Field::Role => access.role(element)?,
                Field::AutomationId => access.automation_id(element)?.unwrap_or_default(),
                Field::Name => access.name(element)?,
                Field::Secondary => access.secondary_id(element)?,
                Field::Depth => access.depth(element)?.to_string(),
                Field::States => access
                    .states(element)?
                    .into_iter()
                    .collect::<Vec<_>>()
                    .join(", "),
                Field::Bounds => access.bounds(element)?.to_string(),
            };
            rows.push((*label, value));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[(&'static str, String)] {
        &self.rows
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for ElementProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in &self.rows {
            writeln!(f, "{:<width$}  {}", label, value, width = width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uiinspect_backend_snapshot::{SnapshotNode, SnapshotTree};

    #[test]
    fn test_window_manager_rows() {
        let tree = SnapshotTree::from_root(
            BackendKind::WindowManager,
            SnapshotNode::new("Pane").with_child(
                SnapshotNode::new("Button")
                    .with_name("7")
                    .with_class("CalcButton")
                    .with_automation_id("num7")
                    .with_states(["visible", "enabled"])
                    .with_bounds(10, 20, 30, 40),
            ),
        );
        let button = tree.node_at_path(&[0]).unwrap();
        let properties = ElementProperties::collect(&tree, &button).unwrap();

        let labels: Vec<&str> = properties.rows().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Control Type", "AutomationId", "Name", "Cls", "Depth", "States", "Bounds"]
        );
        assert_eq!(properties.get("Control Type"), Some("Button"));
        assert_eq!(properties.get("AutomationId"), Some("num7"));
        assert_eq!(properties.get("Depth"), Some("1"));
        assert_eq!(properties.get("States"), Some("enabled, visible"));
        assert_eq!(properties.get("Bounds"), Some("X=10, Y=20, Width=30, Height=40"));
    }

    #[test]
    fn test_access_bridge_rows() {
        let tree = SnapshotTree::from_root(
            BackendKind::AccessBridge,
            SnapshotNode::new("frame").with_name("Editor").with_description("main window"),
        );
        let properties = ElementProperties::collect(&tree, &tree.root_id()).unwrap();
        assert_eq!(properties.get("Role"), Some("frame"));
        assert_eq!(properties.get("Description"), Some("main window"));
        assert_eq!(properties.get("AutomationId"), None);
        assert_eq!(properties.get("States"), Some(""));
    }

    #[test]
    fn test_display_aligns_labels() {
        let tree = SnapshotTree::from_root(
            BackendKind::AccessBridge,
            SnapshotNode::new("frame").with_name("Editor"),
        );
        let text = ElementProperties::collect(&tree, &tree.root_id())
            .unwrap()
            .to_string();
        assert!(text.starts_with("Role         frame\n"));
        assert!(text.contains("Name         Editor\n"));
    }
}
