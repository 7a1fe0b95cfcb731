//! Serialized snapshot format.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uiinspect_protocols::{BackendKind, Rect};

/// A whole dumped tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub backend: BackendKind,

    pub root: SnapshotNode,

    /// Native handles of the desktop's top-level windows. Only meaningful for
    /// access-bridge trees, whose root is the application window itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub desktop_windows: Vec<u64>,
}

impl SnapshotDocument {
    pub fn new(backend: BackendKind, root: SnapshotNode) -> Self {
        Self {
            backend,
            root,
            desktop_windows: Vec::new(),
        }
    }

    pub fn with_desktop_windows(mut self, handles: impl IntoIterator<Item = u64>) -> Self {
        self.desktop_windows = handles.into_iter().collect();
        self
    }
}

/// One element and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub role: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,

    #[serde(default)]
    pub bounds: Rect,

    #[serde(default)]
    pub states: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_automation_id(mut self, id: impl Into<String>) -> Self {
        self.automation_id = Some(id.into());
        self
    }

    pub fn with_bounds(mut self, x: i32, y: i32, width: i32, height: i32) -> Self {
        self.bounds = Rect::new(x, y, width, height);
        self
    }

    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_handle(mut self, handle: u64) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SnapshotNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Copy of this node's own properties, without its subtree.
    pub(crate) fn detached(&self) -> Self {
        Self {
            children: Vec::new(),
            ..self.clone()
        }
    }
}
