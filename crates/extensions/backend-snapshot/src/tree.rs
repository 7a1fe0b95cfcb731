//! Arena-backed tree answering element access queries.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::debug;
use uiinspect_protocols::{
    AccessError, AccessResult, BackendKind, Dialect, ElementAccess, Point, Rect,
};

use crate::document::{SnapshotDocument, SnapshotNode};
use crate::error::SnapshotError;

/// Handle to a node. Handles are never reused, so a handle to a removed node
/// stays stale even after new nodes are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

struct Entry {
    parent: Option<u64>,
    children: Vec<u64>,
    node: SnapshotNode,
}

struct Arena {
    entries: HashMap<u64, Entry>,
    root: u64,
    next_id: u64,
}

impl Arena {
    fn entry(&self, id: NodeId) -> AccessResult<&Entry> {
        self.entries
            .get(&id.0)
            .ok_or_else(|| AccessError::stale(format!("node {} is no longer in the tree", id.0)))
    }

    fn entry_mut(&mut self, id: NodeId) -> AccessResult<&mut Entry> {
        self.entries
            .get_mut(&id.0)
            .ok_or_else(|| AccessError::stale(format!("node {} is no longer in the tree", id.0)))
    }

    fn insert(&mut self, parent: Option<u64>, node: &SnapshotNode) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                parent,
                children: Vec::new(),
                node: node.detached(),
            },
        );
        let children: Vec<u64> = node
            .children
            .iter()
            .map(|child| self.insert(Some(id), child))
            .collect();
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.children = children;
        }
        id
    }

    fn remove_subtree(&mut self, id: u64) {
        if let Some(entry) = self.entries.remove(&id) {
            for child in entry.children {
                self.remove_subtree(child);
            }
        }
    }
}

/// An accessibility tree held in memory.
pub struct SnapshotTree {
    dialect: &'static Dialect,
    arena: RwLock<Arena>,
    desktop_windows: Vec<u64>,
    children_calls: AtomicUsize,
}

impl SnapshotTree {
    pub fn new(document: SnapshotDocument) -> Self {
        let mut arena = Arena {
            entries: HashMap::new(),
            root: 0,
            next_id: 0,
        };
        arena.root = arena.insert(None, &document.root);
        debug!(
            backend = %document.backend,
            nodes = arena.entries.len(),
            "Snapshot tree built"
        );

        Self {
            dialect: document.backend.dialect(),
            arena: RwLock::new(arena),
            desktop_windows: document.desktop_windows,
            children_calls: AtomicUsize::new(0),
        }
    }

    /// Build a tree for one backend from a root node.
    pub fn from_root(backend: BackendKind, root: SnapshotNode) -> Self {
        Self::new(SnapshotDocument::new(backend, root))
    }

    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let document: SnapshotDocument = serde_json::from_str(content)?;
        Ok(Self::new(document))
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn backend(&self) -> BackendKind {
        self.dialect.kind
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(self.arena.read().root)
    }

    pub fn len(&self) -> usize {
        self.arena.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Follow child indices from the root.
    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let arena = self.arena.read();
        let mut current = arena.root;
        for &index in path {
            current = *arena.entries.get(&current)?.children.get(index)?;
        }
        Some(NodeId(current))
    }

    /// Append a subtree under `parent`.
    pub fn append_child(&self, parent: NodeId, node: SnapshotNode) -> AccessResult<NodeId> {
        let mut arena = self.arena.write();
        arena.entry(parent)?;
        let id = arena.insert(Some(parent.0), &node);
        arena.entry_mut(parent)?.children.push(id);
        Ok(NodeId(id))
    }

    /// Insert a subtree under `parent` at child position `index` (clamped).
    pub fn insert_child(
        &self,
        parent: NodeId,
        index: usize,
        node: SnapshotNode,
    ) -> AccessResult<NodeId> {
        let mut arena = self.arena.write();
        arena.entry(parent)?;
        let id = arena.insert(Some(parent.0), &node);
        let children = &mut arena.entry_mut(parent)?.children;
        let index = index.min(children.len());
        children.insert(index, id);
        Ok(NodeId(id))
    }

    /// Remove a node and its subtree. Outstanding handles become stale.
    pub fn remove(&self, id: NodeId) -> AccessResult<()> {
        let mut arena = self.arena.write();
        let parent = arena.entry(id)?.parent;
        if let Some(parent) = parent {
            if let Some(entry) = arena.entries.get_mut(&parent) {
                entry.children.retain(|child| *child != id.0);
            }
        }
        arena.remove_subtree(id.0);
        Ok(())
    }

    /// Swap a node's subtree for a freshly built one at the same position.
    pub fn replace(&self, id: NodeId, node: SnapshotNode) -> AccessResult<NodeId> {
        let mut arena = self.arena.write();
        let parent = arena
            .entry(id)?
            .parent
            .ok_or_else(|| AccessError::unavailable("the root cannot be replaced"))?;
        let new_id = arena.insert(Some(parent), &node);
        let children = &mut arena.entry_mut(NodeId(parent))?.children;
        if let Some(slot) = children.iter_mut().find(|child| **child == id.0) {
            *slot = new_id;
        }
        arena.remove_subtree(id.0);
        Ok(NodeId(new_id))
    }

    pub fn set_name(&self, id: NodeId, name: impl Into<String>) -> AccessResult<()> {
        self.arena.write().entry_mut(id)?.node.name = name.into();
        Ok(())
    }

    /// Number of `children` queries answered so far.
    pub fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::Relaxed)
    }
}

impl ElementAccess for SnapshotTree {
    type Element = NodeId;

    fn dialect(&self) -> &Dialect {
        self.dialect
    }

    fn root(&self) -> AccessResult<NodeId> {
        Ok(self.root_id())
    }

    fn role(&self, element: &NodeId) -> AccessResult<String> {
        Ok(self.arena.read().entry(*element)?.node.role.clone())
    }

    fn name(&self, element: &NodeId) -> AccessResult<String> {
        Ok(self.arena.read().entry(*element)?.node.name.clone())
    }

    fn secondary_id(&self, element: &NodeId) -> AccessResult<String> {
        let arena = self.arena.read();
        let node = &arena.entry(*element)?.node;
        let value = match self.dialect.kind {
            BackendKind::WindowManager => &node.class_name,
            BackendKind::AccessBridge => &node.description,
        };
        Ok(value.clone())
    }

    fn automation_id(&self, element: &NodeId) -> AccessResult<Option<String>> {
        let arena = self.arena.read();
        let node = &arena.entry(*element)?.node;
        Ok(match self.dialect.kind {
            BackendKind::WindowManager => node.automation_id.clone(),
            BackendKind::AccessBridge => None,
        })
    }

    fn states(&self, element: &NodeId) -> AccessResult<BTreeSet<String>> {
        Ok(self.arena.read().entry(*element)?.node.states.clone())
    }

    fn bounds(&self, element: &NodeId) -> AccessResult<Rect> {
        Ok(self.arena.read().entry(*element)?.node.bounds)
    }

    fn depth(&self, element: &NodeId) -> AccessResult<usize> {
        let arena = self.arena.read();
        let mut depth = 0;
        let mut current = arena.entry(*element)?.parent;
        while let Some(parent) = current {
            depth += 1;
            current = arena.entry(NodeId(parent))?.parent;
        }
        Ok(depth)
    }

    fn parent(&self, element: &NodeId) -> AccessResult<Option<NodeId>> {
        Ok(self.arena.read().entry(*element)?.parent.map(NodeId))
    }

    fn previous_sibling(&self, element: &NodeId) -> AccessResult<Option<NodeId>> {
        let arena = self.arena.read();
        let Some(parent) = arena.entry(*element)?.parent else {
            return Ok(None);
        };
        let siblings = &arena.entry(NodeId(parent))?.children;
        let position = siblings
            .iter()
            .position(|child| *child == element.0)
            .ok_or_else(|| AccessError::stale(format!("node {} was detached", element.0)))?;
        Ok(position
            .checked_sub(1)
            .map(|previous| NodeId(siblings[previous])))
    }

    fn children(&self, element: &NodeId) -> AccessResult<Vec<NodeId>> {
        self.children_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .arena
            .read()
            .entry(*element)?
            .children
            .iter()
            .copied()
            .map(NodeId)
            .collect())
    }

    fn children_count(&self, element: &NodeId) -> AccessResult<usize> {
        Ok(self.arena.read().entry(*element)?.children.len())
    }

    fn element_at(&self, point: Point) -> AccessResult<Option<NodeId>> {
        let arena = self.arena.read();
        let root = arena.entry(NodeId(arena.root))?;
        if !root.node.bounds.contains(point) {
            return Ok(None);
        }

        // Later siblings paint over earlier ones.
        let mut current = arena.root;
        'descend: loop {
            let entry = arena.entry(NodeId(current))?;
            for child in entry.children.iter().rev() {
                if arena.entry(NodeId(*child))?.node.bounds.contains(point) {
                    current = *child;
                    continue 'descend;
                }
            }
            return Ok(Some(NodeId(current)));
        }
    }

    fn native_handle(&self, element: &NodeId) -> AccessResult<Option<u64>> {
        Ok(self.arena.read().entry(*element)?.node.handle)
    }

    fn top_level_handles(&self) -> AccessResult<Vec<u64>> {
        match self.dialect.kind {
            BackendKind::AccessBridge => Ok(self.desktop_windows.clone()),
            BackendKind::WindowManager => {
                let arena = self.arena.read();
                let root = arena.entry(NodeId(arena.root))?;
                Ok(root
                    .children
                    .iter()
                    .filter_map(|child| arena.entries.get(child))
                    .filter_map(|entry| entry.node.handle)
                    .collect())
            }
        }
    }
}

/// Parse a child-index path such as `0/2/1`. An empty string is the root.
pub fn parse_child_path(path: &str) -> Result<Vec<usize>, SnapshotError> {
    let path = path.trim().trim_matches('/');
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('/')
        .map(|segment| {
            segment
                .trim()
                .parse::<usize>()
                .map_err(|_| SnapshotError::InvalidPath(path.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
