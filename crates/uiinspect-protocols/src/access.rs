//! Element access interface.
//!
//! A backend exposes a live, externally owned tree through [`ElementAccess`].
//! Handles are borrowed for the duration of a query and any call may report
//! that the element went stale.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::{Attribute, Dialect};
use crate::error::AccessError;

/// Result type for element access calls.
pub type AccessResult<T> = Result<T, AccessError>;

/// Screen point in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside the rectangle (right/bottom edges exclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && i64::from(point.x) < i64::from(self.x) + i64::from(self.width)
            && i64::from(point.y) < i64::from(self.y) + i64::from(self.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X={}, Y={}, Width={}, Height={}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Read-only queries against one accessibility tree.
///
/// One implementation exists per backend and is selected once per tree root.
/// The engine never mutates the tree; every method may fail with
/// [`AccessError::Stale`] when the underlying handle is no longer valid.
pub trait ElementAccess {
    /// Opaque element handle.
    type Element: Clone + fmt::Debug;

    /// Attribute tables for this backend.
    fn dialect(&self) -> &Dialect;

    /// Root of the tree (the desktop, or the attached application window).
    fn root(&self) -> AccessResult<Self::Element>;

    /// Role or control type name.
    fn role(&self, element: &Self::Element) -> AccessResult<String>;

    /// Display text, possibly empty.
    fn name(&self, element: &Self::Element) -> AccessResult<String>;

    /// Class name (window-manager backend) or description (access-bridge backend).
    fn secondary_id(&self, element: &Self::Element) -> AccessResult<String>;

    /// Stable automation id, when the backend has one and it is set.
    fn automation_id(&self, _element: &Self::Element) -> AccessResult<Option<String>> {
        Ok(None)
    }

    /// State flags such as `visible`, `enabled`, `focusable`.
    fn states(&self, element: &Self::Element) -> AccessResult<BTreeSet<String>>;

    /// Bounding rectangle.
    fn bounds(&self, element: &Self::Element) -> AccessResult<Rect>;

    /// Absolute depth, root = 0.
    fn depth(&self, element: &Self::Element) -> AccessResult<usize>;

    fn parent(&self, element: &Self::Element) -> AccessResult<Option<Self::Element>>;

    fn previous_sibling(&self, element: &Self::Element) -> AccessResult<Option<Self::Element>>;

    /// Children in tree order.
    fn children(&self, element: &Self::Element) -> AccessResult<Vec<Self::Element>>;

    fn children_count(&self, element: &Self::Element) -> AccessResult<usize> {
        Ok(self.children(element)?.len())
    }

    /// Deepest element under a screen point.
    fn element_at(&self, point: Point) -> AccessResult<Option<Self::Element>>;

    /// Native window handle, for elements backed by a top-level window.
    fn native_handle(&self, _element: &Self::Element) -> AccessResult<Option<u64>> {
        Ok(None)
    }

    /// Native handles of the desktop's top-level windows, in desktop order.
    fn top_level_handles(&self) -> AccessResult<Vec<u64>> {
        Ok(Vec::new())
    }

    /// Value of one vocabulary attribute.
    ///
    /// Returns `None` when the element has no value for it; empty automation
    /// ids count as absent.
    fn attribute(
        &self,
        element: &Self::Element,
        attribute: Attribute,
    ) -> AccessResult<Option<String>> {
        let value = match attribute {
            Attribute::Role => Some(self.role(element)?),
            Attribute::Name | Attribute::RegexName => Some(self.name(element)?),
            Attribute::ClassName | Attribute::Description => Some(self.secondary_id(element)?),
            Attribute::AutomationId => self.automation_id(element)?.filter(|id| !id.is_empty()),
            Attribute::States => {
                let states = self.states(element)?;
                Some(states.into_iter().collect::<Vec<_>>().join(","))
            }
        };
        Ok(value)
    }
}
