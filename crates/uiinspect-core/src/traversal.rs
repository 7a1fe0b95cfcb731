//! Lazy depth-bounded pre-order traversal.

use uiinspect_protocols::{AccessResult, ElementAccess};

const VISIBLE: &str = "visible";

/// Descendants of an origin element in pre-order, paired with their depth
/// below the origin (children are at depth 1).
///
/// Children of a node are fetched only when the iterator moves past it, and
/// never for nodes at the depth bound. The first access error is yielded once
/// and ends the iteration. A new iterator restarts from the origin.
pub struct Descendants<'a, A: ElementAccess + ?Sized> {
    access: &'a A,
    max_depth: Option<usize>,
    visible_only: bool,
    stack: Vec<(A::Element, usize)>,
    pending: Option<(A::Element, usize)>,
    failed: bool,
}

impl<'a, A: ElementAccess + ?Sized> Descendants<'a, A> {
    /// `max_depth` of `None` walks the whole subtree.
    pub fn new(access: &'a A, origin: A::Element, max_depth: Option<usize>) -> Self {
        Self {
            access,
            max_depth,
            visible_only: false,
            stack: Vec::new(),
            pending: Some((origin, 0)),
            failed: false,
        }
    }

    /// Skip children that do not carry the `visible` state, with their subtrees.
    pub fn visible_only(mut self, visible_only: bool) -> Self {
        self.visible_only = visible_only;
        self
    }

    fn expand(&mut self, element: &A::Element, depth: usize) -> AccessResult<()> {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(());
        }
        let children = self.access.children(element)?;
        for child in children.into_iter().rev() {
            if self.visible_only && !self.access.states(&child)?.contains(VISIBLE) {
                continue;
            }
            self.stack.push((child, depth + 1));
        }
        Ok(())
    }
}

impl<A: ElementAccess + ?Sized> Iterator for Descendants<'_, A> {
    type Item = AccessResult<(A::Element, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some((element, depth)) = self.pending.take() {
            if let Err(err) = self.expand(&element, depth) {
                self.failed = true;
                return Some(Err(err));
            }
        }
        let (element, depth) = self.stack.pop()?;
        self.pending = Some((element.clone(), depth));
        Some(Ok((element, depth)))
    }
}

#[cfg(test)]
#[path = "traversal_tests.rs"]
mod tests;
