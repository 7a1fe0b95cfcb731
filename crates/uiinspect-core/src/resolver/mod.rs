//! Selector resolution against a live tree.
//!
//! Each level is searched below the previous level's match with a fresh
//! [`Descendants`] walk bounded by the level's relative depth; the
//! occurrence-index-th match wins. A failed level fails the whole attempt and
//! the [`Poller`] re-runs the chain from the root.

mod error;
mod poll;

pub use error::{LevelFailure, ResolveError, StaleFailure};
pub use poll::{Attempt, Poller};

use std::time::Duration;

use tracing::{debug, info};
use uiinspect_protocols::{AccessError, ElementAccess, Point, SelectorError};

use crate::predicate::LevelPredicate;
use crate::selector::Selector;
use crate::traversal::Descendants;

/// Resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    pub poller: Poller,
    /// Only descend into children carrying the `visible` state.
    pub visible_only: bool,
}

enum Search<E> {
    Found(E),
    Missing(usize),
}

pub struct Resolver<'a, A: ElementAccess + ?Sized> {
    access: &'a A,
    options: ResolveOptions,
}

impl<'a, A: ElementAccess + ?Sized> Resolver<'a, A> {
    pub fn new(access: &'a A) -> Self {
        Self::with_options(access, ResolveOptions::default())
    }

    pub fn with_options(access: &'a A, options: ResolveOptions) -> Self {
        Self { access, options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// One attempt, no retry.
    pub fn find_once(&self, root: &A::Element, selector: &Selector) -> Result<A::Element, ResolveError> {
        match self.attempt(root, selector, &compile(selector)) {
            Attempt::Found(element) => Ok(element),
            Attempt::NotFound(failure) => Err(ResolveError::NotFound(failure)),
            Attempt::Stale(failure) => Err(ResolveError::Stale(failure)),
            Attempt::Syntax(err) => Err(ResolveError::Selector(err)),
        }
    }

    /// Resolve with the configured timeout.
    pub fn resolve(&self, root: &A::Element, selector: &Selector) -> Result<A::Element, ResolveError> {
        self.resolve_within(root, selector, self.options.poller.timeout)
    }

    /// Resolve, retrying the whole chain until `timeout` elapses.
    pub fn resolve_within(
        &self,
        root: &A::Element,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<A::Element, ResolveError> {
        let predicates = compile(selector);
        let poller = Poller {
            timeout,
            ..self.options.poller
        };

        let mut attempts = 0u32;
        let element = poller.until(|| {
            attempts += 1;
            debug!(attempt = attempts, levels = selector.len(), "Resolving selector");
            self.attempt(root, selector, &predicates)
        })?;
        info!(attempts, levels = selector.len(), "Selector resolved");
        Ok(element)
    }

    /// Parse selector text in this backend's grammar and resolve it.
    /// Syntax errors are reported before any tree access.
    pub fn resolve_text(&self, root: &A::Element, text: &str) -> Result<A::Element, ResolveError> {
        let selector = Selector::parse(text, self.access.dialect())?;
        self.resolve(root, &selector)
    }

    /// Whether the selector resolves within `timeout`. Staleness and selector
    /// errors still propagate, including a stale failure the poller retried
    /// until the deadline.
    pub fn exists(
        &self,
        root: &A::Element,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<bool, ResolveError> {
        match self.resolve_within(root, selector, timeout) {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.root_cause(), ResolveError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Deepest element under a screen point.
    pub fn element_at(&self, point: Point) -> Result<A::Element, ResolveError> {
        match self.access.element_at(point) {
            Ok(Some(element)) => Ok(element),
            Ok(None) => Err(ResolveError::NotFound(LevelFailure {
                level: 1,
                selector: format!("point ({}, {})", point.x, point.y),
                path: Vec::new(),
                matches: 0,
                required: 1,
            })),
            Err(error) => Err(ResolveError::Stale(StaleFailure {
                level: 1,
                path: Vec::new(),
                error,
            })),
        }
    }

    /// One pass over the chain. Compile errors surface as [`Attempt::Syntax`]
    /// so the poller stops before touching the tree.
    fn attempt(
        &self,
        root: &A::Element,
        selector: &Selector,
        predicates: &Result<Vec<LevelPredicate>, SelectorError>,
    ) -> Attempt<A::Element> {
        let predicates = match predicates {
            Ok(predicates) => predicates,
            Err(err) => return Attempt::Syntax(err.clone()),
        };
        let parentless_level = self.access.dialect().parentless_level;
        let mut origin = root.clone();
        let mut path = Vec::with_capacity(selector.len());

        for (index, (level, predicate)) in selector.levels().iter().zip(predicates).enumerate() {
            let search = if index == 0 && parentless_level {
                self.match_origin(&origin, predicate)
            } else {
                self.search(&origin, predicate)
            };
            match search {
                Ok(Search::Found(element)) => {
                    path.push(level.to_string());
                    origin = element;
                }
                Ok(Search::Missing(matches)) => {
                    return Attempt::NotFound(LevelFailure {
                        level: index + 1,
                        selector: level.to_string(),
                        path,
                        matches,
                        required: predicate.occurrence_index(),
                    });
                }
                Err(error) => {
                    return Attempt::Stale(StaleFailure {
                        level: index + 1,
                        path,
                        error,
                    });
                }
            }
        }
        Attempt::Found(origin)
    }

    /// The outermost level of a parentless-level backend names the search root.
    fn match_origin(
        &self,
        origin: &A::Element,
        predicate: &LevelPredicate,
    ) -> Result<Search<A::Element>, AccessError> {
        if predicate.matches_element(self.access, origin)? {
            Ok(Search::Found(origin.clone()))
        } else {
            Ok(Search::Missing(0))
        }
    }

    fn search(
        &self,
        origin: &A::Element,
        predicate: &LevelPredicate,
    ) -> Result<Search<A::Element>, AccessError> {
        let required = predicate.occurrence_index() as usize;
        let mut matches = 0;
        let descendants = Descendants::new(self.access, origin.clone(), predicate.depth_bound())
            .visible_only(self.options.visible_only);

        for item in descendants {
            let (candidate, depth) = item?;
            if predicate.matches(self.access, &candidate, depth)? {
                matches += 1;
                if matches == required {
                    return Ok(Search::Found(candidate));
                }
            }
        }
        Ok(Search::Missing(matches))
    }
}

fn compile(selector: &Selector) -> Result<Vec<LevelPredicate>, SelectorError> {
    selector.levels().iter().map(LevelPredicate::compile).collect()
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
