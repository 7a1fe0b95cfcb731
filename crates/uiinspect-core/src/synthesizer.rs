//! Selector synthesis.
//!
//! Walks from a target element up to the root. At every step the element is
//! compared with each of its preceding siblings, nearest first; siblings the
//! [`Disambiguator`] cannot tell apart raise the level's occurrence index.

use tracing::debug;
use uiinspect_protocols::ElementAccess;

use crate::disambiguator::Disambiguator;
use crate::error::SynthesisError;
use crate::selector::{Selector, SelectorLevel};

/// A synthesized level plus what a tree shell needs to present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedLevel {
    pub level: SelectorLevel,
    /// Number of preceding siblings, or the index among the desktop's
    /// top-level windows for a parentless level. `None` if the window
    /// could not be located.
    pub position: Option<usize>,
    /// Some preceding sibling has children of its own.
    pub sibling_has_children: bool,
    /// Whether generated code includes this level unless the user says otherwise.
    pub checked_by_default: bool,
}

/// Result of one synthesis run, outermost level first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    levels: Vec<SynthesizedLevel>,
}

impl Synthesis {
    pub fn levels(&self) -> &[SynthesizedLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The selector used for resolution; unaffected by check marks.
    pub fn selector(&self) -> Selector {
        Selector::from_non_empty(self.levels.iter().map(|entry| entry.level.clone()).collect())
    }

    pub fn default_mask(&self) -> Vec<bool> {
        self.levels
            .iter()
            .map(|entry| entry.checked_by_default)
            .collect()
    }
}

pub struct Synthesizer<'a, A: ElementAccess + ?Sized> {
    access: &'a A,
    disambiguator: Disambiguator<'a, A>,
}

impl<'a, A: ElementAccess + ?Sized> Synthesizer<'a, A> {
    pub fn new(access: &'a A) -> Self {
        Self {
            access,
            disambiguator: Disambiguator::new(access),
        }
    }

    /// Build the selector levels that re-find `target` from the tree root.
    ///
    /// Backend errors abort the run; a partial chain is never returned.
    pub fn synthesize(&self, target: &A::Element) -> Result<Synthesis, SynthesisError> {
        let dialect = self.access.dialect();
        let mut collected = Vec::new();
        let mut current = Some(target.clone());

        while let Some(element) = current {
            let parent = self.access.parent(&element)?;
            if parent.is_some() {
                collected.push(self.sibling_level(&element)?);
            } else if dialect.parentless_level {
                collected.push(self.top_level(&element)?);
            }
            current = parent;
        }

        if collected.is_empty() {
            return Err(SynthesisError::NoLevels(self.access.role(target)?));
        }
        collected.reverse();

        // The outermost level is matched by first occurrence.
        collected[0].level.occurrence_index = 1;
        let last = collected.len() - 1;
        for (index, entry) in collected.iter_mut().enumerate() {
            entry.checked_by_default = entry.sibling_has_children || index == 0 || index == last;
        }

        debug!(levels = collected.len(), backend = %dialect.kind, "Selector synthesized");
        Ok(Synthesis { levels: collected })
    }

    fn sibling_level(&self, element: &A::Element) -> Result<SynthesizedLevel, SynthesisError> {
        let tag = self.access.role(element)?;
        let mut attributes = self.disambiguator.seed(element)?;
        let mut matching = 0u32;
        let mut position = 0usize;
        let mut sibling_has_children = false;

        let mut sibling = self.access.previous_sibling(element)?;
        while let Some(other) = sibling {
            position += 1;
            let (distinct, grown) = self.disambiguator.distinguish(element, &other, attributes)?;
            attributes = grown;
            if !distinct {
                matching += 1;
            }
            if self.access.children_count(&other)? > 0 {
                sibling_has_children = true;
            }
            sibling = self.access.previous_sibling(&other)?;
        }

        debug!(
            tag = %tag,
            attributes = attributes.len(),
            occurrence = matching + 1,
            siblings = position,
            "Synthesized level"
        );
        Ok(SynthesizedLevel {
            level: SelectorLevel {
                tag,
                attributes,
                occurrence_index: matching + 1,
                relative_depth: 1,
            },
            position: Some(position),
            sibling_has_children,
            checked_by_default: false,
        })
    }

    fn top_level(&self, element: &A::Element) -> Result<SynthesizedLevel, SynthesisError> {
        let tag = self.access.role(element)?;
        let attributes = self.disambiguator.seed(element)?;
        let position = match self.access.native_handle(element)? {
            Some(handle) => self
                .access
                .top_level_handles()?
                .iter()
                .position(|candidate| *candidate == handle),
            None => None,
        };

        debug!(tag = %tag, position = ?position, "Synthesized top-level window level");
        Ok(SynthesizedLevel {
            level: SelectorLevel {
                tag,
                attributes,
                occurrence_index: 1,
                relative_depth: 1,
            },
            position,
            sibling_has_children: false,
            checked_by_default: false,
        })
    }
}

#[cfg(test)]
#[path = "synthesizer_tests.rs"]
mod tests;
