//! Compiled per-level match predicates.

use std::collections::BTreeSet;

use regex::Regex;
use uiinspect_protocols::{AccessResult, Attribute, ElementAccess, SelectorError};

use crate::selector::SelectorLevel;

#[derive(Debug, Clone)]
enum Check {
    Exact(Attribute, String),
    States(BTreeSet<String>),
    NamePattern(Regex),
}

/// Match test for one selector level: tag, attributes and exact relative depth.
#[derive(Debug, Clone)]
pub struct LevelPredicate {
    tag: String,
    checks: Vec<Check>,
    relative_depth: Option<usize>,
    occurrence_index: u32,
}

fn parse_states(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|state| !state.is_empty())
        .map(str::to_string)
        .collect()
}

impl LevelPredicate {
    /// Compile a level. Fails only for an invalid name pattern.
    pub fn compile(level: &SelectorLevel) -> Result<Self, SelectorError> {
        let mut checks = Vec::with_capacity(level.attributes.len());
        for (attribute, value) in &level.attributes {
            let check = match attribute {
                Attribute::States => Check::States(parse_states(value)),
                Attribute::RegexName => {
                    let pattern = Regex::new(&format!("^(?:{})", value)).map_err(|e| {
                        SelectorError::InvalidRegex {
                            pattern: value.clone(),
                            message: e.to_string(),
                        }
                    })?;
                    Check::NamePattern(pattern)
                }
                other => Check::Exact(*other, value.clone()),
            };
            checks.push(check);
        }

        Ok(Self {
            tag: level.tag.clone(),
            checks,
            relative_depth: (!level.is_unbounded()).then_some(level.relative_depth as usize),
            occurrence_index: level.occurrence_index.max(1),
        })
    }

    /// Depth bound for the level's search, `None` when unbounded.
    pub fn depth_bound(&self) -> Option<usize> {
        self.relative_depth
    }

    pub fn occurrence_index(&self) -> u32 {
        self.occurrence_index
    }

    /// Test a traversal candidate found `depth` levels below the search origin.
    pub fn matches<A: ElementAccess + ?Sized>(
        &self,
        access: &A,
        element: &A::Element,
        depth: usize,
    ) -> AccessResult<bool> {
        if self.relative_depth.is_some_and(|expected| expected != depth) {
            return Ok(false);
        }
        self.matches_element(access, element)
    }

    /// Test tag and attributes only.
    pub fn matches_element<A: ElementAccess + ?Sized>(
        &self,
        access: &A,
        element: &A::Element,
    ) -> AccessResult<bool> {
        if access.role(element)? != self.tag {
            return Ok(false);
        }
        for check in &self.checks {
            let matched = match check {
                Check::Exact(attribute, expected) => {
                    access.attribute(element, *attribute)?.as_deref() == Some(expected.as_str())
                }
                Check::States(expected) => access.states(element)? == *expected,
                Check::NamePattern(pattern) => pattern.is_match(&access.name(element)?),
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "predicate_tests.rs"]
mod tests;
