//! Selector levels.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uiinspect_protocols::{Attribute, SelectorError};

fn default_occurrence_index() -> u32 {
    1
}

fn default_relative_depth() -> u32 {
    1
}

/// One ancestor step of a selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorLevel {
    /// Role or control type the element must have.
    pub tag: String,

    #[serde(default)]
    pub attributes: BTreeMap<Attribute, String>,

    /// 1-based rank among the matches found during the level's search.
    #[serde(default = "default_occurrence_index")]
    pub occurrence_index: u32,

    /// Tree levels between the previous level's match and this one.
    /// Zero searches the whole subtree.
    #[serde(default = "default_relative_depth")]
    pub relative_depth: u32,
}

impl SelectorLevel {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            occurrence_index: 1,
            relative_depth: 1,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute, value: impl Into<String>) -> Self {
        self.attributes.insert(attribute, value.into());
        self
    }

    pub fn with_occurrence_index(mut self, index: u32) -> Self {
        self.occurrence_index = index;
        self
    }

    pub fn with_relative_depth(mut self, depth: u32) -> Self {
        self.relative_depth = depth;
        self
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        self.attributes.get(&attribute).map(String::as_str)
    }

    /// Whether the level searches the whole subtree below its origin.
    pub fn is_unbounded(&self) -> bool {
        self.relative_depth == 0
    }
}

impl fmt::Display for SelectorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        for (attribute, value) in &self.attributes {
            write!(f, " {}='{}'", attribute, value)?;
        }
        if self.occurrence_index > 1 {
            write!(f, " #{}", self.occurrence_index)?;
        }
        if self.is_unbounded() {
            write!(f, " (any depth)")
        } else {
            write!(f, " (+{})", self.relative_depth)
        }
    }
}

/// Ordered, non-empty sequence of levels, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SelectorLevel>", into = "Vec<SelectorLevel>")]
pub struct Selector {
    levels: Vec<SelectorLevel>,
}

impl Selector {
    pub fn new(levels: Vec<SelectorLevel>) -> Result<Self, SelectorError> {
        if levels.is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut total = 0u32;
        for (index, level) in levels.iter().enumerate() {
            total = total
                .checked_add(level.relative_depth)
                .ok_or(SelectorError::DepthOverflow { level: index + 1 })?;
        }
        Ok(Self { levels })
    }

    /// Caller guarantees `levels` is non-empty.
    pub(crate) fn from_non_empty(levels: Vec<SelectorLevel>) -> Self {
        debug_assert!(!levels.is_empty());
        Self { levels }
    }

    /// Parse a JSON structured query: an array of levels.
    pub fn from_json(content: &str) -> Result<Self, SelectorError> {
        let levels: Vec<SelectorLevel> = serde_json::from_str(content)
            .map_err(|e| SelectorError::syntax(e.line(), e.to_string()))?;
        Self::new(levels)
    }

    pub fn levels(&self) -> &[SelectorLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn innermost(&self) -> &SelectorLevel {
        // Non-empty by construction.
        &self.levels[self.levels.len() - 1]
    }

    /// Sum of relative depths: the target's depth below the search root.
    /// [`Selector::new`] guarantees the sum fits.
    pub fn total_depth(&self) -> u32 {
        self.levels
            .iter()
            .fold(0u32, |total, level| total.saturating_add(level.relative_depth))
    }
}

impl TryFrom<Vec<SelectorLevel>> for Selector {
    type Error = SelectorError;

    fn try_from(levels: Vec<SelectorLevel>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<Selector> for Vec<SelectorLevel> {
    fn from(selector: Selector) -> Self {
        selector.levels
    }
}
