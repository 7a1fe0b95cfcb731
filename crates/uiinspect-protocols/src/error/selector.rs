//! Selector text and query errors.

use thiserror::Error;

use crate::dialect::{Attribute, BackendKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// A line does not match the backend grammar.
    #[error("Cannot parse selector at line {line}: {text}")]
    Syntax { line: usize, text: String },

    /// Selector text or query contains no levels.
    #[error("Selector is empty")]
    Empty,

    /// Depth values must not increase from one line to the next.
    #[error("Depth {depth} at line {line} is larger than the previous depth {previous}")]
    DepthOrder {
        line: usize,
        depth: u32,
        previous: u32,
    },

    /// The attribute has no display name in this backend's grammar.
    #[error("Attribute {attribute} cannot be written in {backend} selector text")]
    NotSerializable {
        attribute: Attribute,
        backend: BackendKind,
    },

    /// Values are single-quoted without escapes, one level per line.
    #[error("Value for {attribute} contains a quote or line break: {value}")]
    InvalidValue { attribute: Attribute, value: String },

    /// The summed relative depths do not fit the depth counter.
    #[error("Relative depth at level {level} overflows the total selector depth")]
    DepthOverflow { level: usize },

    #[error("Invalid name pattern {pattern}: {message}")]
    InvalidRegex { pattern: String, message: String },
}

impl SelectorError {
    pub fn syntax(line: usize, text: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            text: text.into(),
        }
    }
}
