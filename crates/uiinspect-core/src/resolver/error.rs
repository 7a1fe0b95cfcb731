//! Resolution errors.

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use uiinspect_protocols::{AccessError, SelectorError};

fn describe_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(" > ")
    }
}

/// The level a resolution attempt stopped at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFailure {
    /// 1-based level number.
    pub level: usize,
    pub selector: String,
    /// Levels matched before the failing one.
    pub path: Vec<String>,
    /// Candidates that matched the level's predicate.
    pub matches: usize,
    pub required: u32,
}

impl fmt::Display for LevelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {} [{}] matched {} of {} required under {}",
            self.level,
            self.selector,
            self.matches,
            self.required,
            describe_path(&self.path)
        )
    }
}

/// A backend error raised while resolving a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFailure {
    pub level: usize,
    pub path: Vec<String>,
    pub error: AccessError,
}

impl fmt::Display for StaleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {} under {}: {}",
            self.level,
            describe_path(&self.path),
            self.error
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Element not found: {0}")]
    NotFound(LevelFailure),

    #[error("Element access failed at {0}")]
    Stale(StaleFailure),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("Timed out after {elapsed:?} ({attempts} attempts, limit {timeout:?}): {last}")]
    Timeout {
        timeout: Duration,
        elapsed: Duration,
        attempts: u32,
        last: Box<ResolveError>,
    },
}

impl ResolveError {
    /// The failure behind a timeout, or the error itself.
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            Self::Timeout { last, .. } => last.root_cause(),
            other => other,
        }
    }

    /// Failing level for not-found and stale errors, looking through timeouts.
    pub fn level(&self) -> Option<usize> {
        match self.root_cause() {
            Self::NotFound(failure) => Some(failure.level),
            Self::Stale(failure) => Some(failure.level),
            _ => None,
        }
    }
}
