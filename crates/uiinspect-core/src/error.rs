//! Synthesis errors.

use thiserror::Error;
use uiinspect_protocols::AccessError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// A backend query failed; synthesis is abandoned and the caller refreshes.
    #[error("Access error during synthesis: {0}")]
    Access(#[from] AccessError),

    /// The target has no ancestor step that yields a level (e.g. the desktop root).
    #[error("Element has no selector levels: {0}")]
    NoLevels(String),
}
