//! Error types for the uiinspect protocol layer.

mod access;
mod selector;

pub use access::*;
pub use selector::*;
