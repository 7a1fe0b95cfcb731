//! Selector model and its line-per-level text form.

mod level;
mod text;

pub use level::{Selector, SelectorLevel};
pub use text::{parse_line, serialize_line, SelectorLine};
