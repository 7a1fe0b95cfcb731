//! In-memory accessibility tree backend for uiinspect.
//!
//! Loads a tree dumped as JSON (or built in code) and answers
//! [`ElementAccess`](uiinspect_protocols::ElementAccess) queries against it.
//! Nodes can be inserted, replaced and removed while handles are held;
//! handles to removed nodes report [`AccessError::Stale`](uiinspect_protocols::AccessError).
//!
//! ## Document format
//!
//! ```json
//! {
//!   "backend": "window-manager",
//!   "root": {
//!     "role": "Pane", "name": "Desktop",
//!     "children": [{ "role": "Window", "name": "Calc", "class_name": "CalcFrame" }]
//!   }
//! }
//! ```

mod document;
mod error;
mod tree;

pub use document::{SnapshotDocument, SnapshotNode};
pub use error::SnapshotError;
pub use tree::{parse_child_path, NodeId, SnapshotTree};
