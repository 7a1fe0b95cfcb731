//! # uiinspect Protocols
//!
//! Interface definitions shared by the selector engine and its backends.
//! Contains only the access trait, the attribute vocabulary and the error
//! types - no tree walking logic.
//!
//! ## Core Items
//!
//! - [`ElementAccess`] - Read-only queries against a live accessibility tree
//! - [`Dialect`] - Per-backend attribute tables (seed, priority, display names)
//! - [`Attribute`] - Internal predicate names shared by both backends

pub mod access;
pub mod dialect;
pub mod error;

pub use access::{AccessResult, ElementAccess, Point, Rect};
pub use dialect::{Attribute, BackendKind, Dialect, SeedRule, TagForm};
pub use error::{AccessError, SelectorError};
