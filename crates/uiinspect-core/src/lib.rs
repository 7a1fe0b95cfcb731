//! # uiinspect Core
//!
//! Selector synthesis and resolution over any [`ElementAccess`] backend.
//!
//! ## Pipeline
//!
//! - [`Synthesizer`] walks from a target element to the root, asking the
//!   [`Disambiguator`] which attributes separate it from its preceding siblings.
//! - [`Selector`] holds the resulting levels, root first, and converts to and
//!   from one line of text per level.
//! - [`Resolver`] re-walks a live tree with a [`Selector`], retrying the whole
//!   chain until a timeout.
//!
//! [`ElementAccess`]: uiinspect_protocols::ElementAccess

pub mod codegen;
pub mod disambiguator;
pub mod error;
pub mod predicate;
pub mod properties;
pub mod resolver;
pub mod selector;
pub mod synthesizer;
pub mod traversal;

pub use codegen::CodeGenerator;
pub use disambiguator::{AttributeSet, Disambiguator};
pub use error::SynthesisError;
pub use predicate::LevelPredicate;
pub use properties::ElementProperties;
pub use resolver::{
    Attempt, LevelFailure, Poller, ResolveError, ResolveOptions, Resolver, StaleFailure,
};
pub use selector::{Selector, SelectorLevel, SelectorLine};
pub use synthesizer::{Synthesis, SynthesizedLevel, Synthesizer};
pub use traversal::Descendants;
pub use uiinspect_protocols as protocols;
