//! Scoped class names and cached CSS for component styles.
//!
//! * [`scope`] rewrites selectors into BEM-style classes under a scope and
//!   records every element and modifier it sees.
//! * [`style`] compiles tagged style templates once per structure and binds
//!   dynamic values through custom properties.
//! * [`styled`] composes components on top of the style engine.

pub mod ast;
pub mod error;
pub mod hash;
pub mod parser;
pub mod scope;
pub mod style;
pub mod styled;

pub use error::{Error, Result};
pub use scope::resolver::{ResolverState, ScopeBehaviour, ScopeConfig, ScopeResolver};
pub use style::engine::StyleEngine;
pub use style::token::{CompiledStyle, Declarations, Interpolation, StyleToken};
