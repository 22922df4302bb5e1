//! Template resolution for configuration objects
//!
//! Property values and links carry a [`TemplateValueStatus`]. This crate
//! computes their effective content through the template chain and drives
//! the status cycle.
//!
//! # Core Concepts
//!
//! - [`TemplateResolver`]: walks template chains through a [`TemplateDirectory`]
//! - [`Resolution`]: resolved, resolved via fallback, or not applicable
//! - [`StatusChange`]: a planned status switch, applied to a mutable object
//!
//! [`TemplateValueStatus`]: pcfg_model::TemplateValueStatus
//! [`TemplateDirectory`]: pcfg_model::TemplateDirectory

#![warn(unreachable_pub)]

mod chain;
mod error;
mod resolution;
mod resolver;
mod switch;

pub use chain::{matching_container, ChainEnd, ChainLookup, TemplateChain};
pub use error::TemplateError;
pub use resolution::{FallbackReason, Origin, Resolution};
pub use resolver::TemplateResolver;
pub use switch::StatusChange;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
