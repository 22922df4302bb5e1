//! Delta engine for configuration objects
//!
//! Type definitions evolve independently of the objects configured against
//! them. This crate finds where an object no longer matches its type and
//! repairs it.
//!
//! # Core Concepts
//!
//! - [`DeltaComputer`]: runs the fixed sequence of checks over an object's containers
//! - [`DeltaEntry`]: one mismatch, with a fix that re-checks before it changes anything
//! - [`Delta`]: entries of one object grouped by [`DeltaType`]
//! - [`ConverterRegistry`]: datatype conversion strategies used by datatype fixes
//!
//! Fixing every entry and recomputing yields an empty delta, except for
//! entries that report [`FixOutcome::ManualActionRequired`].

#![warn(unreachable_pub)]

mod computer;
mod convert;
mod delta;
mod delta_type;
mod entry;
mod error;
mod options;
mod validation;

pub use computer::DeltaComputer;
pub use convert::{ConverterRegistry, ValueConverter};
pub use delta::{Delta, FixReport};
pub use delta_type::DeltaType;
pub use entry::{DeltaEntry, FixOutcome};
pub use error::DeltaError;
pub use options::DeltaOptions;
pub use validation::{codes, validate};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
