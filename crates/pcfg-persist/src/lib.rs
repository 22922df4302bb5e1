//! Document storage for product configuration
//!
//! Reads and writes configuration objects as JSON or YAML documents and
//! product types from type files.
//!
//! # Core Concepts
//!
//! - [`ProjectConfig`]: project settings read from TOML
//! - [`ConfigurationDocument`]: persisted form of a configuration object
//! - [`DocumentHeader`] / [`HeaderCache`]: object identity, cached by content fingerprint
//! - [`ContentHash`]: BLAKE3 fingerprint of document bytes
//! - [`DocumentStore`]: loads repositories and type registries, saves dirty objects

#![warn(unreachable_pub)]

mod config;
mod document;
mod error;
mod hash;
mod header;
mod store;

pub use config::ProjectConfig;
pub use document::{
    ConfigurationDocument, DocumentFormat, GenerationElement, LinkElement, ValueElement,
};
pub use error::PersistError;
pub use hash::ContentHash;
pub use header::{DocumentHeader, HeaderCache};
pub use store::{DocumentStore, SaveReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
