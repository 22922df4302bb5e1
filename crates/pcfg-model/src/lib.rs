//! Product configuration model
//!
//! Versioned, template-capable configuration objects.
//!
//! # Core Concepts
//!
//! - [`ConfigurationObject`]: root entity, optionally time-sliced into [`Generation`]s
//! - [`PropertyValueStore`]: name-indexed, kind-partitioned property values of a container
//! - [`PropertyValueContent`]: closed set of property value kinds
//! - [`TemplateValueStatus`]: defined, inherited or undefined content
//! - [`ChangeContext`]: explicit change notification and dirty tracking
//! - [`Repository`]: arena of objects, addressed by [`QualifiedName`]
//!
//! # Example
//!
//! ```rust,ignore
//! use pcfg_model::{ChangeContext, ConfigurationObject, Generation};
//!
//! let ctx = ChangeContext::new();
//! let mut product = ConfigurationObject::new("products.Gold".parse()?, "Motor".parse()?);
//! product.new_generation(date, &ctx)?;
//! let effective = product.generation_effective_on(today);
//! ```

#![warn(unreachable_pub)]

mod container;
mod context;
mod error;
mod generation;
mod link;
mod name;
mod object;
mod property_value;
mod repository;
mod status;
mod store;
mod timeline;
mod validation;
mod value;
mod value_set;

pub use container::{ContainerInfo, ContainerKind, ContainerRef, ValueContainer};
pub use context::{ChangeContext, ChangeEvent, ChangeKind, ChangeObserver, SubscriptionId};
pub use error::ModelError;
pub use generation::{Generation, GenerationRange};
pub use link::{Cardinality, Link};
pub use name::{NameError, PartId, QualifiedName};
pub use object::ConfigurationObject;
pub use property_value::{PropertyRef, PropertyValue, PropertyValueContent, PropertyValueKind};
pub use repository::{Repository, TemplateDirectory};
pub use status::TemplateValueStatus;
pub use store::PropertyValueStore;
pub use validation::{codes, InvalidProperty, Message, MessageList, Severity};
pub use value::{SingleValue, ValueHolder};
pub use value_set::{ValueSet, ValueSetKind};

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
