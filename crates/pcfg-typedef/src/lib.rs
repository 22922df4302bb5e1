//! Product type definitions
//!
//! The type model that configuration objects are reconciled against:
//! datatypes, property and association declarations, product types with
//! supertypes, and the [`TypeDefinition`] seam consumed by the delta engine.

#![warn(unreachable_pub)]

mod datatype;
mod declaration;
mod error;
mod product_type;
mod registry;

pub use datatype::{split_money, Datatype};
pub use declaration::{AssociationDeclaration, PropertyDeclaration, PropertyKind};
pub use error::TypeError;
pub use product_type::{ProductType, ResolvedType, TypeDefinition};
pub use registry::TypeRegistry;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
