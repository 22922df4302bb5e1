//! Structural errors of the configuration model
//!
//! These are programmer errors (deleting a part twice, indexing past the
//! last generation). Data problems such as duplicate generation dates are
//! reported through validation, not through this type.

use crate::container::ContainerRef;
use crate::name::{NameError, PartId, QualifiedName};
use crate::property_value::PropertyValueKind;

/// Structural model failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Part does not exist (never existed or already deleted)
    #[error("part not found: {0}")]
    PartNotFound(PartId),

    /// Container does not exist in the object
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerRef),

    /// Configuration object does not exist
    #[error("configuration object not found: {0}")]
    ObjectNotFound(QualifiedName),

    /// Configuration object name already taken
    #[error("configuration object already exists: {0}")]
    ObjectAlreadyExists(QualifiedName),

    /// Generation index out of range
    #[error("generation index {index} out of range (object has {len} generations)")]
    GenerationIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of generations
        len: usize,
    },

    /// Object has no generations to work on
    #[error("{0} has no generations")]
    NoGenerations(QualifiedName),

    /// Generations requested on an object that is not changing over time
    #[error("{0} is not changing over time")]
    NotChangingOverTime(QualifiedName),

    /// A second value of the same kind for one property in one store
    #[error("duplicate {kind} for property '{property}'")]
    DuplicatePropertyValue {
        /// Property name
        property: String,
        /// Value kind
        kind: PropertyValueKind,
    },

    /// Value kind that the property is not stored as
    #[error("property '{property}' has no {kind} values")]
    KindNotApplicable {
        /// Property name
        property: String,
        /// Requested kind
        kind: PropertyValueKind,
    },

    /// Invalid qualified name
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),
}
