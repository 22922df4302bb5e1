//! Type definition errors

use pcfg_model::QualifiedName;

/// Failure to build or resolve a type definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// No type of that name is registered
    #[error("unknown product type: {0}")]
    UnknownType(QualifiedName),

    /// A type names a supertype that is not registered
    #[error("{type_name} extends unknown supertype {supertype}")]
    UnknownSupertype {
        /// Extending type
        type_name: QualifiedName,
        /// Missing supertype
        supertype: QualifiedName,
    },

    /// Supertype chain loops back to a type
    #[error("supertype cycle through {0}")]
    SupertypeCycle(QualifiedName),

    /// Two types share a name
    #[error("duplicate product type: {0}")]
    DuplicateType(QualifiedName),
}
