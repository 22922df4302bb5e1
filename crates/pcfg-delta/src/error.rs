//! Delta engine errors

use pcfg_model::{ModelError, QualifiedName};
use pcfg_typedef::TypeError;

/// Failure while computing or fixing a delta
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeltaError {
    /// Structural model failure during a fix
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Type of the object could not be resolved
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Delta applied to another object than it was computed for
    #[error("delta computed for {expected} applied to {found}")]
    ObjectMismatch {
        /// Object the delta belongs to
        expected: QualifiedName,
        /// Object passed to the fix
        found: QualifiedName,
    },
}
