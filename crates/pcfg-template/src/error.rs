//! Template resolver errors

use pcfg_model::{ModelError, PartId, QualifiedName, TemplateValueStatus};

/// Failure of a status change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// Structural model failure
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Status cannot be used on this object
    #[error("status {status} is not allowed for {object}")]
    StatusNotAllowed {
        /// Object
        object: QualifiedName,
        /// Requested status
        status: TemplateValueStatus,
    },

    /// Part is neither a property value nor a link
    #[error("part not found: {0}")]
    PartNotFound(PartId),
}
