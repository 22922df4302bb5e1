//! Categories of delta entries

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Category of a mismatch between a configuration object and its type
///
/// The declaration order is the order entries are grouped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaType {
    /// Object holds generations its type does not allow
    InvalidGenerations,
    /// Declared property without a value
    MissingPropertyValue,
    /// Value for a property that is no longer declared
    ValueWithoutProperty,
    /// Value kind no longer matches the declared property kind
    PropertyTypeMismatch,
    /// Stored text does not parse as the declared datatype
    DatatypeMismatch,
    /// Configured value set has another kind than the declared one
    ValueSetMismatch,
    /// Single/multi value shape differs from the declaration
    ValueHolderMismatch,
    /// Plain/localized shape differs from the declaration
    MultilingualMismatch,
    /// Hidden attribute deviates from its declared default
    HiddenAttributeMismatch,
    /// Link along an association that is no longer declared
    LinkWithoutAssociation,
    /// Link stored in the wrong container for its association
    LinkChangingOverTimeMismatch,
    /// Template link missing locally
    MissingTemplateLink,
    /// Inherited or undefined link whose template link was removed
    RemovedTemplateLink,
    /// Rule configuration for a rule that is no longer declared
    ConfigWithoutValidationRule,
    /// Declared rule without configuration
    MissingValidationRuleConfig,
}

impl DeltaType {
    /// All types in grouping order
    pub const ALL: [Self; 15] = [
        Self::InvalidGenerations,
        Self::MissingPropertyValue,
        Self::ValueWithoutProperty,
        Self::PropertyTypeMismatch,
        Self::DatatypeMismatch,
        Self::ValueSetMismatch,
        Self::ValueHolderMismatch,
        Self::MultilingualMismatch,
        Self::HiddenAttributeMismatch,
        Self::LinkWithoutAssociation,
        Self::LinkChangingOverTimeMismatch,
        Self::MissingTemplateLink,
        Self::RemovedTemplateLink,
        Self::ConfigWithoutValidationRule,
        Self::MissingValidationRuleConfig,
    ];

    /// Check if fixing deletes or truncates stored data
    #[must_use]
    pub fn is_destructive(self) -> bool {
        matches!(
            self,
            Self::InvalidGenerations
                | Self::ValueWithoutProperty
                | Self::PropertyTypeMismatch
                | Self::ValueHolderMismatch
                | Self::LinkWithoutAssociation
                | Self::LinkChangingOverTimeMismatch
                | Self::RemovedTemplateLink
                | Self::ConfigWithoutValidationRule
        )
    }

    /// Name as shown in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidGenerations => "INVALID_GENERATIONS",
            Self::MissingPropertyValue => "MISSING_PROPERTY_VALUE",
            Self::ValueWithoutProperty => "VALUE_WITHOUT_PROPERTY",
            Self::PropertyTypeMismatch => "PROPERTY_TYPE_MISMATCH",
            Self::DatatypeMismatch => "DATATYPE_MISMATCH",
            Self::ValueSetMismatch => "VALUE_SET_MISMATCH",
            Self::ValueHolderMismatch => "VALUE_HOLDER_MISMATCH",
            Self::MultilingualMismatch => "MULTILINGUAL_MISMATCH",
            Self::HiddenAttributeMismatch => "HIDDEN_ATTRIBUTE_MISMATCH",
            Self::LinkWithoutAssociation => "LINK_WITHOUT_ASSOCIATION",
            Self::LinkChangingOverTimeMismatch => "LINK_CHANGING_OVER_TIME_MISMATCH",
            Self::MissingTemplateLink => "MISSING_TEMPLATE_LINK",
            Self::RemovedTemplateLink => "REMOVED_TEMPLATE_LINK",
            Self::ConfigWithoutValidationRule => "CONFIG_WITHOUT_VALIDATION_RULE",
            Self::MissingValidationRuleConfig => "MISSING_VALIDATION_RULE_CONFIG",
        }
    }
}

impl Display for DeltaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
