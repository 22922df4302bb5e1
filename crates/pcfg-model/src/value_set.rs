//! Allowed-value sets for configurable attributes

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of a value set, independent of its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSetKind {
    /// Any value of the datatype
    Unrestricted,

    /// Explicit list of values
    Enum,

    /// Bounded interval, optionally stepped
    Range,
}

impl Display for ValueSetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unrestricted => "unrestricted",
            Self::Enum => "enum",
            Self::Range => "range",
        })
    }
}

/// Set of allowed values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueSet {
    /// Every value of the datatype is allowed
    Unrestricted {
        /// Whether null is allowed
        #[serde(default = "default_true")]
        contains_null: bool,
    },

    /// Only the listed values are allowed
    Enum {
        /// Allowed values, `None` for null
        #[serde(default)]
        values: Vec<Option<String>>,
    },

    /// Values between `lower` and `upper`
    Range {
        /// Lower bound, open if absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower: Option<String>,
        /// Upper bound, open if absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper: Option<String>,
        /// Step, continuous if absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<String>,
        /// Whether null is allowed
        #[serde(default)]
        contains_null: bool,
    },
}

fn default_true() -> bool {
    true
}

impl ValueSet {
    /// Unrestricted set allowing null
    #[inline]
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::Unrestricted {
            contains_null: true,
        }
    }

    /// Enum set of plain values
    #[must_use]
    pub fn enumeration<T: Into<String>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Enum {
            values: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }

    /// Closed range without step
    #[must_use]
    pub fn range(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self::Range {
            lower: Some(lower.into()),
            upper: Some(upper.into()),
            step: None,
            contains_null: false,
        }
    }

    /// Kind of this set
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueSetKind {
        match self {
            Self::Unrestricted { .. } => ValueSetKind::Unrestricted,
            Self::Enum { .. } => ValueSetKind::Enum,
            Self::Range { .. } => ValueSetKind::Range,
        }
    }
}

impl Default for ValueSet {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl Display for ValueSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted { .. } => f.write_str("<unrestricted>"),
            Self::Enum { values } => {
                let parts: Vec<&str> = values
                    .iter()
                    .map(|v| v.as_deref().unwrap_or("<null>"))
                    .collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Range {
                lower, upper, step, ..
            } => {
                write!(
                    f,
                    "{}..{}",
                    lower.as_deref().unwrap_or("*"),
                    upper.as_deref().unwrap_or("*")
                )?;
                if let Some(step) = step {
                    write!(f, " step {step}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_set_kinds() {
        assert_eq!(ValueSet::unrestricted().kind(), ValueSetKind::Unrestricted);
        assert_eq!(ValueSet::enumeration(["a"]).kind(), ValueSetKind::Enum);
        assert_eq!(ValueSet::range("0", "10").kind(), ValueSetKind::Range);
    }

    #[test]
    fn value_set_serde_tagged() {
        let json = serde_json::to_string(&ValueSet::range("1", "5")).unwrap();
        assert!(json.contains("\"type\":\"range\""));
        let back: ValueSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ValueSet::range("1", "5"));

        let unrestricted: ValueSet = serde_json::from_str(r#"{"type":"unrestricted"}"#).unwrap();
        assert_eq!(unrestricted, ValueSet::unrestricted());
    }

    #[test]
    fn value_set_display() {
        assert_eq!(ValueSet::enumeration(["a", "b"]).to_string(), "[a, b]");
        assert_eq!(ValueSet::range("0", "9").to_string(), "0..9");
    }
}
