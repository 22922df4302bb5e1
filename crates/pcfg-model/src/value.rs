//! Attribute value content
//!
//! An attribute value stores a [`ValueHolder`]: either one [`SingleValue`]
//! or a list of them. A single value is plain text (possibly null) or an
//! international string keyed by locale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// One attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SingleValue {
    /// Plain text, `None` is the null value
    Plain(Option<String>),

    /// Localized text, locale → text
    International(BTreeMap<String, String>),
}

impl SingleValue {
    /// Plain text value
    #[inline]
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(Some(text.into()))
    }

    /// The null value
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::Plain(None)
    }

    /// International value from (locale, text) pairs
    #[must_use]
    pub fn international<L, T>(pairs: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<String>,
        T: Into<String>,
    {
        Self::International(
            pairs
                .into_iter()
                .map(|(l, t)| (l.into(), t.into()))
                .collect(),
        )
    }

    /// Text of a plain, non-null value
    #[inline]
    #[must_use]
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => text.as_deref(),
            Self::International(_) => None,
        }
    }

    /// Text for a locale (plain values ignore the locale)
    #[inline]
    #[must_use]
    pub fn text_for(&self, locale: &str) -> Option<&str> {
        match self {
            Self::Plain(text) => text.as_deref(),
            Self::International(texts) => texts.get(locale).map(String::as_str),
        }
    }

    /// Check for the null value (plain `None` or international without text)
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Plain(text) => text.is_none(),
            Self::International(texts) => texts.is_empty(),
        }
    }

    /// Check if value is localized
    #[inline]
    #[must_use]
    pub fn is_international(&self) -> bool {
        matches!(self, Self::International(_))
    }

    /// Convert to an international value, plain text goes to `locale`
    #[must_use]
    pub fn to_international(&self, locale: &str) -> Self {
        match self {
            Self::Plain(Some(text)) => Self::international([(locale, text.as_str())]),
            Self::Plain(None) => Self::International(BTreeMap::new()),
            Self::International(_) => self.clone(),
        }
    }

    /// Convert to a plain value, taking the text of `locale` or else the first one
    #[must_use]
    pub fn to_plain(&self, locale: &str) -> Self {
        match self {
            Self::Plain(_) => self.clone(),
            Self::International(texts) => Self::Plain(
                texts
                    .get(locale)
                    .or_else(|| texts.values().next())
                    .cloned(),
            ),
        }
    }
}

impl Default for SingleValue {
    fn default() -> Self {
        Self::null()
    }
}

impl Display for SingleValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(Some(text)) => f.write_str(text),
            Self::Plain(None) => f.write_str("<null>"),
            Self::International(texts) => {
                let parts: Vec<String> = texts.iter().map(|(l, t)| format!("{l}={t}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Single- or multi-valued holder of attribute content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueHolder {
    /// Exactly one value
    Single(SingleValue),

    /// Any number of values
    Multi(Vec<SingleValue>),
}

impl ValueHolder {
    /// Single plain text holder
    #[inline]
    #[must_use]
    pub fn single(text: impl Into<String>) -> Self {
        Self::Single(SingleValue::plain(text))
    }

    /// Multi holder of plain texts
    #[must_use]
    pub fn multi<T: Into<String>>(texts: impl IntoIterator<Item = T>) -> Self {
        Self::Multi(texts.into_iter().map(SingleValue::plain).collect())
    }

    /// Empty holder of the requested shape
    #[inline]
    #[must_use]
    pub fn empty(multi_value: bool) -> Self {
        if multi_value {
            Self::Multi(Vec::new())
        } else {
            Self::Single(SingleValue::null())
        }
    }

    /// Check if holder is multi-valued
    #[inline]
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// All values in the holder
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[SingleValue] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }

    /// Mutable access to all values
    #[inline]
    pub fn values_mut(&mut self) -> &mut [SingleValue] {
        match self {
            Self::Single(value) => std::slice::from_mut(value),
            Self::Multi(values) => values,
        }
    }

    /// Wrap the sole value into a multi holder (a null value becomes an empty list)
    #[must_use]
    pub fn into_multi(self) -> Self {
        match self {
            Self::Single(value) if value.is_null() => Self::Multi(Vec::new()),
            Self::Single(value) => Self::Multi(vec![value]),
            multi @ Self::Multi(_) => multi,
        }
    }

    /// Collapse to a single holder keeping the first value
    #[must_use]
    pub fn into_single(self) -> Self {
        match self {
            Self::Multi(values) => Self::Single(values.into_iter().next().unwrap_or_default()),
            single @ Self::Single(_) => single,
        }
    }

    /// Map every value, keeping the shape
    #[must_use]
    pub fn map_values(self, f: impl Fn(SingleValue) -> SingleValue) -> Self {
        match self {
            Self::Single(value) => Self::Single(f(value)),
            Self::Multi(values) => Self::Multi(values.into_iter().map(f).collect()),
        }
    }
}

impl Default for ValueHolder {
    fn default() -> Self {
        Self::empty(false)
    }
}

impl Display for ValueHolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => write!(f, "{value}"),
            Self::Multi(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_into_multi_keeps_value() {
        let holder = ValueHolder::single("A").into_multi();
        assert_eq!(holder, ValueHolder::multi(["A"]));
    }

    #[test]
    fn null_into_multi_is_empty() {
        let holder = ValueHolder::empty(false).into_multi();
        assert_eq!(holder, ValueHolder::Multi(vec![]));
    }

    #[test]
    fn multi_into_single_keeps_first() {
        let holder = ValueHolder::multi(["A", "B"]).into_single();
        assert_eq!(holder, ValueHolder::single("A"));
        let holder = ValueHolder::Multi(vec![]).into_single();
        assert_eq!(holder, ValueHolder::empty(false));
    }

    #[test]
    fn international_conversions() {
        let plain = SingleValue::plain("Hallo");
        let intl = plain.to_international("de");
        assert_eq!(intl.text_for("de"), Some("Hallo"));
        assert_eq!(intl.to_plain("de"), plain);

        let other = SingleValue::international([("en", "Hello")]);
        assert_eq!(other.to_plain("de"), SingleValue::plain("Hello"));
    }

    #[test]
    fn holder_serde_shapes() {
        let single: ValueHolder = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(single, ValueHolder::single("A"));
        let null: ValueHolder = serde_json::from_str("null").unwrap();
        assert_eq!(null, ValueHolder::empty(false));
        let multi: ValueHolder = serde_json::from_str(r#"["A", null]"#).unwrap();
        assert_eq!(
            multi,
            ValueHolder::Multi(vec![SingleValue::plain("A"), SingleValue::null()])
        );
        let intl: ValueHolder = serde_json::from_str(r#"{"en":"Hi"}"#).unwrap();
        assert!(intl.values()[0].is_international());
    }

    #[test]
    fn holder_display() {
        assert_eq!(ValueHolder::multi(["A", "B"]).to_string(), "[A, B]");
        assert_eq!(ValueHolder::empty(false).to_string(), "<null>");
    }
}
