//! Value datatypes of attributes
//!
//! Attribute content is stored as text. A [`Datatype`] decides whether a
//! text is a valid instance.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid decimal regex"));

static MONEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+(\.\d+)?) ([A-Z]{3})$").expect("valid money regex"));

/// Datatype of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// Any text
    String,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    Long,
    /// Decimal number with optional fraction
    Decimal,
    /// Decimal amount followed by an ISO currency code, e.g. `10.50 EUR`
    Money,
    /// `true` or `false`
    Boolean,
    /// ISO date `YYYY-MM-DD`
    Date,
}

impl Datatype {
    /// Datatypes from most to least specific
    pub const BY_SPECIFICITY: [Self; 7] = [
        Self::Boolean,
        Self::Integer,
        Self::Long,
        Self::Decimal,
        Self::Money,
        Self::Date,
        Self::String,
    ];

    /// Check if `text` is an instance of this datatype
    #[must_use]
    pub fn is_parsable(self, text: &str) -> bool {
        match self {
            Self::String => true,
            Self::Integer => text.parse::<i32>().is_ok(),
            Self::Long => text.parse::<i64>().is_ok(),
            Self::Decimal => DECIMAL.is_match(text),
            Self::Money => MONEY.is_match(text),
            Self::Boolean => matches!(text, "true" | "false"),
            Self::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok(),
        }
    }

    /// Most specific datatype `text` parses as
    #[must_use]
    pub fn infer(text: &str) -> Self {
        Self::BY_SPECIFICITY
            .into_iter()
            .find(|d| d.is_parsable(text))
            .unwrap_or(Self::String)
    }

    /// Check if the datatype is numeric
    #[inline]
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Long | Self::Decimal | Self::Money)
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Decimal => "decimal",
            Self::Money => "money",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

impl Display for Datatype {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a money text into amount and currency
#[must_use]
pub fn split_money(text: &str) -> Option<(&str, &str)> {
    let captures = MONEY.captures(text)?;
    Some((captures.get(1)?.as_str(), captures.get(3)?.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_checks() {
        assert!(Datatype::Integer.is_parsable("-42"));
        assert!(!Datatype::Integer.is_parsable("3000000000"));
        assert!(Datatype::Long.is_parsable("3000000000"));
        assert!(Datatype::Decimal.is_parsable("3.14"));
        assert!(!Datatype::Decimal.is_parsable("3."));
        assert!(Datatype::Money.is_parsable("10.50 EUR"));
        assert!(!Datatype::Money.is_parsable("10.50"));
        assert!(Datatype::Boolean.is_parsable("false"));
        assert!(!Datatype::Boolean.is_parsable("yes"));
        assert!(Datatype::Date.is_parsable("2024-02-29"));
        assert!(!Datatype::Date.is_parsable("2023-02-29"));
        assert!(Datatype::String.is_parsable("anything"));
    }

    #[test]
    fn infer_most_specific() {
        assert_eq!(Datatype::infer("1"), Datatype::Integer);
        assert_eq!(Datatype::infer("3000000000"), Datatype::Long);
        assert_eq!(Datatype::infer("1.5"), Datatype::Decimal);
        assert_eq!(Datatype::infer("1.5 USD"), Datatype::Money);
        assert_eq!(Datatype::infer("true"), Datatype::Boolean);
        assert_eq!(Datatype::infer("2024-01-01"), Datatype::Date);
        assert_eq!(Datatype::infer("01.01.2024"), Datatype::String);
    }

    #[test]
    fn money_parts() {
        assert_eq!(split_money("10.50 EUR"), Some(("10.50", "EUR")));
        assert_eq!(split_money("EUR"), None);
    }

    #[test]
    fn serde_lowercase() {
        assert_eq!(serde_json::to_string(&Datatype::Money).unwrap(), "\"money\"");
        let parsed: Datatype = serde_json::from_str("\"date\"").unwrap();
        assert_eq!(parsed, Datatype::Date);
    }
}
