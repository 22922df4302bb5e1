//! Datatype conversion strategies
//!
//! A [`ConverterRegistry`] maps a (source, target) datatype pair to a
//! [`ValueConverter`]. The source datatype of a stored text is the most
//! specific datatype it parses as ([`Datatype::infer`]).

use crate::options::DeltaOptions;
use chrono::NaiveDate;
use pcfg_typedef::{split_money, Datatype};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Rewrites a text of one datatype as another
pub trait ValueConverter: Send + Sync {
    /// Converted text, `None` if this text cannot be converted
    fn convert(&self, text: &str, options: &DeltaOptions) -> Option<String>;
}

impl<F> ValueConverter for F
where
    F: Fn(&str, &DeltaOptions) -> Option<String> + Send + Sync,
{
    fn convert(&self, text: &str, options: &DeltaOptions) -> Option<String> {
        self(text, options)
    }
}

/// Conversion strategies keyed by (source, target) datatype
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<(Datatype, Datatype), Arc<dyn ValueConverter>>,
}

impl ConverterRegistry {
    /// Create registry without strategies
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in strategies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Datatype::Integer, Datatype::Decimal, identity);
        registry.register(Datatype::Long, Datatype::Decimal, identity);
        registry.register(Datatype::Integer, Datatype::Long, identity);
        registry.register(Datatype::Long, Datatype::Integer, long_to_integer);
        registry.register(Datatype::Decimal, Datatype::Integer, decimal_to_integer);
        registry.register(Datatype::Decimal, Datatype::Long, decimal_to_long);
        registry.register(Datatype::Money, Datatype::Decimal, money_to_decimal);
        registry.register(Datatype::Decimal, Datatype::Money, to_money);
        registry.register(Datatype::Integer, Datatype::Money, to_money);
        registry.register(Datatype::String, Datatype::Boolean, to_boolean);
        registry.register(Datatype::Integer, Datatype::Boolean, to_boolean);
        registry.register(Datatype::String, Datatype::Date, german_date);
        registry
    }

    /// Register a strategy, replacing an existing one for the pair
    pub fn register(
        &mut self,
        from: Datatype,
        to: Datatype,
        converter: impl ValueConverter + 'static,
    ) {
        self.converters.insert((from, to), Arc::new(converter));
    }

    /// Strategy for a pair
    #[inline]
    #[must_use]
    pub fn get(&self, from: Datatype, to: Datatype) -> Option<&Arc<dyn ValueConverter>> {
        self.converters.get(&(from, to))
    }

    /// Check if a strategy exists for a pair
    #[inline]
    #[must_use]
    pub fn supports(&self, from: Datatype, to: Datatype) -> bool {
        self.converters.contains_key(&(from, to))
    }

    /// Convert `text` to `target`, inferring its source datatype
    ///
    /// The result is only returned if it parses as `target`.
    #[must_use]
    pub fn convert(&self, text: &str, target: Datatype, options: &DeltaOptions) -> Option<String> {
        if target.is_parsable(text) {
            return Some(text.to_string());
        }
        let source = Datatype::infer(text);
        self.get(source, target)?
            .convert(text, options)
            .filter(|converted| target.is_parsable(converted))
    }
}

impl Debug for ConverterRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<String> = self
            .converters
            .keys()
            .map(|(from, to)| format!("{from}->{to}"))
            .collect();
        pairs.sort();
        f.debug_struct("ConverterRegistry")
            .field("converters", &pairs)
            .finish()
    }
}

fn identity(text: &str, _: &DeltaOptions) -> Option<String> {
    Some(text.to_string())
}

fn long_to_integer(text: &str, _: &DeltaOptions) -> Option<String> {
    let value: i64 = text.parse().ok()?;
    i32::try_from(value).ok().map(|v| v.to_string())
}

/// Integer part of a decimal text with an all-zero fraction
fn integral_part(text: &str) -> Option<&str> {
    match text.split_once('.') {
        Some((whole, fraction)) if fraction.chars().all(|c| c == '0') => Some(whole),
        Some(_) => None,
        None => Some(text),
    }
}

fn decimal_to_integer(text: &str, _: &DeltaOptions) -> Option<String> {
    integral_part(text)?.parse::<i32>().ok().map(|v| v.to_string())
}

fn decimal_to_long(text: &str, _: &DeltaOptions) -> Option<String> {
    integral_part(text)?.parse::<i64>().ok().map(|v| v.to_string())
}

fn money_to_decimal(text: &str, _: &DeltaOptions) -> Option<String> {
    split_money(text).map(|(amount, _)| amount.to_string())
}

fn to_money(text: &str, options: &DeltaOptions) -> Option<String> {
    Some(format!("{text} {}", options.default_currency))
}

fn to_boolean(text: &str, _: &DeltaOptions) -> Option<String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some("true".to_string()),
        "no" | "false" | "0" => Some("false".to_string()),
        _ => None,
    }
}

fn german_date(text: &str, _: &DeltaOptions) -> Option<String> {
    NaiveDate::parse_from_str(text.trim(), "%d.%m.%Y")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}
