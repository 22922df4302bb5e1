//! Engine options

use serde::{Deserialize, Serialize};

/// Settings the delta engine needs from the project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DeltaOptions {
    /// Locale used when converting between plain and localized values
    pub default_locale: String,
    /// Currency appended when converting amounts to money
    pub default_currency: String,
}

impl Default for DeltaOptions {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            default_currency: "EUR".to_string(),
        }
    }
}

impl DeltaOptions {
    /// Set default locale
    #[inline]
    #[must_use]
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    /// Set default currency
    #[inline]
    #[must_use]
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }
}
