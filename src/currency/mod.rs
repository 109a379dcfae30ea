//! Currency and percentage formatting used in generated messages and reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn symbol(&self) -> Option<&'static str> {
        match self.as_str() {
            "USD" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" => Some("¥"),
            _ => None,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

/// Locale-aware separators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language_tag: "en-US".into(),
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

impl LocaleConfig {
    /// Resolves a BCP 47 tag; anything unrecognised falls back to `en-US` separators.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag.split(['-', '_']).next().unwrap_or("en").to_lowercase();
        let (decimal_separator, grouping_separator) = match language.as_str() {
            "es" | "de" | "it" | "pt" | "nl" => (',', '.'),
            "fr" => (',', ' '),
            _ => ('.', ','),
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
        }
    }
}

/// Formats an amount with two decimals, grouping, and the currency symbol.
pub fn format_amount(amount: f64, currency: &CurrencyCode, locale: &LocaleConfig) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = group_digits(&(cents / 100).to_string(), locale.grouping_separator);
    let body = format!("{}{}{:02}", whole, locale.decimal_separator, cents % 100);
    let body = match currency.symbol() {
        Some(symbol) => format!("{symbol}{body}"),
        None => format!("{} {body}", currency.as_str()),
    };
    if negative && cents > 0 {
        format!("-{body}")
    } else {
        body
    }
}

/// `format_amount` with USD and `en-US` separators.
pub fn format_currency(amount: f64) -> String {
    format_amount(amount, &CurrencyCode::default(), &LocaleConfig::default())
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// Percentage with an explicit `+` for non-negative values.
pub fn format_signed_percentage(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}

/// Turns a `YYYY-MM` key into "March 2024". Returns the key unchanged when malformed.
pub fn format_month_label(month_key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{month_key}-01"), "%Y-%m-%d")
        .map(|date| date.format("%B %Y").to_string())
        .unwrap_or_else(|_| month_key.to_string())
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
