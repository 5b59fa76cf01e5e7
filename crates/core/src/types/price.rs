//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices reach the cart as display text in the shop's locale, e.g.
//! `"12,50 €"` or `"$4.99"`. [`Price::parse`] turns that text into a
//! [`Decimal`] amount plus a [`CurrencyCode`]; [`Price`]'s `Display` renders
//! it back rounded to two decimal places.
//!
//! ## Separator rules
//!
//! - Currency symbols and any whitespace (including no-break spaces) are ignored.
//! - When both `,` and `.` appear, the one appearing last is the decimal
//!   separator and the other is a grouping separator.
//! - A lone `,` is always a decimal separator (`"1,234"` is 1.234).

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places used for display.
pub const DISPLAY_SCALE: u32 = 2;

/// Errors that can occur when parsing or combining [`Price`]s.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input contains a currency symbol but no digits.
    #[error("price has no amount: {0:?}")]
    MissingAmount(String),
    /// The amount is not a decimal number.
    #[error("invalid price amount: {0:?}")]
    InvalidAmount(String),
    /// The amount is below zero.
    #[error("price cannot be negative: {0:?}")]
    Negative(String),
    /// Two different currency symbols in one price.
    #[error("price mixes currencies: {0:?}")]
    MixedCurrency(String),
    /// Prices in different currencies cannot be added.
    #[error("currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency of the running total.
        expected: CurrencyCode,
        /// Currency of the offending price.
        found: CurrencyCode,
    },
    /// Arithmetic overflowed the decimal range.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse localized price text such as `"12,50 €"`.
    ///
    /// `fallback` is used when the text carries no currency symbol. It also
    /// disambiguates `$`, which is shared by several currencies.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty or only whitespace
    /// - Has no digits
    /// - Is not a decimal number once symbols and separators are normalized
    /// - Is negative
    /// - Contains symbols of two different currencies
    ///
    /// # Example
    ///
    /// ```rust
    /// # use panier_core::{CurrencyCode, Price};
    /// # use rust_decimal::Decimal;
    /// let price = Price::parse("12,50 €", CurrencyCode::EUR).unwrap();
    /// assert_eq!(price.amount, Decimal::new(1250, 2));
    /// assert_eq!(price.to_string(), "12.50 €");
    /// ```
    pub fn parse(text: &str, fallback: CurrencyCode) -> Result<Self, PriceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let mut currency: Option<CurrencyCode> = None;
        let mut digits = String::with_capacity(trimmed.len());

        for c in trimmed.chars() {
            if let Some(code) = CurrencyCode::from_symbol(c, fallback) {
                if currency.replace(code).is_some_and(|prev| prev != code) {
                    return Err(PriceError::MixedCurrency(text.to_owned()));
                }
            } else if !c.is_whitespace() {
                digits.push(c);
            }
        }

        if digits.is_empty() {
            return Err(PriceError::MissingAmount(text.to_owned()));
        }

        let amount: Decimal = normalize_separators(&digits)
            .parse()
            .map_err(|_| PriceError::InvalidAmount(text.to_owned()))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(text.to_owned()));
        }

        Ok(Self::new(amount, currency.unwrap_or(fallback)))
    }

    /// This price multiplied by a line quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit.
    pub fn times(&self, quantity: u32) -> Result<Self, PriceError> {
        self.amount
            .checked_mul(Decimal::from(quantity))
            .map(|amount| Self::new(amount, self.currency_code))
            .ok_or(PriceError::Overflow)
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] for different currencies and
    /// [`PriceError::Overflow`] if the sum does not fit.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch {
                expected: self.currency_code,
                found: other.currency_code,
            });
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency_code))
            .ok_or(PriceError::Overflow)
    }

    /// The price rounded half away from zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(
            self.amount
                .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero),
            self.currency_code,
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.rounded().amount;
        let symbol = self.currency_code.symbol();
        if self.currency_code.symbol_after_amount() {
            write!(f, "{amount:.2} {symbol}")
        } else {
            write!(f, "{symbol}{amount:.2}")
        }
    }
}

/// Rewrite locale separators so the result parses as a plain decimal.
fn normalize_separators(raw: &str) -> String {
    let decimal = match (raw.rfind(','), raw.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => ',',
        (Some(_), None) => ',',
        _ => '.',
    };
    let grouping = if decimal == ',' { '.' } else { ',' };

    raw.chars()
        .filter(|&c| c != grouping)
        .map(|c| if c == decimal { '.' } else { c })
        .collect()
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::GBP => "£",
        }
    }

    /// ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EUR => "EUR",
            Self::USD => "USD",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Whether the symbol is written after the amount (`12.50 €`).
    #[must_use]
    pub const fn symbol_after_amount(&self) -> bool {
        matches!(self, Self::EUR)
    }

    /// Resolve a symbol character, preferring `fallback` when it shares the symbol.
    fn from_symbol(c: char, fallback: Self) -> Option<Self> {
        let candidate = match c {
            '€' => Self::EUR,
            '$' => Self::USD,
            '£' => Self::GBP,
            _ => return None,
        };
        if fallback.symbol() == candidate.symbol() {
            Some(fallback)
        } else {
            Some(candidate)
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::EUR),
            "USD" => Ok(Self::USD),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}
