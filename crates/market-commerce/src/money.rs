//! Money type for representing monetary values.
//!
//! Amounts are integers in the currency's minor unit. Fee math stays in
//! integers so that rounding is always an explicit floor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    EUR,
    USD,
    GBP,
    JPY,
    CHF,
}

impl Currency {
    /// Get the currency code (e.g., "EUR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
        }
    }

    /// Get the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "\u{20ac}",
            Currency::USD => "$",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CHF => "CHF",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "EUR" => Some(Currency::EUR),
            "USD" => Some(Currency::USD),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CHF" => Some(Currency::CHF),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the smallest currency unit (e.g., cents).
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Try to add another Money value.
    ///
    /// Returns `None` on currency mismatch or overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Try to subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_sub(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Multiply by an integer factor, `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
    }

    /// Sum an iterator of Money values.
    ///
    /// Returns `None` if any value has a different currency or the sum overflows.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>, currency: Currency) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Take a fraction expressed in basis points, rounded down.
    ///
    /// Non-positive amounts yield zero.
    pub fn basis_points_floor(&self, bps: u32) -> Money {
        if self.amount_minor <= 0 {
            return Money::zero(self.currency);
        }
        // bounded by amount_minor for bps <= 10_000
        let scaled = i128::from(self.amount_minor) * i128::from(bps) / 10_000;
        Money::new(i64::try_from(scaled).unwrap_or(i64::MAX), self.currency)
    }

    /// Format as a display string (e.g., "€12.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format without the symbol (e.g., "12.99").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        if places == 0 {
            return self.amount_minor.to_string();
        }
        let divisor = 10_i64.pow(places);
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / divisor as u64,
            abs % divisor as u64,
            width = places as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(1299, Currency::EUR).display(), "\u{20ac}12.99");
        assert_eq!(Money::new(5, Currency::USD).display_amount(), "0.05");
        assert_eq!(Money::new(-150, Currency::EUR).display_amount(), "-1.50");
        assert_eq!(Money::new(100, Currency::JPY).display(), "\u{00a5}100");
    }

    #[test]
    fn test_try_add_currency_mismatch() {
        let eur = Money::new(1000, Currency::EUR);
        let usd = Money::new(1000, Currency::USD);
        assert!(eur.try_add(&usd).is_none());
        assert_eq!(eur.try_add(&eur).unwrap().amount_minor, 2000);
    }

    #[test]
    fn test_try_multiply_overflow() {
        let m = Money::new(i64::MAX / 2 + 1, Currency::EUR);
        assert!(m.try_multiply(2).is_none());
        assert_eq!(Money::new(599, Currency::EUR).try_multiply(3).unwrap().amount_minor, 1797);
    }

    #[test]
    fn test_try_sum() {
        let values = [Money::new(1000, Currency::EUR), Money::new(500, Currency::EUR)];
        let total = Money::try_sum(values.iter(), Currency::EUR).unwrap();
        assert_eq!(total.amount_minor, 1500);

        let mixed = [Money::new(1000, Currency::EUR), Money::new(500, Currency::GBP)];
        assert!(Money::try_sum(mixed.iter(), Currency::EUR).is_none());

        let empty: [Money; 0] = [];
        assert_eq!(Money::try_sum(empty.iter(), Currency::EUR), Some(Money::zero(Currency::EUR)));

        let huge = [Money::new(i64::MAX, Currency::EUR), Money::new(1, Currency::EUR)];
        assert!(Money::try_sum(huge.iter(), Currency::EUR).is_none());
    }

    #[test]
    fn test_basis_points_floor() {
        let ten_percent = 1_000;
        assert_eq!(Money::new(1500, Currency::EUR).basis_points_floor(ten_percent).amount_minor, 150);
        assert_eq!(Money::new(1999, Currency::EUR).basis_points_floor(ten_percent).amount_minor, 199);
        assert_eq!(Money::new(9, Currency::EUR).basis_points_floor(ten_percent).amount_minor, 0);
        assert_eq!(Money::new(-500, Currency::EUR).basis_points_floor(ten_percent).amount_minor, 0);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("eur"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("XYZ"), None);
    }
}
