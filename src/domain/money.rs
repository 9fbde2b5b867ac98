use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{CloseError, Result};

/// Monetary amount. All closure arithmetic stays in exact decimal.
pub type Amount = Decimal;

/// Minor units kept for every monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount accepted for a single entered field (one billion).
pub const MAX_AMOUNT: Amount = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Rounds an amount to cent resolution, midpoint away from zero.
pub fn round_money(value: Amount) -> Amount {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses operator-entered text into a decimal.
///
/// Accepts either `.` or `,` as the decimal mark (`12,50` and `12.50` are the
/// same value). Grouping separators are not accepted.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains('.') {
        if trimmed.contains(',') {
            return None;
        }
        trimmed.to_string()
    } else {
        trimmed.replacen(',', ".", 1)
    };
    Decimal::from_str(&normalized).ok()
}

/// Adds amounts, reporting overflow as a validation error on `field`.
pub(crate) fn checked_total(
    field: &str,
    values: impl IntoIterator<Item = Amount>,
) -> Result<Amount> {
    values.into_iter().try_fold(Amount::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| overflow(field))
    })
}

pub(crate) fn overflow(field: &str) -> CloseError {
    CloseError::validation(field, "amount is too large to total")
}

/// Locale preferences used when rendering amounts for humans or exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: Option<char>,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "€".into(),
            decimal_separator: ',',
            grouping_separator: Some('.'),
        }
    }
}

impl MoneyFormat {
    /// Plain two-decimal rendering with the configured decimal mark and no
    /// grouping, as used in delimited exports.
    pub fn plain(&self, value: Amount) -> String {
        format_fixed(value, self.decimal_separator, None)
    }

    /// Display rendering with symbol and grouping, e.g. `€ 1.234,50`.
    pub fn display(&self, value: Amount) -> String {
        let body = format_fixed(value, self.decimal_separator, self.grouping_separator);
        if self.symbol.is_empty() {
            body
        } else {
            format!("{} {}", self.symbol, body)
        }
    }
}

fn format_fixed(value: Amount, decimal_separator: char, grouping: Option<char>) -> String {
    let rounded = round_money(value);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let int_part = match grouping {
        Some(separator) => group_digits(int_part, separator),
        None => int_part.to_string(),
    };
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{int_part}{decimal_separator}{frac_part}")
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}
