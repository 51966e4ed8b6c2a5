//! Exact EDU currency amounts.
//!
//! Amounts are held as integer base units (10^-18 EDU, the wallet-native
//! smallest unit) so conversion to a transfer value never rounds. Parsing
//! accepts plain decimal strings such as `"0.001"` or `"12"`.

use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of fractional digits carried by the wallet-native unit.
pub const EDU_DECIMALS: u32 = 18;

const BASE_UNITS_PER_EDU: u128 = 10_u128.pow(EDU_DECIMALS);

/// Errors raised while parsing an [`EduAmount`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    /// Input was blank.
    #[error("amount must not be empty")]
    Empty,
    /// Input contained something other than digits and one decimal point.
    #[error("amount must be a plain decimal number")]
    InvalidDigit,
    /// More fractional digits than the wallet unit can represent.
    #[error("amount supports at most {max} decimal places")]
    TooManyDecimals {
        /// Maximum supported fractional digits.
        max: u32,
    },
    /// Value does not fit the base-unit representation.
    #[error("amount is too large")]
    Overflow,
}

/// Non-negative EDU amount with 18 decimal places of precision.
///
/// # Examples
/// ```
/// use scholarships::domain::EduAmount;
///
/// let amount: EduAmount = "0.001".parse().expect("valid amount");
/// assert_eq!(amount.base_units(), 1_000_000_000_000_000);
/// assert_eq!(amount.to_fixed(3), "0.001");
/// assert_eq!(amount.to_string(), "0.001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EduAmount(u128);

impl EduAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Build an amount from wallet base units.
    #[must_use]
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Amount in wallet base units (what a transfer carries as `value`).
    #[must_use]
    pub const fn base_units(&self) -> u128 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Render with a fixed number of decimals, rounding half up.
    ///
    /// `places` is clamped to the supported precision.
    #[must_use]
    pub fn to_fixed(&self, places: u32) -> String {
        let places = places.min(EDU_DECIMALS);
        let scale = 10_u128.pow(EDU_DECIMALS - places);
        let rounded = self.0 / scale + u128::from(self.0 % scale >= scale / 2 && scale > 1);
        if places == 0 {
            return rounded.to_string();
        }
        let unit = 10_u128.pow(places);
        let width = usize::try_from(places).unwrap_or(usize::MAX);
        format!(
            "{whole}.{frac:0width$}",
            whole = rounded / unit,
            frac = rounded % unit,
        )
    }
}

impl FromStr for EduAmount {
    type Err = AmountParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(AmountParseError::Empty);
        }
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountParseError::InvalidDigit);
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(AmountParseError::InvalidDigit);
        }
        let fraction_len =
            u32::try_from(fraction.len()).map_err(|_| AmountParseError::TooManyDecimals {
                max: EDU_DECIMALS,
            })?;
        if fraction_len > EDU_DECIMALS {
            return Err(AmountParseError::TooManyDecimals { max: EDU_DECIMALS });
        }

        let whole_units = parse_digits(whole)?
            .checked_mul(BASE_UNITS_PER_EDU)
            .ok_or(AmountParseError::Overflow)?;
        let fraction_units = parse_digits(fraction)?
            .checked_mul(10_u128.pow(EDU_DECIMALS - fraction_len))
            .ok_or(AmountParseError::Overflow)?;

        whole_units
            .checked_add(fraction_units)
            .map(Self)
            .ok_or(AmountParseError::Overflow)
    }
}

fn parse_digits(digits: &str) -> Result<u128, AmountParseError> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<u128>().map_err(|_| AmountParseError::Overflow)
}

impl fmt::Display for EduAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / BASE_UNITS_PER_EDU;
        let fraction = self.0 % BASE_UNITS_PER_EDU;
        if fraction == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{fraction:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl TryFrom<String> for EduAmount {
    type Error = AmountParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EduAmount> for String {
    fn from(value: EduAmount) -> Self {
        value.to_string()
    }
}

impl Sum for EduAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, item| Self(acc.0.saturating_add(item.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0.001", 1_000_000_000_000_000)]
    #[case("1", BASE_UNITS_PER_EDU)]
    #[case("1.", BASE_UNITS_PER_EDU)]
    #[case(".5", BASE_UNITS_PER_EDU / 2)]
    #[case("0.000000000000000001", 1)]
    #[case("250.25", 250 * BASE_UNITS_PER_EDU + BASE_UNITS_PER_EDU / 4)]
    fn parses_decimal_strings(#[case] raw: &str, #[case] expected: u128) {
        let amount: EduAmount = raw.parse().expect("valid amount");
        assert_eq!(amount.base_units(), expected);
    }

    #[rstest]
    #[case("", AmountParseError::Empty)]
    #[case(".", AmountParseError::InvalidDigit)]
    #[case("-1", AmountParseError::InvalidDigit)]
    #[case("1.2.3", AmountParseError::InvalidDigit)]
    #[case("1e3", AmountParseError::InvalidDigit)]
    #[case("0.0000000000000000001", AmountParseError::TooManyDecimals { max: 18 })]
    #[case("999999999999999999999999", AmountParseError::Overflow)]
    fn rejects_invalid_input(#[case] raw: &str, #[case] expected: AmountParseError) {
        assert_eq!(raw.parse::<EduAmount>(), Err(expected));
    }

    #[rstest]
    #[case("0.001", "0.001")]
    #[case("12", "12.000")]
    #[case("0.0005", "0.001")]
    #[case("0.00049", "0.000")]
    #[case("1.9999", "2.000")]
    fn renders_three_decimals(#[case] raw: &str, #[case] expected: &str) {
        let amount: EduAmount = raw.parse().expect("valid amount");
        assert_eq!(amount.to_fixed(3), expected);
    }

    #[rstest]
    fn display_trims_trailing_zeros() {
        let amount: EduAmount = "3.1400".parse().expect("valid amount");
        assert_eq!(amount.to_string(), "3.14");
        assert_eq!(EduAmount::ZERO.to_string(), "0");
    }

    #[rstest]
    fn sums_amounts() {
        let total: EduAmount = ["0.001", "0.002", "1"]
            .iter()
            .map(|raw| raw.parse::<EduAmount>().expect("valid amount"))
            .sum();
        assert_eq!(total.to_fixed(3), "1.003");
    }

    #[rstest]
    fn serde_uses_decimal_strings() {
        let amount: EduAmount = serde_json::from_str("\"0.25\"").expect("deserialises");
        assert_eq!(serde_json::to_string(&amount).expect("serialises"), "\"0.25\"");
    }
}
