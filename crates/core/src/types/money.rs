//! Fixed-point money amounts.
//!
//! All prices and totals in the shop are stored as `NUMERIC(12,2)` and handled
//! as [`rust_decimal::Decimal`], so summing line totals never drifts the way
//! binary floating point would (`3 × 9.99` is exactly `29.97`).

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits kept for every amount.
pub const MONEY_SCALE: u32 = 2;

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// Amount has more precision than cents.
    #[error("amount must have at most {MONEY_SCALE} decimal places")]
    TooPrecise,
    /// Amount does not fit a `NUMERIC(12,2)` column.
    #[error("amount cannot exceed {}", Money::MAX)]
    TooLarge,
}

/// A non-negative amount of the shop currency with cent precision.
///
/// Serializes as a decimal string (`"29.97"`) so JSON clients never see a
/// float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest storable amount, `9999999999.99`.
    pub const MAX: Self = Self(Decimal::from_parts(3_567_587_327, 232, 0, false, MONEY_SCALE));

    /// Validate and wrap a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` for amounts below zero,
    /// `MoneyError::TooPrecise` for amounts with sub-cent digits and
    /// `MoneyError::TooLarge` above [`Money::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        if amount.normalize().scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise);
        }
        if amount > Self::MAX.0 {
            return Err(MoneyError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Build an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), MONEY_SCALE))
    }

    /// The underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Callers pass validated quantities (at least 1); cart and order rows
    /// enforce that with a `CHECK` constraint.
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Like [`Money::times`], but `None` when the result exceeds
    /// [`Money::MAX`].
    #[must_use]
    pub fn checked_times(self, quantity: i32) -> Option<Self> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .filter(|amount| *amount <= Self::MAX.0)
            .map(Self)
    }

    /// Sum of two amounts, or `None` above [`Money::MAX`].
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0
            .checked_add(rhs.0)
            .filter(|amount| *amount <= Self::MAX.0)
            .map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // NUMERIC(12,2) columns with a CHECK (>= 0) constraint
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::str::FromStr;

    use super::*;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(
            Money::new(Decimal::from_str("-0.01").unwrap()),
            Err(MoneyError::Negative)
        );
    }

    #[test]
    fn test_rejects_sub_cent_precision() {
        assert_eq!(
            Money::new(Decimal::from_str("1.005").unwrap()),
            Err(MoneyError::TooPrecise)
        );
        // Trailing zeros are not extra precision
        assert!(Money::new(Decimal::from_str("1.500").unwrap()).is_ok());
    }

    #[test]
    fn test_rejects_amounts_over_column_width() {
        assert_eq!(Money::MAX.to_string(), "9999999999.99");
        assert!(Money::new(Decimal::from_str("9999999999.99").unwrap()).is_ok());
        assert_eq!(
            Money::new(Decimal::from_str("10000000000.00").unwrap()),
            Err(MoneyError::TooLarge)
        );
        assert_eq!(
            Money::new(Decimal::from_str("100000000000").unwrap()),
            Err(MoneyError::TooLarge)
        );
    }

    #[test]
    fn test_checked_arithmetic_stays_storable() {
        assert_eq!(money("9.99").checked_times(3), Some(money("29.97")));
        assert_eq!(money("5000000000.00").checked_times(2), None);
        assert_eq!(
            money("4999999999.99").checked_times(2),
            Some(money("9999999999.98"))
        );
        assert_eq!(money("9999999999.99").checked_add(money("0.01")), None);
        assert_eq!(money("1.50").checked_add(money("2.25")), Some(money("3.75")));
    }

    #[test]
    fn test_times_is_exact() {
        assert_eq!(money("9.99").times(3), money("29.97"));
        assert_eq!(money("0.10").times(3), money("0.30"));
    }

    #[test]
    fn test_sum_of_line_totals() {
        let lines = [money("25.00").times(2), money("10.00").times(1), money("0.01")];
        let total: Money = lines.iter().sum();
        assert_eq!(total, money("60.01"));
    }

    #[test]
    fn test_display_has_two_decimals() {
        assert_eq!(Money::from_cents(2997).to_string(), "29.97");
        assert_eq!(money("5").to_string(), "5.00");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_cents(999)).unwrap();
        assert_eq!(json, "\"9.99\"");
    }
}
