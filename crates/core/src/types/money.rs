//! Monetary amounts using decimal arithmetic.
//!
//! The storefront sells in a single currency (CFA francs), so an amount is
//! a bare [`Decimal`]. On the wire it is a plain JSON number, in the
//! database a `NUMERIC` column.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Decimal places a stored amount may carry.
const MAX_SCALE: u32 = 2;

/// Exclusive bound on a stored amount: ten integer digits.
const MAX_WHOLE: i64 = 10_000_000_000;

/// A monetary amount.
///
/// ```
/// use akwaba_core::Money;
/// use rust_decimal::Decimal;
///
/// let unit = Money::new(Decimal::new(1050, 2));
/// assert_eq!(unit.checked_mul_quantity(2), Some(Money::new(Decimal::new(2100, 2))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero in the store currency.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// True when the amount is strictly below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// True when the amount fits a `NUMERIC(12, 2)` column without rounding:
    /// at most two decimal places and below 10^10 in magnitude.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        let amount = self.0.normalize();
        amount.scale() <= MAX_SCALE && amount.abs() < Decimal::from(MAX_WHOLE)
    }

    /// Line total for `quantity` units at this price. `None` on overflow.
    #[must_use]
    pub fn checked_mul_quantity(&self, quantity: i32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum that reports overflow instead of panicking.
    #[must_use]
    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
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
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
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
    use super::*;

    #[test]
    fn test_json_number_round_trip() {
        let money: Money = serde_json::from_str("25.5").unwrap();
        assert_eq!(money, Money::new(Decimal::new(255, 1)));

        let whole: Money = serde_json::from_str("15000").unwrap();
        assert_eq!(whole, Money::new(Decimal::from(15000)));

        let json = serde_json::to_value(Money::new(Decimal::new(1999, 2))).unwrap();
        assert_eq!(json, serde_json::json!(19.99));
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::new(Decimal::new(-1, 2)).is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::new(Decimal::NEGATIVE_ONE * Decimal::ZERO).is_negative());
    }

    #[test]
    fn test_is_storable() {
        assert!(Money::new(Decimal::new(1999, 2)).is_storable());
        assert!(Money::new(Decimal::new(10500, 3)).is_storable());
        assert!(Money::new(Decimal::new(999_999_999_999, 2)).is_storable());
        assert!(!Money::new(Decimal::new(10005, 3)).is_storable());
        assert!(!Money::new(Decimal::from(10_000_000_000_i64)).is_storable());
        assert!(!Money::new(Decimal::from(-10_000_000_000_i64)).is_storable());
    }

    #[test]
    fn test_line_total_and_sum() {
        let lines = [
            Money::new(Decimal::from(10)).checked_mul_quantity(2).unwrap(),
            Money::new(Decimal::new(55, 1)).checked_mul_quantity(1).unwrap(),
        ];
        let total: Money = lines.into_iter().sum();
        assert_eq!(total, Money::new(Decimal::new(255, 1)));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(Money::new(Decimal::MAX).checked_mul_quantity(2).is_none());
        assert!(Money::new(Decimal::MAX)
            .checked_add(Money::new(Decimal::ONE))
            .is_none());
    }
}
