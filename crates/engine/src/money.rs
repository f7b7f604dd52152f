use std::{
    fmt,
    ops::{Add, AddAssign, Sub},
};

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::EngineError;

/// Largest magnitude accepted for an amount: 10 digits, 2 of them fractional.
const MAX_MINOR: i64 = 99_999_999_99;

/// Signed money amount represented as **integer cents**.
///
/// All amounts are stored and aggregated in minor units so sums are exact;
/// [`Money::to_decimal`] produces the 2-decimal fixed-point value shown to
/// clients.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Converting from a client decimal (rejects more than 2 decimals):
///
/// ```rust
/// use engine::Money;
/// use rust_decimal::Decimal;
///
/// let amount = Money::try_from(Decimal::new(105, 1)).unwrap();
/// assert_eq!(amount.minor(), 1050);
/// assert!(Money::try_from(Decimal::new(12345, 3)).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Fixed-point value with exactly 2 fractional digits.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// `self / total * 100`, rounded to 2 decimals. Zero when `total` is zero.
    #[must_use]
    pub fn percentage_of(self, total: Money) -> Decimal {
        if total.is_zero() {
            return Decimal::ZERO;
        }
        (Decimal::from(self.0) * Decimal::ONE_HUNDRED / Decimal::from(total.0)).round_dp(2)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = EngineError;

    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`, accepts `12.500`)
    /// - max 10 digits in total
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.normalize().scale() > 2 {
            return Err(EngineError::InvalidAmount(
                "ensure that there are no more than 2 decimal places".to_string(),
            ));
        }

        let too_large = || {
            EngineError::InvalidAmount(
                "ensure that there are no more than 10 digits in total".to_string(),
            )
        };
        let minor = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.trunc().to_i64())
            .ok_or_else(too_large)?;
        if minor.unsigned_abs() > MAX_MINOR.unsigned_abs() {
            return Err(too_large());
        }

        Ok(Money(minor))
    }
}
