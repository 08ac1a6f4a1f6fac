//! Monetary amounts.
//!
//! Amounts are kept as whole centavos so aggregation never drifts. On the
//! wire they travel as a decimal number of reais (`50`, `12.5`), which is
//! what the browser clients type into their prompts.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Signed amount of money in centavos.
///
/// Negative values are representable because rebuys are not sign-checked
/// and balances can go below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(value_type = f64)]
pub struct Money(i64);

impl Money {
    /// Zero reais.
    pub const ZERO: Self = Self(0);

    /// Builds an amount from centavos.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Builds an amount from whole reais.
    #[must_use]
    pub const fn from_reais(reais: i64) -> Self {
        Self(reais.saturating_mul(100))
    }

    /// Converts a decimal reais value, rounding to the nearest centavo.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64`
    /// centavo range.
    #[must_use]
    pub fn from_decimal(reais: f64) -> Option<Self> {
        if !reais.is_finite() {
            return None;
        }
        let cents = (reais * 100.0).round();
        #[allow(clippy::cast_precision_loss)]
        let in_range = cents >= i64::MIN as f64 && cents <= i64::MAX as f64;
        if !in_range {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        Some(Self(cents as i64))
    }

    /// Returns the amount in centavos.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns the amount as decimal reais.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns `true` when the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    /// Formats as reais, dropping the fraction when it is zero
    /// (`50`, `12.50`, `-10`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let (whole, frac) = (abs / 100, abs % 100);
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            write!(f, "{sign}{whole}.{frac:02}")
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let reais = f64::deserialize(deserializer)?;
        Self::from_decimal(reais)
            .ok_or_else(|| D::Error::custom(format!("invalid monetary amount: {reais}")))
    }
}
