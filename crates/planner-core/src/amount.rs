//! Exact quantities.
//!
//! Catalog numbers arrive as decimals (`1.5`, `0.25`) and convert to
//! [`Amount`] without loss. Scaling through a recipe multiplies and divides
//! rationals, so a yield of 3 gives thirds rather than `0.333...`, and every
//! parent-child edge of a production tree conserves amounts exactly.

use num_rational::Ratio;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, Signed, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

/// Largest decimal scale `rust_decimal` represents.
const MAX_DECIMAL_SCALE: u32 = 28;

/// Exact rational quantity over `i128`, always kept in lowest terms.
///
/// Every item count, recipe yield, and build time in the planner is an
/// `Amount`. Floating point never enters the expansion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Ratio<i128>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid amount '{0}': expected a decimal or a fraction like 1/3")]
pub struct ParseAmountError(String);

impl Amount {
    pub const ZERO: Amount = Amount(Ratio::new_raw(0, 1));
    pub const ONE: Amount = Amount(Ratio::new_raw(1, 1));
    pub const MAX: Amount = Amount(Ratio::new_raw(i128::MAX, 1));

    /// `numer / denom` in lowest terms. `None` when `denom` is zero.
    pub fn ratio(numer: i128, denom: i128) -> Option<Amount> {
        if denom == 0 {
            return None;
        }
        Some(Amount(Ratio::new(numer, denom)))
    }

    pub fn numer(&self) -> i128 {
        *self.0.numer()
    }

    pub fn denom(&self) -> i128 {
        *self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn checked_add(&self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(&rhs.0).map(Amount)
    }

    pub fn checked_mul(&self, rhs: Amount) -> Option<Amount> {
        self.0.checked_mul(&rhs.0).map(Amount)
    }

    /// `None` on overflow or division by zero.
    pub fn checked_div(&self, rhs: Amount) -> Option<Amount> {
        if rhs.is_zero() {
            return None;
        }
        self.0.checked_div(&rhs.0).map(Amount)
    }

    /// The exact decimal form, normalized. `None` when the denominator has a
    /// prime factor other than 2 and 5 (`1/3`), or the value does not fit a
    /// `Decimal`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let denom = self.denom();
        let (twos, rest) = strip_factor(denom, 2);
        let (fives, rest) = strip_factor(rest, 5);
        if rest != 1 {
            return None;
        }
        let scale = twos.max(fives);
        if scale > MAX_DECIMAL_SCALE {
            return None;
        }
        let mantissa = self.numer().checked_mul(10i128.pow(scale) / denom)?;
        Decimal::try_from_i128_with_scale(mantissa, scale)
            .ok()
            .map(|d| d.normalize())
    }
}

fn strip_factor(mut n: i128, factor: i128) -> (u32, i128) {
    let mut count = 0;
    while n % factor == 0 {
        n /= factor;
        count += 1;
    }
    (count, n)
}

impl Default for Amount {
    fn default() -> Self {
        Amount::ZERO
    }
}

impl From<Decimal> for Amount {
    /// Lossless: a decimal is `mantissa / 10^scale`, and both fit `i128`.
    fn from(d: Decimal) -> Self {
        Amount(Ratio::new(d.mantissa(), 10i128.pow(d.scale())))
    }
}

impl From<i32> for Amount {
    fn from(v: i32) -> Self {
        Amount(Ratio::from_integer(i128::from(v)))
    }
}

impl From<i64> for Amount {
    fn from(v: i64) -> Self {
        Amount(Ratio::from_integer(i128::from(v)))
    }
}

impl From<i128> for Amount {
    fn from(v: i128) -> Self {
        Amount(Ratio::from_integer(v))
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Accepts decimal text (`"2.5"`, `"1e3"`) and fractions (`"1/3"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ParseAmountError(s.to_string());
        if let Some((numer, denom)) = s.split_once('/') {
            let numer = numer.trim().parse::<i128>().map_err(|_| invalid())?;
            let denom = denom.trim().parse::<i128>().map_err(|_| invalid())?;
            return Amount::ratio(numer, denom).ok_or_else(invalid);
        }
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Amount::from)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for Amount {
    /// Decimal form when it terminates (`6`, `2.5`), otherwise `n/d`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(d) => write!(f, "{d}"),
            None => write!(f, "{}", self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Amount::from)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 = self.0 + rhs.0;
    }
}

impl Mul for Amount {
    type Output = Amount;

    fn mul(self, rhs: Amount) -> Amount {
        Amount(self.0 * rhs.0)
    }
}

/// Ingredient quantity needed to produce `requested` units of a product
/// that a recipe yields `produced` at a time.
///
/// Computes `ingredient * requested / produced` exactly. Returns `None` on
/// overflow or when `produced` is zero.
#[inline]
pub fn scale_requirement(ingredient: Amount, requested: Amount, produced: Amount) -> Option<Amount> {
    ingredient.checked_mul(requested)?.checked_div(produced)
}
