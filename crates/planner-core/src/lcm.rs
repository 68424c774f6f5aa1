//! Least common multiple over integers and exact decimals.
//!
//! Decimal operands are reduced to integers by a common power of ten: with
//! `d` the largest fractional digit count among the decimals, every operand
//! is multiplied by `10^d`, the integer LCM is taken, and the result is
//! floor-divided by `10^d`. No floating point is involved, so `2.5` and
//! `1.0` give exactly `5`.
//!
//! Conventions: signs are ignored, any zero operand makes the result zero,
//! and a single operand is its own LCM.

use crate::amount::Amount;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// One LCM input: a plain integer or an exact decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Integer(i64),
    Decimal(Decimal),
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Integer(v)
    }
}

impl From<Decimal> for Operand {
    fn from(v: Decimal) -> Self {
        Operand::Decimal(v)
    }
}

impl TryFrom<Amount> for Operand {
    type Error = LcmError;

    /// Terminating amounts only; `1/3` has no decimal operand form.
    fn try_from(v: Amount) -> Result<Self, Self::Error> {
        v.to_decimal()
            .map(Operand::Decimal)
            .ok_or_else(|| LcmError::InvalidOperand(v.to_string()))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Integer(v) => write!(f, "{v}"),
            Operand::Decimal(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for Operand {
    type Err = LcmError;

    /// `"4"` is an integer, `"2.5"` and `"1e3"` are decimals, anything else
    /// is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(v) = s.parse::<i64>() {
            return Ok(Operand::Integer(v));
        }
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Operand::Decimal)
            .map_err(|_| LcmError::InvalidOperand(s.to_string()))
    }
}

#[cfg(feature = "json")]
impl TryFrom<&serde_json::Value> for Operand {
    type Error = LcmError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Ok(Operand::Integer(v)),
                None => n.to_string().parse(),
            },
            other => Err(LcmError::InvalidOperand(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LcmError {
    #[error("only integers and decimals are allowed in lcm, got: {0}")]
    InvalidOperand(String),

    #[error("lcm of an empty operand list")]
    Empty,

    #[error("lcm overflowed 128-bit integer range")]
    Overflow,
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Integer LCM. Zero if any value is zero.
pub fn lcm_integers(values: impl IntoIterator<Item = u128>) -> Result<u128, LcmError> {
    let mut iter = values.into_iter();
    let mut acc = iter.next().ok_or(LcmError::Empty)?;
    for v in iter {
        if acc == 0 || v == 0 {
            acc = 0;
            continue;
        }
        acc = (acc / gcd(acc, v)).checked_mul(v).ok_or(LcmError::Overflow)?;
    }
    Ok(acc)
}

/// LCM of mixed integer and decimal operands, floor-divided back to the
/// operands' magnitude.
pub fn lcm(operands: &[Operand]) -> Result<u128, LcmError> {
    if operands.is_empty() {
        return Err(LcmError::Empty);
    }

    let digits = operands
        .iter()
        .map(|op| match op {
            Operand::Integer(_) => 0,
            Operand::Decimal(v) => v.normalize().scale(),
        })
        .max()
        .unwrap_or(0);

    let scaled = operands
        .iter()
        .map(|op| scale_to_integer(*op, digits))
        .collect::<Result<Vec<_>, _>>()?;

    let factor = 10u128.checked_pow(digits).ok_or(LcmError::Overflow)?;
    Ok(lcm_integers(scaled)? / factor)
}

/// Parse and take the LCM of textual operands.
pub fn lcm_str<S: AsRef<str>>(operands: &[S]) -> Result<u128, LcmError> {
    let parsed = operands
        .iter()
        .map(|s| s.as_ref().parse::<Operand>())
        .collect::<Result<Vec<_>, _>>()?;
    lcm(&parsed)
}

/// Convert loosely typed JSON values and take their LCM. Strings, booleans,
/// arrays, objects, and null are rejected.
#[cfg(feature = "json")]
pub fn lcm_json(values: &[serde_json::Value]) -> Result<u128, LcmError> {
    let parsed = values
        .iter()
        .map(Operand::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    lcm(&parsed)
}

/// `|op| * 10^digits` as an integer. `digits` is at least the operand's own
/// fractional digit count, so the conversion is lossless.
fn scale_to_integer(op: Operand, digits: u32) -> Result<u128, LcmError> {
    let (mantissa, scale) = match op {
        Operand::Integer(v) => (u128::from(v.unsigned_abs()), 0),
        Operand::Decimal(v) => {
            let v = v.normalize();
            (v.mantissa().unsigned_abs(), v.scale())
        }
    };
    let factor = 10u128
        .checked_pow(digits - scale)
        .ok_or(LcmError::Overflow)?;
    mantissa.checked_mul(factor).ok_or(LcmError::Overflow)
}
