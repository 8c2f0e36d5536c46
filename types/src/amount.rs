//! Token amount type for voting weights and tallies.
//!
//! Amounts are arbitrary-precision decimals. Weights come from an external
//! balance oracle as decimal strings with any number of significant digits,
//! and tallies accumulate many of them, so neither fixed-width integers nor
//! binary floating point are acceptable here.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::TypesError;

/// Largest accepted distance, in decimal places, between an amount's last
/// significant digit and the decimal point.
pub const MAX_DECIMAL_EXPONENT: u64 = 1_000;

/// A non-negative token amount with exact decimal arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(BigDecimal);

impl TokenAmount {
    pub fn zero() -> Self {
        Self(BigDecimal::from(0u32))
    }

    pub fn from_u64(units: u64) -> Self {
        Self(BigDecimal::from(units))
    }

    /// Parse a decimal string such as `"100"`, `"0.000000000000000001"` or `"1e21"`.
    ///
    /// Negative values are rejected, and so are values whose exponent puts
    /// them more than [`MAX_DECIMAL_EXPONENT`] places away from the decimal
    /// point: their plain rendering would not fit in memory.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let trimmed = raw.trim();
        let value = BigDecimal::from_str(trimmed)
            .map_err(|e| TypesError::InvalidAmount(format!("{raw}: {e}")))?;

        // Work on the raw digits: comparing or normalizing a decimal with an
        // extreme scale makes bigdecimal materialize a power of ten that size.
        let (int_val, scale) = value.as_bigint_and_exponent();
        let digits = int_val.to_string();
        if digits.starts_with('-') {
            return Err(TypesError::InvalidAmount(format!("{raw}: negative")));
        }
        let significant = digits.trim_end_matches('0');
        if significant.is_empty() {
            return Ok(Self::zero());
        }
        let exponent = scale.saturating_sub((digits.len() - significant.len()) as i64);
        if exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT {
            return Err(TypesError::InvalidAmount(format!(
                "{raw}: exponent out of range"
            )));
        }
        let int_val = BigInt::from_str(significant)
            .map_err(|e| TypesError::InvalidAmount(format!("{raw}: {e}")))?;
        Ok(Self(BigDecimal::new(int_val, exponent)))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigDecimal::from(0u32)
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// Render without exponent notation and without trailing fractional zeros.
    pub fn to_plain_string(&self) -> String {
        let (digits, scale) = self.0.normalized().as_bigint_and_exponent();
        let digits = digits.to_string();
        if scale <= 0 {
            let mut out = digits;
            if out != "0" {
                out.push_str(&"0".repeat(scale.unsigned_abs() as usize));
            }
            return out;
        }
        let scale = scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            format!("{int_part}.{frac_part}")
        } else {
            format!("0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

impl Default for TokenAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for TokenAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a TokenAmount> for &'a TokenAmount {
    type Output = TokenAmount;
    fn add(self, rhs: &'a TokenAmount) -> TokenAmount {
        TokenAmount(&self.0 + &rhs.0)
    }
}

impl AddAssign<&TokenAmount> for TokenAmount {
    fn add_assign(&mut self, rhs: &TokenAmount) {
        self.0 = &self.0 + &rhs.0;
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

impl FromStr for TokenAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Amounts travel as decimal strings so JSON consumers never round them
// through a double.
impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_plain_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenAmountVisitor)
    }
}

struct TokenAmountVisitor;

impl Visitor<'_> for TokenAmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        TokenAmount::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TokenAmount::from_u64(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        TokenAmount::parse(&v.to_string()).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        TokenAmount::parse(&v.to_string()).map_err(E::custom)
    }
}
