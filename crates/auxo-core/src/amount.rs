//! Token amounts in the smallest denomination (wei)
//!
//! Amounts travel through every file as base-10 integer strings. Parsing is
//! strict: no sign, no decimal point, no exponent. All arithmetic is done on
//! 256 bit integers with a 512 bit intermediate for `a * b / c`, so pro-rata
//! shares are exact floors.

use crate::error::{CoreError, Result};
use primitive_types::{U256, U512};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token decimals used by WETH, ARV and PRV
pub const DECIMALS: u8 = 18;

/// A non-negative integer token amount
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(U256);

impl Amount {
    pub const fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn from_u256(value: U256) -> Self {
        Self(value)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a base-10 integer string
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidAmount(input.to_string()));
        }
        U256::from_dec_str(input)
            .map(Self)
            .map_err(|_| CoreError::InvalidAmount(input.to_string()))
    }

    pub fn checked_add(self, other: Amount) -> Result<Amount> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(CoreError::AmountOverflow("addition"))
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Absolute difference between two amounts
    pub fn abs_diff(self, other: Amount) -> Amount {
        if self >= other {
            Self(self.0 - other.0)
        } else {
            Self(other.0 - self.0)
        }
    }

    /// `floor(self * numerator / denominator)`, computed without intermediate
    /// overflow. Returns zero when the denominator is zero.
    pub fn mul_div_floor(self, numerator: Amount, denominator: Amount) -> Result<Amount> {
        if denominator.is_zero() {
            return Ok(Amount::zero());
        }
        let product: U512 = self.0.full_mul(numerator.0);
        let quotient = product / U512::from(denominator.0);
        U256::try_from(quotient)
            .map(Self)
            .map_err(|_| CoreError::AmountOverflow("pro-rata share"))
    }

    /// Checked sum over an iterator of amounts
    pub fn sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Result<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::zero(), |acc, a| acc.checked_add(a))
    }

    /// Whole tokens, for log lines only
    pub fn to_token_units(&self) -> f64 {
        let unit = U256::exp10(DECIMALS as usize);
        let whole = self.0 / unit;
        let frac = self.0 % unit;
        whole.low_u128() as f64 + frac.low_u128() as f64 / 1e18
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer amount")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from)
            .map_err(|_| E::custom(CoreError::InvalidAmount(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Amount, E> {
        Err(E::custom(CoreError::InvalidAmount(v.to_string())))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}
