//! # Weight
//!
//! Fixed-point weight in hundredths of a kilogram.
//!
//! The scale reports two fraction digits and the ledger stores two decimal
//! places, so every weight in the system is an exact integer count of
//! 10-gram steps. Arithmetic is plain integer arithmetic; conversion to
//! `f64` happens only at the JSON boundary.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ParseError;

/// Hundredths per kilogram.
const SCALE: i64 = 100;

/// A signed weight in hundredths of a kilogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(i64);

impl Weight {
    /// Zero kilograms.
    pub const ZERO: Weight = Weight(0);

    /// Build a weight from an exact count of hundredths of a kilogram.
    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Build a weight from kilograms, rounding to the nearest hundredth.
    #[must_use]
    pub fn from_kg(kg: f64) -> Self {
        Self((kg * SCALE as f64).round() as i64)
    }

    /// Exact count of hundredths of a kilogram.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Kilograms as a float, for display and wire formats only.
    #[must_use]
    pub fn as_kg(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Negative readings collapse to zero.
    #[must_use]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Self::ZERO
        } else {
            self
        }
    }

    /// Arithmetic mean of `samples`, rounded half away from zero.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn mean(samples: &[Weight]) -> Option<Weight> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len() as i64;
        let sum: i64 = samples.iter().map(|w| w.0).sum();
        let rounded = (sum.abs() * 2 + count) / (2 * count);
        Some(Self(if sum < 0 { -rounded } else { rounded }))
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        Weight(self.0 + rhs.0)
    }
}

impl Sub for Weight {
    type Output = Weight;

    fn sub(self, rhs: Weight) -> Weight {
        Weight(self.0 - rhs.0)
    }
}

impl Neg for Weight {
    type Output = Weight;

    fn neg(self) -> Weight {
        Weight(-self.0)
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Weight>>(iter: I) -> Weight {
        iter.fold(Weight::ZERO, Add::add)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / SCALE as u64,
            abs % SCALE as u64
        )
    }
}

impl FromStr for Weight {
    type Err = ParseError;

    /// Parses `"12"`, `"12.3"`, `"-2.70"`. More than two fraction digits is
    /// rejected rather than silently rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidWeight(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (body, ""),
        };
        if int_part.is_empty()
            || frac_part.len() > 2
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = int_part.parse().map_err(|_| invalid())?;
        let frac: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac_part.parse().map_err(|_| invalid())?,
        };
        let magnitude = whole
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl Serialize for Weight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_kg())
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let kg = f64::deserialize(deserializer)?;
        if !kg.is_finite() {
            return Err(serde::de::Error::custom("weight must be a finite number"));
        }
        Ok(Self::from_kg(kg))
    }
}
