//! Amount representations exchanged with backends.

use std::{
    fmt::{self, Display},
    ops::{Add, Sub},
};

use error_stack::report;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, ParsingError};

/// This Unit struct represents MinorUnit in which core amount works
#[derive(
    Default, Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct MinorUnit(pub i64);

impl MinorUnit {
    /// forms a new minor unit from amount
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// forms a new minor default unit i.e zero
    pub fn zero() -> Self {
        Self(0)
    }

    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }

    /// Two-decimal major unit string, e.g. `1000` becomes `"10.00"`.
    pub fn to_major_unit_string(self) -> StringMajorUnit {
        let sign = if self.0 < 0 { "-" } else { "" };
        let absolute = self.0.unsigned_abs();
        StringMajorUnit(format!("{sign}{}.{:02}", absolute / 100, absolute % 100))
    }
}

impl Display for MinorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for MinorUnit {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for MinorUnit {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Amount in major units as a decimal string, the form backends expect on the wire.
#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn get_amount_as_string(&self) -> &str {
        &self.0
    }

    /// Parses back into minor units. Accepts up to two fractional digits.
    pub fn to_minor_unit(&self) -> CustomResult<MinorUnit, ParsingError> {
        let invalid = || report!(ParsingError::AmountParseFailure(self.0.clone()));
        let (whole, fraction) = self.0.split_once('.').unwrap_or((self.0.as_str(), ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
            || fraction.len() > 2
        {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        whole
            .checked_mul(100)
            .and_then(|whole| whole.checked_add(fraction))
            .map(MinorUnit)
            .ok_or_else(invalid)
    }
}

impl Display for StringMajorUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
