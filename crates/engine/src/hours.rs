use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed hour amount represented as **integer centihours** (hundredths of an
/// hour).
///
/// Use this type for **all** hour quantities in the engine (granted totals,
/// consumed totals, adjustments) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = hours granted / consumed
/// - negative = refund / corrective credit
///
/// # Examples
///
/// ```rust
/// use engine::Hours;
///
/// let amount = Hours::new(2_50);
/// assert_eq!(amount.centi(), 250);
/// assert_eq!(amount.to_string(), "2.50h");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Hours;
///
/// assert_eq!("60".parse::<Hours>().unwrap().centi(), 6000);
/// assert_eq!("2,5".parse::<Hours>().unwrap().centi(), 250);
/// assert!("1.505".parse::<Hours>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Hours(i64);

impl Hours {
    pub const ZERO: Hours = Hours(0);

    /// Creates a new amount from integer centihours.
    #[must_use]
    pub const fn new(centi: i64) -> Self {
        Self(centi)
    }

    /// Creates a new amount from whole hours.
    #[must_use]
    pub const fn from_whole(hours: i64) -> Self {
        Self(hours * 100)
    }

    /// Returns the raw value in centihours.
    #[must_use]
    pub const fn centi(self) -> i64 {
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

    /// Clamps the amount to the inclusive `[lo, hi]` range.
    #[must_use]
    pub fn clamp_to(self, lo: Hours, hi: Hours) -> Hours {
        Hours(self.0.clamp(lo.0, hi.0))
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Hours) -> Option<Hours> {
        self.0.checked_add(rhs.0).map(Hours)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Hours) -> Option<Hours> {
        self.0.checked_sub(rhs.0).map(Hours)
    }

    /// Converts an elapsed wall-clock duration to hours, rounding half-up to
    /// the nearest centihour.
    ///
    /// Rejects negative durations.
    pub fn from_duration(delta: TimeDelta) -> Result<Hours, EngineError> {
        let seconds = delta.num_seconds();
        if seconds < 0 {
            return Err(EngineError::Validation(
                "duration must not be negative".to_string(),
            ));
        }
        let centi = seconds
            .checked_mul(100)
            .and_then(|v| v.checked_add(1800))
            .map(|v| v / 3600)
            .ok_or_else(|| EngineError::Validation("duration too large".to_string()))?;
        Ok(Hours(centi))
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / 100;
        let centi = abs % 100;
        write!(f, "{sign}{whole}.{centi:02}h")
    }
}

impl From<i64> for Hours {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Hours> for i64 {
    fn from(value: Hours) -> Self {
        value.0
    }
}

impl Add for Hours {
    type Output = Hours;

    fn add(self, rhs: Hours) -> Self::Output {
        Hours(self.0 + rhs.0)
    }
}

impl AddAssign for Hours {
    fn add_assign(&mut self, rhs: Hours) {
        self.0 += rhs.0;
    }
}

impl Sub for Hours {
    type Output = Hours;

    fn sub(self, rhs: Hours) -> Self::Output {
        Hours(self.0 - rhs.0)
    }
}

impl SubAssign for Hours {
    fn sub_assign(&mut self, rhs: Hours) {
        self.0 -= rhs.0;
    }
}

impl Neg for Hours {
    type Output = Hours;

    fn neg(self) -> Self::Output {
        Hours(-self.0)
    }
}

impl FromStr for Hours {
    type Err = EngineError;

    /// Parses a decimal string into centihours.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `1.505`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::Validation("empty hour amount".to_string());
        let invalid = || EngineError::Validation("invalid hour amount".to_string());
        let overflow = || EngineError::Validation("hour amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let whole_str = parts.next().ok_or_else(invalid)?;
        let centi_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole_str.parse().map_err(|_| invalid())?;

        let centi: i64 = match centi_str {
            None => 0,
            Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    0 => 0,
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => return Err(EngineError::Validation("too many decimals".to_string())),
                }
            }
        };

        let total = whole
            .checked_mul(100)
            .and_then(|v| v.checked_add(centi))
            .ok_or_else(overflow)?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Hours(signed))
    }
}
