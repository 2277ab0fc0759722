use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed-point decimal with two places, stored as integer hundredths.
///
/// Scores, criterion weights and segment weights all use this type so that
/// tie detection and displayed totals never see binary floating-point drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Points(i64);

impl Points {
    pub const ZERO: Points = Points(0);

    pub const fn from_hundredths(hundredths: i64) -> Self {
        Points(hundredths)
    }

    pub const fn whole(units: i64) -> Self {
        Points(units * 100)
    }

    /// Nearest two-place value, rounding half away from zero.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * 100.0).round();
        if scaled.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Points(scaled as i64))
    }

    pub fn hundredths(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Points) -> Option<Points> {
        self.0.checked_add(other.0).map(Points)
    }

    /// `Σ(weight × value) / Σ(weight)`, computed exactly and rounded once.
    ///
    /// Returns `None` when the weights sum to zero (or there are no pairs), or
    /// when the exact sums do not fit.
    pub fn weighted_mean<I>(pairs: I) -> Option<Points>
    where
        I: IntoIterator<Item = (Points, Points)>,
    {
        let mut numerator: i128 = 0;
        let mut denominator: i128 = 0;
        for (weight, value) in pairs {
            let product = (weight.0 as i128).checked_mul(value.0 as i128)?;
            numerator = numerator.checked_add(product)?;
            denominator = denominator.checked_add(weight.0 as i128)?;
        }
        if denominator == 0 {
            return None;
        }
        div_round(numerator, denominator).map(Points)
    }

    /// Arithmetic mean, rounded half away from zero. `None` for no values.
    pub fn mean<I>(values: I) -> Option<Points>
    where
        I: IntoIterator<Item = Points>,
    {
        let mut total: i128 = 0;
        let mut count: i128 = 0;
        for value in values {
            total = total.checked_add(value.0 as i128)?;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        div_round(total, count).map(Points)
    }
}

/// `numerator / denominator` rounded half away from zero, if it fits an i64.
fn div_round(numerator: i128, denominator: i128) -> Option<i64> {
    let (n, d) = if denominator < 0 {
        (numerator.checked_neg()?, denominator.checked_neg()?)
    } else {
        (numerator, denominator)
    };
    let quotient = n / d;
    let remainder = (n % d).abs();
    // remainder >= d / 2, without doubling
    let rounded = if remainder >= d - remainder {
        if n >= 0 {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    };
    i64::try_from(rounded).ok()
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let text = format!("{}{}.{:02}", sign, abs / 100, abs % 100);
        f.pad(&text)
    }
}

impl FromStr for Points {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("'{}' is not a number", s));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!("'{}' is not a number", s));
        }
        if frac_part.len() > 2 {
            return Err(format!("'{}' has more than two decimal places", s));
        }
        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| format!("'{}' is out of range", s))?
        };
        let frac: i64 = format!("{:0<2}", frac_part)
            .parse()
            .map_err(|_| format!("'{}' is not a number", s))?;
        let hundredths = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(|| format!("'{}' is out of range", s))?;
        Ok(Points(if negative { -hundredths } else { hundredths }))
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct PointsVisitor;

impl<'de> Visitor<'de> for PointsVisitor {
    type Value = Points;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or decimal string with at most two places")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Points, E> {
        v.checked_mul(100)
            .map(Points)
            .ok_or_else(|| E::custom(format!("{} is out of range", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Points, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Points)
            .ok_or_else(|| E::custom(format!("{} is out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Points, E> {
        let points = Points::from_f64(v).ok_or_else(|| E::custom(format!("{} is not finite", v)))?;
        // Reject values that carry more precision than two places
        if ((points.to_f64() - v).abs()) > 1e-9 {
            return Err(E::custom(format!("{} has more than two decimal places", v)));
        }
        Ok(points)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Points, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PointsVisitor)
    }
}
