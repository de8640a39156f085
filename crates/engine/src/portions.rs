use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};

use serde::{Deserialize, Serialize};

/// Portion quantity represented as integer **hundredths of a portion**.
///
/// Meal stock and planned assignments use the same fixed-point scheme as
/// [`MoneyCents`](crate::MoneyCents): `1.50` portions is stored as `150`.
/// Stock can never go negative; depleting past zero clamps (see
/// [`saturating_sub`](Portions::saturating_sub)).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Portions(i64);

impl Portions {
    pub const ZERO: Portions = Portions(0);

    /// One whole portion, the implicit quantity of legacy single-meal slots.
    pub const ONE: Portions = Portions(100);

    /// Creates a quantity from integer hundredths.
    #[must_use]
    pub const fn new(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Returns the raw value in hundredths of a portion.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Returns `true` if the quantity is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the quantity is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Subtraction floored at zero, the depletion rule for meal stock.
    ///
    /// Returns the clamped result and whether clamping happened (demand
    /// exceeded stock).
    #[must_use]
    pub fn saturating_sub(self, rhs: Portions) -> (Portions, bool) {
        if rhs.0 > self.0 {
            (Portions::ZERO, true)
        } else {
            (Portions(self.0 - rhs.0), false)
        }
    }
}

impl fmt::Display for Portions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Portions {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Portions> for i64 {
    fn from(value: Portions) -> Self {
        value.0
    }
}

impl Add for Portions {
    type Output = Portions;

    fn add(self, rhs: Portions) -> Self::Output {
        Portions(self.0 + rhs.0)
    }
}

impl AddAssign for Portions {
    fn add_assign(&mut self, rhs: Portions) {
        self.0 += rhs.0;
    }
}

impl Sum for Portions {
    fn sum<I: Iterator<Item = Portions>>(iter: I) -> Self {
        iter.fold(Portions::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_two_decimals() {
        assert_eq!(Portions::new(0).to_string(), "0.00");
        assert_eq!(Portions::new(150).to_string(), "1.50");
        assert_eq!(Portions::new(5).to_string(), "0.05");
    }

    #[test]
    fn saturating_sub_clamps_at_zero() {
        let (left, clamped) = Portions::new(500).saturating_sub(Portions::new(200));
        assert_eq!(left, Portions::new(300));
        assert!(!clamped);

        let (left, clamped) = Portions::new(100).saturating_sub(Portions::new(250));
        assert_eq!(left, Portions::ZERO);
        assert!(clamped);
    }
}
