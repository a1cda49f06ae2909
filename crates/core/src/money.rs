//! Money and percentage value objects.
//!
//! All monetary amounts are carried as **signed integer cents** (the smallest
//! currency unit) and all percentages as **basis points** (1 bp = 0.01%).
//! Binary floating point never enters the money path; rounding happens exactly
//! once, where a derived amount is produced.

use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// A monetary amount in the smallest currency unit (cents).
///
/// Signed so that downstream consumers can represent credits/adjustments;
/// within this domain every quoted amount is non-negative.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Build from major and minor units, e.g. `from_major_minor(1299, 99)`
    /// for 1299.99. For negative amounts only the major unit carries the sign.
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Self(major * 100 - minor)
        } else {
            Self(major * 100 + minor)
        }
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{}.{:02}", (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl ValueObject for Money {}

/// A discount percentage in basis points (1250 = 12.5%).
///
/// The type is deliberately permissive: it can hold values above 100% so that
/// staged form input survives coercion unchanged. Whether a value is usable is
/// checked at the point it is applied (see `is_valid`).
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DiscountPercent(u32);

impl DiscountPercent {
    pub const ZERO: Self = Self(0);

    /// 100%, the largest discount that is valid to apply.
    pub const FULL: Self = Self(10_000);

    pub const fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    /// Coerce a percentage into basis points, rounding to the nearest bp.
    /// Negative input saturates to zero.
    pub fn from_percent(percent: f64) -> Self {
        Self((percent * 100.0).round() as u32)
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// The percentage as a float, for display only.
    pub fn percent(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 <= Self::FULL.0
    }
}

impl core::fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

impl ValueObject for DiscountPercent {}
