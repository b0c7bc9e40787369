use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// number of decimal places shown for currency values
pub const CURRENCY_DP: u32 = 2;

/// Money type backed by an exact decimal.
///
/// Arithmetic keeps full precision; rounding to cents only happens through
/// [`Money::round_currency`] when a value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const MAX: Money = Money(Decimal::MAX);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d)
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str_exact(s.trim())?))
    }

    /// create from integer amount (reais, dollars, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents)
    pub fn from_minor(amount: i64, scale: u32) -> Self {
        Money(Decimal::new(amount, scale))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places (banker's rounding)
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    /// round to cents for display
    pub fn round_currency(&self) -> Self {
        self.round_dp(CURRENCY_DP)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// subtract, flooring the result at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0)).max(Money::ZERO)
    }

    /// add, clamping at the decimal range instead of overflowing
    pub fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    /// apply a periodic rate (e.g. one month of interest), clamped at the decimal range
    pub fn apply_rate(&self, rate: Rate) -> Self {
        Money(self.0.saturating_mul(rate.as_decimal()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money(self.0 * other)
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money(self.0 / other)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc.saturating_add(*x))
    }
}

/// monthly interest rate, stored as a percentage (e.g. 1.5 for 1.5% a month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from percentage (e.g., 2 for 2%)
    pub fn from_percentage(p: Decimal) -> Self {
        Rate(p)
    }

    /// create from a fraction (e.g., 0.02 for 2%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d * Decimal::ONE_HUNDRED)
    }

    /// create from basis points (e.g., 150 for 1.5%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::ONE_HUNDRED)
    }

    /// the rate as a fraction, ready to multiply a balance
    pub fn as_decimal(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// the rate as entered, in percent
    pub fn as_percentage(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for Rate {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Rate(Decimal::from_str_exact(s.trim().trim_end_matches('%'))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_keeps_full_precision() {
        let m = Money::from_major(1000) / dec!(3);
        assert!(m.as_decimal().scale() > 2);
        assert_eq!(m.round_currency().to_string(), "333.33");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(12_345, 2), Money::from_str_exact("123.45").unwrap());
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let a = Money::from_major(100);
        let b = Money::from_major(150);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
        assert_eq!(b.saturating_sub(a), Money::from_major(50));
    }

    #[test]
    fn test_monthly_rate_application() {
        let balance = Money::from_major(1200);
        let rate = Rate::from_percentage(dec!(1));
        assert_eq!(rate.as_decimal(), dec!(0.01));
        assert_eq!(balance.apply_rate(rate), Money::from_major(12));
    }

    #[test]
    fn test_rate_parsing() {
        let rate: Rate = "2.5%".parse().unwrap();
        assert_eq!(rate.as_percentage(), dec!(2.5));
        assert_eq!(Rate::from_bps(250), rate);
        assert_eq!(Rate::from_decimal(dec!(0.025)), rate);
        assert_eq!(rate.to_string(), "2.5%");
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_major(10), Money::from_major(15)].iter().sum();
        assert_eq!(total, Money::from_major(25));
    }

    #[test]
    fn test_sum_and_rate_clamp_at_range() {
        let huge = Money::from_decimal(Decimal::MAX);
        let total: Money = [huge, huge, Money::from_major(1)].into_iter().sum();
        assert_eq!(total, Money::MAX);

        let interest = huge.apply_rate(Rate::from_percentage(dec!(500)));
        assert_eq!(interest, Money::MAX);
        assert_eq!(Money::from_decimal(Decimal::MIN).saturating_sub(huge), Money::ZERO);
    }
}
