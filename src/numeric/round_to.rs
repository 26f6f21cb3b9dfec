//! Decimal rounding functor
//!
//! A `RoundTo` is an immutable (decimals, style) pair. Applying it scales the
//! value by 10^decimals, rounds the scaled value to an integer according to
//! the style, and scales back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a scaled value is brought to an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingStyle {
    /// Truncate toward zero
    TowardZero,
    /// Nearest integer; exact ties go to the even neighbor
    ToNearest,
    /// Toward positive infinity
    Upward,
    /// Toward negative infinity
    Downward,
    /// The floating-point environment's mode, which is always
    /// round-half-even in Rust
    Current,
    /// Leave the value unchanged
    NotAtAll,
    /// Only produced by `RoundTo::default()`; rounding with it is an error
    #[default]
    Indeterminate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundingError {
    #[error("invalid number of decimals: {decimals}")]
    Domain { decimals: i32 },

    #[error("invalid rounding style: {0:?}")]
    InvalidStyle(RoundingStyle),

    #[error("rounding functor used before it was configured")]
    Uninitialized,
}

/// Rounding functor configured with a number of decimals and a style
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundTo {
    decimals: i32,
    style: RoundingStyle,
    /// 10^|decimals|; division by it is exact where multiplying by its
    /// reciprocal would not be.
    scale: f64,
}

impl RoundTo {
    /// Create a functor, failing if `decimals` lies outside the decimal
    /// exponent range of `f64`.
    pub fn new(decimals: i32, style: RoundingStyle) -> Result<Self, RoundingError> {
        if decimals < f64::MIN_10_EXP || f64::MAX_10_EXP < decimals {
            return Err(RoundingError::Domain { decimals });
        }
        if style == RoundingStyle::Indeterminate {
            return Err(RoundingError::InvalidStyle(style));
        }
        Ok(Self {
            decimals,
            style,
            scale: 10.0_f64.powi(decimals.abs()),
        })
    }

    pub fn decimals(&self) -> i32 {
        self.decimals
    }

    pub fn style(&self) -> RoundingStyle {
        self.style
    }

    /// Round a single value
    pub fn round(&self, r: f64) -> Result<f64, RoundingError> {
        let integral: fn(f64) -> f64 = match self.style {
            RoundingStyle::TowardZero => f64::trunc,
            RoundingStyle::ToNearest | RoundingStyle::Current => f64::round_ties_even,
            RoundingStyle::Upward => f64::ceil,
            RoundingStyle::Downward => f64::floor,
            RoundingStyle::NotAtAll => return Ok(r),
            RoundingStyle::Indeterminate => return Err(RoundingError::Uninitialized),
        };

        if self.decimals >= 0 {
            Ok(integral(r * self.scale) / self.scale)
        } else {
            Ok(integral(r / self.scale) * self.scale)
        }
    }

    /// Round every element of a rate vector
    pub fn round_vec(&self, values: &[f64]) -> Result<Vec<f64>, RoundingError> {
        values.iter().map(|&r| self.round(r)).collect()
    }
}

impl PartialEq for RoundTo {
    fn eq(&self, other: &Self) -> bool {
        self.decimals == other.decimals && self.style == other.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_to_even() {
        let near = RoundTo::new(0, RoundingStyle::ToNearest).unwrap();
        assert_eq!(near.round(2.5).unwrap(), 2.0);
        assert_eq!(near.round(3.5).unwrap(), 4.0);
        assert_eq!(near.round(-2.5).unwrap(), -2.0);
        assert_eq!(near.round(2.4999).unwrap(), 2.0);
        assert_eq!(near.round(2.5001).unwrap(), 3.0);

        let current = RoundTo::new(0, RoundingStyle::Current).unwrap();
        assert_eq!(current.round(0.5).unwrap(), 0.0);
        assert_eq!(current.round(1.5).unwrap(), 2.0);
    }

    #[test]
    fn test_directed_rounding_bounds_value() {
        let values = [1.234, -1.234, 0.001, -0.001, 2.5, 99.995, 123_456.789];
        for decimals in 0..=3 {
            let up = RoundTo::new(decimals, RoundingStyle::Upward).unwrap();
            let down = RoundTo::new(decimals, RoundingStyle::Downward).unwrap();
            for &x in &values {
                assert!(up.round(x).unwrap() >= x, "up({}, {}) < x", decimals, x);
                assert!(down.round(x).unwrap() <= x, "down({}, {}) > x", decimals, x);
            }
        }
    }

    #[test]
    fn test_styles_at_two_decimals() {
        let x = 1.23456;
        let round = |style| RoundTo::new(2, style).unwrap().round(x).unwrap();
        assert_eq!(round(RoundingStyle::Upward), 1.24);
        assert_eq!(round(RoundingStyle::Downward), 1.23);
        assert_eq!(round(RoundingStyle::TowardZero), 1.23);
        assert_eq!(round(RoundingStyle::ToNearest), 1.23);
        assert_eq!(round(RoundingStyle::NotAtAll), x);

        let trunc = RoundTo::new(2, RoundingStyle::TowardZero).unwrap();
        assert_eq!(trunc.round(-1.239).unwrap(), -1.23);
    }

    #[test]
    fn test_negative_decimals() {
        let thousands = RoundTo::new(-3, RoundingStyle::Upward).unwrap();
        assert_eq!(thousands.round(100_001.0).unwrap(), 101_000.0);
        let near = RoundTo::new(-2, RoundingStyle::ToNearest).unwrap();
        assert_eq!(near.round(250.0).unwrap(), 200.0);
    }

    #[test]
    fn test_equality_on_decimals_and_style() {
        let a = RoundTo::new(2, RoundingStyle::Upward).unwrap();
        let b = RoundTo::new(2, RoundingStyle::Upward).unwrap();
        let c = RoundTo::new(2, RoundingStyle::Downward).unwrap();
        let d = RoundTo::new(3, RoundingStyle::Upward).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_default_is_poisoned() {
        let poisoned = RoundTo::default();
        assert_eq!(poisoned.round(1.0), Err(RoundingError::Uninitialized));
        assert!(poisoned.round_vec(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_invalid_decimals() {
        assert!(matches!(
            RoundTo::new(400, RoundingStyle::ToNearest),
            Err(RoundingError::Domain { decimals: 400 })
        ));
        assert!(RoundTo::new(-400, RoundingStyle::ToNearest).is_err());
        assert!(RoundTo::new(f64::MAX_10_EXP, RoundingStyle::ToNearest).is_ok());
        assert!(RoundTo::new(0, RoundingStyle::Indeterminate).is_err());
    }
}
