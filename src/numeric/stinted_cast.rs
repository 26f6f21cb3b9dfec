//! Value-preserving numeric conversion between integral and IEEE floating types
//!
//! `stinted_cast` either returns a value of the target type that equals the
//! source value, or fails. It never silently wraps, saturates, or rounds:
//! - float -> float: NaN and infinities carry over; finite values outside the
//!   target range fail
//! - int -> float: values outside the target range fail; precision loss is
//!   accepted
//! - float -> int: NaN fails, out-of-range fails, and a fractional part fails
//! - int -> int: negative-to-unsigned and out-of-range fail

use std::any::type_name;
use std::fmt;

use thiserror::Error;

mod sealed {
    pub trait Sealed {}
}

/// A source value widened to a representation that holds every supported
/// type exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Widened {
    Int(i128),
    Float(f64),
}

/// Numeric types accepted by [`stinted_cast`].
///
/// Implemented for the primitive integers up to 64 bits and for `f32`/`f64`.
pub trait Stintable: Copy + fmt::Display + sealed::Sealed {
    const IS_INTEGER: bool;
    const IS_SIGNED: bool;
    /// Lowest finite value, as `f64`.
    const LOWEST: f64;
    /// Greatest finite value, as `f64`.
    const MAX: f64;
    /// Exact integral bounds. Floating types report the full `i128` range.
    const LOWEST_INT: i128;
    const MAX_INT: i128;

    fn widen(self) -> Widened;
    fn from_int(value: i128) -> Self;
    fn from_float(value: f64) -> Self;
}

macro_rules! impl_stintable_int {
    ($($t:ty => $signed:expr),* $(,)?) => {$(
        impl sealed::Sealed for $t {}
        impl Stintable for $t {
            const IS_INTEGER: bool = true;
            const IS_SIGNED: bool = $signed;
            const LOWEST: f64 = <$t>::MIN as f64;
            const MAX: f64 = <$t>::MAX as f64;
            const LOWEST_INT: i128 = <$t>::MIN as i128;
            const MAX_INT: i128 = <$t>::MAX as i128;

            fn widen(self) -> Widened {
                Widened::Int(self as i128)
            }
            fn from_int(value: i128) -> Self {
                value as $t
            }
            fn from_float(value: f64) -> Self {
                value as $t
            }
        }
    )*};
}

macro_rules! impl_stintable_float {
    ($($t:ty),* $(,)?) => {$(
        impl sealed::Sealed for $t {}
        impl Stintable for $t {
            const IS_INTEGER: bool = false;
            const IS_SIGNED: bool = true;
            const LOWEST: f64 = <$t>::MIN as f64;
            const MAX: f64 = <$t>::MAX as f64;
            const LOWEST_INT: i128 = i128::MIN;
            const MAX_INT: i128 = i128::MAX;

            fn widen(self) -> Widened {
                Widened::Float(self as f64)
            }
            fn from_int(value: i128) -> Self {
                value as $t
            }
            fn from_float(value: f64) -> Self {
                value as $t
            }
        }
    )*};
}

impl_stintable_int!(
    i8 => true, i16 => true, i32 => true, i64 => true, isize => true,
    u8 => false, u16 => false, u32 => false, u64 => false, usize => false,
);
impl_stintable_float!(f32, f64);

/// Which limit of the target type a value would transgress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Lower,
    Upper,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Lower => write!(f, "lower"),
            Limit::Upper => write!(f, "upper"),
        }
    }
}

/// Failure of a value-preserving numeric conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    #[error("cast from {value} [{from}] to [{to}] would transgress {limit} limit {bound}")]
    Range {
        from: &'static str,
        to: &'static str,
        value: String,
        limit: Limit,
        bound: String,
    },

    #[error("cannot cast negative {value} [{from}] to unsigned [{to}]")]
    Sign {
        from: &'static str,
        to: &'static str,
        value: String,
    },

    #[error("cannot cast {value} [{from}] to integral [{to}]")]
    Domain {
        from: &'static str,
        to: &'static str,
        value: String,
    },

    #[error("cast from {value} [{from}] to {result} [{to}] would not preserve value")]
    ValuePreservation {
        from: &'static str,
        to: &'static str,
        value: String,
        result: String,
    },
}

fn range_error<To, From: Stintable>(from: From, limit: Limit, bound: String) -> CastError {
    CastError::Range {
        from: type_name::<From>(),
        to: type_name::<To>(),
        value: from.to_string(),
        limit,
        bound,
    }
}

/// Convert `from` to `To`, preserving its numeric value exactly or failing.
pub fn stinted_cast<To: Stintable, From: Stintable>(from: From) -> Result<To, CastError> {
    match from.widen() {
        // Floating to floating.
        Widened::Float(x) if !To::IS_INTEGER => {
            if x.is_nan() || x.is_infinite() {
                return Ok(To::from_float(x));
            }
            if x < To::LOWEST {
                return Err(range_error::<To, From>(from, Limit::Lower, To::LOWEST.to_string()));
            }
            if To::MAX < x {
                return Err(range_error::<To, From>(from, Limit::Upper, To::MAX.to_string()));
            }
            Ok(To::from_float(x))
        }

        // Integral to floating.
        Widened::Int(i) if !To::IS_INTEGER => {
            let x = i as f64;
            if x < To::LOWEST {
                return Err(range_error::<To, From>(from, Limit::Lower, To::LOWEST.to_string()));
            }
            if To::MAX < x {
                return Err(range_error::<To, From>(from, Limit::Upper, To::MAX.to_string()));
            }
            Ok(To::from_int(i))
        }

        // Floating to integral.
        Widened::Float(x) => {
            if x.is_nan() {
                return Err(CastError::Domain {
                    from: type_name::<From>(),
                    to: type_name::<To>(),
                    value: from.to_string(),
                });
            }
            let lowest = To::LOWEST_INT as f64;
            let upper = To::MAX_INT as f64 + 1.0;
            if x < lowest {
                return Err(range_error::<To, From>(from, Limit::Lower, To::LOWEST_INT.to_string()));
            }
            if upper <= x {
                return Err(range_error::<To, From>(from, Limit::Upper, To::MAX_INT.to_string()));
            }
            let truncated = x.trunc() as i128;
            if truncated as f64 != x {
                return Err(CastError::ValuePreservation {
                    from: type_name::<From>(),
                    to: type_name::<To>(),
                    value: format!("{:.6}", x),
                    result: truncated.to_string(),
                });
            }
            Ok(To::from_int(truncated))
        }

        // Integral to integral.
        Widened::Int(i) => {
            if !To::IS_SIGNED && i < 0 {
                return Err(CastError::Sign {
                    from: type_name::<From>(),
                    to: type_name::<To>(),
                    value: from.to_string(),
                });
            }
            if i < To::LOWEST_INT {
                return Err(range_error::<To, From>(from, Limit::Lower, To::LOWEST_INT.to_string()));
            }
            if To::MAX_INT < i {
                return Err(range_error::<To, From>(from, Limit::Upper, To::MAX_INT.to_string()));
            }
            Ok(To::from_int(i))
        }
    }
}
