//! Numeric utilities used throughout the engine: exact conversions,
//! decimal rounding, and actuarial rate conversions

pub mod math;
pub mod round_to;
pub mod stinted_cast;

pub use math::{coi_rate_from_q, i_upper_12_over_12_from_i, level_annuity_factor, EPSILON_PLUS_ONE};
pub use round_to::{RoundTo, RoundingError, RoundingStyle};
pub use stinted_cast::{stinted_cast, CastError, Stintable};
