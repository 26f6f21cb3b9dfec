//! Rate sub-objects derived from product data: mortality, interest, and loads
//!
//! Each is built once, from read-only inputs passed explicitly, and never
//! changes afterwards.

mod interest;
mod loads;
mod mortality;

pub use interest::InterestRates;
pub use loads::Loads;
pub use mortality::MortalityRates;

/// Basis on which charges and credits are illustrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenBasis {
    Current,
    Guaranteed,
}

/// Period over which an interest rate is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatePeriod {
    Annual,
    Monthly,
}
