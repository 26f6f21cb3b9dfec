//! Rounding rules for each monetary and rate category

use serde::{Deserialize, Serialize};

use crate::numeric::{RoundTo, RoundingError, RoundingStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingParameters {
    pub decimals: i32,
    pub style: RoundingStyle,
}

impl RoundingParameters {
    pub const fn new(decimals: i32, style: RoundingStyle) -> Self {
        Self { decimals, style }
    }

    pub fn functor(&self) -> Result<RoundTo, RoundingError> {
        RoundTo::new(self.decimals, self.style)
    }
}

/// One rule per rounding category, as stored in a product's rounding file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingRules {
    pub specamt: RoundingParameters,
    pub death_benefit: RoundingParameters,
    pub naar: RoundingParameters,
    pub coi_rate: RoundingParameters,
    pub coi_charge: RoundingParameters,
    pub gross_premium: RoundingParameters,
    pub net_premium: RoundingParameters,
    pub interest_rate: RoundingParameters,
    pub interest_credit: RoundingParameters,
    pub withdrawal: RoundingParameters,
    pub loan: RoundingParameters,
    pub interest_rate_7702: RoundingParameters,
    pub corridor_factor: RoundingParameters,
    pub nsp_rate_7702: RoundingParameters,
    pub seven_pay_rate: RoundingParameters,
    pub surrender_charge: RoundingParameters,
    pub irr: RoundingParameters,
    pub min_specamt: RoundingParameters,
    pub max_specamt: RoundingParameters,
    pub min_premium: RoundingParameters,
    pub max_premium: RoundingParameters,
    pub min_init_premium: RoundingParameters,
}

impl Default for RoundingRules {
    fn default() -> Self {
        use RoundingStyle::*;
        let cents = RoundingParameters::new(2, ToNearest);
        Self {
            specamt: RoundingParameters::new(0, Upward),
            death_benefit: cents,
            naar: cents,
            coi_rate: RoundingParameters::new(8, Upward),
            coi_charge: cents,
            gross_premium: cents,
            net_premium: cents,
            interest_rate: RoundingParameters::new(0, NotAtAll),
            interest_credit: cents,
            withdrawal: RoundingParameters::new(2, Downward),
            loan: RoundingParameters::new(2, Downward),
            interest_rate_7702: RoundingParameters::new(0, NotAtAll),
            corridor_factor: RoundingParameters::new(2, ToNearest),
            nsp_rate_7702: RoundingParameters::new(0, NotAtAll),
            seven_pay_rate: RoundingParameters::new(0, NotAtAll),
            surrender_charge: cents,
            irr: RoundingParameters::new(5, Downward),
            min_specamt: RoundingParameters::new(0, Upward),
            max_specamt: RoundingParameters::new(0, Downward),
            min_premium: RoundingParameters::new(2, Upward),
            max_premium: RoundingParameters::new(2, Downward),
            min_init_premium: RoundingParameters::new(2, Upward),
        }
    }
}
