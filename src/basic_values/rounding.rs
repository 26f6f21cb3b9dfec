//! One rounding functor per category

use crate::numeric::{RoundTo, RoundingError};
use crate::product::RoundingRules;

/// Functors built from a product's rounding rules; immutable once built
#[derive(Debug, Clone)]
pub struct RoundingFunctors {
    pub specamt: RoundTo,
    pub death_benefit: RoundTo,
    pub naar: RoundTo,
    pub coi_rate: RoundTo,
    pub coi_charge: RoundTo,
    pub gross_premium: RoundTo,
    pub net_premium: RoundTo,
    pub interest_rate: RoundTo,
    pub interest_credit: RoundTo,
    pub withdrawal: RoundTo,
    pub loan: RoundTo,
    pub interest_rate_7702: RoundTo,
    pub corridor_factor: RoundTo,
    pub nsp_rate_7702: RoundTo,
    pub seven_pay_rate: RoundTo,
    pub surrender_charge: RoundTo,
    pub irr: RoundTo,
    pub min_specamt: RoundTo,
    pub max_specamt: RoundTo,
    pub min_premium: RoundTo,
    pub max_premium: RoundTo,
    pub min_init_premium: RoundTo,
}

impl RoundingFunctors {
    pub fn new(rules: &RoundingRules) -> Result<Self, RoundingError> {
        Ok(Self {
            specamt: rules.specamt.functor()?,
            death_benefit: rules.death_benefit.functor()?,
            naar: rules.naar.functor()?,
            coi_rate: rules.coi_rate.functor()?,
            coi_charge: rules.coi_charge.functor()?,
            gross_premium: rules.gross_premium.functor()?,
            net_premium: rules.net_premium.functor()?,
            interest_rate: rules.interest_rate.functor()?,
            interest_credit: rules.interest_credit.functor()?,
            withdrawal: rules.withdrawal.functor()?,
            loan: rules.loan.functor()?,
            interest_rate_7702: rules.interest_rate_7702.functor()?,
            corridor_factor: rules.corridor_factor.functor()?,
            nsp_rate_7702: rules.nsp_rate_7702.functor()?,
            seven_pay_rate: rules.seven_pay_rate.functor()?,
            surrender_charge: rules.surrender_charge.functor()?,
            irr: rules.irr.functor()?,
            min_specamt: rules.min_specamt.functor()?,
            max_specamt: rules.max_specamt.functor()?,
            min_premium: rules.min_premium.functor()?,
            max_premium: rules.max_premium.functor()?,
            min_init_premium: rules.min_init_premium.functor()?,
        })
    }
}
