//! Modified-endowment testing under IRC section 7702A

use serde::Serialize;

use crate::error::{IllustrationError, Result};
use crate::numeric::{RoundTo, EPSILON_PLUS_ONE};
use crate::policy::{AvoidMec, DefnLifeIns, DefnMaterialChange};

/// Years over which cumulative premium is tested against the seven-pay limit
pub const SEVEN_PAY_YEARS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MecStatus {
    /// Non-compliant contracts are outside 7702A
    NotTested,
    NonMec,
    /// Became a MEC in the given policy year
    Mec { year: usize },
}

#[derive(Debug, Clone)]
pub struct Irc7702A {
    defn_life_ins: DefnLifeIns,
    defn_material_change: DefnMaterialChange,
    avoid_mec: AvoidMec,
    seven_pay_rates: Vec<f64>,
    nsp_rates: Vec<f64>,
    round_max_premium: RoundTo,
}

impl Irc7702A {
    pub fn new(
        defn_life_ins: DefnLifeIns,
        defn_material_change: DefnMaterialChange,
        avoid_mec: AvoidMec,
        seven_pay_rates: Vec<f64>,
        nsp_rates: Vec<f64>,
        round_max_premium: RoundTo,
    ) -> Result<Self> {
        if seven_pay_rates.is_empty() {
            return Err(IllustrationError::configuration("Seven-pay rates are empty."));
        }
        Ok(Self {
            defn_life_ins,
            defn_material_change,
            avoid_mec,
            seven_pay_rates,
            nsp_rates,
            round_max_premium,
        })
    }

    /// Annual seven-pay premium for a specified amount issued now
    pub fn seven_pay_premium(&self, specamt: f64) -> Result<f64> {
        Ok(self
            .round_max_premium
            .round(self.seven_pay_rates[0] * EPSILON_PLUS_ONE * specamt)?)
    }

    /// Test annual premiums, paid at the start of each year, against the
    /// seven-pay limit
    pub fn test_premiums(&self, specamt: f64, premiums: &[f64]) -> Result<MecStatus> {
        if DefnLifeIns::Noncompliant == self.defn_life_ins {
            return Ok(MecStatus::NotTested);
        }

        let seven_pay = self.seven_pay_premium(specamt)?;
        let mut cumulative = 0.0;
        for (year, premium) in premiums.iter().take(SEVEN_PAY_YEARS).enumerate() {
            cumulative += premium;
            if cumulative > seven_pay * (year + 1) as f64 {
                log::debug!("7702A: MEC in year {} with cumulative premium {:.2}", year, cumulative);
                return Ok(MecStatus::Mec { year });
            }
        }
        Ok(MecStatus::NonMec)
    }

    /// Premiums reduced, where the MEC-avoidance method calls for it, so that
    /// no cumulative total exceeds the seven-pay limit
    pub fn limit_premiums(&self, specamt: f64, premiums: &[f64]) -> Result<Vec<f64>> {
        if AvoidMec::ReducePremium != self.avoid_mec || DefnLifeIns::Noncompliant == self.defn_life_ins {
            return Ok(premiums.to_vec());
        }

        let seven_pay = self.seven_pay_premium(specamt)?;
        let mut cumulative = 0.0;
        let limited = premiums
            .iter()
            .enumerate()
            .map(|(year, &premium)| {
                if year >= SEVEN_PAY_YEARS {
                    return premium;
                }
                let allowed = (seven_pay * (year + 1) as f64 - cumulative).max(0.0);
                let paid = premium.min(allowed);
                cumulative += paid;
                paid
            })
            .collect();
        Ok(limited)
    }

    pub fn seven_pay_rates(&self) -> &[f64] {
        &self.seven_pay_rates
    }

    pub fn nsp_rates(&self) -> &[f64] {
        &self.nsp_rates
    }

    pub fn defn_material_change(&self) -> DefnMaterialChange {
        self.defn_material_change
    }

    pub fn avoid_mec(&self) -> AvoidMec {
        self.avoid_mec
    }
}
