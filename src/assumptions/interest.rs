//! General-account interest rates
//!
//! The current rate is the input crediting rate less any product spread,
//! never below the guaranteed rate.

use super::{GenBasis, RatePeriod};
use crate::error::Result;
use crate::numeric::{i_upper_12_over_12_from_i, RoundTo};
use crate::policy::PolicyInput;
use crate::product::{Database, DbKey};

#[derive(Debug, Clone)]
pub struct InterestRates {
    guaranteed_annual: Vec<f64>,
    guaranteed_monthly: Vec<f64>,
    current_annual: Vec<f64>,
    current_monthly: Vec<f64>,
}

impl InterestRates {
    pub fn new(db: &Database, input: &PolicyInput, round_interest_rate: &RoundTo) -> Result<Self> {
        let guaranteed_annual = round_interest_rate.round_vec(&db.query_vec(DbKey::GuarInt)?)?;
        let spread = db.query_vec(DbKey::CurrIntSpread)?;

        let current_annual: Vec<f64> = input
            .general_account_rate
            .iter()
            .zip(&spread)
            .zip(&guaranteed_annual)
            .map(|((rate, spread), guar)| (rate - spread).max(*guar))
            .collect();
        let current_annual = round_interest_rate.round_vec(&current_annual)?;

        let monthly = |annual: &[f64]| -> Vec<f64> { annual.iter().map(|&i| i_upper_12_over_12_from_i(i)).collect() };

        Ok(Self {
            guaranteed_monthly: monthly(&guaranteed_annual),
            current_monthly: monthly(&current_annual),
            guaranteed_annual,
            current_annual,
        })
    }

    pub fn gen_acct_net_rate(&self, basis: GenBasis, period: RatePeriod) -> &[f64] {
        match (basis, period) {
            (GenBasis::Current, RatePeriod::Annual) => &self.current_annual,
            (GenBasis::Current, RatePeriod::Monthly) => &self.current_monthly,
            (GenBasis::Guaranteed, RatePeriod::Annual) => &self.guaranteed_annual,
            (GenBasis::Guaranteed, RatePeriod::Monthly) => &self.guaranteed_monthly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::RoundingStyle;
    use crate::product::{DatabaseIndex, ProductDatabase};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn test_current_rate_floored_at_guarantee() {
        let mut data = ProductDatabase::new("test");
        data.set(DbKey::MaturityAge, 100.0)
            .set(DbKey::GuarInt, 0.03)
            .set(DbKey::CurrIntSpread, 0.005);
        let input = PolicyInput {
            issue_age: 97,
            general_account_rate: vec![0.05, 0.032, 0.02],
            ..Default::default()
        };
        let db = Database::new(Arc::new(data), DatabaseIndex::from_input(&input), input.issue_age).unwrap();
        let round = RoundTo::new(0, RoundingStyle::NotAtAll).unwrap();

        let rates = InterestRates::new(&db, &input, &round).unwrap();
        let current = rates.gen_acct_net_rate(GenBasis::Current, RatePeriod::Annual);
        assert_relative_eq!(current[0], 0.045, epsilon = 1e-15);
        assert_relative_eq!(current[1], 0.03, epsilon = 1e-15);
        assert_relative_eq!(current[2], 0.03, epsilon = 1e-15);

        let monthly = rates.gen_acct_net_rate(GenBasis::Guaranteed, RatePeriod::Monthly);
        assert_relative_eq!(monthly[0], 1.03_f64.powf(1.0 / 12.0) - 1.0, epsilon = 1e-15);
    }
}
