//! Policy fees, specified-amount loads, and premium loads

use super::GenBasis;
use crate::error::Result;
use crate::product::{Database, DbKey};

#[derive(Debug, Clone)]
struct BasisLoads {
    monthly_policy_fee: Vec<f64>,
    annual_policy_fee: Vec<f64>,
    specified_amount_load: Vec<f64>,
    /// Premium loads including premium tax
    target_premium_load: Vec<f64>,
    excess_premium_load: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Loads {
    current: BasisLoads,
    guaranteed: BasisLoads,
    premium_tax_load: Vec<f64>,
    target_premium_load_excluding_premium_tax: Vec<f64>,
    excess_premium_load_excluding_premium_tax: Vec<f64>,
    target_premium_load_maximum_premium_tax: Vec<f64>,
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

impl Loads {
    /// Build loads; the specified-amount load tables are added to the
    /// database's scalar loads.
    pub fn new(db: &Database, current_specamt_load_table: &[f64], guaranteed_specamt_load_table: &[f64]) -> Result<Self> {
        let premium_tax_load = db.query_vec(DbKey::PremTaxLoad)?;
        let max_premium_tax = db.query(DbKey::MaxPremTaxLoad)?;

        let current_target = db.query_vec(DbKey::CurrPremLoadTgt)?;
        let current_excess = db.query_vec(DbKey::CurrPremLoadExc)?;
        let guaranteed_target = db.query_vec(DbKey::GuarPremLoadTgt)?;
        let guaranteed_excess = db.query_vec(DbKey::GuarPremLoadExc)?;

        let current = BasisLoads {
            monthly_policy_fee: db.query_vec(DbKey::CurrMonthlyPolFee)?,
            annual_policy_fee: db.query_vec(DbKey::CurrAnnualPolFee)?,
            specified_amount_load: add(&db.query_vec(DbKey::CurrSpecAmtLoad)?, current_specamt_load_table),
            target_premium_load: add(&current_target, &premium_tax_load),
            excess_premium_load: add(&current_excess, &premium_tax_load),
        };
        let guaranteed = BasisLoads {
            monthly_policy_fee: db.query_vec(DbKey::GuarMonthlyPolFee)?,
            annual_policy_fee: db.query_vec(DbKey::GuarAnnualPolFee)?,
            specified_amount_load: add(&db.query_vec(DbKey::GuarSpecAmtLoad)?, guaranteed_specamt_load_table),
            target_premium_load: add(&guaranteed_target, &premium_tax_load),
            excess_premium_load: add(&guaranteed_excess, &premium_tax_load),
        };

        Ok(Self {
            current,
            guaranteed,
            target_premium_load_maximum_premium_tax: current_target.iter().map(|r| r + max_premium_tax).collect(),
            target_premium_load_excluding_premium_tax: current_target,
            excess_premium_load_excluding_premium_tax: current_excess,
            premium_tax_load,
        })
    }

    fn basis(&self, basis: GenBasis) -> &BasisLoads {
        match basis {
            GenBasis::Current => &self.current,
            GenBasis::Guaranteed => &self.guaranteed,
        }
    }

    pub fn monthly_policy_fee(&self, basis: GenBasis) -> &[f64] {
        &self.basis(basis).monthly_policy_fee
    }

    pub fn annual_policy_fee(&self, basis: GenBasis) -> &[f64] {
        &self.basis(basis).annual_policy_fee
    }

    pub fn specified_amount_load(&self, basis: GenBasis) -> &[f64] {
        &self.basis(basis).specified_amount_load
    }

    pub fn target_premium_load(&self, basis: GenBasis) -> &[f64] {
        &self.basis(basis).target_premium_load
    }

    pub fn excess_premium_load(&self, basis: GenBasis) -> &[f64] {
        &self.basis(basis).excess_premium_load
    }

    pub fn premium_tax_load(&self) -> &[f64] {
        &self.premium_tax_load
    }

    pub fn target_premium_load_excluding_premium_tax(&self) -> &[f64] {
        &self.target_premium_load_excluding_premium_tax
    }

    pub fn excess_premium_load_excluding_premium_tax(&self) -> &[f64] {
        &self.excess_premium_load_excluding_premium_tax
    }

    /// Current target load plus the highest premium-tax rate in any state
    pub fn target_premium_load_maximum_premium_tax(&self) -> &[f64] {
        &self.target_premium_load_maximum_premium_tax
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyInput;
    use crate::product::{DatabaseIndex, LoadedProduct};
    use std::sync::Arc;

    #[test]
    fn test_sample_loads() {
        let data = LoadedProduct::sample().unwrap().database;
        let input = PolicyInput::default();
        let db = Database::new(Arc::new(data), DatabaseIndex::from_input(&input), input.issue_age).unwrap();
        let table = vec![0.00001; db.length()];
        let loads = Loads::new(&db, &table, &vec![0.0; db.length()]).unwrap();

        assert_eq!(loads.monthly_policy_fee(GenBasis::Current)[0], 8.0);
        assert_eq!(loads.monthly_policy_fee(GenBasis::Guaranteed)[0], 12.0);
        assert!((loads.specified_amount_load(GenBasis::Current)[0] - 0.00003).abs() < 1e-15);
        assert!((loads.target_premium_load(GenBasis::Current)[0] - 0.08).abs() < 1e-15);
        assert!((loads.target_premium_load_excluding_premium_tax()[0] - 0.06).abs() < 1e-15);
        assert!((loads.target_premium_load_maximum_premium_tax()[0] - 0.095).abs() < 1e-15);
        assert!((loads.excess_premium_load(GenBasis::Guaranteed)[0] - 0.06).abs() < 1e-15);
    }
}
