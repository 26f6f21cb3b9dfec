//! Values fixed at construction that every later step may rely on
//!
//! These depend on the product database and the policy input only, so they
//! can be built before any rate object.

use serde::{Deserialize, Serialize};

use crate::config::GlobalSettings;
use crate::error::{IllustrationError, Result};
use crate::policy::{DefnLifeIns, DefnMaterialChange, Dbo7702, PolicyInput, SubstandardTable, UnderwritingClass};
use crate::product::{Database, DbKey, ReentryMethod};

/// How a minimum or target premium is derived from specified amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalPremiumType {
    MonthlyDeduction,
    NonMec,
    Table,
}

impl TryFrom<i32> for ModalPremiumType {
    type Error = IllustrationError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(ModalPremiumType::MonthlyDeduction),
            1 => Ok(ModalPremiumType::NonMec),
            2 => Ok(ModalPremiumType::Table),
            other => Err(IllustrationError::configuration(format!(
                "Unknown modal premium type {}.",
                other
            ))),
        }
    }
}

/// How the waiver-of-premium rider is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaiverChargeMethod {
    /// Rate times specified amount, up to the waiver limit
    TimesSpecamt,
    /// Rate times all other monthly deductions
    TimesDeductions,
}

impl TryFrom<i32> for WaiverChargeMethod {
    type Error = IllustrationError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(WaiverChargeMethod::TimesSpecamt),
            1 => Ok(WaiverChargeMethod::TimesDeductions),
            other => Err(IllustrationError::configuration(format!(
                "Unknown waiver charge method {}.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PermanentInvariants {
    pub min_iss_specamt: f64,
    pub min_renl_specamt: f64,
    pub max_incr_age: i32,
    pub min_prem_type: ModalPremiumType,
    pub tgt_prem_type: ModalPremiumType,
    pub tgt_prem_fixed_at_issue: bool,
    /// Monthly policy fee folded into table-derived target premium
    pub tgt_prem_monthly_pol_fee: f64,
    pub curr_coi_table0_limit: f64,
    pub curr_coi_table1_limit: f64,
    pub coi_inforce_reentry: ReentryMethod,
    pub adb_limit: f64,
    pub wp_limit: f64,
    pub specamt_load_limit: f64,
    pub min_wd: f64,
    pub wd_fee: f64,
    pub wd_fee_rate: f64,
    pub waiver_charge_method: WaiverChargeMethod,
    /// Monthly discount factor applied to the death benefit in the NAAR
    pub db_discount_rate: Vec<f64>,
    pub use_unusual_coi_banding: bool,
    pub defn_life_ins: DefnLifeIns,
    pub defn_material_change: DefnMaterialChange,
    pub equiv_7702_dbo3: Dbo7702,
    pub term_is_db_for_7702: bool,
    pub term_is_db_for_7702a: bool,
    pub max_naar: f64,
    pub min_prem_int_spread: Vec<f64>,
}

impl PermanentInvariants {
    pub fn new(db: &Database, input: &PolicyInput, settings: &GlobalSettings) -> Result<Self> {
        let min_prem_type: ModalPremiumType = db.query_code(DbKey::MinPremType)?;
        let tgt_prem_type: ModalPremiumType = db.query_code(DbKey::TgtPremType)?;
        let tgt_prem_monthly_pol_fee = db.query(DbKey::TgtPremMonthlyPolFee)?;
        if 0.0 != tgt_prem_monthly_pol_fee
            && !(ModalPremiumType::Table == tgt_prem_type && ModalPremiumType::Table != min_prem_type)
        {
            return Err(IllustrationError::configuration(format!(
                "Target premium monthly policy fee {} requires table target premium and non-table minimum premium.",
                tgt_prem_monthly_pol_fee
            )));
        }

        let curr_coi_table0_limit = db.query(DbKey::CurrCoiTable0Limit)?;
        let curr_coi_table1_limit = db.query(DbKey::CurrCoiTable1Limit)?;
        if !(0.0 <= curr_coi_table0_limit && curr_coi_table0_limit <= curr_coi_table1_limit) {
            return Err(IllustrationError::configuration(format!(
                "COI band limits {} and {} must be nonnegative and ascending.",
                curr_coi_table0_limit, curr_coi_table1_limit
            )));
        }

        if db.query_bool(DbKey::SurrChgOnDecr)? {
            return Err(IllustrationError::configuration(
                "Surrender charge on decrease not supported.",
            ));
        }

        let naar_discount = db.query_vec(DbKey::NaarDiscount)?;
        if naar_discount.contains(&-1.0) {
            return Err(IllustrationError::configuration(
                "NAAR discount rate of -100% is not meaningful.",
            ));
        }
        let db_discount_rate = naar_discount.iter().map(|i| 1.0 / (1.0 + i)).collect();

        // Unusual banding is written for a product with neither experience
        // rating nor a term rider.
        let use_unusual_coi_banding = db.query_bool(DbKey::UnusualCoiBanding)?;
        if use_unusual_coi_banding && input.use_experience_rating {
            log::warn!("Unusual COI banding ignores experience rating.");
        }
        if use_unusual_coi_banding && db.query_bool(DbKey::AllowTerm)? {
            log::warn!("Unusual COI banding ignores any term rider.");
        }

        if input.substandard_table != SubstandardTable::None
            && !(db.query_bool(DbKey::AllowSubstdTable)? && UnderwritingClass::Rated == input.underwriting_class)
        {
            return Err(IllustrationError::validation("Substandard table ratings not permitted."));
        }
        if input.is_policy_rated() && input.waiver_of_premium_benefit {
            return Err(IllustrationError::validation("Substandard waiver of premium not supported."));
        }
        if input.is_policy_rated() && input.accidental_death_benefit {
            return Err(IllustrationError::validation(
                "Substandard accidental death rider not supported.",
            ));
        }

        let defn_life_ins = input.definition_of_life_insurance;
        // Input material-change definition is honored only in privileged mode.
        let defn_material_change = if settings.privileged {
            input.definition_of_material_change
        } else if DefnLifeIns::Gpt == defn_life_ins {
            DefnMaterialChange::AdjustmentEvent
        } else {
            db.query_code(DbKey::CvatMatChangeDefn)?
        };

        Ok(Self {
            min_iss_specamt: db.query(DbKey::MinIssSpecAmt)?,
            min_renl_specamt: db.query(DbKey::MinRenlSpecAmt)?,
            max_incr_age: db.query_int(DbKey::MaxIncrAge)?,
            min_prem_type,
            tgt_prem_type,
            tgt_prem_fixed_at_issue: db.query_bool(DbKey::TgtPremFixedAtIssue)?,
            tgt_prem_monthly_pol_fee,
            curr_coi_table0_limit,
            curr_coi_table1_limit,
            coi_inforce_reentry: db.query_code(DbKey::CoiInforceReentry)?,
            adb_limit: db.query(DbKey::AdbLimit)?,
            wp_limit: db.query(DbKey::WpLimit)?,
            specamt_load_limit: db.query(DbKey::SpecAmtLoadLimit)?,
            min_wd: db.query(DbKey::MinWd)?,
            wd_fee: db.query(DbKey::WdFee)?,
            wd_fee_rate: db.query(DbKey::WdFeeRate)?,
            waiver_charge_method: db.query_code(DbKey::WpChargeMethod)?,
            db_discount_rate,
            use_unusual_coi_banding,
            defn_life_ins,
            defn_material_change,
            equiv_7702_dbo3: db.query_code(DbKey::Equiv7702Dbo3)?,
            term_is_db_for_7702: 1.0 == db.query(DbKey::TermIsQabOrDb7702)?,
            term_is_db_for_7702a: 1.0 == db.query(DbKey::TermIsQabOrDb7702A)?,
            max_naar: input.maximum_naar,
            min_prem_int_spread: db.query_vec(DbKey::MinPremIntSpread)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{DatabaseIndex, LoadedProduct, ProductDatabase};
    use std::sync::Arc;

    fn build(database: ProductDatabase, input: &PolicyInput, settings: &GlobalSettings) -> Result<PermanentInvariants> {
        let db = Database::new(Arc::new(database), DatabaseIndex::from_input(input), input.issue_age)?;
        PermanentInvariants::new(&db, input, settings)
    }

    fn sample_database() -> ProductDatabase {
        LoadedProduct::sample().unwrap().database
    }

    #[test]
    fn test_sample_invariants() {
        let input = PolicyInput::default();
        let inv = build(sample_database(), &input, &GlobalSettings::default()).unwrap();
        assert_eq!(inv.min_prem_type, ModalPremiumType::MonthlyDeduction);
        assert_eq!(inv.tgt_prem_type, ModalPremiumType::Table);
        assert_eq!(inv.db_discount_rate.len(), 55);
        assert!(inv.db_discount_rate[0] < 1.0);
        assert_eq!(inv.waiver_charge_method, WaiverChargeMethod::TimesDeductions);
        // GPT always uses adjustment events outside privileged mode.
        assert_eq!(inv.defn_material_change, DefnMaterialChange::AdjustmentEvent);
    }

    #[test]
    fn test_material_change_definition() {
        let input = PolicyInput {
            definition_of_life_insurance: DefnLifeIns::Cvat,
            definition_of_material_change: DefnMaterialChange::UnnecessaryPremium,
            ..Default::default()
        };
        let inv = build(sample_database(), &input, &GlobalSettings::default()).unwrap();
        assert_eq!(inv.defn_material_change, DefnMaterialChange::BenefitIncrease);

        let privileged = GlobalSettings {
            privileged: true,
            ..Default::default()
        };
        let inv = build(sample_database(), &input, &privileged).unwrap();
        assert_eq!(inv.defn_material_change, DefnMaterialChange::UnnecessaryPremium);
    }

    #[test]
    fn test_band_limits_must_ascend() {
        let mut database = sample_database();
        database.set(DbKey::CurrCoiTable0Limit, 600_000.0);
        let result = build(database, &PolicyInput::default(), &GlobalSettings::default());
        assert!(matches!(result, Err(IllustrationError::Configuration(_))));
    }

    #[test]
    fn test_rated_riders_rejected() {
        let input = PolicyInput {
            underwriting_class: UnderwritingClass::Rated,
            substandard_table: SubstandardTable::B,
            waiver_of_premium_benefit: true,
            ..Default::default()
        };
        let result = build(sample_database(), &input, &GlobalSettings::default());
        assert!(matches!(result, Err(IllustrationError::Validation(_))));

        let input = PolicyInput {
            substandard_table: SubstandardTable::B,
            ..Default::default()
        };
        let result = build(sample_database(), &input, &GlobalSettings::default());
        assert!(matches!(result, Err(IllustrationError::Validation(_))));
    }

    #[test]
    fn test_target_fee_requires_table_target() {
        let mut database = sample_database();
        database.set(DbKey::TgtPremMonthlyPolFee, 5.0).set(DbKey::TgtPremType, 1.0);
        let result = build(database, &PolicyInput::default(), &GlobalSettings::default());
        assert!(matches!(result, Err(IllustrationError::Configuration(_))));
    }
}
