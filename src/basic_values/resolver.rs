//! Rate-table lookup with gender and smoking blending
//!
//! Blending is done only as the policy requests it and the table permits it:
//!
//! |           | female | male | unisex |
//! |-----------|--------|------|--------|
//! | smoker    | 1      | 1    | 3      |
//! | nonsmoker | 1      | 1    | 3      |
//! | unismoke  | 2      | 2    | 4      |
//!
//! Case 1 reads a single table; cases 2 and 3 blend two tables linearly; case
//! 4 blends all four, in either nesting order.

use chrono::{Datelike, Months, NaiveDate};

use super::invariants::{ModalPremiumType, PermanentInvariants};
use crate::config::GlobalSettings;
use crate::error::{IllustrationError, Result};
use crate::numeric::stinted_cast;
use crate::policy::{Gender, PolicyInput, Smoking};
use crate::product::{ActuarialTableProvider, Database, DbKey, ProductData, ReentryMethod};

/// Whether a table may be blended along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    Cannot,
    /// Blend if the policy input asks for it
    Can,
    Must,
}

impl TryFrom<i32> for Blend {
    type Error = IllustrationError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Blend::Cannot),
            1 => Ok(Blend::Can),
            2 => Ok(Blend::Must),
            other => Err(IllustrationError::configuration(format!(
                "Case '{}' not found for table blending.",
                other
            ))),
        }
    }
}

impl Blend {
    fn applies(&self, requested: bool) -> bool {
        match self {
            Blend::Cannot => false,
            Blend::Can => requested,
            Blend::Must => true,
        }
    }
}

/// Whole years from `from` to `to`, rounded up; negative if `to` precedes `from`
pub fn duration_ceiling(from: NaiveDate, to: NaiveDate) -> i32 {
    let years = to.year() - from.year();
    let months = Months::new(12 * years.unsigned_abs());
    let anniversary = if years < 0 {
        from.checked_sub_months(months)
    } else {
        from.checked_add_months(months)
    };
    match anniversary {
        Some(anniversary) if anniversary < to => years + 1,
        _ => years,
    }
}

/// Read-only view over everything needed to resolve a table
pub struct TableResolver<'a> {
    product: &'a ProductData,
    database: &'a Database,
    input: &'a PolicyInput,
    tables: &'a dyn ActuarialTableProvider,
    settings: &'a GlobalSettings,
    invariants: &'a PermanentInvariants,
    issue_age: i32,
    maturity_age: i32,
    length: usize,
}

impl<'a> TableResolver<'a> {
    pub fn new(
        product: &'a ProductData,
        database: &'a Database,
        input: &'a PolicyInput,
        tables: &'a dyn ActuarialTableProvider,
        settings: &'a GlobalSettings,
        invariants: &'a PermanentInvariants,
    ) -> Result<Self> {
        let length = database.length();
        Ok(Self {
            product,
            database,
            input,
            tables,
            settings,
            invariants,
            issue_age: input.issue_age,
            maturity_age: database.query_int(DbKey::MaturityAge)?,
            length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Rates from one table number, honoring inforce reentry for current COI
    fn actuarial_table(&self, file: &str, key: DbKey, number: i64) -> Result<Vec<f64>> {
        let method = self.invariants.coi_inforce_reentry;
        if DbKey::CurrCoiTable == key && ReentryMethod::Never != method {
            let reset_duration = duration_ceiling(self.input.effective_date, self.input.last_coi_reentry_date);
            self.tables.table_rates_elaborated(
                file,
                number,
                self.issue_age,
                self.length,
                method,
                self.input.inforce_year,
                reset_duration,
            )
        } else {
            self.tables.table_rates(file, number, self.issue_age, self.length)
        }
    }

    fn unblended(&self, file: &str, key: DbKey, database: &Database) -> Result<Vec<f64>> {
        let number: i64 = database.query_int(key)?;
        self.actuarial_table(file, key, number)
    }

    fn unblended_for(&self, file: &str, key: DbKey, gender: Gender, smoking: Smoking) -> Result<Vec<f64>> {
        let index = self.database.index().gender(gender).smoking(smoking);
        self.unblended(file, key, &self.database.with_index(index))
    }

    /// Resolve the table named by product datum `file_key`, blended as required
    pub fn table(
        &self,
        file_key: &str,
        key: DbKey,
        is_valid: bool,
        blend_smoking: Blend,
        blend_gender: Blend,
    ) -> Result<Vec<f64>> {
        if !is_valid {
            return Ok(vec![0.0; self.length]);
        }

        let file = self.settings.add_data_dir(self.product.datum(file_key)?);
        let by_smoking = blend_smoking.applies(self.input.blend_smoking);
        let by_gender = blend_gender.applies(self.input.blend_gender);

        let n = self.input.nonsmoker_proportion;
        let s = 1.0 - n;
        let m = self.input.male_proportion;
        let f = 1.0 - m;

        let blended = match (by_smoking, by_gender) {
            (false, false) => self.unblended(&file, key, self.database)?,
            (true, false) => {
                let smoker = self.unblended_for(&file, key, self.input.gender, Smoking::Smoker)?;
                let nonsmoker = self.unblended_for(&file, key, self.input.gender, Smoking::Nonsmoker)?;
                smoker.iter().zip(&nonsmoker).map(|(sm, ns)| s * sm + n * ns).collect()
            }
            (false, true) => {
                let female = self.unblended_for(&file, key, Gender::Female, self.input.smoking)?;
                let male = self.unblended_for(&file, key, Gender::Male, self.input.smoking)?;
                female.iter().zip(&male).map(|(fe, ma)| f * fe + m * ma).collect()
            }
            (true, true) => {
                let fs = self.unblended_for(&file, key, Gender::Female, Smoking::Smoker)?;
                let fn_ = self.unblended_for(&file, key, Gender::Female, Smoking::Nonsmoker)?;
                let ms = self.unblended_for(&file, key, Gender::Male, Smoking::Smoker)?;
                let mn = self.unblended_for(&file, key, Gender::Male, Smoking::Nonsmoker)?;
                (0..self.length)
                    .map(|j| f * (s * fs[j] + n * fn_[j]) + m * (s * ms[j] + n * mn[j]))
                    .collect()
            }
        };
        Ok(blended)
    }

    fn plain(&self, file_key: &str, key: DbKey) -> Result<Vec<f64>> {
        self.table(file_key, key, true, Blend::Cannot, Blend::Cannot)
    }

    fn rider(&self, file_key: &str, key: DbKey, allowed: DbKey) -> Result<Vec<f64>> {
        let is_valid = self.database.query_bool(allowed)?;
        self.table(file_key, key, is_valid, Blend::Cannot, Blend::Cannot)
    }

    /// Spouse rates run from the spouse's issue age and are fitted to the
    /// insured's contract length
    fn spouse_rider(&self, file_key: &str, key: DbKey) -> Result<Vec<f64>> {
        if !self.database.query_bool(DbKey::AllowSpouseRider)? {
            return Ok(vec![0.0; self.length]);
        }
        let file = self.settings.add_data_dir(self.product.datum(file_key)?);
        let number: i64 = self.database.query_int(key)?;
        let spouse_length = stinted_cast::<usize, i32>(self.maturity_age - self.input.spouse_issue_age)?;
        let mut z = self.tables.table_rates(&file, number, self.input.spouse_issue_age, spouse_length)?;
        z.resize(self.length, 0.0);
        Ok(z)
    }

    // Only current COI and term rates are blended.

    pub fn current_coi_rates_0(&self) -> Result<Vec<f64>> {
        self.table("CurrCOIFilename", DbKey::CurrCoiTable, true, Blend::Can, Blend::Can)
    }

    pub fn current_coi_rates_1(&self) -> Result<Vec<f64>> {
        let is_valid = self.invariants.curr_coi_table0_limit < f64::MAX;
        self.table("CurrCOIFilename", DbKey::CurrCoiTable1, is_valid, Blend::Can, Blend::Can)
    }

    pub fn current_coi_rates_2(&self) -> Result<Vec<f64>> {
        let is_valid = self.invariants.curr_coi_table1_limit < f64::MAX;
        self.table("CurrCOIFilename", DbKey::CurrCoiTable2, is_valid, Blend::Can, Blend::Can)
    }

    pub fn guaranteed_coi_rates(&self) -> Result<Vec<f64>> {
        self.plain("GuarCOIFilename", DbKey::GuarCoiTable)
    }

    pub fn smoker_blended_guaranteed_coi_rates(&self) -> Result<Vec<f64>> {
        self.table("GuarCOIFilename", DbKey::GuarCoiTable, true, Blend::Can, Blend::Can)
    }

    pub fn wp_rates(&self) -> Result<Vec<f64>> {
        self.rider("WPFilename", DbKey::WpTable, DbKey::AllowWp)
    }

    pub fn adb_rates(&self) -> Result<Vec<f64>> {
        self.rider("ADDFilename", DbKey::AdbTable, DbKey::AllowAdb)
    }

    pub fn child_rider_rates(&self) -> Result<Vec<f64>> {
        self.rider("ChildRiderFilename", DbKey::ChildRiderTable, DbKey::AllowChildRider)
    }

    pub fn current_spouse_rider_rates(&self) -> Result<Vec<f64>> {
        self.spouse_rider("CurrSpouseRiderFilename", DbKey::SpouseRiderTable)
    }

    pub fn guaranteed_spouse_rider_rates(&self) -> Result<Vec<f64>> {
        self.spouse_rider("GuarSpouseRiderFilename", DbKey::SpouseRiderGuarTable)
    }

    pub fn current_term_rates(&self) -> Result<Vec<f64>> {
        let is_valid = self.database.query_bool(DbKey::AllowTerm)?;
        self.table("CurrTermFilename", DbKey::TermTable, is_valid, Blend::Can, Blend::Can)
    }

    pub fn guaranteed_term_rates(&self) -> Result<Vec<f64>> {
        let is_valid = self.database.query_bool(DbKey::AllowTerm)?;
        self.table("GuarTermFilename", DbKey::GuarTermTable, is_valid, Blend::Can, Blend::Can)
    }

    pub fn group_proxy_rates(&self) -> Result<Vec<f64>> {
        self.plain("GroupProxyFilename", DbKey::GroupProxyRateTable)
    }

    pub fn seven_pay_rates(&self) -> Result<Vec<f64>> {
        self.plain("SevenPayFilename", DbKey::SevenPayTable)
    }

    /// Read when either minimum or target premium is table-driven
    pub fn target_premium_rates(&self) -> Result<Vec<f64>> {
        let is_valid = ModalPremiumType::Table == self.invariants.tgt_prem_type
            || ModalPremiumType::Table == self.invariants.min_prem_type;
        self.table("TgtPremFilename", DbKey::TgtPremTable, is_valid, Blend::Cannot, Blend::Cannot)
    }

    pub fn irc7702_q_rates(&self) -> Result<Vec<f64>> {
        self.plain("Irc7702QFilename", DbKey::Irc7702QTable)
    }

    pub fn partial_mortality_rates(&self) -> Result<Vec<f64>> {
        self.table("PartialMortalityFilename", DbKey::PartialMortTable, true, Blend::Cannot, Blend::Can)
    }

    /// All ones when the product has no multiplier table
    pub fn substandard_table_multipliers(&self) -> Result<Vec<f64>> {
        if 0.0 == self.database.query(DbKey::SubstdTableMultTable)? {
            return Ok(vec![1.0; self.length]);
        }
        self.plain("SubstdTblMultFilename", DbKey::SubstdTableMultTable)
    }

    pub fn current_specamt_load_rates(&self) -> Result<Vec<f64>> {
        let is_valid = 0.0 != self.database.query(DbKey::CurrSpecAmtLoadTable)?;
        self.table("CurrSpecAmtLoadFilename", DbKey::CurrSpecAmtLoadTable, is_valid, Blend::Cannot, Blend::Cannot)
    }

    pub fn guaranteed_specamt_load_rates(&self) -> Result<Vec<f64>> {
        let is_valid = 0.0 != self.database.query(DbKey::GuarSpecAmtLoadTable)?;
        self.table("GuarSpecAmtLoadFilename", DbKey::GuarSpecAmtLoadTable, is_valid, Blend::Cannot, Blend::Cannot)
    }

    pub fn cvat_corridor_factors(&self) -> Result<Vec<f64>> {
        self.plain("CvatCorridorFilename", DbKey::CorridorTable)
    }

    /// NSP rates share the corridor table number
    pub fn irc7702_nsp_rates(&self) -> Result<Vec<f64>> {
        self.plain("Irc7702NspFilename", DbKey::CorridorTable)
    }
}
