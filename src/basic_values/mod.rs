//! The Basic Values engine
//!
//! Builds, once, every value an illustration needs before it projects:
//! product data bound to one policy, validated invariants, rounding rules,
//! mortality and interest rates, loads, and the tax-compliance state. The
//! engine is read-only after construction, and a failed construction leaves
//! nothing behind.

mod invariants;
mod resolver;
mod rounding;
mod strategies;

pub use invariants::{ModalPremiumType, PermanentInvariants, WaiverChargeMethod};
pub use resolver::{duration_ceiling, Blend, TableResolver};
pub use rounding::RoundingFunctors;
pub use strategies::{DeductionPortion, ModalStrategy};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assumptions::{GenBasis, InterestRates, Loads, MortalityRates};
use crate::config::GlobalSettings;
use crate::error::{IllustrationError, Result};
use crate::irc7702::{GptHistory, Irc7702, Irc7702A, Irc7702Params, GLP_INTEREST_FLOOR, GSP_INTEREST_FLOOR};
use crate::numeric::{coi_rate_from_q, i_upper_12_over_12_from_i};
use crate::policy::{
    effective_dbopt_7702, DbOption, Dbo7702, DefnLifeIns, DefnMaterialChange, Gender, PolicyInput, Smoking,
    SurviveTo, UnderwritingBasis, UnderwritingClass,
};
use crate::product::{ActuarialTableProvider, Database, DatabaseIndex, DbKey, ProductData, ProductDatabase};

/// Kind of illustration ledger a product produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerType {
    UniversalLife,
    VariableUniversalLife,
    GroupUniversalLife,
}

impl TryFrom<i32> for LedgerType {
    type Error = IllustrationError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(LedgerType::UniversalLife),
            1 => Ok(LedgerType::VariableUniversalLife),
            2 => Ok(LedgerType::GroupUniversalLife),
            other => Err(IllustrationError::configuration(format!("Unknown ledger type {}.", other))),
        }
    }
}

impl LedgerType {
    /// Only general-account universal life falls under the illustration
    /// regulation; variable products are governed by securities rules
    pub fn is_subject_to_illustration_reg(&self) -> bool {
        LedgerType::UniversalLife == *self
    }
}

/// Monthly 7702 rates derived from the 7702 mortality table and the
/// statutory interest floors
#[derive(Debug, Clone, Default)]
pub struct Irc7702Rates {
    pub spread_for_7702: Vec<f64>,
    pub mly_7702_qc: Vec<f64>,
    /// 7702 COI rates rounded as deemed-cash-value rates
    pub mly_dcv_qc: Vec<f64>,
    pub mly_7702_i_glp: Vec<f64>,
    pub mly_7702_i_gsp: Vec<f64>,
    pub mly_7702_ig: Vec<f64>,
}

/// Policy particulars for a standalone guideline-premium calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GptServerInput {
    pub product_name: String,
    pub gender: Gender,
    pub underwriting_class: UnderwritingClass,
    pub smoking: Smoking,
    pub issue_age: i32,
    pub underwriting_basis: UnderwritingBasis,
    pub state_of_jurisdiction: String,
    pub specified_amount: f64,
    pub dbo_7702: Dbo7702,
    pub adb_in_force: bool,
    pub target_premium: f64,
}

#[derive(Debug, Clone)]
pub struct BasicValues {
    product: Arc<ProductData>,
    database: Database,
    input: PolicyInput,
    tables: Arc<dyn ActuarialTableProvider>,
    settings: GlobalSettings,
    invariants: PermanentInvariants,

    state_of_jurisdiction: String,
    state_of_domicile: String,
    issue_age: i32,
    retirement_age: i32,
    maturity_age: i32,
    length: usize,
    ledger_type: LedgerType,
    nonillustrated: bool,
    no_can_issue: bool,
    subject_to_illustration_reg: bool,

    rounding: RoundingFunctors,
    mortality: MortalityRates,
    /// Absent when built only for guideline-premium calculations
    interest: Option<InterestRates>,
    loads: Loads,
    max_survival_duration: f64,

    irc7702_rates: Irc7702Rates,
    irc7702: Irc7702,
    irc7702a: Option<Irc7702A>,
    non_compliant_corridor: Vec<f64>,
}

/// Values built by the first steps of every initialization chain
struct Foundation {
    database: Database,
    input: PolicyInput,
    invariants: PermanentInvariants,
    length: usize,
    maturity_age: i32,
}

/// Bind the database to the policy and validate it; `input` is resized to
/// the contract length
fn lay_foundation(
    database: Arc<ProductDatabase>,
    mut input: PolicyInput,
    settings: &GlobalSettings,
    check_jurisdiction: bool,
) -> Result<Foundation> {
    let database = Database::new(database, DatabaseIndex::from_input(&input), input.issue_age)?;
    let invariants = PermanentInvariants::new(&database, &input, settings)?;

    if check_jurisdiction
        && !settings.privileged
        && !settings.regression_testing
        && !database.query_bool(DbKey::StateApproved)?
    {
        return Err(IllustrationError::validation(format!(
            "Product {} not approved in state {}.",
            database.product_name(),
            input.state_of_jurisdiction
        )));
    }

    let min_issue_age: i32 = database.query_int(DbKey::MinIssAge)?;
    let max_issue_age: i32 = database.query_int(DbKey::MaxIssAge)?;
    if input.issue_age < min_issue_age {
        return Err(IllustrationError::validation(format!(
            "Issue age {} less than minimum {}.",
            input.issue_age, min_issue_age
        )));
    }
    if max_issue_age < input.issue_age {
        return Err(IllustrationError::validation(format!(
            "Issue age {} greater than maximum {}.",
            input.issue_age, max_issue_age
        )));
    }
    if !input.retirees_can_enroll && input.retirement_age < input.issue_age {
        return Err(IllustrationError::validation(format!(
            "Issue age {} exceeds retirement age {}, and retirees cannot enroll.",
            input.issue_age, input.retirement_age
        )));
    }

    let length = database.length();
    input.resize_to(length);
    Ok(Foundation {
        maturity_age: database.query_int(DbKey::MaturityAge)?,
        database,
        input,
        invariants,
        length,
    })
}

/// The 7702 spread, which never varies by duration here but is kept as a
/// vector like every other rate
fn spread_for_7702(db: &Database) -> Result<Vec<f64>> {
    db.query_vec(DbKey::MinimumTieredSpreadFor7702)
}

/// Build the 7702 rates and the guideline-premium object
///
/// Takes the loads, mortality, rounding functors, and invariants as
/// arguments, so it cannot run before they exist.
#[allow(clippy::too_many_arguments)]
fn init_7702(
    db: &Database,
    input: &PolicyInput,
    invariants: &PermanentInvariants,
    rounding: &RoundingFunctors,
    mortality: &MortalityRates,
    loads: &Loads,
    resolver: &TableResolver<'_>,
    spread_for_7702: Vec<f64>,
    target_premium: f64,
) -> Result<(Irc7702Rates, Irc7702)> {
    let max_monthly_coi_rate = db.query(DbKey::MaxMonthlyCoiRate)?;
    if 0.0 == max_monthly_coi_rate {
        return Err(IllustrationError::configuration(format!(
            "Maximum monthly COI rate is zero in product {}.",
            db.product_name()
        )));
    }
    let max_coi = 1.0 / max_monthly_coi_rate;

    let mly_7702_qc: Vec<f64> = resolver
        .irc7702_q_rates()?
        .iter()
        .map(|&q| coi_rate_from_q(q, max_coi))
        .collect();
    let mly_dcv_qc = rounding.coi_rate.round_vec(&mly_7702_qc)?;

    let guaranteed_interest = db.query_vec(DbKey::GuarInt)?;
    let floored = |floor: f64| -> Result<Vec<f64>> {
        let rates: Vec<f64> = guaranteed_interest
            .iter()
            .zip(&spread_for_7702)
            .map(|(i, spread)| i_upper_12_over_12_from_i(floor.max(*i) - spread))
            .collect();
        Ok(rounding.interest_rate_7702.round_vec(&rates)?)
    };
    let mly_7702_i_glp = floored(GLP_INTEREST_FLOOR)?;
    let mly_7702_i_gsp = floored(GSP_INTEREST_FLOOR)?;
    let mly_7702_ig = db.query_vec(DbKey::NaarDiscount)?;

    let specamt = input.specified_amount[0];
    let length = db.length();
    let (adb_rates, adb_limit) = if input.accidental_death_benefit && db.query_bool(DbKey::AdbIsQab)? {
        (mortality.adb_rates().to_vec(), invariants.adb_limit)
    } else {
        (vec![0.0; length], 0.0)
    };

    let basis = GenBasis::Current;
    let irc7702 = Irc7702::new(Irc7702Params {
        defn_life_ins: invariants.defn_life_ins,
        issue_age: input.issue_age,
        maturity_age: input.issue_age + (length as i32),
        inforce_year: input.inforce_year,
        q: mly_7702_qc.clone(),
        glp_interest: mly_7702_i_glp.clone(),
        gsp_interest: mly_7702_i_gsp.clone(),
        naar_discount: mly_7702_ig.clone(),
        specamt,
        benefit: specamt + input.term_rider_amount,
        dbo: effective_dbopt_7702(input.death_benefit_option[0], invariants.equiv_7702_dbo3),
        monthly_policy_fee: loads.monthly_policy_fee(basis).to_vec(),
        annual_policy_fee: loads.annual_policy_fee(basis).to_vec(),
        specamt_load: loads.specified_amount_load(basis).to_vec(),
        specamt_load_limit: invariants.specamt_load_limit,
        adb_rates,
        adb_limit,
        target_premium_load: loads.target_premium_load_excluding_premium_tax().to_vec(),
        excess_premium_load: loads.excess_premium_load_excluding_premium_tax().to_vec(),
        target_premium,
        round_max_premium: rounding.max_premium,
        round_min_specamt: rounding.min_specamt,
        round_corridor_factor: rounding.corridor_factor,
        history: GptHistory {
            glp: input.inforce_glp,
            cumulative_glp: input.inforce_cumulative_glp,
            gsp: input.inforce_gsp,
            cumulative_premiums_paid: input.inforce_cumulative_gpt_premiums_paid,
        },
    })?;

    let rates = Irc7702Rates {
        spread_for_7702,
        mly_7702_qc,
        mly_dcv_qc,
        mly_7702_i_glp,
        mly_7702_i_gsp,
        mly_7702_ig,
    };
    Ok((rates, irc7702))
}

fn init_7702a(
    input: &PolicyInput,
    invariants: &PermanentInvariants,
    rounding: &RoundingFunctors,
    mortality: &MortalityRates,
) -> Result<Irc7702A> {
    Irc7702A::new(
        invariants.defn_life_ins,
        invariants.defn_material_change,
        input.avoid_mec_method,
        mortality.seven_pay_rates().to_vec(),
        mortality.cvat_nsp_rates().to_vec(),
        rounding.max_premium,
    )
}

/// Years the insured is assumed to survive; with no limit, the endowment age
fn max_survival_duration(input: &PolicyInput, mortality: &MortalityRates, maturity_age: i32) -> Result<f64> {
    let endowment_age = maturity_age as f64;
    let duration = match input.survive_to_type {
        SurviveTo::NoLimit => endowment_age,
        SurviveTo::Age => (input.survive_to_age - input.issue_age) as f64,
        SurviveTo::Year => input.survive_to_year as f64,
        SurviveTo::Expectancy => {
            // Curtate expectation of life
            let mut survival = 1.0;
            mortality
                .partial_mortality_q()
                .iter()
                .map(|q| {
                    survival *= 1.0 - q;
                    survival
                })
                .sum()
        }
    };
    if endowment_age < duration {
        return Err(IllustrationError::configuration(format!(
            "Maximum survival duration {} exceeds endowment age {}.",
            duration, maturity_age
        )));
    }
    Ok(duration)
}

impl BasicValues {
    /// Run the full initialization chain for one policy
    pub fn new(
        product: Arc<ProductData>,
        database: Arc<ProductDatabase>,
        input: PolicyInput,
        tables: Arc<dyn ActuarialTableProvider>,
        settings: GlobalSettings,
    ) -> Result<Self> {
        let Foundation {
            database,
            input,
            invariants,
            length,
            maturity_age,
        } = lay_foundation(database, input, &settings, true)?;
        log::debug!("basic values: {} issue age {}, length {}", product.product_name, input.issue_age, length);

        let rounding = RoundingFunctors::new(&product.rounding)?;
        let spread = spread_for_7702(&database)?;

        let resolver = TableResolver::new(&product, &database, &input, tables.as_ref(), &settings, &invariants)?;
        let mortality = MortalityRates::new(&resolver, &database, &input, &rounding)?;
        let interest = InterestRates::new(&database, &input, &rounding.interest_rate)?;
        let loads = Loads::new(
            &database,
            &resolver.current_specamt_load_rates()?,
            &resolver.guaranteed_specamt_load_rates()?,
        )?;
        log::debug!("basic values: rates built");

        let max_survival_duration = max_survival_duration(&input, &mortality, maturity_age)?;

        // Target premium is zero here, so guideline premiums bear excess loads.
        let (irc7702_rates, irc7702) =
            init_7702(&database, &input, &invariants, &rounding, &mortality, &loads, &resolver, spread, 0.0)?;
        let irc7702a = init_7702a(&input, &invariants, &rounding, &mortality)?;
        drop(resolver);
        log::debug!("basic values: 7702 and 7702A initialized");
        let ledger_type: LedgerType = database.query_code(DbKey::LedgerType)?;

        Ok(Self {
            state_of_jurisdiction: input.state_of_jurisdiction.clone(),
            state_of_domicile: product.domicile.clone(),
            issue_age: input.issue_age,
            retirement_age: input.retirement_age,
            maturity_age,
            length,
            ledger_type,
            nonillustrated: database.query_bool(DbKey::Nonillustrated)?,
            no_can_issue: database.query_bool(DbKey::NoLongerIssued)? && input.is_new_business(),
            subject_to_illustration_reg: ledger_type.is_subject_to_illustration_reg(),
            non_compliant_corridor: vec![1.0; length],
            product,
            database,
            input,
            tables,
            settings,
            invariants,
            rounding,
            mortality,
            interest: Some(interest),
            loads,
            max_survival_duration,
            irc7702_rates,
            irc7702,
            irc7702a: Some(irc7702a),
        })
    }

    /// Reduced chain for a standalone guideline-premium calculation
    ///
    /// Only what 7702 needs is built: no interest rates, no 7702A, and no
    /// jurisdiction check.
    pub fn gpt_server(
        product: Arc<ProductData>,
        database: Arc<ProductDatabase>,
        tables: Arc<dyn ActuarialTableProvider>,
        settings: GlobalSettings,
        gpt: &GptServerInput,
    ) -> Result<Self> {
        let dbo = match gpt.dbo_7702 {
            Dbo7702::Option1 => DbOption::Option1,
            Dbo7702::Option2 => DbOption::Option2,
        };
        let input = PolicyInput {
            product_name: gpt.product_name.clone(),
            gender: gpt.gender,
            underwriting_class: gpt.underwriting_class,
            smoking: gpt.smoking,
            issue_age: gpt.issue_age,
            underwriting_basis: gpt.underwriting_basis,
            state_of_jurisdiction: gpt.state_of_jurisdiction.clone(),
            premium_tax_state: gpt.state_of_jurisdiction.clone(),
            specified_amount: vec![gpt.specified_amount],
            death_benefit_option: vec![dbo],
            accidental_death_benefit: gpt.adb_in_force,
            definition_of_life_insurance: DefnLifeIns::Gpt,
            definition_of_material_change: DefnMaterialChange::AdjustmentEvent,
            retirees_can_enroll: true,
            ..Default::default()
        };

        let Foundation {
            database,
            input,
            invariants,
            length,
            maturity_age,
        } = lay_foundation(database, input, &settings, false)?;
        log::debug!("gpt server: {} issue age {}", product.product_name, input.issue_age);

        let rounding = RoundingFunctors::new(&product.rounding)?;
        let spread = spread_for_7702(&database)?;
        let resolver = TableResolver::new(&product, &database, &input, tables.as_ref(), &settings, &invariants)?;
        let mortality = MortalityRates::new(&resolver, &database, &input, &rounding)?;
        let loads = Loads::new(
            &database,
            &resolver.current_specamt_load_rates()?,
            &resolver.guaranteed_specamt_load_rates()?,
        )?;
        let (irc7702_rates, irc7702) = init_7702(
            &database,
            &input,
            &invariants,
            &rounding,
            &mortality,
            &loads,
            &resolver,
            spread,
            gpt.target_premium,
        )?;
        drop(resolver);
        let ledger_type: LedgerType = database.query_code(DbKey::LedgerType)?;

        Ok(Self {
            state_of_jurisdiction: input.state_of_jurisdiction.clone(),
            state_of_domicile: product.domicile.clone(),
            issue_age: input.issue_age,
            retirement_age: input.retirement_age,
            maturity_age,
            length,
            ledger_type,
            nonillustrated: database.query_bool(DbKey::Nonillustrated)?,
            no_can_issue: database.query_bool(DbKey::NoLongerIssued)? && input.is_new_business(),
            subject_to_illustration_reg: ledger_type.is_subject_to_illustration_reg(),
            non_compliant_corridor: vec![1.0; length],
            max_survival_duration: maturity_age as f64,
            product,
            database,
            input,
            tables,
            settings,
            invariants,
            rounding,
            mortality,
            interest: None,
            loads,
            irc7702_rates,
            irc7702,
            irc7702a: None,
        })
    }

    /// A resolver over this engine's product, policy, and tables
    pub fn resolver(&self) -> Result<TableResolver<'_>> {
        TableResolver::new(
            &self.product,
            &self.database,
            &self.input,
            self.tables.as_ref(),
            &self.settings,
            &self.invariants,
        )
    }

    /// Investment management fee as an annual rate
    pub fn investment_management_fee(&self) -> Result<f64> {
        if !self.database.query_bool(DbKey::AllowSepAcct)? {
            return Ok(0.0);
        }
        if self.input.override_fund_management_fee {
            return Ok(self.input.input_fund_management_fee / 10_000.0);
        }

        let funds = &self.product.funds;
        let basis_points = if self.input.use_average_of_all_funds || 0.0 == self.input.premium_allocation_to_sepacct()
        {
            let listed: Vec<f64> = funds
                .iter()
                .filter(|fund| !fund.short_name.starts_with("custom"))
                .map(|fund| fund.scalar_imf)
                .collect();
            if listed.is_empty() {
                0.0
            } else {
                listed.iter().sum::<f64>() / listed.len() as f64
            }
        } else {
            let total: f64 = self.input.fund_allocations.iter().sum();
            if 0.0 == total {
                0.0
            } else {
                funds
                    .iter()
                    .zip(&self.input.fund_allocations)
                    .map(|(fund, allocation)| fund.scalar_imf * allocation)
                    .sum::<f64>()
                    / total
            }
        };
        Ok(basis_points / 10_000.0)
    }

    /// Corridor factors for the contract's definition of life insurance
    pub fn corridor_factor(&self) -> &[f64] {
        match self.invariants.defn_life_ins {
            DefnLifeIns::Cvat => self.mortality.cvat_corridor_factors(),
            DefnLifeIns::Gpt => self.irc7702.corridor_factors(),
            DefnLifeIns::Noncompliant => &self.non_compliant_corridor,
        }
    }

    pub fn issue_age(&self) -> i32 {
        self.issue_age
    }

    pub fn retirement_age(&self) -> i32 {
        self.retirement_age
    }

    pub fn maturity_age(&self) -> i32 {
        self.maturity_age
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn state_of_jurisdiction(&self) -> &str {
        &self.state_of_jurisdiction
    }

    pub fn state_of_domicile(&self) -> &str {
        &self.state_of_domicile
    }

    pub fn ledger_type(&self) -> LedgerType {
        self.ledger_type
    }

    pub fn nonillustrated(&self) -> bool {
        self.nonillustrated
    }

    pub fn no_can_issue(&self) -> bool {
        self.no_can_issue
    }

    pub fn subject_to_illustration_reg(&self) -> bool {
        self.subject_to_illustration_reg
    }

    pub fn product(&self) -> &ProductData {
        &self.product
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Policy input, resized to the contract length
    pub fn input(&self) -> &PolicyInput {
        &self.input
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    pub fn invariants(&self) -> &PermanentInvariants {
        &self.invariants
    }

    pub fn rounding(&self) -> &RoundingFunctors {
        &self.rounding
    }

    pub fn mortality(&self) -> &MortalityRates {
        &self.mortality
    }

    pub fn interest(&self) -> Option<&InterestRates> {
        self.interest.as_ref()
    }

    pub fn loads(&self) -> &Loads {
        &self.loads
    }

    pub fn max_survival_duration(&self) -> f64 {
        self.max_survival_duration
    }

    pub fn spread_for_7702(&self) -> &[f64] {
        &self.irc7702_rates.spread_for_7702
    }

    pub fn mly_7702_qc(&self) -> &[f64] {
        &self.irc7702_rates.mly_7702_qc
    }

    pub fn mly_dcv_qc(&self) -> &[f64] {
        &self.irc7702_rates.mly_dcv_qc
    }

    pub fn mly_7702_i_glp(&self) -> &[f64] {
        &self.irc7702_rates.mly_7702_i_glp
    }

    pub fn mly_7702_i_gsp(&self) -> &[f64] {
        &self.irc7702_rates.mly_7702_i_gsp
    }

    pub fn mly_7702_ig(&self) -> &[f64] {
        &self.irc7702_rates.mly_7702_ig
    }

    pub fn irc7702(&self) -> &Irc7702 {
        &self.irc7702
    }

    pub fn irc7702a(&self) -> Option<&Irc7702A> {
        self.irc7702a.as_ref()
    }
}
