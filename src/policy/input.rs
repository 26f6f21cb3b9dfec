//! Per-policy illustration input

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IllustrationError;

/// Parse a census or case-file code into an enumerator, naming the field on failure
macro_rules! parse_enum {
    ($ty:ident, $field:literal, { $($text:literal => $variant:ident),* $(,)? }) => {
        impl FromStr for $ty {
            type Err = IllustrationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)*
                    other => Err(IllustrationError::configuration(format!(
                        "Unknown {}: {}",
                        $field, other
                    ))),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Unisex,
}

parse_enum!(Gender, "Gender", { "Female" => Female, "Male" => Male, "Unisex" => Unisex });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Smoking {
    Smoker,
    Nonsmoker,
    Unismoke,
}

parse_enum!(Smoking, "Smoking", {
    "Smoker" => Smoker,
    "Nonsmoker" => Nonsmoker,
    "Unismoke" => Unismoke,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnderwritingClass {
    Ultrapreferred,
    Preferred,
    Standard,
    Rated,
}

parse_enum!(UnderwritingClass, "UnderwritingClass", {
    "Ultrapreferred" => Ultrapreferred,
    "Preferred" => Preferred,
    "Standard" => Standard,
    "Rated" => Rated,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnderwritingBasis {
    Medical,
    Paramedical,
    NonMedical,
    SimplifiedIssue,
    GuaranteedIssue,
}

parse_enum!(UnderwritingBasis, "UnderwritingBasis", {
    "Medical" => Medical,
    "Paramedical" => Paramedical,
    "NonMedical" => NonMedical,
    "SimplifiedIssue" => SimplifiedIssue,
    "GuaranteedIssue" => GuaranteedIssue,
});

/// Substandard table rating; each table adds 25% of standard mortality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubstandardTable {
    #[default]
    None,
    A,
    B,
    C,
    D,
    E,
    F,
    H,
    J,
    L,
    P,
}

impl SubstandardTable {
    /// Extra mortality as a multiple of standard
    pub fn extra_multiple(&self) -> f64 {
        let tables = match self {
            SubstandardTable::None => 0.0,
            SubstandardTable::A => 1.0,
            SubstandardTable::B => 2.0,
            SubstandardTable::C => 3.0,
            SubstandardTable::D => 4.0,
            SubstandardTable::E => 5.0,
            SubstandardTable::F => 6.0,
            SubstandardTable::H => 8.0,
            SubstandardTable::J => 10.0,
            SubstandardTable::L => 12.0,
            SubstandardTable::P => 16.0,
        };
        0.25 * tables
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbOption {
    /// Level death benefit
    Option1,
    /// Specified amount plus account value
    Option2,
    /// Specified amount plus premiums paid
    Rop,
    /// Minimum death benefit
    Mdb,
}

parse_enum!(DbOption, "DeathBenefitOption", {
    "Option1" => Option1,
    "Option2" => Option2,
    "Rop" => Rop,
    "Mdb" => Mdb,
});

/// Death-benefit option as treated for 7702 purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dbo7702 {
    Option1,
    Option2,
}

impl TryFrom<i32> for Dbo7702 {
    type Error = IllustrationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Dbo7702::Option1),
            2 => Ok(Dbo7702::Option2),
            other => Err(IllustrationError::configuration(format!(
                "Unknown 7702 death benefit option code {}.",
                other
            ))),
        }
    }
}

/// Map an input death-benefit option to its 7702 equivalent
///
/// ROP takes the product's stated equivalent; MDB is level.
pub fn effective_dbopt_7702(dbo: DbOption, rop_equivalent: Dbo7702) -> Dbo7702 {
    match dbo {
        DbOption::Option1 | DbOption::Mdb => Dbo7702::Option1,
        DbOption::Option2 => Dbo7702::Option2,
        DbOption::Rop => rop_equivalent,
    }
}

/// Definition of life insurance under IRC 7702
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefnLifeIns {
    Cvat,
    Gpt,
    Noncompliant,
}

parse_enum!(DefnLifeIns, "DefinitionOfLifeInsurance", {
    "Cvat" => Cvat,
    "Gpt" => Gpt,
    "Noncompliant" => Noncompliant,
});

/// Definition of material change under IRC 7702A
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefnMaterialChange {
    UnnecessaryPremium,
    BenefitIncrease,
    LaterOfIncreaseOrUnnecessaryPremium,
    EarlierOfIncreaseOrUnnecessaryPremium,
    AdjustmentEvent,
}

impl TryFrom<i32> for DefnMaterialChange {
    type Error = IllustrationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DefnMaterialChange::UnnecessaryPremium),
            1 => Ok(DefnMaterialChange::BenefitIncrease),
            2 => Ok(DefnMaterialChange::LaterOfIncreaseOrUnnecessaryPremium),
            3 => Ok(DefnMaterialChange::EarlierOfIncreaseOrUnnecessaryPremium),
            4 => Ok(DefnMaterialChange::AdjustmentEvent),
            other => Err(IllustrationError::configuration(format!(
                "Unknown material change definition code {}.",
                other
            ))),
        }
    }
}

/// How premiums are treated when they would make the contract a MEC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvoidMec {
    AllowMec,
    ReducePremium,
    IncreaseSpecamt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurviveTo {
    NoLimit,
    Age,
    Year,
    Expectancy,
}

/// Premium payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Annual,
    Semiannual,
    Quarterly,
    Monthly,
}

parse_enum!(Mode, "Mode", {
    "Annual" => Annual,
    "Semiannual" => Semiannual,
    "Quarterly" => Quarterly,
    "Monthly" => Monthly,
});

impl Mode {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Mode::Annual => 1.0,
            Mode::Semiannual => 2.0,
            Mode::Quarterly => 4.0,
            Mode::Monthly => 12.0,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// All parameters that describe one illustrated policy
///
/// Vectors are indexed by policy year and are resized to the contract length
/// when an engine is built; a shorter vector is extended with its last value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyInput {
    pub product_name: String,

    pub issue_age: i32,
    pub retirement_age: i32,
    /// Whether insureds past retirement age may be issued coverage
    pub retirees_can_enroll: bool,

    pub gender: Gender,
    pub smoking: Smoking,
    pub underwriting_class: UnderwritingClass,
    pub underwriting_basis: UnderwritingBasis,
    pub substandard_table: SubstandardTable,

    /// Blend mortality tables by gender using `male_proportion`
    pub blend_gender: bool,
    /// Blend mortality tables by smoking using `nonsmoker_proportion`
    pub blend_smoking: bool,
    pub male_proportion: f64,
    pub nonsmoker_proportion: f64,

    pub state_of_jurisdiction: String,
    pub premium_tax_state: String,

    pub effective_date: NaiveDate,
    pub inforce_as_of_date: NaiveDate,
    /// Date on which current COI rates were last re-entered
    pub last_coi_reentry_date: NaiveDate,
    pub inforce_year: i32,
    pub inforce_month: i32,

    pub specified_amount: Vec<f64>,
    pub death_benefit_option: Vec<DbOption>,
    /// Annual general-account crediting rate by year
    pub general_account_rate: Vec<f64>,
    /// Proportion of premium allocated to the general account
    pub general_account_allocation: f64,
    pub current_coi_multiplier: Vec<f64>,
    pub use_experience_rating: bool,
    pub maximum_naar: f64,

    pub term_rider: bool,
    pub term_rider_amount: f64,
    pub accidental_death_benefit: bool,
    pub waiver_of_premium_benefit: bool,
    pub spouse_rider: bool,
    pub spouse_rider_amount: f64,
    pub spouse_issue_age: i32,
    pub child_rider: bool,
    pub child_rider_amount: f64,

    pub definition_of_life_insurance: DefnLifeIns,
    pub definition_of_material_change: DefnMaterialChange,
    pub avoid_mec_method: AvoidMec,

    pub inforce_glp: f64,
    pub inforce_cumulative_glp: f64,
    pub inforce_gsp: f64,
    pub inforce_cumulative_gpt_premiums_paid: f64,

    pub projected_salary: Vec<f64>,
    pub salary_specamt_factor: f64,
    /// Zero means no cap
    pub salary_specamt_cap: f64,
    pub salary_specamt_offset: f64,

    pub survive_to_type: SurviveTo,
    pub survive_to_age: i32,
    pub survive_to_year: i32,

    pub override_fund_management_fee: bool,
    /// Investment management fee in basis points
    pub input_fund_management_fee: f64,
    pub use_average_of_all_funds: bool,
    /// Separate-account fund allocations, in fund-list order
    pub fund_allocations: Vec<f64>,
}

impl Default for PolicyInput {
    fn default() -> Self {
        let effective_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        Self {
            product_name: "sample".to_string(),
            issue_age: 45,
            retirement_age: 65,
            retirees_can_enroll: true,
            gender: Gender::Male,
            smoking: Smoking::Nonsmoker,
            underwriting_class: UnderwritingClass::Standard,
            underwriting_basis: UnderwritingBasis::Medical,
            substandard_table: SubstandardTable::None,
            blend_gender: false,
            blend_smoking: false,
            male_proportion: 1.0,
            nonsmoker_proportion: 1.0,
            state_of_jurisdiction: "CT".to_string(),
            premium_tax_state: "CT".to_string(),
            effective_date,
            inforce_as_of_date: effective_date,
            last_coi_reentry_date: effective_date,
            inforce_year: 0,
            inforce_month: 0,
            specified_amount: vec![1_000_000.0],
            death_benefit_option: vec![DbOption::Option1],
            general_account_rate: vec![0.04],
            general_account_allocation: 1.0,
            current_coi_multiplier: vec![1.0],
            use_experience_rating: false,
            maximum_naar: 0.0,
            term_rider: false,
            term_rider_amount: 0.0,
            accidental_death_benefit: false,
            waiver_of_premium_benefit: false,
            spouse_rider: false,
            spouse_rider_amount: 0.0,
            spouse_issue_age: 45,
            child_rider: false,
            child_rider_amount: 0.0,
            definition_of_life_insurance: DefnLifeIns::Gpt,
            definition_of_material_change: DefnMaterialChange::AdjustmentEvent,
            avoid_mec_method: AvoidMec::AllowMec,
            inforce_glp: 0.0,
            inforce_cumulative_glp: 0.0,
            inforce_gsp: 0.0,
            inforce_cumulative_gpt_premiums_paid: 0.0,
            projected_salary: vec![0.0],
            salary_specamt_factor: 0.0,
            salary_specamt_cap: 0.0,
            salary_specamt_offset: 0.0,
            survive_to_type: SurviveTo::NoLimit,
            survive_to_age: 100,
            survive_to_year: 0,
            override_fund_management_fee: false,
            input_fund_management_fee: 0.0,
            use_average_of_all_funds: false,
            fund_allocations: Vec::new(),
        }
    }
}

/// Extend or truncate `values` to `length`, repeating the last element
fn resize_padded<T: Clone>(values: &mut Vec<T>, length: usize, fill: T) {
    let last = values.last().cloned().unwrap_or(fill);
    values.resize(length, last);
}

impl PolicyInput {
    /// Whether the insured carries any substandard rating
    pub fn is_policy_rated(&self) -> bool {
        self.underwriting_class == UnderwritingClass::Rated
            || self.substandard_table != SubstandardTable::None
    }

    pub fn is_new_business(&self) -> bool {
        self.effective_date == self.inforce_as_of_date
    }

    /// Proportion of premium directed to separate-account funds
    pub fn premium_allocation_to_sepacct(&self) -> f64 {
        1.0 - self.general_account_allocation
    }

    /// Resize every duration-indexed vector to the contract length
    pub fn resize_to(&mut self, length: usize) {
        resize_padded(&mut self.specified_amount, length, 0.0);
        resize_padded(&mut self.death_benefit_option, length, DbOption::Option1);
        resize_padded(&mut self.general_account_rate, length, 0.0);
        resize_padded(&mut self.current_coi_multiplier, length, 1.0);
        resize_padded(&mut self.projected_salary, length, 0.0);
    }
}
