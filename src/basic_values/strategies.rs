//! Modal premiums and specified amounts
//!
//! Each strategy turns a specified amount into a modal premium, and an
//! annualized payment back into a specified amount. The two forms are
//! inverses, apart from rounding, except where a form does not exist.

use serde::{Deserialize, Serialize};

use super::{BasicValues, ModalPremiumType, WaiverChargeMethod};
use crate::assumptions::{GenBasis, RatePeriod};
use crate::error::{IllustrationError, Result};
use crate::numeric::{i_upper_12_over_12_from_i, level_annuity_factor, EPSILON_PLUS_ONE};
use crate::policy::{effective_dbopt_7702, Mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalStrategy {
    /// Premium that covers one year's monthly deductions
    MonthlyDeduction,
    /// 7702A seven-pay premium
    SevenPay,
    /// Target premium from a table of rates per dollar
    TargetTable,
    /// Premium that buys the specified amount at the corridor factor
    Corridor,
    Glp,
    Gsp,
    /// Specified amount as a multiple of salary
    Salary,
}

impl From<ModalPremiumType> for ModalStrategy {
    fn from(premium_type: ModalPremiumType) -> Self {
        match premium_type {
            ModalPremiumType::MonthlyDeduction => ModalStrategy::MonthlyDeduction,
            ModalPremiumType::NonMec => ModalStrategy::SevenPay,
            ModalPremiumType::Table => ModalStrategy::TargetTable,
        }
    }
}

/// Which charges a monthly-deduction premium covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeductionPortion {
    Full,
    /// Charges paid by the employee: term, spouse, and child riders
    Employee,
    /// Charges paid by the employer: base COI, ADB, loads, and fees
    Employer,
}

impl BasicValues {
    fn year(&self, duration: i32) -> Result<usize> {
        match usize::try_from(duration) {
            Ok(year) if year < self.length() => Ok(year),
            _ => Err(IllustrationError::validation(format!(
                "Duration {} outside contract length {}.",
                duration,
                self.length()
            ))),
        }
    }

    /// Current COI rates for the band that `specamt` falls in; band 0 unless
    /// the product uses unusual banding
    pub fn banded_coi_rates(&self, basis: GenBasis, specamt: f64) -> &[f64] {
        let invariants = self.invariants();
        let mortality = self.mortality();
        if !invariants.use_unusual_coi_banding || GenBasis::Guaranteed == basis {
            return mortality.monthly_coi_rates_band0(basis);
        }
        if invariants.curr_coi_table0_limit <= specamt && specamt < invariants.curr_coi_table1_limit {
            mortality.monthly_coi_rates_band1(basis)
        } else if invariants.curr_coi_table1_limit <= specamt {
            mortality.monthly_coi_rates_band2(basis)
        } else {
            mortality.monthly_coi_rates_band0(basis)
        }
    }

    /// Annuity factor, in monthly payments, for one modal premium, at the
    /// credited rate less the minimum-premium spread
    fn annuity_value_mly_ded(&self, year: usize, mode: Mode) -> Result<f64> {
        let interest = self.interest().ok_or_else(|| {
            IllustrationError::configuration("Monthly deduction premium requires interest rates.")
        })?;
        let spread = match mode {
            Mode::Monthly => 0.0,
            _ => self.invariants().min_prem_int_spread[year] / mode.periods_per_year(),
        };
        let annual = self.input().general_account_rate[year];
        let guaranteed_monthly = interest.gen_acct_net_rate(GenBasis::Guaranteed, RatePeriod::Monthly)[year];
        let z = i_upper_12_over_12_from_i(annual - spread);
        let u = 1.0 / (1.0 + z.max(guaranteed_monthly));
        Ok(level_annuity_factor(u, mode.periods_per_year()))
    }

    /// Annuity factor discounted at the NAAR discount rate
    fn annuity_value_naar_discount(&self, year: usize, mode: Mode) -> f64 {
        level_annuity_factor(self.invariants().db_discount_rate[year], mode.periods_per_year())
    }

    /// Modal premium that pays the monthly deductions for one year
    pub fn monthly_deduction_premium(
        &self,
        portion: DeductionPortion,
        duration: i32,
        mode: Mode,
        specamt: f64,
    ) -> Result<f64> {
        let year = self.year(duration)?;
        let input = self.input();
        let invariants = self.invariants();
        let mortality = self.mortality();
        let loads = self.loads();
        let basis = GenBasis::Current;

        let employee = DeductionPortion::Employer != portion;
        let employer = DeductionPortion::Employee != portion;

        let mut z = 0.0;
        let mut annual_charge = 0.0;
        if employer {
            z += specamt * self.banded_coi_rates(basis, specamt)[year] * invariants.db_discount_rate[year];
            if input.accidental_death_benefit {
                z += mortality.adb_rates()[year] * specamt.min(invariants.adb_limit);
            }
            z += loads.specified_amount_load(basis)[year] * specamt.min(invariants.specamt_load_limit);
            z += loads.monthly_policy_fee(basis)[year];
            annual_charge = loads.annual_policy_fee(basis)[year];
        }
        // The employee's specified amount is charged at term rates.
        if DeductionPortion::Employee == portion {
            z += specamt * invariants.db_discount_rate[year] * mortality.term_rates(basis)[year];
        }
        if employee {
            if input.spouse_rider {
                z += mortality.spouse_rider_rates(basis)[year] * input.spouse_rider_amount;
            }
            if input.child_rider {
                z += mortality.child_rider_rates()[year] * input.child_rider_amount;
            }
        }
        if input.waiver_of_premium_benefit {
            let rate = mortality.wp_rates()[year];
            match invariants.waiver_charge_method {
                WaiverChargeMethod::TimesSpecamt => z += rate * specamt.min(invariants.wp_limit),
                WaiverChargeMethod::TimesDeductions => {
                    z *= 1.0 + rate;
                    annual_charge *= 1.0 + rate;
                }
            }
        }

        z /= 1.0 - self.loads().target_premium_load_maximum_premium_tax()[year];
        z *= match portion {
            DeductionPortion::Full => self.annuity_value_mly_ded(year, mode)?,
            DeductionPortion::Employee | DeductionPortion::Employer => self.annuity_value_naar_discount(year, mode),
        };
        z += annual_charge;
        Ok(self.rounding().min_premium.round(z)?)
    }

    fn corridor_at_issue(&self) -> Result<f64> {
        self.corridor_factor()
            .first()
            .copied()
            .ok_or_else(|| IllustrationError::configuration("Corridor factors are empty."))
    }

    fn first_rate(rates: &[f64], name: &str) -> Result<f64> {
        match rates.first() {
            Some(&rate) if 0.0 != rate => Ok(rate),
            _ => Err(IllustrationError::configuration(format!(
                "First-year {} rate is zero or missing.",
                name
            ))),
        }
    }

    fn guideline_at_issue(&self, strategy: ModalStrategy, duration: i32) -> Result<()> {
        if 0 != duration {
            return Err(IllustrationError::validation(format!(
                "{:?} premium is available only at issue, not at duration {}.",
                strategy, duration
            )));
        }
        Ok(())
    }

    /// Modal premium for a specified amount (and, for guideline premiums, a
    /// 7702 benefit amount)
    pub fn modal_premium(
        &self,
        strategy: ModalStrategy,
        duration: i32,
        mode: Mode,
        specamt: f64,
        bft: f64,
    ) -> Result<f64> {
        let periods = mode.periods_per_year();
        let round_max_premium = &self.rounding().max_premium;
        match strategy {
            ModalStrategy::MonthlyDeduction => {
                self.monthly_deduction_premium(DeductionPortion::Full, duration, mode, specamt)
            }
            ModalStrategy::SevenPay => {
                self.year(duration)?;
                let rate = Self::first_rate(self.mortality().seven_pay_rates(), "seven-pay")?;
                Ok(round_max_premium.round(rate * EPSILON_PLUS_ONE * specamt / periods)?)
            }
            ModalStrategy::TargetTable => {
                self.year(duration)?;
                let rate = Self::first_rate(self.mortality().target_premium_rates(), "target premium")?;
                let fee = self.invariants().tgt_prem_monthly_pol_fee;
                Ok(round_max_premium.round((12.0 * fee + specamt * EPSILON_PLUS_ONE * rate) / periods)?)
            }
            ModalStrategy::Corridor => {
                self.year(duration)?;
                let corridor = self.corridor_at_issue()?;
                Ok(round_max_premium.round(specamt * EPSILON_PLUS_ONE / corridor / periods)?)
            }
            ModalStrategy::Glp => {
                self.guideline_at_issue(strategy, duration)?;
                let dbo = effective_dbopt_7702(self.input().death_benefit_option[0], self.invariants().equiv_7702_dbo3);
                let glp = self.irc7702().calculate_glp(0, bft, specamt, dbo)?;
                Ok(round_max_premium.round(EPSILON_PLUS_ONE * glp / periods)?)
            }
            ModalStrategy::Gsp => {
                self.guideline_at_issue(strategy, duration)?;
                let gsp = self.irc7702().calculate_gsp(0, bft, specamt)?;
                Ok(round_max_premium.round(EPSILON_PLUS_ONE * gsp / periods)?)
            }
            ModalStrategy::Salary => Err(IllustrationError::unsupported(
                "Salary determines specified amount only; it has no premium form.",
            )),
        }
    }

    /// Specified amount for an annualized payment
    pub fn modal_specamt(&self, strategy: ModalStrategy, annualized_pmt: f64, duration: i32) -> Result<f64> {
        let round_min_specamt = &self.rounding().min_specamt;
        match strategy {
            ModalStrategy::MonthlyDeduction => Err(IllustrationError::unsupported(
                "No specified amount can be derived from a monthly deduction premium.",
            )),
            ModalStrategy::SevenPay => {
                let rate = Self::first_rate(self.mortality().seven_pay_rates(), "seven-pay")?;
                Ok(round_min_specamt.round(annualized_pmt / rate)?)
            }
            ModalStrategy::TargetTable => {
                let rate = Self::first_rate(self.mortality().target_premium_rates(), "target premium")?;
                let fee = self.invariants().tgt_prem_monthly_pol_fee;
                Ok(round_min_specamt.round((annualized_pmt - 12.0 * fee) / rate)?)
            }
            ModalStrategy::Corridor => Ok(round_min_specamt.round(annualized_pmt * self.corridor_at_issue()?)?),
            ModalStrategy::Glp => {
                self.guideline_at_issue(strategy, duration)?;
                self.irc7702().specamt_for_glp(annualized_pmt)
            }
            ModalStrategy::Gsp => {
                self.guideline_at_issue(strategy, duration)?;
                self.irc7702().specamt_for_gsp(annualized_pmt)
            }
            ModalStrategy::Salary => {
                let year = self.year(duration)?;
                let input = self.input();
                let mut z = input.projected_salary[year] * input.salary_specamt_factor;
                if 0.0 != input.salary_specamt_cap {
                    z = z.min(input.salary_specamt_cap);
                }
                z -= input.salary_specamt_offset;
                Ok(round_min_specamt.round(z.max(0.0))?)
            }
        }
    }

    pub fn modal_min_premium(&self, duration: i32, mode: Mode, specamt: f64) -> Result<f64> {
        let strategy = ModalStrategy::from(self.invariants().min_prem_type);
        self.modal_premium(strategy, duration, mode, specamt, specamt)
    }

    /// Modal target premium; rates are taken at issue when the target is
    /// fixed then
    pub fn modal_target_premium(&self, duration: i32, mode: Mode, specamt: f64) -> Result<f64> {
        let duration = if self.invariants().tgt_prem_fixed_at_issue { 0 } else { duration };
        let strategy = ModalStrategy::from(self.invariants().tgt_prem_type);
        self.modal_premium(strategy, duration, mode, specamt, specamt)
    }

    pub fn annual_target_premium(&self, duration: i32, specamt: f64) -> Result<f64> {
        self.modal_target_premium(duration, Mode::Annual, specamt)
    }

    /// Largest specified amount a minimum-premium payment supports
    pub fn modal_specamt_max(&self, annualized_pmt: f64) -> Result<f64> {
        self.modal_specamt(ModalStrategy::from(self.invariants().min_prem_type), annualized_pmt, 0)
    }

    /// Specified amount for which a payment is the target premium
    pub fn modal_specamt_target(&self, annualized_pmt: f64) -> Result<f64> {
        self.modal_specamt(ModalStrategy::from(self.invariants().tgt_prem_type), annualized_pmt, 0)
    }
}
