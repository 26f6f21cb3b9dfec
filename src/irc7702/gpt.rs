//! Guideline premiums under IRC section 7702
//!
//! The account value is projected monthly with charges deducted at the start
//! of each month, COI charged on the discounted net amount at risk, and
//! interest credited at the guideline rate. Because every step is affine in
//! the premium, the account value at maturity is `a * P + b`, and the premium
//! that endows the benefit is solved directly rather than by iteration.

use crate::error::{IllustrationError, Result};
use crate::numeric::RoundTo;
use crate::policy::{DefnLifeIns, Dbo7702};

/// Breakpoints of the statutory GPT corridor: (attained age, factor)
const GPT_CORRIDOR: [(i32, f64); 11] = [
    (0, 2.50),
    (40, 2.50),
    (45, 2.15),
    (50, 1.85),
    (55, 1.50),
    (60, 1.30),
    (65, 1.20),
    (70, 1.15),
    (75, 1.05),
    (90, 1.05),
    (95, 1.00),
];

/// Statutory corridor factor at an attained age, interpolated linearly
/// between breakpoints
pub fn gpt_corridor_factor(age: i32) -> f64 {
    let mut previous = GPT_CORRIDOR[0];
    for &(breakpoint, factor) in &GPT_CORRIDOR[1..] {
        if age < breakpoint {
            let (lo_age, lo_factor) = previous;
            let fraction = (age - lo_age) as f64 / (breakpoint - lo_age) as f64;
            return lo_factor + fraction * (factor - lo_factor);
        }
        previous = (breakpoint, factor);
    }
    previous.1
}

/// Inforce guideline-premium history carried into a new projection
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GptHistory {
    pub glp: f64,
    /// Sum of guideline level premiums through the inforce year
    pub cumulative_glp: f64,
    pub gsp: f64,
    pub cumulative_premiums_paid: f64,
}

/// Everything needed to build an [`Irc7702`] object
///
/// Rate vectors run from issue to maturity and are monthly unless noted.
#[derive(Debug, Clone)]
pub struct Irc7702Params {
    pub defn_life_ins: DefnLifeIns,
    pub issue_age: i32,
    pub maturity_age: i32,
    /// Policy year at which the projection starts; zero for new business
    pub inforce_year: i32,
    pub q: Vec<f64>,
    pub glp_interest: Vec<f64>,
    pub gsp_interest: Vec<f64>,
    /// Monthly rate at which the death benefit is discounted in the NAAR
    pub naar_discount: Vec<f64>,
    pub specamt: f64,
    /// Death benefit for 7702: specified amount plus any term treated as
    /// death benefit
    pub benefit: f64,
    pub dbo: Dbo7702,
    pub monthly_policy_fee: Vec<f64>,
    pub annual_policy_fee: Vec<f64>,
    /// Rate per dollar of specified amount, monthly
    pub specamt_load: Vec<f64>,
    pub specamt_load_limit: f64,
    /// Monthly rate for a qualified ADB, zero when none is charged
    pub adb_rates: Vec<f64>,
    pub adb_limit: f64,
    pub target_premium_load: Vec<f64>,
    pub excess_premium_load: Vec<f64>,
    pub target_premium: f64,
    pub round_max_premium: RoundTo,
    pub round_min_specamt: RoundTo,
    pub round_corridor_factor: RoundTo,
    pub history: GptHistory,
}

/// Which premium a calculation solves for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guideline {
    /// Paid at every anniversary
    Level,
    /// Paid once at the start
    Single,
}

#[derive(Debug, Clone)]
pub struct Irc7702 {
    params: Irc7702Params,
    glp: f64,
    gsp: f64,
    least_bft_ever: f64,
    corridor: Vec<f64>,
}

impl Irc7702 {
    pub fn new(params: Irc7702Params) -> Result<Self> {
        let length = (params.maturity_age - params.issue_age).max(0) as usize;
        for (name, values) in [
            ("q", &params.q),
            ("GLP interest", &params.glp_interest),
            ("GSP interest", &params.gsp_interest),
            ("NAAR discount", &params.naar_discount),
        ] {
            if values.len() < length {
                return Err(IllustrationError::configuration(format!(
                    "7702 {} rates cover {} years, but the contract runs {} years.",
                    name,
                    values.len(),
                    length
                )));
            }
        }

        let corridor = (params.issue_age..params.maturity_age)
            .map(|age| params.round_corridor_factor.round(gpt_corridor_factor(age)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut irc7702 = Self {
            glp: 0.0,
            gsp: 0.0,
            least_bft_ever: params.benefit,
            corridor,
            params,
        };

        if 0 == irc7702.params.inforce_year {
            let (benefit, specamt, dbo) = (irc7702.params.benefit, irc7702.params.specamt, irc7702.params.dbo);
            irc7702.glp = irc7702.calculate_glp(0, benefit, specamt, dbo)?;
            irc7702.gsp = irc7702.calculate_gsp(0, benefit, specamt)?;
        } else {
            irc7702.glp = irc7702.params.history.glp;
            irc7702.gsp = irc7702.params.history.gsp;
        }
        log::debug!("7702: GLP {:.2}, GSP {:.2}", irc7702.glp, irc7702.gsp);

        Ok(irc7702)
    }

    fn length(&self) -> usize {
        (self.params.maturity_age - self.params.issue_age).max(0) as usize
    }

    /// Account value at maturity as `(a, b)` in `a * P + b`, for premiums in
    /// one load regime
    fn endowment_coefficients(
        &self,
        duration: usize,
        guideline: Guideline,
        benefit: f64,
        specamt: f64,
        dbo: Dbo7702,
        above_target: bool,
    ) -> (f64, f64) {
        let p = &self.params;
        let interest = match guideline {
            Guideline::Level => &p.glp_interest,
            Guideline::Single => &p.gsp_interest,
        };

        let (mut a, mut b) = (0.0, 0.0);
        for year in duration..self.length() {
            let paid = Guideline::Level == guideline || year == duration;
            if paid {
                // Net premium is alpha * P + beta within the chosen regime.
                let (alpha, beta) = if above_target {
                    (
                        1.0 - p.excess_premium_load[year],
                        p.target_premium * (p.excess_premium_load[year] - p.target_premium_load[year]),
                    )
                } else {
                    (1.0 - p.target_premium_load[year], 0.0)
                };
                a += alpha;
                b += beta;
            }
            b -= p.annual_policy_fee[year];

            let monthly_charges = p.monthly_policy_fee[year]
                + p.specamt_load[year] * specamt.min(p.specamt_load_limit)
                + p.adb_rates[year] * specamt.min(p.adb_limit);
            let q = p.q[year];
            let discounted_benefit = benefit / (1.0 + p.naar_discount[year]);
            let growth = 1.0 + interest[year];
            for _ in 0..12 {
                b -= monthly_charges;
                match dbo {
                    Dbo7702::Option1 => {
                        a *= 1.0 + q;
                        b = b * (1.0 + q) - q * discounted_benefit;
                    }
                    Dbo7702::Option2 => b -= q * discounted_benefit,
                }
                a *= growth;
                b *= growth;
            }
        }
        (a, b)
    }

    fn endowment_premium(
        &self,
        duration: usize,
        guideline: Guideline,
        benefit: f64,
        specamt: f64,
        dbo: Dbo7702,
    ) -> Result<f64> {
        let solve = |above_target: bool| -> Result<f64> {
            let (a, b) = self.endowment_coefficients(duration, guideline, benefit, specamt, dbo, above_target);
            if a <= 0.0 {
                return Err(IllustrationError::configuration(format!(
                    "Premium loads leave no net premium to endow a benefit of {}.",
                    benefit
                )));
            }
            Ok((benefit - b) / a)
        };

        let below = solve(false)?;
        let premium = if below <= self.params.target_premium {
            below
        } else {
            solve(true)?
        };
        Ok(self.params.round_max_premium.round(premium)?)
    }

    fn check_duration(&self, duration: i32) -> Result<usize> {
        let length = self.length();
        match usize::try_from(duration) {
            Ok(d) if d < length => Ok(d),
            _ => Err(IllustrationError::validation(format!(
                "Duration {} outside contract length {}.",
                duration, length
            ))),
        }
    }

    /// Level annual premium, paid at each anniversary, that endows `benefit`
    pub fn calculate_glp(&self, duration: i32, benefit: f64, specamt: f64, dbo: Dbo7702) -> Result<f64> {
        let duration = self.check_duration(duration)?;
        self.endowment_premium(duration, Guideline::Level, benefit, specamt, dbo)
    }

    /// Single premium that endows `benefit`; always on death benefit option 1
    pub fn calculate_gsp(&self, duration: i32, benefit: f64, specamt: f64) -> Result<f64> {
        let duration = self.check_duration(duration)?;
        self.endowment_premium(duration, Guideline::Single, benefit, specamt, Dbo7702::Option1)
    }

    /// Specified amount whose guideline premium equals `premium`
    fn inverse(&self, premium: f64, guideline: impl Fn(f64) -> Result<f64>) -> Result<f64> {
        if premium <= guideline(0.0)? {
            return Ok(0.0);
        }

        let mut high = 1000.0;
        let mut bracketed = false;
        for _ in 0..64 {
            if guideline(high)? >= premium {
                bracketed = true;
                break;
            }
            high *= 2.0;
        }
        if !bracketed {
            return Err(IllustrationError::validation(format!(
                "No specified amount has a guideline premium of {}.",
                premium
            )));
        }

        let mut low = 0.0;
        while high - low > 0.01 {
            let mid = 0.5 * (low + high);
            if guideline(mid)? < premium {
                low = mid;
            } else {
                high = mid;
            }
        }
        Ok(self.params.round_min_specamt.round(low)?)
    }

    pub fn specamt_for_glp(&self, premium: f64) -> Result<f64> {
        self.inverse(premium, |specamt| self.calculate_glp(0, specamt, specamt, self.params.dbo))
    }

    pub fn specamt_for_gsp(&self, premium: f64) -> Result<f64> {
        self.inverse(premium, |specamt| self.calculate_gsp(0, specamt, specamt))
    }

    pub fn glp(&self) -> f64 {
        self.glp
    }

    pub fn gsp(&self) -> f64 {
        self.gsp
    }

    /// Sum of guideline level premiums through `year`
    pub fn cumulative_glp(&self, year: i32) -> f64 {
        let history = &self.params.history;
        let inforce_year = self.params.inforce_year;
        if 0 == inforce_year {
            self.glp * (year + 1).max(0) as f64
        } else {
            history.cumulative_glp + self.glp * (year - inforce_year).max(0) as f64
        }
    }

    /// Greater of the GSP and the cumulative GLP through `year`
    pub fn guideline_premium_limit(&self, year: i32) -> f64 {
        self.gsp.max(self.cumulative_glp(year))
    }

    pub fn premiums_paid_to_date(&self) -> f64 {
        self.params.history.cumulative_premiums_paid
    }

    pub fn least_bft_ever(&self) -> f64 {
        self.least_bft_ever
    }

    /// Statutory corridor factors by policy year
    pub fn corridor_factors(&self) -> &[f64] {
        &self.corridor
    }

    pub fn defn_life_ins(&self) -> DefnLifeIns {
        self.params.defn_life_ins
    }

    pub fn dbo(&self) -> Dbo7702 {
        self.params.dbo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{i_upper_12_over_12_from_i, RoundingStyle};
    use approx::assert_relative_eq;

    fn params(length: usize) -> Irc7702Params {
        let rounding = |decimals, style| RoundTo::new(decimals, style).unwrap();
        Irc7702Params {
            defn_life_ins: DefnLifeIns::Gpt,
            issue_age: 100 - length as i32,
            maturity_age: 100,
            inforce_year: 0,
            q: vec![0.0; length],
            glp_interest: vec![i_upper_12_over_12_from_i(0.04); length],
            gsp_interest: vec![i_upper_12_over_12_from_i(0.06); length],
            naar_discount: vec![0.0; length],
            specamt: 100_000.0,
            benefit: 100_000.0,
            dbo: Dbo7702::Option1,
            monthly_policy_fee: vec![0.0; length],
            annual_policy_fee: vec![0.0; length],
            specamt_load: vec![0.0; length],
            specamt_load_limit: f64::MAX,
            adb_rates: vec![0.0; length],
            adb_limit: 0.0,
            target_premium_load: vec![0.0; length],
            excess_premium_load: vec![0.0; length],
            target_premium: 0.0,
            round_max_premium: rounding(2, RoundingStyle::NotAtAll),
            round_min_specamt: rounding(0, RoundingStyle::Upward),
            round_corridor_factor: rounding(2, RoundingStyle::ToNearest),
            history: GptHistory::default(),
        }
    }

    #[test]
    fn test_gsp_without_mortality_is_pure_discount() {
        let irc = Irc7702::new(params(10)).unwrap();
        assert_relative_eq!(irc.gsp(), 100_000.0 / 1.06_f64.powi(10), epsilon = 1e-6);
    }

    #[test]
    fn test_glp_without_mortality_is_annuity_due() {
        let irc = Irc7702::new(params(10)).unwrap();
        let v: f64 = 1.0 / 1.04;
        let annuity_due: f64 = (0..10).map(|t| v.powi(t)).sum();
        let expected = 100_000.0 * v.powi(10) / annuity_due;
        assert_relative_eq!(irc.glp(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_excess_load_applies_above_target() {
        let mut p = params(10);
        p.excess_premium_load = vec![0.05; 10];
        let loaded = Irc7702::new(p).unwrap();
        let unloaded = Irc7702::new(params(10)).unwrap();
        assert_relative_eq!(loaded.gsp(), unloaded.gsp() / 0.95, epsilon = 1e-6);

        // A target above the premium keeps it in the target-load regime.
        let mut p = params(10);
        p.excess_premium_load = vec![0.05; 10];
        p.target_premium = 1_000_000.0;
        let below_target = Irc7702::new(p).unwrap();
        assert_relative_eq!(below_target.gsp(), unloaded.gsp(), epsilon = 1e-6);
    }

    #[test]
    fn test_inverse_recovers_specamt() {
        let mut p = params(30);
        p.q = (0..30).map(|t| 0.0002 + 0.00002 * t as f64).collect();
        p.monthly_policy_fee = vec![5.0; 30];
        p.specamt_load = vec![0.00002; 30];
        let irc = Irc7702::new(p).unwrap();

        let glp = irc.calculate_glp(0, 250_000.0, 250_000.0, Dbo7702::Option1).unwrap();
        let specamt = irc.specamt_for_glp(glp).unwrap();
        assert!((specamt - 250_000.0).abs() <= 1.0, "{}", specamt);

        let gsp = irc.calculate_gsp(0, 250_000.0, 250_000.0).unwrap();
        let specamt = irc.specamt_for_gsp(gsp).unwrap();
        assert!((specamt - 250_000.0).abs() <= 1.0, "{}", specamt);
    }

    #[test]
    fn test_option2_glp_exceeds_option1() {
        let mut p = params(30);
        p.q = vec![0.0005; 30];
        let irc = Irc7702::new(p).unwrap();
        let dbo1 = irc.calculate_glp(0, 100_000.0, 100_000.0, Dbo7702::Option1).unwrap();
        let dbo2 = irc.calculate_glp(0, 100_000.0, 100_000.0, Dbo7702::Option2).unwrap();
        assert!(dbo2 > dbo1);
    }

    #[test]
    fn test_statutory_corridor() {
        assert_eq!(gpt_corridor_factor(25), 2.50);
        assert_eq!(gpt_corridor_factor(40), 2.50);
        assert_relative_eq!(gpt_corridor_factor(42), 2.36, epsilon = 1e-12);
        assert_eq!(gpt_corridor_factor(45), 2.15);
        assert_relative_eq!(gpt_corridor_factor(57), 1.42, epsilon = 1e-12);
        assert_eq!(gpt_corridor_factor(80), 1.05);
        assert_relative_eq!(gpt_corridor_factor(93), 1.02, epsilon = 1e-12);
        assert_eq!(gpt_corridor_factor(99), 1.00);

        let irc = Irc7702::new(params(60)).unwrap();
        assert_eq!(irc.corridor_factors().len(), 60);
        assert_eq!(irc.corridor_factors()[0], 2.50);
        assert_eq!(irc.corridor_factors()[5], 2.15);
    }

    #[test]
    fn test_inforce_history_carried_forward() {
        let mut p = params(30);
        p.inforce_year = 5;
        p.history = GptHistory {
            glp: 1_200.0,
            cumulative_glp: 7_200.0,
            gsp: 15_000.0,
            cumulative_premiums_paid: 6_000.0,
        };
        let irc = Irc7702::new(p).unwrap();
        assert_eq!(irc.glp(), 1_200.0);
        assert_eq!(irc.gsp(), 15_000.0);
        assert_eq!(irc.cumulative_glp(7), 9_600.0);
        assert_eq!(irc.guideline_premium_limit(5), 15_000.0);
        assert_eq!(irc.premiums_paid_to_date(), 6_000.0);
    }

    #[test]
    fn test_duration_beyond_maturity_rejected() {
        let irc = Irc7702::new(params(10)).unwrap();
        assert!(matches!(
            irc.calculate_glp(10, 1.0, 1.0, Dbo7702::Option1),
            Err(IllustrationError::Validation(_))
        ));
    }
}
