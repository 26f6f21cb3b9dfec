//! Mortality-based rates: COI bands, rider charges, and 7702A tables
//!
//! COI rates are read as monthly rates, adjusted by the product and input
//! multipliers and any substandard table rating, limited to the product's
//! maximum monthly rate, then rounded.

use super::GenBasis;
use crate::basic_values::{RoundingFunctors, TableResolver};
use crate::error::{IllustrationError, Result};
use crate::numeric::RoundTo;
use crate::policy::PolicyInput;
use crate::product::{Database, DbKey};

#[derive(Debug, Clone)]
pub struct MortalityRates {
    /// Current monthly COI rates for bands 0, 1, and 2
    current_coi: [Vec<f64>; 3],
    guaranteed_coi: Vec<f64>,

    adb_rates: Vec<f64>,
    wp_rates: Vec<f64>,
    child_rider_rates: Vec<f64>,
    current_spouse_rider_rates: Vec<f64>,
    guaranteed_spouse_rider_rates: Vec<f64>,
    current_term_rates: Vec<f64>,
    guaranteed_term_rates: Vec<f64>,

    seven_pay_rates: Vec<f64>,
    target_premium_rates: Vec<f64>,
    cvat_corridor_factors: Vec<f64>,
    cvat_nsp_rates: Vec<f64>,
    /// Annual mortality used for survivorship
    partial_mortality_q: Vec<f64>,
}

/// Multiply, limit, and round one vector of monthly COI rates
fn adjust_coi(rates: &[f64], multiplier: &[f64], max_coi: f64, round: &RoundTo) -> Result<Vec<f64>> {
    rates
        .iter()
        .zip(multiplier)
        .map(|(r, m)| Ok(round.round((r * m).min(max_coi))?))
        .collect()
}

fn round_all(values: Vec<f64>, round: &RoundTo) -> Result<Vec<f64>> {
    Ok(round.round_vec(&values)?)
}

impl MortalityRates {
    pub fn new(
        resolver: &TableResolver<'_>,
        db: &Database,
        input: &PolicyInput,
        rounding: &RoundingFunctors,
    ) -> Result<Self> {
        let max_monthly_coi_rate = db.query(DbKey::MaxMonthlyCoiRate)?;
        if 0.0 == max_monthly_coi_rate {
            return Err(IllustrationError::configuration(format!(
                "Maximum monthly COI rate is zero in product {}.",
                db.product_name()
            )));
        }
        let max_coi = 1.0 / max_monthly_coi_rate;

        let table_multiple = input.substandard_table.extra_multiple();
        let substandard: Vec<f64> = resolver
            .substandard_table_multipliers()?
            .iter()
            .map(|m| 1.0 + m * table_multiple)
            .collect();
        let product_multiplier = db.query_vec(DbKey::CurrCoiMultiplier)?;
        let current_multiplier: Vec<f64> = product_multiplier
            .iter()
            .zip(&input.current_coi_multiplier)
            .zip(&substandard)
            .map(|((p, i), s)| p * i * s)
            .collect();

        let round_coi = &rounding.coi_rate;
        let current_coi = [
            adjust_coi(&resolver.current_coi_rates_0()?, &current_multiplier, max_coi, round_coi)?,
            adjust_coi(&resolver.current_coi_rates_1()?, &current_multiplier, max_coi, round_coi)?,
            adjust_coi(&resolver.current_coi_rates_2()?, &current_multiplier, max_coi, round_coi)?,
        ];
        let guaranteed_coi = adjust_coi(&resolver.guaranteed_coi_rates()?, &substandard, max_coi, round_coi)?;

        log::debug!(
            "mortality: first-year current COI {:.8}, guaranteed {:.8}",
            current_coi[0].first().copied().unwrap_or_default(),
            guaranteed_coi.first().copied().unwrap_or_default()
        );

        Ok(Self {
            current_coi,
            guaranteed_coi,
            adb_rates: resolver.adb_rates()?,
            wp_rates: resolver.wp_rates()?,
            child_rider_rates: resolver.child_rider_rates()?,
            current_spouse_rider_rates: resolver.current_spouse_rider_rates()?,
            guaranteed_spouse_rider_rates: resolver.guaranteed_spouse_rider_rates()?,
            current_term_rates: resolver.current_term_rates()?,
            guaranteed_term_rates: resolver.guaranteed_term_rates()?,
            seven_pay_rates: round_all(resolver.seven_pay_rates()?, &rounding.seven_pay_rate)?,
            target_premium_rates: resolver.target_premium_rates()?,
            cvat_corridor_factors: round_all(resolver.cvat_corridor_factors()?, &rounding.corridor_factor)?,
            cvat_nsp_rates: round_all(resolver.irc7702_nsp_rates()?, &rounding.nsp_rate_7702)?,
            partial_mortality_q: resolver.partial_mortality_rates()?,
        })
    }

    fn band(&self, basis: GenBasis, band: usize) -> &[f64] {
        match basis {
            GenBasis::Current => &self.current_coi[band],
            GenBasis::Guaranteed => &self.guaranteed_coi,
        }
    }

    pub fn monthly_coi_rates_band0(&self, basis: GenBasis) -> &[f64] {
        self.band(basis, 0)
    }

    pub fn monthly_coi_rates_band1(&self, basis: GenBasis) -> &[f64] {
        self.band(basis, 1)
    }

    pub fn monthly_coi_rates_band2(&self, basis: GenBasis) -> &[f64] {
        self.band(basis, 2)
    }

    pub fn adb_rates(&self) -> &[f64] {
        &self.adb_rates
    }

    pub fn wp_rates(&self) -> &[f64] {
        &self.wp_rates
    }

    pub fn child_rider_rates(&self) -> &[f64] {
        &self.child_rider_rates
    }

    pub fn spouse_rider_rates(&self, basis: GenBasis) -> &[f64] {
        match basis {
            GenBasis::Current => &self.current_spouse_rider_rates,
            GenBasis::Guaranteed => &self.guaranteed_spouse_rider_rates,
        }
    }

    pub fn term_rates(&self, basis: GenBasis) -> &[f64] {
        match basis {
            GenBasis::Current => &self.current_term_rates,
            GenBasis::Guaranteed => &self.guaranteed_term_rates,
        }
    }

    pub fn seven_pay_rates(&self) -> &[f64] {
        &self.seven_pay_rates
    }

    pub fn target_premium_rates(&self) -> &[f64] {
        &self.target_premium_rates
    }

    pub fn cvat_corridor_factors(&self) -> &[f64] {
        &self.cvat_corridor_factors
    }

    pub fn cvat_nsp_rates(&self) -> &[f64] {
        &self.cvat_nsp_rates
    }

    pub fn partial_mortality_q(&self) -> &[f64] {
        &self.partial_mortality_q
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_relative_eq;

    use super::*;
    use crate::basic_values::PermanentInvariants;
    use crate::config::GlobalSettings;
    use crate::numeric::RoundingStyle;
    use crate::product::{DatabaseIndex, LoadedProduct, ProductDatabase};

    struct Fixture {
        loaded: LoadedProduct,
        database: Database,
        input: PolicyInput,
        settings: GlobalSettings,
        invariants: PermanentInvariants,
    }

    fn fixture(input: PolicyInput, edit: impl FnOnce(&mut ProductDatabase)) -> Fixture {
        let mut loaded = LoadedProduct::sample().unwrap();
        edit(&mut loaded.database);
        let database = Database::new(
            Arc::new(loaded.database.clone()),
            DatabaseIndex::from_input(&input),
            input.issue_age,
        )
        .unwrap();
        let settings = GlobalSettings::default();
        let invariants = PermanentInvariants::new(&database, &input, &settings).unwrap();
        Fixture {
            loaded,
            database,
            input,
            settings,
            invariants,
        }
    }

    impl Fixture {
        fn resolver(&self) -> TableResolver<'_> {
            TableResolver::new(
                &self.loaded.product,
                &self.database,
                &self.input,
                &self.loaded.tables,
                &self.settings,
                &self.invariants,
            )
            .unwrap()
        }

        fn mortality(&self) -> Result<MortalityRates> {
            let rounding = RoundingFunctors::new(&self.loaded.product.rounding).unwrap();
            MortalityRates::new(&self.resolver(), &self.database, &self.input, &rounding)
        }
    }

    #[test]
    fn test_band0_coi_rounded_up() {
        let fx = fixture(PolicyInput::default(), |_| {});
        let mortality = fx.mortality().unwrap();
        let round_up = RoundTo::new(8, RoundingStyle::Upward).unwrap();

        let raw = fx.resolver().current_coi_rates_0().unwrap();
        let band0 = mortality.monthly_coi_rates_band0(GenBasis::Current);
        assert_eq!(band0.len(), 55);
        for (rate, r) in band0.iter().zip(&raw) {
            assert_eq!(*rate, round_up.round(*r).unwrap());
        }

        let guaranteed = mortality.monthly_coi_rates_band0(GenBasis::Guaranteed);
        assert!(guaranteed[0] > band0[0]);
        assert!(mortality.monthly_coi_rates_band1(GenBasis::Current)[0] < band0[0]);
    }

    #[test]
    fn test_coi_limited_to_maximum_monthly_rate() {
        let fx = fixture(PolicyInput::default(), |db| {
            db.set(DbKey::CurrCoiMultiplier, 100.0);
        });
        let mortality = fx.mortality().unwrap();
        for &rate in mortality.monthly_coi_rates_band0(GenBasis::Current) {
            assert_eq!(rate, 0.08333334);
        }
        assert!(mortality.monthly_coi_rates_band0(GenBasis::Guaranteed)[0] < 0.01);
    }

    #[test]
    fn test_zero_maximum_coi_rate_rejected() {
        let fx = fixture(PolicyInput::default(), |db| {
            db.set(DbKey::MaxMonthlyCoiRate, 0.0);
        });
        assert!(matches!(fx.mortality(), Err(IllustrationError::Configuration(_))));
    }

    #[test]
    fn test_rider_rates() {
        let fx = fixture(PolicyInput::default(), |_| {});
        let mortality = fx.mortality().unwrap();

        assert_eq!(mortality.adb_rates(), vec![0.00008; 55].as_slice());
        assert_eq!(mortality.child_rider_rates(), vec![0.0005; 55].as_slice());

        let current = mortality.spouse_rider_rates(GenBasis::Current);
        let guaranteed = mortality.spouse_rider_rates(GenBasis::Guaranteed);
        assert_eq!(current.len(), 55);
        assert_eq!(guaranteed.len(), 55);
        assert_relative_eq!(guaranteed[0] / current[0], 1.5 / 0.9, max_relative = 1e-3);
    }
}
