//! Interest and mortality conversions shared by the rate sub-objects

/// One plus the `f64` machine epsilon.
///
/// Multiplied into premiums before a downward-rounding functor so that a value
/// whose exact result is a whole cent is not rounded down a cent because of
/// representation error.
pub const EPSILON_PLUS_ONE: f64 = 1.0 + f64::EPSILON;

/// Monthly-equivalent rate of an annual effective rate: (1+i)^(1/12) - 1
pub fn i_upper_12_over_12_from_i(i: f64) -> f64 {
    (i.ln_1p() / 12.0).exp_m1()
}

/// Annual effective rate of a monthly rate: (1+i)^12 - 1
pub fn i_from_i_upper_12_over_12(i: f64) -> f64 {
    (12.0 * i.ln_1p()).exp_m1()
}

/// Monthly COI rate from an annual mortality rate, limited to `max_coi`
///
/// q_monthly = 1 - (1 - q)^(1/12). Callers validate that `q` lies in [0, 1].
pub fn coi_rate_from_q(q: f64, max_coi: f64) -> f64 {
    if q <= 0.0 {
        0.0
    } else if q >= 1.0 {
        max_coi
    } else {
        let monthly = -((-q).ln_1p() / 12.0).exp_m1();
        monthly.min(max_coi)
    }
}

/// Present value of a level premium paid `periods` times a year in advance,
/// expressed in units of the monthly payment, at monthly discount factor `v`.
///
/// (1 - v^(12/periods)) / (1 - v); reduces to 12/periods when there is no
/// discounting.
pub fn level_annuity_factor(v: f64, periods: f64) -> f64 {
    let n = 12.0 / periods;
    if (1.0 - v).abs() < 1e-15 {
        n
    } else {
        (1.0 - v.powf(n)) / (1.0 - v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_monthly_interest_round_trip() {
        let monthly = i_upper_12_over_12_from_i(0.04);
        assert_relative_eq!(monthly, 1.04_f64.powf(1.0 / 12.0) - 1.0, epsilon = 1e-15);
        assert_relative_eq!(i_from_i_upper_12_over_12(monthly), 0.04, epsilon = 1e-14);
        assert_eq!(i_upper_12_over_12_from_i(0.0), 0.0);
    }

    #[test]
    fn test_coi_rate_from_q() {
        let max = 1.0 / 12.0;
        assert_eq!(coi_rate_from_q(0.0, max), 0.0);
        assert_eq!(coi_rate_from_q(1.0, max), max);
        let q = 0.012;
        assert_relative_eq!(
            coi_rate_from_q(q, max),
            1.0 - (1.0 - q).powf(1.0 / 12.0),
            epsilon = 1e-15
        );
        // Near-certain death is capped at the maximum.
        assert_eq!(coi_rate_from_q(0.999, max), max);
    }

    #[test]
    fn test_level_annuity_factor() {
        assert_eq!(level_annuity_factor(1.0, 1.0), 12.0);
        assert_eq!(level_annuity_factor(0.99, 12.0), 1.0);
        let v: f64 = 1.0 / 1.004;
        let expected: f64 = (0..12).map(|k| v.powi(k)).sum();
        assert_relative_eq!(level_annuity_factor(v, 1.0), expected, epsilon = 1e-12);
    }
}
