//! End-to-end tests of the Basic Values engine against the sample product

use std::sync::Arc;

use approx::assert_relative_eq;
use illustration_core::assumptions::{GenBasis, RatePeriod};
use chrono::Duration;
use illustration_core::basic_values::{DeductionPortion, GptServerInput, LedgerType};
use illustration_core::irc7702::MecStatus;
use illustration_core::numeric::{i_upper_12_over_12_from_i, EPSILON_PLUS_ONE};
use illustration_core::policy::{
    DefnLifeIns, Dbo7702, Gender, Smoking, SubstandardTable, SurviveTo, UnderwritingBasis, UnderwritingClass,
};
use illustration_core::product::DbKey;
use illustration_core::{
    BasicValues, GlobalSettings, IllustrationError, LoadedProduct, Mode, ModalStrategy, PolicyInput, ProductDatabase,
};

fn engine_with(edit: impl FnOnce(&mut ProductDatabase), input: PolicyInput) -> Result<BasicValues, IllustrationError> {
    engine_in_mode(edit, input, GlobalSettings::default())
}

fn engine_in_mode(
    edit: impl FnOnce(&mut ProductDatabase),
    input: PolicyInput,
    settings: GlobalSettings,
) -> Result<BasicValues, IllustrationError> {
    let mut loaded = LoadedProduct::sample().unwrap();
    edit(&mut loaded.database);
    BasicValues::new(
        Arc::new(loaded.product),
        Arc::new(loaded.database),
        input,
        Arc::new(loaded.tables),
        settings,
    )
}

fn engine(input: PolicyInput) -> BasicValues {
    engine_with(|_| {}, input).unwrap()
}

#[test]
fn test_issue_age_above_maximum() {
    let input = PolicyInput {
        issue_age: 99,
        ..Default::default()
    };
    let result = engine_with(
        |db| {
            db.set(DbKey::MinIssAge, 0.0)
                .set(DbKey::MaxIssAge, 90.0)
                .set(DbKey::MaturityAge, 100.0);
        },
        input,
    );
    match result {
        Err(IllustrationError::Validation(message)) => assert!(message.contains("greater than maximum"), "{}", message),
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_issue_age_below_minimum() {
    let input = PolicyInput {
        issue_age: 10,
        ..Default::default()
    };
    let result = engine_with(|db| { db.set(DbKey::MinIssAge, 18.0); }, input);
    assert!(matches!(result, Err(IllustrationError::Validation(m)) if m.contains("less than minimum")));
}

#[test]
fn test_contract_length_and_resized_input() {
    let bv = engine(PolicyInput {
        specified_amount: vec![500_000.0, 400_000.0],
        ..Default::default()
    });
    assert_eq!(bv.length(), 55);
    assert_eq!(bv.maturity_age(), 100);
    assert_eq!(bv.input().specified_amount.len(), 55);
    assert_eq!(bv.input().specified_amount[54], 400_000.0);
    assert_eq!(bv.mortality().monthly_coi_rates_band0(GenBasis::Current).len(), 55);
}

#[test]
fn test_unapproved_state() {
    let result = engine_with(|db| { db.set(DbKey::StateApproved, 0.0); }, PolicyInput::default());
    assert!(matches!(result, Err(IllustrationError::Validation(m)) if m.contains("not approved")));

    let regression = engine_in_mode(
        |db| {
            db.set(DbKey::StateApproved, 0.0);
        },
        PolicyInput::default(),
        GlobalSettings::regression(),
    );
    assert!(regression.is_ok());
}

#[test]
fn test_unusual_banding_selects_band_by_specamt() {
    let bv = engine_with(|db| { db.set(DbKey::UnusualCoiBanding, 1.0); }, PolicyInput::default()).unwrap();
    let mortality = bv.mortality();

    assert_eq!(
        bv.banded_coi_rates(GenBasis::Current, 250_000.0),
        mortality.monthly_coi_rates_band1(GenBasis::Current)
    );
    assert_eq!(
        bv.banded_coi_rates(GenBasis::Current, 50_000.0),
        mortality.monthly_coi_rates_band0(GenBasis::Current)
    );
    assert_eq!(
        bv.banded_coi_rates(GenBasis::Current, 500_000.0),
        mortality.monthly_coi_rates_band2(GenBasis::Current)
    );
    assert_eq!(
        bv.banded_coi_rates(GenBasis::Guaranteed, 250_000.0),
        mortality.monthly_coi_rates_band0(GenBasis::Guaranteed)
    );
}

#[test]
fn test_ordinary_banding_uses_band_zero() {
    let bv = engine(PolicyInput::default());
    assert_eq!(
        bv.banded_coi_rates(GenBasis::Current, 250_000.0),
        bv.mortality().monthly_coi_rates_band0(GenBasis::Current)
    );
}

#[test]
fn test_coi_rates_rounded_and_capped() {
    let bv = engine(PolicyInput {
        issue_age: 80,
        ..Default::default()
    });
    for &rate in bv.mortality().monthly_coi_rates_band0(GenBasis::Guaranteed) {
        assert!(rate <= 1.0 / 12.0 + 1e-8);
        assert_relative_eq!(rate * 1e8, (rate * 1e8).round(), epsilon = 1e-4);
    }
}

#[test]
fn test_substandard_table_raises_coi() {
    let standard = engine(PolicyInput::default());
    let rated = engine(PolicyInput {
        underwriting_class: UnderwritingClass::Rated,
        substandard_table: SubstandardTable::B,
        ..Default::default()
    });
    let s = standard.mortality().monthly_coi_rates_band0(GenBasis::Current)[0];
    let r = rated.mortality().monthly_coi_rates_band0(GenBasis::Current)[0];
    assert_relative_eq!(r, 1.5 * s, epsilon = 3e-8);
}

#[test]
fn test_substandard_table_requires_rated_class() {
    let result = engine_with(
        |_| {},
        PolicyInput {
            substandard_table: SubstandardTable::C,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(IllustrationError::Validation(_))));
}

#[test]
fn test_target_table_round_trip() {
    let bv = engine(PolicyInput::default());
    let premium = bv
        .modal_premium(ModalStrategy::TargetTable, 0, Mode::Annual, 100_000.0, 100_000.0)
        .unwrap();
    let rate = bv.mortality().target_premium_rates()[0];
    assert!(premium <= 100_000.0 * rate + 1e-9);
    assert!(premium > 100_000.0 * rate - 0.01);
    assert_eq!(bv.modal_specamt(ModalStrategy::TargetTable, premium, 0).unwrap(), 100_000.0);

    let monthly = bv
        .modal_premium(ModalStrategy::TargetTable, 0, Mode::Monthly, 100_000.0, 100_000.0)
        .unwrap();
    assert!((12.0 * monthly - premium).abs() < 0.12);
}

#[test]
fn test_monthly_deduction_has_no_specamt_form() {
    let bv = engine(PolicyInput::default());
    assert!(matches!(
        bv.modal_specamt(ModalStrategy::MonthlyDeduction, 10_000.0, 0),
        Err(IllustrationError::UnsupportedOperation(_))
    ));
    assert!(matches!(
        bv.modal_premium(ModalStrategy::Salary, 0, Mode::Annual, 100_000.0, 100_000.0),
        Err(IllustrationError::UnsupportedOperation(_))
    ));
}

#[test]
fn test_monthly_deduction_premium_arithmetic() {
    let bv = engine(PolicyInput::default());
    let specamt = 1_000_000.0;
    let coi = bv.mortality().monthly_coi_rates_band0(GenBasis::Current)[0];
    let discount = bv.invariants().db_discount_rate[0];
    let loads = bv.loads();

    let charges = specamt * coi * discount
        + loads.specified_amount_load(GenBasis::Current)[0] * specamt
        + loads.monthly_policy_fee(GenBasis::Current)[0];
    let grossed_up = charges / (1.0 - loads.target_premium_load_maximum_premium_tax()[0]);

    // Monthly: no spread, so the annuity factor is one.
    let monthly = bv
        .monthly_deduction_premium(DeductionPortion::Full, 0, Mode::Monthly, specamt)
        .unwrap();
    assert!(monthly >= grossed_up - 1e-9 && monthly < grossed_up + 0.01, "{} vs {}", monthly, grossed_up);

    // Annual: discounted at the credited rate less the spread, floored at
    // the guaranteed rate.
    let u = 1.0 / (1.0 + i_upper_12_over_12_from_i(0.03));
    let factor = (1.0 - u.powi(12)) / (1.0 - u);
    let annual = bv
        .monthly_deduction_premium(DeductionPortion::Full, 0, Mode::Annual, specamt)
        .unwrap();
    assert_relative_eq!(annual, grossed_up * factor, epsilon = 0.011);
    assert_eq!(annual, bv.modal_min_premium(0, Mode::Annual, specamt).unwrap());
}

#[test]
fn test_employee_and_employer_portions() {
    let bv = engine(PolicyInput {
        child_rider: true,
        child_rider_amount: 10_000.0,
        ..Default::default()
    });
    let specamt = 500_000.0;
    let deduction = |portion| {
        bv.monthly_deduction_premium(portion, 0, Mode::Monthly, specamt)
            .unwrap()
    };
    let full = deduction(DeductionPortion::Full);
    let employee = deduction(DeductionPortion::Employee);
    let employer = deduction(DeductionPortion::Employer);

    let load = 1.0 - bv.loads().target_premium_load_maximum_premium_tax()[0];
    let discount = bv.invariants().db_discount_rate[0];
    let child = bv.mortality().child_rider_rates()[0] * 10_000.0;

    // The employee pays term rates on the specified amount, whether or not
    // a term rider is elected, plus the child rider.
    let term = specamt * discount * bv.mortality().term_rates(GenBasis::Current)[0];
    let expected = (term + child) / load;
    assert!(employee >= expected - 1e-9 && employee < expected + 0.01, "{} vs {}", employee, expected);

    // The employer pays everything else; monthly, both annuity factors are one.
    let without_child = engine(PolicyInput::default())
        .monthly_deduction_premium(DeductionPortion::Full, 0, Mode::Monthly, specamt)
        .unwrap();
    assert_eq!(employer, without_child);
    assert!(full > employer);
    assert_relative_eq!(full - employer, child / load, epsilon = 0.02);
}

#[test]
fn test_guideline_premiums() {
    let bv = engine(PolicyInput::default());
    let irc7702 = bv.irc7702();
    assert!(irc7702.glp() > 0.0);
    assert!(irc7702.glp() < irc7702.gsp());

    let glp = bv
        .modal_premium(ModalStrategy::Glp, 0, Mode::Annual, 1_000_000.0, 1_000_000.0)
        .unwrap();
    assert_eq!(glp, irc7702.glp());

    let specamt = bv.modal_specamt(ModalStrategy::Glp, glp, 0).unwrap();
    assert!((specamt - 1_000_000.0).abs() <= 2.0, "{}", specamt);

    let gsp = bv
        .modal_premium(ModalStrategy::Gsp, 0, Mode::Annual, 1_000_000.0, 1_000_000.0)
        .unwrap();
    let specamt = bv.modal_specamt(ModalStrategy::Gsp, gsp, 0).unwrap();
    assert!((specamt - 1_000_000.0).abs() <= 2.0, "{}", specamt);
}

#[test]
fn test_guideline_premiums_only_at_issue() {
    let bv = engine(PolicyInput::default());
    assert!(matches!(
        bv.modal_premium(ModalStrategy::Glp, 3, Mode::Annual, 1_000_000.0, 1_000_000.0),
        Err(IllustrationError::Validation(_))
    ));
    assert!(matches!(
        bv.modal_specamt(ModalStrategy::Gsp, 50_000.0, 1),
        Err(IllustrationError::Validation(_))
    ));
}

#[test]
fn test_7702_interest_floors() {
    let bv = engine(PolicyInput::default());
    assert_relative_eq!(bv.mly_7702_i_glp()[0], i_upper_12_over_12_from_i(0.04), epsilon = 1e-15);
    assert_relative_eq!(bv.mly_7702_i_gsp()[0], i_upper_12_over_12_from_i(0.06), epsilon = 1e-15);
    assert_eq!(bv.spread_for_7702()[0], 0.0);

    let high = engine_with(|db| { db.set(DbKey::GuarInt, 0.07); }, PolicyInput::default()).unwrap();
    assert_relative_eq!(high.mly_7702_i_glp()[0], i_upper_12_over_12_from_i(0.07), epsilon = 1e-15);
    assert_relative_eq!(high.mly_7702_i_gsp()[0], i_upper_12_over_12_from_i(0.07), epsilon = 1e-15);

    let spread = engine_with(|db| { db.set(DbKey::MinimumTieredSpreadFor7702, 0.005); }, PolicyInput::default()).unwrap();
    assert_relative_eq!(spread.mly_7702_i_glp()[0], i_upper_12_over_12_from_i(0.035), epsilon = 1e-15);
}

#[test]
fn test_7702_mortality_rates() {
    let bv = engine(PolicyInput::default());
    for (qc, dcv) in bv.mly_7702_qc().iter().zip(bv.mly_dcv_qc()) {
        assert!(*qc <= 1.0 / 12.0);
        assert!(dcv >= qc);
        assert!(dcv - qc < 1e-8);
    }
}

#[test]
fn test_corridor_by_definition_of_life_insurance() {
    let gpt = engine(PolicyInput::default());
    assert_eq!(gpt.corridor_factor()[0], 2.15);
    assert_eq!(gpt.corridor_factor()[54], 1.00);

    let premium = gpt
        .modal_premium(ModalStrategy::Corridor, 0, Mode::Annual, 1_000_000.0, 1_000_000.0)
        .unwrap();
    assert_eq!(premium, 465_116.27);
    assert_eq!(gpt.modal_specamt(ModalStrategy::Corridor, premium, 0).unwrap(), 1_000_000.0);

    let cvat = engine(PolicyInput {
        definition_of_life_insurance: DefnLifeIns::Cvat,
        ..Default::default()
    });
    assert_eq!(cvat.corridor_factor()[0], 3.11);

    let noncompliant = engine(PolicyInput {
        definition_of_life_insurance: DefnLifeIns::Noncompliant,
        ..Default::default()
    });
    assert!(noncompliant.corridor_factor().iter().all(|&f| 1.0 == f));
}

#[test]
fn test_seven_pay_and_mec() {
    let bv = engine(PolicyInput::default());
    let specamt = 1_000_000.0;
    let irc7702a = bv.irc7702a().unwrap();
    let seven_pay = irc7702a.seven_pay_premium(specamt).unwrap();
    assert_eq!(
        seven_pay,
        bv.modal_premium(ModalStrategy::SevenPay, 0, Mode::Annual, specamt, specamt).unwrap()
    );

    let level = seven_pay - 0.01;
    assert_eq!(irc7702a.test_premiums(specamt, &[level; 10]).unwrap(), MecStatus::NonMec);
    let mut excessive = vec![level; 10];
    excessive[4] += 1.0;
    assert_eq!(irc7702a.test_premiums(specamt, &excessive).unwrap(), MecStatus::Mec { year: 4 });

    let noncompliant = engine(PolicyInput {
        definition_of_life_insurance: DefnLifeIns::Noncompliant,
        ..Default::default()
    });
    assert_eq!(
        noncompliant.irc7702a().unwrap().test_premiums(specamt, &[1e9]).unwrap(),
        MecStatus::NotTested
    );
}

#[test]
fn test_salary_strategy() {
    let input = PolicyInput {
        projected_salary: vec![100_000.0],
        salary_specamt_factor: 5.0,
        salary_specamt_cap: 400_000.0,
        salary_specamt_offset: 50_000.0,
        ..Default::default()
    };
    let bv = engine(input.clone());
    assert_eq!(bv.modal_specamt(ModalStrategy::Salary, 0.0, 0).unwrap(), 350_000.0);
    assert_eq!(bv.modal_specamt(ModalStrategy::Salary, 0.0, 20).unwrap(), 350_000.0);

    let uncapped = engine(PolicyInput {
        salary_specamt_cap: 0.0,
        ..input.clone()
    });
    assert_eq!(uncapped.modal_specamt(ModalStrategy::Salary, 0.0, 0).unwrap(), 450_000.0);

    let offset_exceeds = engine(PolicyInput {
        salary_specamt_offset: 1_000_000.0,
        ..input
    });
    assert_eq!(offset_exceeds.modal_specamt(ModalStrategy::Salary, 0.0, 0).unwrap(), 0.0);
}

#[test]
fn test_max_survival_duration() {
    let bv = engine(PolicyInput::default());
    assert_eq!(bv.max_survival_duration(), 100.0);

    let to_age = engine(PolicyInput {
        survive_to_type: SurviveTo::Age,
        survive_to_age: 85,
        ..Default::default()
    });
    assert_eq!(to_age.max_survival_duration(), 40.0);

    let to_year = engine(PolicyInput {
        survive_to_type: SurviveTo::Year,
        survive_to_year: 80,
        ..Default::default()
    });
    assert_eq!(to_year.max_survival_duration(), 80.0);

    let expectancy = engine(PolicyInput {
        survive_to_type: SurviveTo::Expectancy,
        ..Default::default()
    });
    let e = expectancy.max_survival_duration();
    assert!(e > 20.0 && e < 55.0, "{}", e);
}

#[test]
fn test_survival_beyond_endowment_age_rejected() {
    let result = engine_with(
        |_| {},
        PolicyInput {
            survive_to_type: SurviveTo::Year,
            survive_to_year: 120,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(IllustrationError::Configuration(m)) if m.contains("exceeds endowment age")));
}

#[test]
fn test_investment_management_fee() {
    let average = engine(PolicyInput::default());
    assert_relative_eq!(average.investment_management_fee().unwrap(), 0.00425, epsilon = 1e-12);

    let overridden = engine(PolicyInput {
        override_fund_management_fee: true,
        input_fund_management_fee: 80.0,
        ..Default::default()
    });
    assert_relative_eq!(overridden.investment_management_fee().unwrap(), 0.008, epsilon = 1e-12);

    let weighted = engine(PolicyInput {
        general_account_allocation: 0.5,
        fund_allocations: vec![0.25, 0.25, 0.5],
        ..Default::default()
    });
    assert_relative_eq!(weighted.investment_management_fee().unwrap(), 0.007125, epsilon = 1e-12);

    let no_sepacct = engine_with(|db| { db.set(DbKey::AllowSepAcct, 0.0); }, PolicyInput::default()).unwrap();
    assert_eq!(no_sepacct.investment_management_fee().unwrap(), 0.0);
}

#[test]
fn test_interest_and_loads_bound_to_policy() {
    let bv = engine(PolicyInput {
        general_account_rate: vec![0.05, 0.045, 0.02],
        ..Default::default()
    });
    let interest = bv.interest().unwrap();
    let annual = interest.gen_acct_net_rate(GenBasis::Current, RatePeriod::Annual);
    assert_eq!(annual.len(), 55);
    assert_relative_eq!(annual[0], 0.05, epsilon = 1e-15);
    assert_relative_eq!(annual[2], 0.03, epsilon = 1e-15);
    assert_relative_eq!(annual[54], 0.03, epsilon = 1e-15);
}

#[test]
fn test_gpt_server_reduced_chain() {
    let loaded = LoadedProduct::sample().unwrap();
    let product = Arc::new(loaded.product);
    let database = Arc::new(loaded.database);
    let tables: Arc<dyn illustration_core::product::ActuarialTableProvider> = Arc::new(loaded.tables);

    let mut gpt = GptServerInput {
        product_name: "sample".to_string(),
        gender: Gender::Female,
        underwriting_class: UnderwritingClass::Preferred,
        smoking: Smoking::Nonsmoker,
        issue_age: 40,
        underwriting_basis: UnderwritingBasis::Medical,
        state_of_jurisdiction: "NY".to_string(),
        specified_amount: 500_000.0,
        dbo_7702: Dbo7702::Option2,
        adb_in_force: true,
        target_premium: 5_000.0,
    };
    let bv = BasicValues::gpt_server(
        Arc::clone(&product),
        Arc::clone(&database),
        Arc::clone(&tables),
        GlobalSettings::default(),
        &gpt,
    )
    .unwrap();
    assert_eq!(bv.invariants().defn_life_ins, DefnLifeIns::Gpt);
    assert!(bv.interest().is_none());
    assert!(bv.irc7702a().is_none());
    assert_eq!(bv.irc7702().dbo(), Dbo7702::Option2);
    assert!(bv.irc7702().glp() > 0.0);

    gpt.issue_age = 95;
    assert!(matches!(
        BasicValues::gpt_server(product, database, tables, GlobalSettings::default(), &gpt),
        Err(IllustrationError::Validation(_))
    ));
}

#[test]
fn test_product_flags() {
    let bv = engine(PolicyInput::default());
    assert_eq!(bv.state_of_jurisdiction(), "CT");
    assert_eq!(bv.state_of_domicile(), "CT");
    assert!(!bv.nonillustrated());
    assert!(!bv.no_can_issue());
    assert!(bv.subject_to_illustration_reg());

    let variable = engine_with(|db| { db.set(DbKey::LedgerType, 1.0); }, PolicyInput::default()).unwrap();
    assert_eq!(variable.ledger_type(), LedgerType::VariableUniversalLife);
    assert!(!variable.subject_to_illustration_reg());
}

#[test]
fn test_no_can_issue_only_for_new_business() {
    let withdrawn = |db: &mut ProductDatabase| {
        db.set(DbKey::NoLongerIssued, 1.0);
    };
    let new_business = engine_with(withdrawn, PolicyInput::default()).unwrap();
    assert!(new_business.no_can_issue());

    let effective_date = PolicyInput::default().effective_date;
    let inforce = engine_with(
        withdrawn,
        PolicyInput {
            inforce_as_of_date: effective_date + Duration::days(730),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!inforce.no_can_issue());
}

#[test]
fn test_target_premium_round_trip_for_any_specamt() {
    // The target is fixed at issue in the sample product.
    let bv = engine(PolicyInput::default());
    assert!(bv.invariants().tgt_prem_fixed_at_issue);

    let premium = bv.annual_target_premium(0, 250_000.0).unwrap();
    assert!(premium < bv.annual_target_premium(0, 1_000_000.0).unwrap());
    assert_eq!(bv.modal_specamt_target(premium).unwrap(), 250_000.0);
    assert_eq!(bv.annual_target_premium(5, 250_000.0).unwrap(), premium);
}

#[test]
fn test_guideline_modal_premiums_round_after_epsilon() {
    let bv = engine(PolicyInput::default());
    let round = bv.rounding().max_premium;
    let specamt = 1_000_000.0;

    let glp = bv.irc7702().calculate_glp(0, specamt, specamt, Dbo7702::Option1).unwrap();
    let modal = bv
        .modal_premium(ModalStrategy::Glp, 0, Mode::Monthly, specamt, specamt)
        .unwrap();
    assert_eq!(modal, round.round(EPSILON_PLUS_ONE * glp / 12.0).unwrap());
    assert!(modal >= round.round(glp / 12.0).unwrap());

    let gsp = bv.irc7702().calculate_gsp(0, specamt, specamt).unwrap();
    let modal = bv
        .modal_premium(ModalStrategy::Gsp, 0, Mode::Quarterly, specamt, specamt)
        .unwrap();
    assert_eq!(modal, round.round(EPSILON_PLUS_ONE * gsp / 4.0).unwrap());
}

#[test]
fn test_deduction_annuity_uses_input_crediting_rate() {
    // A current spread lowers the credited rate to 4%, but the annuity
    // discounts at the input 5% less the 1% minimum-premium spread.
    let bv = engine_with(
        |db| {
            db.set(DbKey::CurrIntSpread, 0.01);
        },
        PolicyInput {
            general_account_rate: vec![0.05],
            ..Default::default()
        },
    )
    .unwrap();
    let credited = bv.interest().unwrap().gen_acct_net_rate(GenBasis::Current, RatePeriod::Annual)[0];
    assert_relative_eq!(credited, 0.04, epsilon = 1e-15);

    let specamt = 1_000_000.0;
    let monthly = bv
        .monthly_deduction_premium(DeductionPortion::Full, 0, Mode::Monthly, specamt)
        .unwrap();
    let u = 1.0 / (1.0 + i_upper_12_over_12_from_i(0.04));
    let factor = (1.0 - u.powi(12)) / (1.0 - u);
    let annual = bv
        .monthly_deduction_premium(DeductionPortion::Full, 0, Mode::Annual, specamt)
        .unwrap();
    assert_relative_eq!(annual, monthly * factor, epsilon = 0.2);

    let u_double_spread = 1.0 / (1.0 + i_upper_12_over_12_from_i(0.03));
    let factor_double_spread = (1.0 - u_double_spread.powi(12)) / (1.0 - u_double_spread);
    assert!(annual < monthly * factor_double_spread - 0.2);
}

#[test]
fn test_term_amount_included_in_7702_benefit() {
    let specamt = 1_000_000.0;
    let bv = engine(PolicyInput {
        term_rider_amount: 250_000.0,
        ..Default::default()
    });
    let expected = bv
        .irc7702()
        .calculate_glp(0, specamt + 250_000.0, specamt, Dbo7702::Option1)
        .unwrap();
    assert_eq!(bv.irc7702().glp(), expected);
    assert!(bv.irc7702().glp() > engine(PolicyInput::default()).irc7702().glp());
}
