//! Built-in sample universal-life product
//!
//! Rates are synthetic (a Gompertz mortality curve with simple gender,
//! smoking, and band factors) but shaped like a real product, so the engine
//! can run without any product files.

use super::{ActuarialTable, DbKey, FundInfo, InMemoryTables, LoadedProduct, ProductData, ProductDatabase};
use crate::error::Result;
use crate::numeric::{coi_rate_from_q, i_upper_12_over_12_from_i};
use crate::policy::{Gender, Smoking};

const MIN_AGE: i32 = 0;
const MAX_AGE: i32 = 120;

/// Annual base mortality
fn base_q(age: i32) -> f64 {
    (0.0004 + 0.00005 * (0.105 * (age - 20) as f64).exp()).min(1.0)
}

fn gender_factor(gender: Gender) -> f64 {
    match gender {
        Gender::Female => 0.8,
        Gender::Male | Gender::Unisex => 1.0,
    }
}

fn smoking_factor(smoking: Smoking) -> f64 {
    match smoking {
        Smoking::Smoker => 1.8,
        Smoking::Nonsmoker | Smoking::Unismoke => 1.0,
    }
}

/// Monthly COI table scaled from base mortality
fn coi_table(factor: f64) -> ActuarialTable {
    ActuarialTable::from_fn(MIN_AGE, MAX_AGE, |age| coi_rate_from_q((factor * base_q(age)).min(1.0), 1.0 / 12.0))
}

fn flat_table(rate: f64) -> ActuarialTable {
    ActuarialTable::from_fn(MIN_AGE, MAX_AGE, |_| rate)
}

/// Table numbers for the four gender/smoking combinations: FS, FN, MS, MN
const COMBINATIONS: [(Gender, Smoking, i64); 4] = [
    (Gender::Female, Smoking::Smoker, 1),
    (Gender::Female, Smoking::Nonsmoker, 2),
    (Gender::Male, Smoking::Smoker, 3),
    (Gender::Male, Smoking::Nonsmoker, 4),
];

fn sample_tables() -> InMemoryTables {
    let mut tables = InMemoryTables::new();

    // Current COI: three bands, each in four gender/smoking variants.
    for (band, band_factor) in [(0_i64, 1.0), (1, 0.9), (2, 0.8)] {
        for &(gender, smoking, number) in &COMBINATIONS {
            let factor = band_factor * gender_factor(gender) * smoking_factor(smoking);
            tables.insert("sample_curr_coi", 10 * band + number, coi_table(factor));
        }
    }
    for &(gender, smoking, number) in &COMBINATIONS {
        let factor = gender_factor(gender) * smoking_factor(smoking);
        tables.insert("sample_curr_term", number, coi_table(factor));
        tables.insert("sample_guar_term", number, coi_table(1.5 * factor));
    }

    tables
        .insert("sample_guar_coi", 1, coi_table(1.5))
        .insert("sample_wp", 1, flat_table(0.06))
        .insert("sample_adb", 1, flat_table(0.00008))
        .insert("sample_child", 1, flat_table(0.0005))
        .insert("sample_curr_spouse", 1, coi_table(0.9))
        .insert("sample_guar_spouse", 1, coi_table(1.5))
        .insert("sample_group_proxy", 1, ActuarialTable::from_fn(MIN_AGE, MAX_AGE, base_q))
        .insert(
            "sample_7pp",
            1,
            ActuarialTable::from_fn(MIN_AGE, MAX_AGE, |age| (0.012 * (0.04 * (age - 35) as f64).exp()).min(1.0)),
        )
        .insert(
            "sample_tgt_prem",
            1,
            ActuarialTable::from_fn(MIN_AGE, MAX_AGE, |age| (0.01 * (0.04 * (age - 35) as f64).exp()).min(1.0)),
        )
        .insert(
            "sample_7702_q",
            1,
            ActuarialTable::from_fn(MIN_AGE, MAX_AGE, |age| (1.1 * base_q(age)).min(1.0)),
        )
        .insert("sample_partial_mort", 1, ActuarialTable::from_fn(MIN_AGE, MAX_AGE, base_q))
        .insert(
            "sample_partial_mort",
            2,
            ActuarialTable::from_fn(MIN_AGE, MAX_AGE, |age| 0.8 * base_q(age)),
        )
        .insert("sample_substd_mult", 1, flat_table(1.0))
        .insert("sample_cvat_corridor", 1, ActuarialTable::from_fn(MIN_AGE, MAX_AGE, cvat_corridor))
        .insert(
            "sample_7702_nsp",
            1,
            ActuarialTable::from_fn(MIN_AGE, MAX_AGE, |age| 1.0 / cvat_corridor(age)),
        );

    tables
}

fn cvat_corridor(age: i32) -> f64 {
    (12.0 * (-0.03 * age as f64).exp()).max(1.0)
}

fn sample_product_data() -> ProductData {
    let mut product = ProductData::new("sample", "CT");
    for (name, file) in [
        ("CurrCOIFilename", "sample_curr_coi"),
        ("GuarCOIFilename", "sample_guar_coi"),
        ("WPFilename", "sample_wp"),
        ("ADDFilename", "sample_adb"),
        ("ChildRiderFilename", "sample_child"),
        ("CurrSpouseRiderFilename", "sample_curr_spouse"),
        ("GuarSpouseRiderFilename", "sample_guar_spouse"),
        ("CurrTermFilename", "sample_curr_term"),
        ("GuarTermFilename", "sample_guar_term"),
        ("GroupProxyFilename", "sample_group_proxy"),
        ("SevenPayFilename", "sample_7pp"),
        ("TgtPremFilename", "sample_tgt_prem"),
        ("Irc7702QFilename", "sample_7702_q"),
        ("PartialMortalityFilename", "sample_partial_mort"),
        ("SubstdTblMultFilename", "sample_substd_mult"),
        ("CurrSpecAmtLoadFilename", "sample_curr_specamt_load"),
        ("GuarSpecAmtLoadFilename", "sample_guar_specamt_load"),
        ("CvatCorridorFilename", "sample_cvat_corridor"),
        ("Irc7702NspFilename", "sample_7702_nsp"),
    ] {
        product.set_datum(name, file);
    }
    product.funds = vec![
        FundInfo {
            short_name: "money_market".to_string(),
            scalar_imf: 25.0,
        },
        FundInfo {
            short_name: "equity_index".to_string(),
            scalar_imf: 60.0,
        },
        FundInfo {
            short_name: "custom_fund".to_string(),
            scalar_imf: 100.0,
        },
    ];
    product
}

fn sample_database() -> Result<ProductDatabase> {
    use DbKey::*;

    let mut db = ProductDatabase::new("sample");
    for (key, value) in [
        (MinIssAge, 0.0),
        (MaxIssAge, 85.0),
        (MaturityAge, 100.0),
        (StateApproved, 1.0),
        (LedgerType, 0.0),
        (Nonillustrated, 0.0),
        (NoLongerIssued, 0.0),
        (MinIssSpecAmt, 50_000.0),
        (MinRenlSpecAmt, 25_000.0),
        (MaxIncrAge, 85.0),
        (MinPremType, 0.0),
        (TgtPremType, 2.0),
        (TgtPremFixedAtIssue, 1.0),
        (TgtPremMonthlyPolFee, 0.0),
        (CurrCoiTable0Limit, 100_000.0),
        (CurrCoiTable1Limit, 500_000.0),
        (CoiInforceReentry, 0.0),
        (AdbLimit, 1_000_000.0),
        (WpLimit, 1_000_000.0),
        (SpecAmtLoadLimit, 10_000_000.0),
        (MinWd, 100.0),
        (WdFee, 25.0),
        (WdFeeRate, 0.02),
        (WpChargeMethod, 1.0),
        (SurrChgOnDecr, 0.0),
        (UnusualCoiBanding, 0.0),
        (CvatMatChangeDefn, 1.0),
        (Equiv7702Dbo3, 1.0),
        (TermIsQabOrDb7702, 1.0),
        (TermIsQabOrDb7702A, 1.0),
        (MinPremIntSpread, 0.01),
        (AllowTerm, 1.0),
        (AllowWp, 1.0),
        (AllowAdb, 1.0),
        (AllowChildRider, 1.0),
        (AllowSpouseRider, 1.0),
        (AllowSubstdTable, 1.0),
        (AllowSepAcct, 1.0),
        (GuarCoiTable, 1.0),
        (WpTable, 1.0),
        (AdbTable, 1.0),
        (ChildRiderTable, 1.0),
        (SpouseRiderTable, 1.0),
        (SpouseRiderGuarTable, 1.0),
        (GroupProxyRateTable, 1.0),
        (SevenPayTable, 1.0),
        (TgtPremTable, 1.0),
        (Irc7702QTable, 1.0),
        (PartialMortTable, 1.0),
        (SubstdTableMultTable, 0.0),
        (CurrSpecAmtLoadTable, 0.0),
        (GuarSpecAmtLoadTable, 0.0),
        (CorridorTable, 1.0),
        (CurrCoiMultiplier, 1.0),
        (MaxMonthlyCoiRate, 12.0),
        (GuarInt, 0.03),
        (CurrIntSpread, 0.0),
        (AdbIsQab, 1.0),
        (MinimumTieredSpreadFor7702, 0.0),
        (CurrMonthlyPolFee, 8.0),
        (GuarMonthlyPolFee, 12.0),
        (CurrAnnualPolFee, 0.0),
        (GuarAnnualPolFee, 0.0),
        (CurrSpecAmtLoad, 0.00002),
        (GuarSpecAmtLoad, 0.00004),
        (CurrPremLoadTgt, 0.06),
        (CurrPremLoadExc, 0.02),
        (GuarPremLoadTgt, 0.08),
        (GuarPremLoadExc, 0.04),
        (PremTaxLoad, 0.02),
        (MaxPremTaxLoad, 0.035),
    ] {
        db.set(key, value);
    }
    db.set(NaarDiscount, i_upper_12_over_12_from_i(0.03));

    // Table numbers that vary by gender and smoking; the defaults serve unisex
    // and unismoke lives.
    for (key, base) in [(CurrCoiTable, 0_i64), (CurrCoiTable1, 10), (CurrCoiTable2, 20)] {
        db.set(key, (base + 4) as f64);
        for &(gender, smoking, number) in &COMBINATIONS {
            db.set_indexed(key, Some(gender), Some(smoking), None, (base + number) as f64)?;
        }
    }
    for key in [TermTable, GuarTermTable] {
        db.set(key, 4.0);
        for &(gender, smoking, number) in &COMBINATIONS {
            db.set_indexed(key, Some(gender), Some(smoking), None, number as f64)?;
        }
    }
    db.set_indexed(PartialMortTable, Some(Gender::Female), None, None, 2.0)?;

    Ok(db)
}

impl LoadedProduct {
    /// The built-in sample product
    pub fn sample() -> Result<Self> {
        Ok(Self {
            product: sample_product_data(),
            database: sample_database()?,
            tables: sample_tables(),
        })
    }
}
