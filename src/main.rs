//! Illustration Core CLI
//!
//! Builds the basic values for one policy and prints its premiums, 7702
//! values, and year-by-year rates

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use illustration_core::assumptions::{GenBasis, RatePeriod};
use illustration_core::{BasicValues, GlobalSettings, LoadedProduct, Mode, ModalStrategy, PolicyInput};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "illustration_core")]
#[command(about = "Build basic values for one life-insurance illustration")]
#[command(version)]
struct Cli {
    /// JSON case file holding the policy input; defaults apply to missing fields
    #[arg(long)]
    case: Option<PathBuf>,

    /// Product directory (product.json, database.json, tables.json);
    /// the built-in sample product when omitted
    #[arg(long)]
    product: Option<PathBuf>,

    /// Privileged mode: ignore state approval, honor input material-change definition
    #[arg(long, default_value_t = false)]
    privileged: bool,

    /// Regression-testing mode: ignore state approval
    #[arg(long, default_value_t = false)]
    regression: bool,

    /// Write year-by-year rates to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RateRow {
    #[serde(rename = "Year")]
    year: usize,
    #[serde(rename = "Age")]
    age: i32,
    #[serde(rename = "CurrCoi")]
    current_coi: f64,
    #[serde(rename = "GuarCoi")]
    guaranteed_coi: f64,
    #[serde(rename = "CurrIntMly")]
    current_interest: f64,
    #[serde(rename = "Corridor")]
    corridor: f64,
    #[serde(rename = "SevenPayRate")]
    seven_pay_rate: f64,
    #[serde(rename = "Mly7702qc")]
    mly_7702_qc: f64,
    #[serde(rename = "Mly7702iGlp")]
    mly_7702_i_glp: f64,
    #[serde(rename = "Mly7702iGsp")]
    mly_7702_i_gsp: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Illustration Core v0.1.0");
    println!("========================\n");

    let input: PolicyInput = match &cli.case {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening case file {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("parsing case file {}", path.display()))?
        }
        None => PolicyInput::default(),
    };
    let loaded = match &cli.product {
        Some(path) => LoadedProduct::load_from(path).with_context(|| format!("loading product {}", path.display()))?,
        None => LoadedProduct::sample().context("building sample product")?,
    };
    let settings = GlobalSettings {
        privileged: cli.privileged,
        regression_testing: cli.regression,
        ..Default::default()
    };

    let engine = BasicValues::new(
        loaded.product.into(),
        loaded.database.into(),
        input,
        std::sync::Arc::new(loaded.tables),
        settings,
    )
    .context("initializing basic values")?;

    let specamt = engine.input().specified_amount[0];
    println!("Product: {}", engine.product().product_name);
    println!("  Issue Age: {}", engine.issue_age());
    println!("  Maturity Age: {}", engine.maturity_age());
    println!("  State: {} (domicile {})", engine.state_of_jurisdiction(), engine.state_of_domicile());
    println!("  Specified Amount: ${:.2}", specamt);
    println!("  Definition of Life Insurance: {:?}", engine.invariants().defn_life_ins);
    println!();

    println!("Premiums:");
    for mode in [Mode::Annual, Mode::Monthly] {
        println!(
            "  Minimum ({:?}): ${:.2}",
            mode,
            engine.modal_min_premium(0, mode, specamt)?
        );
    }
    println!("  Target (Annual): ${:.2}", engine.annual_target_premium(0, specamt)?);
    println!(
        "  Seven-pay (Annual): ${:.2}",
        engine.modal_premium(ModalStrategy::SevenPay, 0, Mode::Annual, specamt, specamt)?
    );
    println!(
        "  Corridor (Annual): ${:.2}",
        engine.modal_premium(ModalStrategy::Corridor, 0, Mode::Annual, specamt, specamt)?
    );
    println!();

    println!("Section 7702:");
    println!("  GLP: ${:.2}", engine.irc7702().glp());
    println!("  GSP: ${:.2}", engine.irc7702().gsp());
    println!("  Max survival duration: {:.2}", engine.max_survival_duration());
    println!("  Investment management fee: {:.4}%", 100.0 * engine.investment_management_fee()?);

    if let Some(path) = &cli.output {
        let interest = engine
            .interest()
            .map(|rates| rates.gen_acct_net_rate(GenBasis::Current, RatePeriod::Monthly).to_vec())
            .unwrap_or_else(|| vec![0.0; engine.length()]);
        let mortality = engine.mortality();
        let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
        for year in 0..engine.length() {
            writer.serialize(RateRow {
                year: year + 1,
                age: engine.issue_age() + year as i32,
                current_coi: engine.banded_coi_rates(GenBasis::Current, specamt)[year],
                guaranteed_coi: mortality.monthly_coi_rates_band0(GenBasis::Guaranteed)[year],
                current_interest: interest[year],
                corridor: engine.corridor_factor()[year],
                seven_pay_rate: mortality.seven_pay_rates()[year],
                mly_7702_qc: engine.mly_7702_qc()[year],
                mly_7702_i_glp: engine.mly_7702_i_glp()[year],
                mly_7702_i_gsp: engine.mly_7702_i_gsp()[year],
            })?;
        }
        writer.flush()?;
        println!("\nYear-by-year rates written to: {}", path.display());
    }

    Ok(())
}
