//! Run basic values for every cell of a census CSV
//!
//! Outputs one row per cell with its premiums and 7702 values

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use illustration_core::policy::load_census;
use illustration_core::{CensusRunner, GlobalSettings, LoadedProduct, PolicyInput};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "run_census")]
#[command(about = "Build basic values for every cell of a census")]
struct Cli {
    /// Census CSV, one row per cell
    #[arg(long)]
    census: PathBuf,

    /// JSON case file supplying every field the census does not
    #[arg(long)]
    template: Option<PathBuf>,

    /// Product directory; the built-in sample product when omitted
    #[arg(long)]
    product: Option<PathBuf>,

    /// Regression-testing mode: ignore state approval
    #[arg(long, default_value_t = false)]
    regression: bool,

    #[arg(long, default_value = "census_output.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    #[serde(rename = "CellId")]
    cell_id: u32,
    #[serde(rename = "IssueAge")]
    issue_age: Option<i32>,
    #[serde(rename = "SpecifiedAmount")]
    specified_amount: Option<f64>,
    #[serde(rename = "AnnualMinPremium")]
    annual_min_premium: Option<f64>,
    #[serde(rename = "AnnualTargetPremium")]
    annual_target_premium: Option<f64>,
    #[serde(rename = "SevenPayPremium")]
    seven_pay_premium: Option<f64>,
    #[serde(rename = "GLP")]
    glp: Option<f64>,
    #[serde(rename = "GSP")]
    gsp: Option<f64>,
    #[serde(rename = "Corridor")]
    corridor_factor: Option<f64>,
    #[serde(rename = "MecAtTarget")]
    mec_at_target: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let template: PolicyInput = match &cli.template {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening template {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("parsing template {}", path.display()))?
        }
        None => PolicyInput::default(),
    };

    println!("Loading census from {}...", cli.census.display());
    let cells = load_census(&cli.census, &template).with_context(|| format!("loading {}", cli.census.display()))?;
    println!("Loaded {} cells in {:?}", cells.len(), start.elapsed());

    let loaded = match &cli.product {
        Some(path) => LoadedProduct::load_from(path).with_context(|| format!("loading product {}", path.display()))?,
        None => LoadedProduct::sample().context("building sample product")?,
    };
    let settings = GlobalSettings {
        regression_testing: cli.regression,
        ..Default::default()
    };
    let runner = CensusRunner::from_loaded(loaded, settings);

    println!("Running cells...");
    let run_start = Instant::now();
    let outcomes = runner.run(&cells);
    println!("Cells complete in {:?}", run_start.elapsed());

    let mut writer =
        csv::Writer::from_path(&cli.output).with_context(|| format!("creating {}", cli.output.display()))?;
    for outcome in &outcomes {
        let summary = outcome.summary.as_ref();
        writer.serialize(OutputRow {
            cell_id: outcome.cell_id,
            issue_age: summary.map(|s| s.issue_age),
            specified_amount: summary.map(|s| s.specified_amount),
            annual_min_premium: summary.map(|s| s.annual_min_premium),
            annual_target_premium: summary.map(|s| s.annual_target_premium),
            seven_pay_premium: summary.map(|s| s.seven_pay_premium),
            glp: summary.map(|s| s.glp),
            gsp: summary.map(|s| s.gsp),
            corridor_factor: summary.map(|s| s.corridor_factor),
            mec_at_target: summary.map(|s| format!("{:?}", s.mec_at_target)),
            error: outcome.error.clone(),
        })?;
    }
    writer.flush()?;
    println!("Output written to {}", cli.output.display());

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    let total_target: f64 = outcomes
        .iter()
        .filter_map(|o| o.summary.as_ref())
        .map(|s| s.annual_target_premium)
        .sum();
    println!("\nCensus Summary:");
    println!("  Cells: {}", outcomes.len());
    println!("  Failed: {}", failed);
    println!("  Total annual target premium: ${:.2}", total_target);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
