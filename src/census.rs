//! Census runner for batch illustrations
//!
//! Holds one product, loaded once, and builds an independent engine for each
//! census cell. Only the immutable product data is shared between cells, so
//! cells run in parallel and a cell that fails does not affect the others.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::basic_values::BasicValues;
use crate::config::GlobalSettings;
use crate::error::Result;
use crate::irc7702::MecStatus;
use crate::policy::{CensusCell, Mode, PolicyInput};
use crate::product::{ActuarialTableProvider, LoadedProduct, ProductData, ProductDatabase};

/// Headline values for one cell
#[derive(Debug, Clone, Serialize)]
pub struct CellSummary {
    pub issue_age: i32,
    pub length: usize,
    pub specified_amount: f64,
    pub annual_min_premium: f64,
    pub annual_target_premium: f64,
    pub seven_pay_premium: f64,
    pub glp: f64,
    pub gsp: f64,
    pub corridor_factor: f64,
    /// MEC status if the target premium were paid every year
    pub mec_at_target: MecStatus,
    pub investment_management_fee: f64,
}

/// Outcome of one cell: a summary, or the reason the engine could not be built
#[derive(Debug, Clone, Serialize)]
pub struct CellOutcome {
    pub cell_id: u32,
    pub summary: Option<CellSummary>,
    pub error: Option<String>,
}

impl CellOutcome {
    pub fn is_ok(&self) -> bool {
        self.summary.is_some()
    }
}

/// Pre-loaded product shared by every cell of a census
#[derive(Debug, Clone)]
pub struct CensusRunner {
    product: Arc<ProductData>,
    database: Arc<ProductDatabase>,
    tables: Arc<dyn ActuarialTableProvider>,
    settings: GlobalSettings,
}

impl CensusRunner {
    pub fn new(
        product: Arc<ProductData>,
        database: Arc<ProductDatabase>,
        tables: Arc<dyn ActuarialTableProvider>,
        settings: GlobalSettings,
    ) -> Self {
        Self {
            product,
            database,
            tables,
            settings,
        }
    }

    pub fn from_loaded(loaded: LoadedProduct, settings: GlobalSettings) -> Self {
        Self::new(
            Arc::new(loaded.product),
            Arc::new(loaded.database),
            Arc::new(loaded.tables),
            settings,
        )
    }

    /// Build an engine for one policy
    pub fn engine(&self, input: PolicyInput) -> Result<BasicValues> {
        BasicValues::new(
            Arc::clone(&self.product),
            Arc::clone(&self.database),
            input,
            Arc::clone(&self.tables),
            self.settings.clone(),
        )
    }

    fn summarize(&self, input: &PolicyInput) -> Result<CellSummary> {
        let engine = self.engine(input.clone())?;
        let specamt = engine.input().specified_amount[0];

        let annual_target_premium = engine.annual_target_premium(0, specamt)?;
        let seven_pay_premium = match engine.irc7702a() {
            Some(irc7702a) => irc7702a.seven_pay_premium(specamt)?,
            None => 0.0,
        };
        let mec_at_target = match engine.irc7702a() {
            Some(irc7702a) => irc7702a.test_premiums(specamt, &vec![annual_target_premium; engine.length()])?,
            None => MecStatus::NotTested,
        };

        Ok(CellSummary {
            issue_age: engine.issue_age(),
            length: engine.length(),
            specified_amount: specamt,
            annual_min_premium: engine.modal_min_premium(0, Mode::Annual, specamt)?,
            annual_target_premium,
            seven_pay_premium,
            glp: engine.irc7702().glp(),
            gsp: engine.irc7702().gsp(),
            corridor_factor: engine.corridor_factor().first().copied().unwrap_or(1.0),
            mec_at_target,
            investment_management_fee: engine.investment_management_fee()?,
        })
    }

    /// Run one cell; failures are captured in the outcome
    pub fn run_cell(&self, cell: &CensusCell) -> CellOutcome {
        match self.summarize(&cell.input) {
            Ok(summary) => CellOutcome {
                cell_id: cell.cell_id,
                summary: Some(summary),
                error: None,
            },
            Err(e) => {
                log::warn!("cell {}: {}", cell.cell_id, e);
                CellOutcome {
                    cell_id: cell.cell_id,
                    summary: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Run every cell in parallel, preserving census order
    pub fn run(&self, cells: &[CensusCell]) -> Vec<CellOutcome> {
        cells.par_iter().map(|cell| self.run_cell(cell)).collect()
    }

    pub fn product(&self) -> &ProductData {
        &self.product
    }
}
