//! Load census cells from CSV
//!
//! Each row overrides a handful of fields of a template `PolicyInput`; every
//! other field comes from the template (normally the case file).

use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{DbOption, DefnLifeIns, Gender, PolicyInput, Smoking, UnderwritingClass};
use crate::error::Result;

/// Raw CSV row matching census.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "CellId")]
    cell_id: u32,
    #[serde(rename = "IssueAge")]
    issue_age: i32,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "Smoking")]
    smoking: String,
    #[serde(rename = "UnderwritingClass")]
    underwriting_class: String,
    #[serde(rename = "SpecifiedAmount")]
    specified_amount: f64,
    #[serde(rename = "DeathBenefitOption")]
    death_benefit_option: String,
    #[serde(rename = "DefinitionOfLifeInsurance")]
    definition_of_life_insurance: String,
    #[serde(rename = "StateOfJurisdiction")]
    state_of_jurisdiction: String,
}

/// One life in a census, with its complete input
#[derive(Debug, Clone)]
pub struct CensusCell {
    pub cell_id: u32,
    pub input: PolicyInput,
}

impl CsvRow {
    fn into_cell(self, template: &PolicyInput) -> Result<CensusCell> {
        let input = PolicyInput {
            issue_age: self.issue_age,
            gender: self.gender.parse::<Gender>()?,
            smoking: self.smoking.parse::<Smoking>()?,
            underwriting_class: self.underwriting_class.parse::<UnderwritingClass>()?,
            specified_amount: vec![self.specified_amount],
            death_benefit_option: vec![self.death_benefit_option.parse::<DbOption>()?],
            definition_of_life_insurance: self.definition_of_life_insurance.parse::<DefnLifeIns>()?,
            premium_tax_state: self.state_of_jurisdiction.clone(),
            state_of_jurisdiction: self.state_of_jurisdiction,
            ..template.clone()
        };

        Ok(CensusCell {
            cell_id: self.cell_id,
            input,
        })
    }
}

/// Load all census cells from a CSV file
pub fn load_census<P: AsRef<Path>>(path: P, template: &PolicyInput) -> Result<Vec<CensusCell>> {
    let reader = Reader::from_path(path)?;
    read_cells(reader, template)
}

/// Load census cells from any reader (e.g., string buffer)
pub fn load_census_from_reader<R: Read>(reader: R, template: &PolicyInput) -> Result<Vec<CensusCell>> {
    read_cells(Reader::from_reader(reader), template)
}

fn read_cells<R: Read>(mut reader: Reader<R>, template: &PolicyInput) -> Result<Vec<CensusCell>> {
    let mut cells = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        cells.push(row.into_cell(template)?);
    }

    log::debug!("loaded {} census cells", cells.len());
    Ok(cells)
}
