//! File-based product loader
//!
//! A product directory holds:
//! - `product.json`: [`ProductData`]
//! - `database.json`: [`ProductDatabase`]
//! - `tables.json`: a manifest naming each rate table's file, number, and CSV
//! - one CSV per table, with an `age` column, zero or more select-duration
//!   columns, and a final ultimate column

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::{ActuarialTable, InMemoryTables, ProductData, ProductDatabase};
use crate::error::{IllustrationError, Result};

/// Default path to the product directory
pub const DEFAULT_PRODUCT_PATH: &str = "data/product";

#[derive(Debug, Deserialize)]
struct TableManifestEntry {
    file: String,
    number: i64,
    csv: String,
}

fn parse_field<T: std::str::FromStr>(text: &str, what: &str, path: &Path) -> Result<T> {
    text.trim().parse().map_err(|_| {
        IllustrationError::table(format!("Invalid {} '{}' in {}.", what, text, path.display()))
    })
}

/// Load one rate table from CSV
///
/// Rows must be in ascending, contiguous age order. With `k` select columns,
/// row `age` supplies the select rates for issue age `age` and the ultimate
/// rate for attained age `age`.
pub fn load_rate_table(path: &Path) -> Result<ActuarialTable> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let columns = reader.headers()?.len();
    if columns < 2 {
        return Err(IllustrationError::table(format!(
            "Rate table {} needs an age column and a rate column.",
            path.display()
        )));
    }
    let select_period = columns - 2;

    let mut min_age = None;
    let mut ultimate = Vec::new();
    let mut select = BTreeMap::new();

    for result in reader.records() {
        let record = result?;
        let age: i32 = parse_field(&record[0], "age", path)?;
        let first = *min_age.get_or_insert(age);
        if age != first + ultimate.len() as i32 {
            return Err(IllustrationError::table(format!(
                "Age {} out of sequence in {}.",
                age,
                path.display()
            )));
        }

        if 0 < select_period {
            let row = (1..=select_period)
                .map(|j| parse_field(&record[j], "rate", path))
                .collect::<Result<Vec<f64>>>()?;
            select.insert(age, row);
        }
        ultimate.push(parse_field(&record[columns - 1], "rate", path)?);
    }

    let min_age = min_age.ok_or_else(|| {
        IllustrationError::table(format!("Rate table {} is empty.", path.display()))
    })?;

    Ok(ActuarialTable {
        min_age,
        max_age: min_age + ultimate.len() as i32 - 1,
        select_period,
        select,
        ultimate,
    })
}

/// Load every table listed in a manifest, resolving CSV paths against `dir`
pub fn load_tables(dir: &Path) -> Result<InMemoryTables> {
    let manifest: Vec<TableManifestEntry> =
        serde_json::from_reader(BufReader::new(File::open(dir.join("tables.json"))?))?;

    let mut tables = InMemoryTables::new();
    for entry in manifest {
        let table = load_rate_table(&dir.join(&entry.csv))?;
        log::debug!(
            "loaded table {} #{} (ages {}-{}, select {})",
            entry.file,
            entry.number,
            table.min_age,
            table.max_age,
            table.select_period
        );
        tables.insert(entry.file, entry.number, table);
    }
    Ok(tables)
}

/// Everything needed to build engines for one product
pub struct LoadedProduct {
    pub product: ProductData,
    pub database: ProductDatabase,
    pub tables: InMemoryTables,
}

impl LoadedProduct {
    /// Load the product from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_PRODUCT_PATH))
    }

    /// Load the product from a specific directory
    pub fn load_from(path: &Path) -> Result<Self> {
        let product: ProductData =
            serde_json::from_reader(BufReader::new(File::open(path.join("product.json"))?))?;
        let database: ProductDatabase =
            serde_json::from_reader(BufReader::new(File::open(path.join("database.json"))?))?;
        let tables = load_tables(path)?;
        log::info!(
            "loaded product {} with {} tables from {}",
            product.product_name,
            tables.len(),
            path.display()
        );
        Ok(Self {
            product,
            database,
            tables,
        })
    }
}
