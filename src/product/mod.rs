//! Product configuration: database, table file names, rounding rules, and
//! actuarial rate tables

mod database;
pub mod loader;
mod product_data;
mod rounding_rules;
mod sample;
mod tables;

pub use database::{Database, DatabaseIndex, DbCode, DbEntry, DbKey, IndexedValues, ProductDatabase};
pub use loader::LoadedProduct;
pub use product_data::{FundInfo, ProductData};
pub use rounding_rules::{RoundingParameters, RoundingRules};
pub use tables::{ActuarialTable, ActuarialTableProvider, InMemoryTables, ReentryMethod};
