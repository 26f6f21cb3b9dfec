//! Policy input and census loading

mod input;
pub mod loader;

pub use input::{
    effective_dbopt_7702, AvoidMec, DbOption, Dbo7702, DefnLifeIns, DefnMaterialChange, Gender,
    Mode, PolicyInput, Smoking, SubstandardTable, SurviveTo, UnderwritingBasis, UnderwritingClass,
};
pub use loader::{load_census, load_census_from_reader, CensusCell};
