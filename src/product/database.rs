//! Product database: keyed scalar and vector parameters
//!
//! Every entry is a duration-indexed vector; a scalar is a vector of one.
//! An entry may carry overrides that apply only to particular genders,
//! smoking statuses, or underwriting classes. Queries resolve overrides
//! against a `DatabaseIndex` and pad vectors with their last value to the
//! contract length.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IllustrationError, Result};
use crate::numeric::{stinted_cast, Stintable};
use crate::policy::{Gender, PolicyInput, Smoking, UnderwritingClass};

/// Database keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DbKey {
    // Issue rules and contract structure
    MinIssAge,
    MaxIssAge,
    MaturityAge,
    StateApproved,
    LedgerType,
    Nonillustrated,
    NoLongerIssued,

    // Permanent invariants
    MinIssSpecAmt,
    MinRenlSpecAmt,
    MaxIncrAge,
    MinPremType,
    TgtPremType,
    TgtPremFixedAtIssue,
    TgtPremMonthlyPolFee,
    CurrCoiTable0Limit,
    CurrCoiTable1Limit,
    CoiInforceReentry,
    AdbLimit,
    WpLimit,
    SpecAmtLoadLimit,
    MinWd,
    WdFee,
    WdFeeRate,
    WpChargeMethod,
    SurrChgOnDecr,
    NaarDiscount,
    UnusualCoiBanding,
    CvatMatChangeDefn,
    Equiv7702Dbo3,
    TermIsQabOrDb7702,
    TermIsQabOrDb7702A,
    MinPremIntSpread,

    // Rider and fund availability
    AllowTerm,
    AllowWp,
    AllowAdb,
    AllowChildRider,
    AllowSpouseRider,
    AllowSubstdTable,
    AllowSepAcct,

    // Table numbers
    CurrCoiTable,
    CurrCoiTable1,
    CurrCoiTable2,
    GuarCoiTable,
    WpTable,
    AdbTable,
    ChildRiderTable,
    SpouseRiderTable,
    SpouseRiderGuarTable,
    TermTable,
    GuarTermTable,
    GroupProxyRateTable,
    SevenPayTable,
    TgtPremTable,
    Irc7702QTable,
    PartialMortTable,
    SubstdTableMultTable,
    CurrSpecAmtLoadTable,
    GuarSpecAmtLoadTable,
    CorridorTable,

    // Mortality and interest
    CurrCoiMultiplier,
    MaxMonthlyCoiRate,
    GuarInt,
    CurrIntSpread,
    AdbIsQab,
    MinimumTieredSpreadFor7702,

    // Loads and fees
    CurrMonthlyPolFee,
    GuarMonthlyPolFee,
    CurrAnnualPolFee,
    GuarAnnualPolFee,
    CurrSpecAmtLoad,
    GuarSpecAmtLoad,
    CurrPremLoadTgt,
    CurrPremLoadExc,
    GuarPremLoadTgt,
    GuarPremLoadExc,
    PremTaxLoad,
    MaxPremTaxLoad,
}

/// Axes along which an entry may vary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseIndex {
    pub gender: Gender,
    pub smoking: Smoking,
    pub class: UnderwritingClass,
}

impl DatabaseIndex {
    pub fn from_input(input: &PolicyInput) -> Self {
        Self {
            gender: input.gender,
            smoking: input.smoking,
            class: input.underwriting_class,
        }
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn smoking(mut self, smoking: Smoking) -> Self {
        self.smoking = smoking;
        self
    }
}

/// Values applying only where every specified axis matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedValues {
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub smoking: Option<Smoking>,
    #[serde(default)]
    pub class: Option<UnderwritingClass>,
    pub values: Vec<f64>,
}

impl IndexedValues {
    fn matches(&self, index: &DatabaseIndex) -> bool {
        self.gender.map_or(true, |g| g == index.gender)
            && self.smoking.map_or(true, |s| s == index.smoking)
            && self.class.map_or(true, |c| c == index.class)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbEntry {
    pub values: Vec<f64>,
    #[serde(default)]
    pub by_index: Vec<IndexedValues>,
}

impl DbEntry {
    /// First matching override, else the default values
    fn resolve(&self, index: &DatabaseIndex) -> &[f64] {
        self.by_index
            .iter()
            .find(|v| v.matches(index))
            .map_or(self.values.as_slice(), |v| v.values.as_slice())
    }
}

/// Integer codes stored in the database that name an enumerator
pub trait DbCode: TryFrom<i32, Error = IllustrationError> {}

impl<T: TryFrom<i32, Error = IllustrationError>> DbCode for T {}

/// All parameters of one product, shared read-only across engines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductDatabase {
    pub product_name: String,
    entries: HashMap<DbKey, DbEntry>,
}

impl ProductDatabase {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            entries: HashMap::new(),
        }
    }

    /// Set a scalar entry
    pub fn set(&mut self, key: DbKey, value: f64) -> &mut Self {
        self.set_vec(key, vec![value])
    }

    /// Set a duration-varying entry
    pub fn set_vec(&mut self, key: DbKey, values: Vec<f64>) -> &mut Self {
        self.entries.insert(key, DbEntry { values, by_index: Vec::new() });
        self
    }

    /// Add an override for the given axes; the key must already have default values
    pub fn set_indexed(
        &mut self,
        key: DbKey,
        gender: Option<Gender>,
        smoking: Option<Smoking>,
        class: Option<UnderwritingClass>,
        value: f64,
    ) -> Result<&mut Self> {
        let product_name = self.product_name.clone();
        let entry = self.entries.get_mut(&key).ok_or_else(|| {
            IllustrationError::configuration(format!(
                "Cannot index {:?} before it is set in product {}.",
                key, product_name
            ))
        })?;
        entry.by_index.push(IndexedValues {
            gender,
            smoking,
            class,
            values: vec![value],
        });
        Ok(self)
    }

    pub fn contains(&self, key: DbKey) -> bool {
        self.entries.contains_key(&key)
    }

    fn entry(&self, key: DbKey) -> Result<&DbEntry> {
        self.entries.get(&key).ok_or_else(|| {
            IllustrationError::configuration(format!(
                "Database key {:?} not found for product {}.",
                key, self.product_name
            ))
        })
    }
}

/// A product database viewed through one policy's index
///
/// Cheap to clone; the underlying entries are shared.
#[derive(Debug, Clone)]
pub struct Database {
    data: Arc<ProductDatabase>,
    index: DatabaseIndex,
    length: usize,
}

impl Database {
    /// Bind the database to a policy; the contract length runs from issue
    /// age to maturity age.
    pub fn new(data: Arc<ProductDatabase>, index: DatabaseIndex, issue_age: i32) -> Result<Self> {
        let mut db = Self { data, index, length: 1 };
        let maturity_age: i32 = db.query_int(DbKey::MaturityAge)?;
        if maturity_age <= issue_age {
            return Err(IllustrationError::validation(format!(
                "Issue age {} not less than maturity age {}.",
                issue_age, maturity_age
            )));
        }
        db.length = stinted_cast::<usize, i32>(maturity_age - issue_age)?;
        Ok(db)
    }

    pub fn index(&self) -> DatabaseIndex {
        self.index
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn product_name(&self) -> &str {
        &self.data.product_name
    }

    /// The same data viewed through a different index
    pub fn with_index(&self, index: DatabaseIndex) -> Self {
        Self {
            data: Arc::clone(&self.data),
            index,
            length: self.length,
        }
    }

    /// Scalar value; fails if the entry varies by duration
    pub fn query(&self, key: DbKey) -> Result<f64> {
        let values = self.data.entry(key)?.resolve(&self.index);
        match values {
            [value] => Ok(*value),
            [] => Err(IllustrationError::configuration(format!(
                "Database key {:?} has no values in product {}.",
                key,
                self.product_name()
            ))),
            _ => Err(IllustrationError::configuration(format!(
                "Database key {:?} varies by duration in product {}, but a scalar was requested.",
                key,
                self.product_name()
            ))),
        }
    }

    /// Vector of contract length, padded with the last stored value
    pub fn query_vec(&self, key: DbKey) -> Result<Vec<f64>> {
        let values = self.data.entry(key)?.resolve(&self.index);
        let last = values.last().copied().ok_or_else(|| {
            IllustrationError::configuration(format!(
                "Database key {:?} has no values in product {}.",
                key,
                self.product_name()
            ))
        })?;
        let mut z: Vec<f64> = values.iter().copied().take(self.length).collect();
        z.resize(self.length, last);
        Ok(z)
    }

    pub fn query_bool(&self, key: DbKey) -> Result<bool> {
        Ok(0.0 != self.query(key)?)
    }

    /// Integral value; a fractional or out-of-range entry is an error
    pub fn query_int<T: Stintable>(&self, key: DbKey) -> Result<T> {
        let value = self.query(key)?;
        stinted_cast::<T, f64>(value).map_err(|e| {
            log::error!("Database key {:?} holds {}: {}", key, value, e);
            e.into()
        })
    }

    /// Enumerator stored as an integer code
    pub fn query_code<T: DbCode>(&self, key: DbKey) -> Result<T> {
        let code: i32 = self.query_int(key)?;
        T::try_from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db() -> ProductDatabase {
        let mut db = ProductDatabase::new("test");
        db.set(DbKey::MaturityAge, 100.0)
            .set(DbKey::MaxIssAge, 85.0)
            .set(DbKey::MaxIncrAge, 70.5)
            .set_vec(DbKey::GuarInt, vec![0.03, 0.025]);
        db.set(DbKey::CurrCoiTable, 1.0);
        db.set_indexed(DbKey::CurrCoiTable, Some(Gender::Female), Some(Smoking::Smoker), None, 7.0)
            .unwrap();
        db
    }

    fn view(db: ProductDatabase, issue_age: i32) -> Result<Database> {
        let index = DatabaseIndex::from_input(&PolicyInput::default());
        Database::new(Arc::new(db), index, issue_age)
    }

    #[test]
    fn test_length_and_vector_padding() {
        let db = view(sample_db(), 95).unwrap();
        assert_eq!(db.length(), 5);
        assert_eq!(db.query_vec(DbKey::GuarInt).unwrap(), vec![0.03, 0.025, 0.025, 0.025, 0.025]);
        assert!(matches!(db.query(DbKey::GuarInt), Err(IllustrationError::Configuration(_))));
    }

    #[test]
    fn test_indexed_override() {
        let db = view(sample_db(), 45).unwrap();
        assert_eq!(db.query(DbKey::CurrCoiTable).unwrap(), 1.0);
        let fs = db.with_index(db.index().gender(Gender::Female).smoking(Smoking::Smoker));
        assert_eq!(fs.query(DbKey::CurrCoiTable).unwrap(), 7.0);
        let fn_ = db.with_index(db.index().gender(Gender::Female).smoking(Smoking::Nonsmoker));
        assert_eq!(fn_.query(DbKey::CurrCoiTable).unwrap(), 1.0);
    }

    #[test]
    fn test_integral_queries() {
        let db = view(sample_db(), 45).unwrap();
        assert_eq!(db.query_int::<i32>(DbKey::MaxIssAge).unwrap(), 85);
        assert!(matches!(
            db.query_int::<i32>(DbKey::MaxIncrAge),
            Err(IllustrationError::NumericConversion(_))
        ));
    }

    #[test]
    fn test_missing_key_and_bad_age() {
        let db = view(sample_db(), 45).unwrap();
        assert!(matches!(db.query(DbKey::WpLimit), Err(IllustrationError::Configuration(_))));
        assert!(matches!(view(sample_db(), 100), Err(IllustrationError::Validation(_))));
    }
}
