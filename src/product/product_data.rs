//! Product-level data: table file names, domicile, funds, rounding

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::RoundingRules;
use crate::error::{IllustrationError, Result};

/// A separate-account fund available under the product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundInfo {
    pub short_name: String,
    /// Investment management fee in basis points
    pub scalar_imf: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductData {
    pub product_name: String,
    /// Two-letter state code of the insurer's domicile
    pub domicile: String,
    /// Table file names keyed by role, e.g. "CurrCOIFilename"
    #[serde(default)]
    pub filenames: HashMap<String, String>,
    #[serde(default)]
    pub funds: Vec<FundInfo>,
    #[serde(default)]
    pub rounding: RoundingRules,
}

impl ProductData {
    pub fn new(product_name: impl Into<String>, domicile: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            domicile: domicile.into(),
            filenames: HashMap::new(),
            funds: Vec::new(),
            rounding: RoundingRules::default(),
        }
    }

    /// File name stored under `name`
    pub fn datum(&self, name: &str) -> Result<&str> {
        self.filenames.get(name).map(String::as_str).ok_or_else(|| {
            IllustrationError::configuration(format!(
                "Product {} has no datum '{}'.",
                self.product_name, name
            ))
        })
    }

    pub fn set_datum(&mut self, name: impl Into<String>, file: impl Into<String>) -> &mut Self {
        self.filenames.insert(name.into(), file.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datum() {
        let mut product = ProductData::new("sample", "CT");
        product.set_datum("CurrCOIFilename", "sample_coi");
        assert_eq!(product.datum("CurrCOIFilename").unwrap(), "sample_coi");
        assert!(matches!(product.datum("WPFilename"), Err(IllustrationError::Configuration(_))));
    }
}
