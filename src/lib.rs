//! Illustration Core - Basic Values engine for universal-life illustrations
//!
//! This library provides:
//! - Product databases and select-and-ultimate rate tables
//! - Gender and smoking blending of mortality tables
//! - Mortality, interest, and load rates bound to one policy
//! - Modal premium and specified-amount strategies
//! - IRC 7702 guideline premiums and 7702A MEC testing
//! - Parallel census runs

pub mod numeric;
pub mod error;
pub mod config;
pub mod product;
pub mod policy;
pub mod assumptions;
pub mod irc7702;
pub mod basic_values;
pub mod census;

// Re-export commonly used types
pub use error::{IllustrationError, Result};
pub use config::GlobalSettings;
pub use policy::{PolicyInput, Mode};
pub use product::{LoadedProduct, ProductData, ProductDatabase};
pub use basic_values::{BasicValues, ModalStrategy};
pub use census::CensusRunner;
