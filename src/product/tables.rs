//! Actuarial rate tables and the provider seam
//!
//! Tables are select-and-ultimate: a rate depends on issue age for the first
//! `select_period` durations and on attained age thereafter. A table with a
//! zero select period is attained-age only.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{IllustrationError, Result};

/// How current rates re-enter a select table for an inforce contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReentryMethod {
    Never,
    /// Re-enter at the attained age reached at the inforce duration
    AtInforceDuration,
    /// Re-enter at the attained age on the last rate-reset date
    UponRateReset,
}

impl TryFrom<i32> for ReentryMethod {
    type Error = IllustrationError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(ReentryMethod::Never),
            1 => Ok(ReentryMethod::AtInforceDuration),
            2 => Ok(ReentryMethod::UponRateReset),
            other => Err(IllustrationError::configuration(format!(
                "Unknown table reentry method {}.",
                other
            ))),
        }
    }
}

/// Source of actuarial table rates
///
/// Implementations must be shareable across threads: a census runs one engine
/// per cell against a single provider.
pub trait ActuarialTableProvider: Send + Sync + std::fmt::Debug {
    /// `length` rates for a life issued at `issue_age`, starting at duration zero
    fn table_rates(&self, file: &str, number: i64, issue_age: i32, length: usize) -> Result<Vec<f64>>;

    /// Rates for an inforce contract that re-enters the select period
    ///
    /// `inforce_duration` is the number of full years in force;
    /// `reset_duration` the number of years from issue to the last rate
    /// reset, which is negative if the reset preceded issue.
    #[allow(clippy::too_many_arguments)]
    fn table_rates_elaborated(
        &self,
        file: &str,
        number: i64,
        issue_age: i32,
        length: usize,
        method: ReentryMethod,
        inforce_duration: i32,
        reset_duration: i32,
    ) -> Result<Vec<f64>> {
        let reentry_duration = match method {
            ReentryMethod::Never => return self.table_rates(file, number, issue_age, length),
            ReentryMethod::AtInforceDuration => inforce_duration,
            ReentryMethod::UponRateReset => reset_duration,
        };

        if reentry_duration <= 0 {
            // The select period started at reentry, before or at issue.
            let skip = reentry_duration.unsigned_abs() as usize;
            let rates = self.table_rates(file, number, issue_age + reentry_duration, length + skip)?;
            return Ok(rates.into_iter().skip(skip).collect());
        }

        let before = (reentry_duration as usize).min(length);
        let mut rates = self.table_rates(file, number, issue_age, before)?;
        if before < length {
            rates.extend(self.table_rates(file, number, issue_age + reentry_duration, length - before)?);
        }
        Ok(rates)
    }
}

/// One select-and-ultimate table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActuarialTable {
    pub min_age: i32,
    pub max_age: i32,
    pub select_period: usize,
    /// Select rates by issue age; each row holds `select_period` rates
    #[serde(default)]
    pub select: BTreeMap<i32, Vec<f64>>,
    /// Ultimate rates indexed by `age - min_age`
    pub ultimate: Vec<f64>,
}

impl ActuarialTable {
    /// Attained-age table from `min_age` onward
    pub fn ultimate(min_age: i32, rates: Vec<f64>) -> Self {
        let max_age = min_age + rates.len() as i32 - 1;
        Self {
            min_age,
            max_age,
            select_period: 0,
            select: BTreeMap::new(),
            ultimate: rates,
        }
    }

    /// Build an attained-age table from a rate function
    pub fn from_fn(min_age: i32, max_age: i32, f: impl Fn(i32) -> f64) -> Self {
        Self::ultimate(min_age, (min_age..=max_age).map(f).collect())
    }

    fn ultimate_rate(&self, age: i32) -> Option<f64> {
        let offset = usize::try_from(age - self.min_age).ok()?;
        self.ultimate.get(offset).copied()
    }

    /// Rates for a life issued at `issue_age`
    pub fn rates(&self, issue_age: i32, length: usize) -> Result<Vec<f64>> {
        let last_age = issue_age + length as i32 - 1;
        if issue_age < self.min_age || self.max_age < last_age {
            return Err(IllustrationError::table(format!(
                "Ages {} through {} lie outside table range {} through {}.",
                issue_age, last_age, self.min_age, self.max_age
            )));
        }

        (0..length)
            .map(|d| {
                let select = self
                    .select
                    .get(&issue_age)
                    .filter(|_| d < self.select_period)
                    .and_then(|row| row.get(d).copied());
                select
                    .or_else(|| self.ultimate_rate(issue_age + d as i32))
                    .ok_or_else(|| {
                        IllustrationError::table(format!(
                            "No rate at issue age {} duration {}.",
                            issue_age, d
                        ))
                    })
            })
            .collect()
    }
}

/// Tables held in memory, keyed by file name and table number
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    tables: HashMap<(String, i64), ActuarialTable>,
}

impl InMemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: impl Into<String>, number: i64, table: ActuarialTable) -> &mut Self {
        self.tables.insert((file.into(), number), table);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl ActuarialTableProvider for InMemoryTables {
    fn table_rates(&self, file: &str, number: i64, issue_age: i32, length: usize) -> Result<Vec<f64>> {
        let table = self.tables.get(&(file.to_string(), number)).ok_or_else(|| {
            IllustrationError::table(format!("Table {} not found in file '{}'.", number, file))
        })?;
        table.rates(issue_age, length)
    }
}
