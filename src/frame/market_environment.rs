// src/frame/market_environment.rs
//! Market Environment
//!
//! Named bag of valuation inputs: scalar constants (model parameters, path
//! counts, dates), date lists (special dates, prebuilt time grids) and
//! discount curves. Simulation objects read from it once, at construction.

use super::short_rate::ConstantShortRate;
use crate::error::{SdeError, SdeResult};
use chrono::NaiveDate;
use std::collections::HashMap;

/// A scalar market-environment entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Float(f64),
    Int(i64),
    Date(NaiveDate),
    Text(String),
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Float(value)
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<NaiveDate> for Constant {
    fn from(value: NaiveDate) -> Self {
        Constant::Date(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::Text(value.to_string())
    }
}

impl From<String> for Constant {
    fn from(value: String) -> Self {
        Constant::Text(value)
    }
}

#[derive(Debug, Clone)]
pub struct MarketEnvironment {
    name: String,
    pricing_date: NaiveDate,
    constants: HashMap<String, Constant>,
    lists: HashMap<String, Vec<NaiveDate>>,
    curves: HashMap<String, ConstantShortRate>,
}

impl MarketEnvironment {
    pub fn new(name: impl Into<String>, pricing_date: NaiveDate) -> Self {
        MarketEnvironment {
            name: name.into(),
            pricing_date,
            constants: HashMap::new(),
            lists: HashMap::new(),
            curves: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pricing_date(&self) -> NaiveDate {
        self.pricing_date
    }

    pub fn add_constant(&mut self, key: impl Into<String>, constant: impl Into<Constant>) {
        self.constants.insert(key.into(), constant.into());
    }

    pub fn get_constant(&self, key: &str) -> SdeResult<&Constant> {
        self.constants
            .get(key)
            .ok_or_else(|| SdeError::key_not_found("constant", key))
    }

    /// Float constant; integer entries are widened.
    pub fn get_float(&self, key: &str) -> SdeResult<f64> {
        match self.get_constant(key)? {
            Constant::Float(v) => Ok(*v),
            Constant::Int(v) => Ok(*v as f64),
            other => Err(type_mismatch(key, "float", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> SdeResult<i64> {
        match self.get_constant(key)? {
            Constant::Int(v) => Ok(*v),
            other => Err(type_mismatch(key, "integer", other)),
        }
    }

    pub fn get_date(&self, key: &str) -> SdeResult<NaiveDate> {
        match self.get_constant(key)? {
            Constant::Date(v) => Ok(*v),
            other => Err(type_mismatch(key, "date", other)),
        }
    }

    pub fn get_text(&self, key: &str) -> SdeResult<&str> {
        match self.get_constant(key)? {
            Constant::Text(v) => Ok(v.as_str()),
            other => Err(type_mismatch(key, "text", other)),
        }
    }

    pub fn add_list(&mut self, key: impl Into<String>, list: Vec<NaiveDate>) {
        self.lists.insert(key.into(), list);
    }

    pub fn get_list(&self, key: &str) -> SdeResult<&[NaiveDate]> {
        self.lists
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| SdeError::key_not_found("list", key))
    }

    pub fn add_curve(&mut self, key: impl Into<String>, curve: ConstantShortRate) {
        self.curves.insert(key.into(), curve);
    }

    pub fn get_curve(&self, key: &str) -> SdeResult<&ConstantShortRate> {
        self.curves
            .get(key)
            .ok_or_else(|| SdeError::key_not_found("curve", key))
    }

    /// Merges `other` into `self`; entries in `other` win on key clashes.
    pub fn add_environment(&mut self, other: &MarketEnvironment) {
        let overwritten = other
            .constants
            .keys()
            .filter(|k| self.constants.contains_key(*k))
            .chain(other.lists.keys().filter(|k| self.lists.contains_key(*k)))
            .chain(other.curves.keys().filter(|k| self.curves.contains_key(*k)))
            .count();
        if overwritten > 0 {
            tracing::warn!(
                target_env = %self.name,
                source_env = %other.name,
                overwritten,
                "market environment merge replaced existing entries"
            );
        }

        self.constants
            .extend(other.constants.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.lists
            .extend(other.lists.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.curves
            .extend(other.curves.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

fn type_mismatch(key: &str, expected: &str, found: &Constant) -> SdeError {
    SdeError::invalid_input(
        "market environment",
        format!("constant '{}' is not a {} (found {:?})", key, expected, found),
    )
}
