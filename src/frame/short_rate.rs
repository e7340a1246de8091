// src/frame/short_rate.rs
//! Constant Short Rate Discounting
//!
//! A flat curve with continuously compounded rate `r`:
//! ```text
//! DF(t) = exp(-r t)
//! ```
//!
//! Each factor is computed from the offset it is returned with, so the
//! `(input, factor)` pairs keep the caller's order and never get shuffled by
//! sorting.

use super::year_fractions::get_year_deltas;
use crate::error::{validation::*, SdeResult};
use chrono::NaiveDate;

/// Flat discount curve driven by a single non-negative short rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantShortRate {
    name: String,
    short_rate: f64,
}

impl ConstantShortRate {
    /// # Errors
    /// `InvalidParameters` if `short_rate` is negative or not finite.
    pub fn new(name: impl Into<String>, short_rate: f64) -> SdeResult<Self> {
        validate_finite("short_rate", short_rate)?;
        validate_non_negative("short_rate", short_rate)?;
        Ok(ConstantShortRate {
            name: name.into(),
            short_rate,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_rate(&self) -> f64 {
        self.short_rate
    }

    /// Discount factor for a single offset in years.
    #[inline]
    pub fn discount_factor(&self, year_fraction: f64) -> f64 {
        (self.short_rate * -year_fraction).exp()
    }

    /// `(year_fraction, discount_factor)` pairs in input order.
    pub fn discount_factors(&self, year_fractions: &[f64]) -> Vec<(f64, f64)> {
        year_fractions
            .iter()
            .map(|&t| (t, self.discount_factor(t)))
            .collect()
    }

    /// `(date, discount_factor)` pairs, offsets measured from the first date.
    ///
    /// # Errors
    /// `InvalidInput` if `dates` is empty.
    pub fn discount_factors_from_dates(&self, dates: &[NaiveDate]) -> SdeResult<Vec<(NaiveDate, f64)>> {
        let deltas = get_year_deltas(dates)?;
        Ok(dates
            .iter()
            .zip(deltas)
            .map(|(&date, t)| (date, self.discount_factor(t)))
            .collect())
    }
}
