// src/simulation/context.rs
//! Per-Risk-Factor Simulation Context
//!
//! Holds everything one simulated risk factor needs: model parameters read
//! from a [`MarketEnvironment`], the lazily built time grid, the discount
//! curve supplying the drift, optional correlation wiring and the cached
//! path ensemble.
//!
//! # State Machine
//!
//! ```text
//! Uninitialized ──grid──▶ GridBuilt ──generate──▶ Simulated
//!       ▲                    ▲   ▲                    │
//!       └── update(final) ───┘   └── update(value) ───┘
//! ```
//! Every accepted mutation bumps a generation counter. Cached values are
//! tagged with the generation that produced them.

use super::correlation::CorrelationLink;
use super::time_grid::{build_time_grid, Frequency};
use crate::error::{validation::*, SdeError, SdeResult};
use crate::frame::{ConstantShortRate, MarketEnvironment};
use chrono::NaiveDate;
use ndarray::Array2;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Uninitialized,
    GridBuilt,
    Simulated,
}

/// Parameters to change on a context. Unset fields stay as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParameterUpdate {
    pub initial_value: Option<f64>,
    pub volatility: Option<f64>,
    pub final_date: Option<NaiveDate>,
}

impl ParameterUpdate {
    pub fn initial_value(mut self, value: f64) -> Self {
        self.initial_value = Some(value);
        self
    }

    pub fn volatility(mut self, value: f64) -> Self {
        self.volatility = Some(value);
        self
    }

    pub fn final_date(mut self, date: NaiveDate) -> Self {
        self.final_date = Some(date);
        self
    }
}

#[derive(Debug, Clone)]
pub struct SimulationContext {
    name: String,
    pricing_date: NaiveDate,
    initial_value: f64,
    volatility: f64,
    final_date: NaiveDate,
    paths: usize,
    frequency: Frequency,
    currency: Option<String>,
    special_dates: Vec<NaiveDate>,
    discount_curve: ConstantShortRate,
    time_grid: Option<Vec<NaiveDate>>,
    correlated: bool,
    correlation: Option<CorrelationLink>,
    generation: u64,
    instrument_values: Option<(u64, Array2<f64>)>,
}

impl SimulationContext {
    /// Reads the model set-up from `env`.
    ///
    /// Required keys: constants `initial_value`, `volatility`, `final_date`,
    /// `paths`, `frequency`; curve `discount_curve`. Optional: constant
    /// `currency`, lists `time_grid` and `special_dates`.
    ///
    /// # Errors
    /// - `KeyNotFound` for a missing required key
    /// - `InvalidParameters` for negative volatility or a non-positive path count
    /// - `InvalidInput` for mistyped entries or a malformed `time_grid` list
    pub fn from_environment(
        name: impl Into<String>,
        env: &MarketEnvironment,
        correlated: bool,
    ) -> SdeResult<Self> {
        let name = name.into();
        let pricing_date = env.pricing_date();

        let initial_value = env.get_float("initial_value")?;
        validate_finite("initial_value", initial_value)?;
        let volatility = env.get_float("volatility")?;
        validate_finite("volatility", volatility)?;
        validate_non_negative("volatility", volatility)?;
        let paths = validate_paths(env.get_int("paths")?)?;
        let final_date = env.get_date("final_date")?;
        check_final_date(pricing_date, final_date)?;
        let frequency: Frequency = env.get_text("frequency")?.parse()?;
        let discount_curve = env.get_curve("discount_curve")?.clone();

        let currency = optional(env.get_text("currency"))?.map(str::to_string);
        let special_dates = optional(env.get_list("special_dates"))?
            .map(<[NaiveDate]>::to_vec)
            .unwrap_or_default();
        let time_grid = optional(env.get_list("time_grid"))?
            .map(|grid| check_time_grid(pricing_date, final_date, grid))
            .transpose()?;

        Ok(SimulationContext {
            name,
            pricing_date,
            initial_value,
            volatility,
            final_date,
            paths,
            frequency,
            currency,
            special_dates,
            discount_curve,
            time_grid,
            correlated,
            correlation: None,
            generation: 0,
            instrument_values: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pricing_date(&self) -> NaiveDate {
        self.pricing_date
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn final_date(&self) -> NaiveDate {
        self.final_date
    }

    pub fn paths(&self) -> usize {
        self.paths
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn special_dates(&self) -> &[NaiveDate] {
        &self.special_dates
    }

    pub fn discount_curve(&self) -> &ConstantShortRate {
        &self.discount_curve
    }

    pub fn is_correlated(&self) -> bool {
        self.correlated
    }

    pub fn correlation(&self) -> Option<&CorrelationLink> {
        self.correlation.as_ref()
    }

    /// Counter bumped by every accepted mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn time_grid(&self) -> Option<&[NaiveDate]> {
        self.time_grid.as_deref()
    }

    /// Cached path ensemble, `(grid points, paths)`.
    pub fn instrument_values(&self) -> Option<&Array2<f64>> {
        self.instrument_values.as_ref().map(|(_, values)| values)
    }

    pub fn state(&self) -> SimulationState {
        match (&self.time_grid, &self.instrument_values) {
            (_, Some((generation, _))) if *generation == self.generation => SimulationState::Simulated,
            (Some(_), _) => SimulationState::GridBuilt,
            (None, _) => SimulationState::Uninitialized,
        }
    }

    /// Builds the time grid from pricing date, final date, frequency and
    /// special dates, replacing any existing grid.
    pub fn generate_time_grid(&mut self) -> SdeResult<&[NaiveDate]> {
        let grid = build_time_grid(
            self.pricing_date,
            self.final_date,
            self.frequency,
            &self.special_dates,
        )?;
        Ok(self.time_grid.insert(grid).as_slice())
    }

    /// Existing grid, or a freshly built one that is not stored yet.
    pub(crate) fn resolve_time_grid(&self) -> SdeResult<Cow<'_, [NaiveDate]>> {
        match &self.time_grid {
            Some(grid) => Ok(Cow::Borrowed(grid.as_slice())),
            None => build_time_grid(
                self.pricing_date,
                self.final_date,
                self.frequency,
                &self.special_dates,
            )
            .map(Cow::Owned),
        }
    }

    /// Wires a correlated context to its shared random numbers.
    ///
    /// # Errors
    /// `InvalidState` if the context was not created as correlated.
    pub fn attach_correlation(&mut self, link: CorrelationLink) -> SdeResult<()> {
        if !self.correlated {
            return Err(SdeError::invalid_state(
                "attach correlation",
                format!("'{}' was created uncorrelated", self.name),
            ));
        }
        self.correlation = Some(link);
        self.invalidate_values();
        Ok(())
    }

    /// Applies `update` after validating every field; on error nothing changes.
    ///
    /// Any accepted change drops cached paths. A changed final date also drops
    /// the time grid.
    pub fn update(&mut self, update: ParameterUpdate) -> SdeResult<()> {
        if let Some(value) = update.initial_value {
            validate_finite("initial_value", value)?;
        }
        if let Some(value) = update.volatility {
            validate_finite("volatility", value)?;
            validate_non_negative("volatility", value)?;
        }
        if let Some(date) = update.final_date {
            check_final_date(self.pricing_date, date)?;
        }

        if let Some(value) = update.initial_value {
            self.initial_value = value;
        }
        if let Some(value) = update.volatility {
            self.volatility = value;
        }
        if let Some(date) = update.final_date {
            if date != self.final_date {
                self.final_date = date;
                self.time_grid = None;
            }
        }
        self.invalidate_values();
        Ok(())
    }

    pub(crate) fn store_instrument_values(&mut self, values: Array2<f64>) {
        self.instrument_values = Some((self.generation, values));
    }

    /// Stores a grid produced by [`resolve_time_grid`](Self::resolve_time_grid)
    /// once the pass that needed it has succeeded.
    pub(crate) fn store_time_grid(&mut self, grid: Vec<NaiveDate>) {
        self.time_grid = Some(grid);
    }

    fn invalidate_values(&mut self) {
        self.generation += 1;
        self.instrument_values = None;
    }
}

fn optional<T>(lookup: SdeResult<T>) -> SdeResult<Option<T>> {
    match lookup {
        Ok(value) => Ok(Some(value)),
        Err(SdeError::KeyNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn check_final_date(pricing_date: NaiveDate, final_date: NaiveDate) -> SdeResult<()> {
    if final_date < pricing_date {
        return Err(SdeError::invalid_input(
            "final_date",
            format!("{} precedes pricing date {}", final_date, pricing_date),
        ));
    }
    Ok(())
}

fn check_time_grid(
    pricing_date: NaiveDate,
    final_date: NaiveDate,
    grid: &[NaiveDate],
) -> SdeResult<Vec<NaiveDate>> {
    if grid.first() != Some(&pricing_date) {
        return Err(SdeError::invalid_input(
            "time_grid",
            format!("grid must start at pricing date {}", pricing_date),
        ));
    }
    if grid.windows(2).any(|w| w[1] < w[0]) {
        return Err(SdeError::invalid_input("time_grid", "grid dates must be non-decreasing"));
    }
    if grid.last() < Some(&final_date) {
        return Err(SdeError::invalid_input(
            "time_grid",
            format!("grid must reach final date {}", final_date),
        ));
    }
    Ok(grid.to_vec())
}
