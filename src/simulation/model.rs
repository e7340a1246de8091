// src/simulation/model.rs
use super::context::{ParameterUpdate, SimulationContext};
use crate::error::{validation::*, SdeError, SdeResult};
use crate::frame::DEFAULT_DAY_COUNT;
use chrono::NaiveDate;
use ndarray::Array2;
use rayon::prelude::*;

/// Settings for one path generation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub fixed_seed: bool,
    pub day_count: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            fixed_seed: false,
            day_count: DEFAULT_DAY_COUNT,
        }
    }
}

impl GenerationConfig {
    pub fn seeded() -> Self {
        GenerationConfig {
            fixed_seed: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> SdeResult<()> {
        validate_finite("day_count", self.day_count)?;
        validate_positive("day_count", self.day_count)
    }
}

pub trait PathSimulator {
    fn context(&self) -> &SimulationContext;

    fn update(&mut self, update: ParameterUpdate) -> SdeResult<()>;

    /// Simulates the full ensemble and caches it on the context. On error the
    /// previously cached ensemble, if any, is left in place.
    fn generate_paths(&mut self, cfg: &GenerationConfig) -> SdeResult<()>;

    fn time_grid(&self) -> Option<&[NaiveDate]> {
        self.context().time_grid()
    }

    /// Cached paths, regenerated when absent or when `fixed_seed` is false.
    fn instrument_values(&mut self, fixed_seed: bool) -> SdeResult<&Array2<f64>> {
        if self.context().instrument_values().is_none() || !fixed_seed {
            self.generate_paths(&GenerationConfig {
                fixed_seed,
                ..Default::default()
            })?;
        }
        self.context().instrument_values().ok_or_else(|| {
            SdeError::invalid_state("read instrument values", "no paths were generated")
        })
    }
}

/// Generates paths for independent simulation objects in parallel.
///
/// Stops at the first failure; objects that already finished keep their new
/// ensemble.
pub fn simulate_all<S>(simulators: &mut [S], cfg: &GenerationConfig) -> SdeResult<()>
where
    S: PathSimulator + Send,
{
    simulators
        .par_iter_mut()
        .try_for_each(|sim| sim.generate_paths(cfg))
}
