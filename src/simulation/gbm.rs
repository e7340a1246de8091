// src/simulation/gbm.rs
//! Geometric Brownian Motion Path Simulation
//!
//! # Mathematical Framework
//!
//! Under the risk-neutral measure with constant short rate `r`:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! Each grid step uses the exact log-Euler solution
//! ```text
//! S_{t} = S_{t-1} · exp((r - σ²/2) Δt + σ √Δt · z_t)
//! ```
//! with `Δt = days(grid[t-1], grid[t]) / day_count`. The scheme is exact in
//! distribution for any step size. Repeated grid dates give `Δt = 0` and
//! leave the path unchanged.
//!
//! # Random Inputs
//!
//! - Uncorrelated: one `(M, I)` block from the variance-reduced sampler
//!   (antithetic + moment matching), seeded when `fixed_seed` is set.
//! - Correlated: row `factor_index` of `L · ε[:, t, :]` from the shared
//!   [`CorrelationContext`](super::correlation::CorrelationContext). The cube
//!   is drawn once by the orchestrator, so `fixed_seed` has no effect here.
//!
//! # Parallelism
//!
//! Steps are sequential (`S_t` needs `S_{t-1}`); within a step the update is
//! split across paths with rayon.

use super::context::{ParameterUpdate, SimulationContext};
use super::correlation::CorrelationLink;
use super::model::{GenerationConfig, PathSimulator};
use crate::error::{SdeError, SdeResult};
use crate::frame::year_fractions::year_fraction_between;
use crate::frame::MarketEnvironment;
use crate::rng::{sn_random_matrix_with_rng, SamplerConfig};
use ndarray::{s, Array2, Axis, Zip};
use rand::Rng;
use std::borrow::Cow;

enum Draws<'a> {
    Independent(Array2<f64>),
    Correlated(&'a CorrelationLink),
}

#[derive(Debug, Clone)]
pub struct GeometricBrownianMotion {
    context: SimulationContext,
}

impl GeometricBrownianMotion {
    pub fn new(context: SimulationContext) -> Self {
        GeometricBrownianMotion { context }
    }

    pub fn from_environment(
        name: impl Into<String>,
        env: &MarketEnvironment,
        correlated: bool,
    ) -> SdeResult<Self> {
        SimulationContext::from_environment(name, env, correlated).map(Self::new)
    }

    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.context
    }

    /// [`PathSimulator::generate_paths`] with a caller-owned generator for
    /// the uncorrelated draws; `cfg.fixed_seed` is ignored.
    pub fn generate_paths_with_rng<R: Rng + ?Sized>(
        &mut self,
        cfg: &GenerationConfig,
        rng: &mut R,
    ) -> SdeResult<()> {
        cfg.validate()?;
        let link = if self.context.is_correlated() {
            Some(self.context.correlation().ok_or_else(|| {
                SdeError::missing_dependency(
                    "random numbers, cholesky matrix and factor index",
                    &format!("correlated simulation '{}'", self.context.name()),
                )
            })?)
        } else {
            None
        };

        let grid = self.context.resolve_time_grid()?;
        let m = grid.len();
        let i = self.context.paths();
        if i == 0 {
            return Err(SdeError::invalid_state(
                "generate paths",
                format!("'{}' has no paths to simulate", self.context.name()),
            ));
        }
        if m < 2 {
            return Err(SdeError::invalid_state(
                "generate paths",
                format!(
                    "time grid of '{}' has {} point(s), need at least 2",
                    self.context.name(),
                    m
                ),
            ));
        }
        if let Some(w) = grid.windows(2).find(|w| w[1] < w[0]) {
            return Err(SdeError::invalid_state(
                "generate paths",
                format!("time grid decreases between {} and {}", w[0], w[1]),
            ));
        }
        let dts: Vec<f64> = grid
            .windows(2)
            .map(|w| year_fraction_between(w[0], w[1], cfg.day_count))
            .collect();
        let fresh_grid = match grid {
            Cow::Owned(grid) => Some(grid),
            Cow::Borrowed(_) => None,
        };

        let draws = match link {
            Some(link) => {
                let (steps, paths) = link.context().shape();
                if steps < m || paths != i {
                    return Err(SdeError::invalid_input(
                        "shared random numbers",
                        format!(
                            "cube covers ({}, {}) steps/paths, '{}' needs ({}, {})",
                            steps,
                            paths,
                            self.context.name(),
                            m,
                            i
                        ),
                    ));
                }
                Draws::Correlated(link)
            }
            None => Draws::Independent(sn_random_matrix_with_rng(
                m,
                i,
                SamplerConfig::default().reduction,
                rng,
            )?),
        };

        let short_rate = self.context.discount_curve().short_rate();
        let sigma = self.context.volatility();

        let mut paths = Array2::<f64>::zeros((m, i));
        paths.row_mut(0).fill(self.context.initial_value());

        for (t, &dt) in (1..m).zip(&dts) {
            let drift = (short_rate - 0.5 * sigma * sigma) * dt;
            let diffusion = sigma * dt.sqrt();

            let mixed;
            let z = match &draws {
                Draws::Independent(ran) => ran.index_axis(Axis(0), t),
                Draws::Correlated(link) => {
                    mixed = link.correlated_draws(t);
                    mixed.view()
                }
            };

            let (prev, mut next) = paths.multi_slice_mut((s![t - 1, ..], s![t, ..]));
            Zip::from(&mut next)
                .and(&prev)
                .and(&z)
                .par_for_each(|s_t, &s_prev, &z_t| {
                    *s_t = s_prev * (drift + diffusion * z_t).exp();
                });
        }

        tracing::debug!(
            name = %self.context.name(),
            grid_points = m,
            paths = i,
            correlated = self.context.is_correlated(),
            "generated gbm paths"
        );
        if let Some(grid) = fresh_grid {
            self.context.store_time_grid(grid);
        }
        self.context.store_instrument_values(paths);
        Ok(())
    }
}

impl PathSimulator for GeometricBrownianMotion {
    fn context(&self) -> &SimulationContext {
        &self.context
    }

    fn update(&mut self, update: ParameterUpdate) -> SdeResult<()> {
        self.context.update(update)
    }

    fn generate_paths(&mut self, cfg: &GenerationConfig) -> SdeResult<()> {
        let mut rng = SamplerConfig {
            fixed_seed: cfg.fixed_seed,
            ..Default::default()
        }
        .rng();
        self.generate_paths_with_rng(cfg, &mut rng)
    }
}
