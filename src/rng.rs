// src/rng.rs
//! Variance-Reduced Standard Normal Draws
//!
//! # Design Philosophy
//!
//! Path simulation consumes whole blocks of standard normals at once, shaped
//! `(outer, steps, paths)`. The block generator offers:
//! 1. **Reproducibility**: `fixed_seed` → same block, bit for bit
//! 2. **Antithetic variates**: every draw paired with its negation
//! 3. **Moment matching**: realised mean 0 and standard deviation 1 exactly
//!
//! # Generator Ownership
//!
//! There is no process-wide generator. Each call builds its own `StdRng`
//! (seeded with [`FIXED_SEED`] or from OS entropy), or borrows one from the
//! caller through the `*_with_rng` entry points. Concurrent contexts
//! therefore never race on generator state.
//!
//! # Antithetic Layout
//!
//! With `h = ceil(paths / 2)` base draws per `(outer, step)`:
//! ```text
//! z[.., .., k]     = ε_k          for k < h
//! z[.., .., h + k] = -ε_k         for h + k < paths
//! ```
//! For even `paths` every column `k` is mirrored by column `k + paths/2`;
//! for odd `paths` the last base draw has no partner.

use crate::error::{SdeError, SdeResult};
use bitflags::bitflags;
use ndarray::{s, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use statrs::statistics::Statistics;

/// Seed used whenever a reproducible draw is requested.
pub const FIXED_SEED: u64 = 1000;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VarianceReduction: u8 {
        const NONE            = 0;
        const ANTITHETIC      = 1 << 0;
        const MOMENT_MATCHING = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub reduction: VarianceReduction,
    pub fixed_seed: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            reduction: VarianceReduction::ANTITHETIC | VarianceReduction::MOMENT_MATCHING,
            fixed_seed: false,
        }
    }
}

impl SamplerConfig {
    pub fn seeded() -> Self {
        SamplerConfig {
            fixed_seed: true,
            ..Default::default()
        }
    }

    /// Fresh generator honouring `fixed_seed`.
    pub fn rng(&self) -> StdRng {
        if self.fixed_seed {
            seed_rng_from_u64(FIXED_SEED)
        } else {
            StdRng::from_entropy()
        }
    }
}

pub fn seed_rng_from_u64(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Standard normal block of shape `(outer, steps, paths)`.
pub fn sn_random_numbers(shape: (usize, usize, usize), cfg: &SamplerConfig) -> SdeResult<Array3<f64>> {
    let mut rng = cfg.rng();
    sn_random_numbers_with_rng(shape, cfg.reduction, &mut rng)
}

/// Squeezed `(steps, paths)` block, i.e. the `outer == 1` case.
pub fn sn_random_matrix(steps: usize, paths: usize, cfg: &SamplerConfig) -> SdeResult<Array2<f64>> {
    let mut rng = cfg.rng();
    sn_random_matrix_with_rng(steps, paths, cfg.reduction, &mut rng)
}

pub fn sn_random_matrix_with_rng<R: Rng + ?Sized>(
    steps: usize,
    paths: usize,
    reduction: VarianceReduction,
    rng: &mut R,
) -> SdeResult<Array2<f64>> {
    let cube = sn_random_numbers_with_rng((1, steps, paths), reduction, rng)?;
    Ok(cube.index_axis_move(Axis(0), 0))
}

/// Block generator driven by a caller-owned generator.
///
/// # Errors
/// - `InvalidInput` if any dimension is zero
/// - `InvalidInput` if moment matching is requested on a block whose
///   realised standard deviation is zero (e.g. a single draw)
pub fn sn_random_numbers_with_rng<R: Rng + ?Sized>(
    shape: (usize, usize, usize),
    reduction: VarianceReduction,
    rng: &mut R,
) -> SdeResult<Array3<f64>> {
    let (outer, steps, paths) = shape;
    if outer == 0 || steps == 0 || paths == 0 {
        return Err(SdeError::invalid_input(
            "random numbers",
            format!("shape ({}, {}, {}) has an empty dimension", outer, steps, paths),
        ));
    }

    let mut ran = if reduction.contains(VarianceReduction::ANTITHETIC) {
        let half = (paths + 1) / 2;
        let base = Array3::from_shape_fn((outer, steps, half), |_| get_normal_draw(&mut *rng));

        let mut full = Array3::<f64>::zeros((outer, steps, paths));
        full.slice_mut(s![.., .., ..half]).assign(&base);
        full.slice_mut(s![.., .., half..])
            .assign(&base.slice(s![.., .., ..paths - half]).mapv(|z| -z));
        full
    } else {
        Array3::from_shape_fn(shape, |_| get_normal_draw(&mut *rng))
    };

    if reduction.contains(VarianceReduction::MOMENT_MATCHING) {
        let mean = ran.iter().mean();
        let std = ran.iter().population_std_dev();
        if !(std > 0.0 && std.is_finite()) {
            return Err(SdeError::invalid_input(
                "moment matching",
                format!("sample standard deviation is {}", std),
            ));
        }
        ran.mapv_inplace(|z| (z - mean) / std);
    }

    tracing::trace!(outer, steps, paths, ?reduction, "drew standard normal block");
    Ok(ran)
}
