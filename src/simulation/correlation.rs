// src/simulation/correlation.rs
//! Shared Correlation State for Multi-Factor Simulation
//!
//! # Mathematical Framework
//!
//! For `n` risk factors with correlation matrix `ρ = L Lᵀ` (lower Cholesky
//! factor `L`) and independent standard normals `ε ∈ ℝ^{n × M × I}`, the
//! correlated draw for factor `j` at step `t` is
//! ```text
//! z_j[t] = Σ_k L[j, k] · ε[k, t, :]
//! ```
//!
//! # Ownership
//!
//! The orchestrating valuation run builds one [`CorrelationContext`] and keeps
//! it behind an `Arc`. Each simulation object receives a [`CorrelationLink`]
//! at registration time, carrying its factor row index. The random cube is
//! never mutated after construction, so sibling contexts may read it from
//! several threads at once.

use crate::error::{SdeError, SdeResult};
use crate::rng::{sn_random_numbers, SamplerConfig};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, Array3, Axis};
use std::sync::Arc;

const SYMMETRY_TOLERANCE: f64 = 1e-12;

#[derive(Debug)]
pub struct CorrelationContext {
    names: Vec<String>,
    cholesky_matrix: Array2<f64>,
    random_numbers: Array3<f64>,
}

impl CorrelationContext {
    /// Factorises `correlation` and draws the shared `(factors, steps, paths)` cube.
    ///
    /// # Errors
    /// - `InvalidInput` if the matrix is not a valid correlation matrix for
    ///   `names` (square, symmetric, unit diagonal, entries in `[-1, 1]`,
    ///   positive definite)
    /// - any sampler error for the requested cube shape
    pub fn new(
        names: Vec<String>,
        correlation: &Array2<f64>,
        steps: usize,
        paths: usize,
        cfg: &SamplerConfig,
    ) -> SdeResult<Arc<Self>> {
        validate_correlation_matrix(&names, correlation)?;
        let cholesky_matrix = cholesky_lower(correlation)?;
        let random_numbers = sn_random_numbers((names.len(), steps, paths), cfg)?;

        tracing::debug!(
            factors = names.len(),
            steps,
            paths,
            "built correlation context"
        );
        Self::from_parts(names, cholesky_matrix, random_numbers)
    }

    /// Wraps an externally produced Cholesky factor and random cube.
    pub fn from_parts(
        names: Vec<String>,
        cholesky_matrix: Array2<f64>,
        random_numbers: Array3<f64>,
    ) -> SdeResult<Arc<Self>> {
        let n = names.len();
        check_unique(&names)?;
        if cholesky_matrix.dim() != (n, n) {
            return Err(SdeError::invalid_input(
                "correlation context",
                format!(
                    "cholesky matrix is {:?}, expected ({}, {})",
                    cholesky_matrix.dim(),
                    n,
                    n
                ),
            ));
        }
        if random_numbers.len_of(Axis(0)) != n {
            return Err(SdeError::invalid_input(
                "correlation context",
                format!(
                    "random number cube has {} factor slices, expected {}",
                    random_numbers.len_of(Axis(0)),
                    n
                ),
            ));
        }
        Ok(Arc::new(CorrelationContext {
            names,
            cholesky_matrix,
            random_numbers,
        }))
    }

    /// Hands out the link for `name`; the row index is fixed from here on.
    pub fn register(self: &Arc<Self>, name: &str) -> SdeResult<CorrelationLink> {
        let factor_index = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| SdeError::key_not_found("risk factor", name))?;
        Ok(CorrelationLink {
            context: Arc::clone(self),
            factor_index,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn cholesky_matrix(&self) -> &Array2<f64> {
        &self.cholesky_matrix
    }

    pub fn random_numbers(&self) -> &Array3<f64> {
        &self.random_numbers
    }

    /// `(steps, paths)` covered by the shared cube.
    pub fn shape(&self) -> (usize, usize) {
        let (_, steps, paths) = self.random_numbers.dim();
        (steps, paths)
    }
}

/// A simulation object's handle into a [`CorrelationContext`].
#[derive(Debug, Clone)]
pub struct CorrelationLink {
    context: Arc<CorrelationContext>,
    factor_index: usize,
}

impl CorrelationLink {
    pub fn factor_index(&self) -> usize {
        self.factor_index
    }

    pub fn context(&self) -> &CorrelationContext {
        &self.context
    }

    /// Row `factor_index` of `L · ε[:, step, :]`.
    pub(crate) fn correlated_draws(&self, step: usize) -> Array1<f64> {
        let slice = self.context.random_numbers.index_axis(Axis(1), step);
        self.context
            .cholesky_matrix
            .row(self.factor_index)
            .dot(&slice)
    }
}

fn check_unique(names: &[String]) -> SdeResult<()> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(SdeError::invalid_input(
                "correlation context",
                format!("risk factor '{}' listed twice", name),
            ));
        }
    }
    Ok(())
}

fn validate_correlation_matrix(names: &[String], correlation: &Array2<f64>) -> SdeResult<()> {
    let n = names.len();
    if n == 0 {
        return Err(SdeError::invalid_input(
            "correlation matrix",
            "no risk factors given",
        ));
    }
    if correlation.dim() != (n, n) {
        return Err(SdeError::invalid_input(
            "correlation matrix",
            format!("shape {:?} does not match {} risk factors", correlation.dim(), n),
        ));
    }
    if correlation.iter().any(|v| !v.is_finite()) {
        return Err(SdeError::invalid_input(
            "correlation matrix",
            "contains NaN or infinite entries",
        ));
    }
    for i in 0..n {
        if (correlation[[i, i]] - 1.0).abs() > SYMMETRY_TOLERANCE {
            return Err(SdeError::invalid_input(
                "correlation matrix",
                format!("diagonal entry {} is {}, expected 1", i, correlation[[i, i]]),
            ));
        }
        for j in 0..i {
            let (a, b) = (correlation[[i, j]], correlation[[j, i]]);
            if !(-1.0..=1.0).contains(&a) {
                return Err(SdeError::invalid_input(
                    "correlation matrix",
                    format!("entry ({}, {}) = {} outside [-1, 1]", i, j, a),
                ));
            }
            if (a - b).abs() > SYMMETRY_TOLERANCE {
                return Err(SdeError::invalid_input(
                    "correlation matrix",
                    format!("not symmetric at ({}, {})", i, j),
                ));
            }
        }
    }
    Ok(())
}

/// Lower Cholesky factor of a positive definite matrix.
pub fn cholesky_lower(matrix: &Array2<f64>) -> SdeResult<Array2<f64>> {
    let (rows, cols) = matrix.dim();
    let dm = DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]]);
    let l = dm
        .cholesky()
        .ok_or_else(|| {
            SdeError::invalid_input("correlation matrix", "matrix is not positive definite")
        })?
        .l();
    Ok(Array2::from_shape_fn((rows, cols), |(i, j)| l[(i, j)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn names() -> Vec<String> {
        vec!["gbm_a".to_string(), "gbm_b".to_string()]
    }

    #[test]
    fn test_cholesky_reproduces_matrix() {
        let corr = array![[1.0, 0.6, 0.2], [0.6, 1.0, 0.3], [0.2, 0.3, 1.0]];
        let l = cholesky_lower(&corr).unwrap();
        let rebuilt = l.dot(&l.t());
        for (a, b) in rebuilt.iter().zip(corr.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
        assert_eq!(l[[0, 1]], 0.0);
    }

    #[test]
    fn test_register_assigns_row_index() {
        let corr = array![[1.0, 0.9], [0.9, 1.0]];
        let ctx = CorrelationContext::new(names(), &corr, 5, 100, &SamplerConfig::seeded()).unwrap();
        assert_eq!(ctx.register("gbm_a").unwrap().factor_index(), 0);
        assert_eq!(ctx.register("gbm_b").unwrap().factor_index(), 1);
        assert!(matches!(ctx.register("gbm_c"), Err(SdeError::KeyNotFound { .. })));
        assert_eq!(ctx.shape(), (5, 100));
    }

    #[test]
    fn test_first_factor_uses_raw_draws() {
        let corr = array![[1.0, 0.5], [0.5, 1.0]];
        let ctx = CorrelationContext::new(names(), &corr, 3, 8, &SamplerConfig::seeded()).unwrap();
        let link = ctx.register("gbm_a").unwrap();
        let z = link.correlated_draws(2);
        for (k, v) in z.iter().enumerate() {
            assert_abs_diff_eq!(*v, ctx.random_numbers()[[0, 2, k]], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_invalid_matrices_rejected() {
        let not_symmetric = array![[1.0, 0.5], [0.4, 1.0]];
        let bad_diag = array![[2.0, 0.0], [0.0, 1.0]];
        let not_pd = array![[1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]];
        let cfg = SamplerConfig::seeded();
        assert!(CorrelationContext::new(names(), &not_symmetric, 2, 4, &cfg).is_err());
        assert!(CorrelationContext::new(names(), &bad_diag, 2, 4, &cfg).is_err());
        let three: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert!(CorrelationContext::new(three, &not_pd, 2, 4, &cfg).is_err());
    }

    #[test]
    fn test_from_parts_shape_checks() {
        let l = Array2::<f64>::eye(2);
        assert!(CorrelationContext::from_parts(names(), l.clone(), Array3::zeros((3, 4, 4))).is_err());
        assert!(CorrelationContext::from_parts(names(), l, Array3::zeros((2, 4, 4))).is_ok());
        let dup = vec!["x".to_string(), "x".to_string()];
        assert!(CorrelationContext::from_parts(dup, Array2::eye(2), Array3::zeros((2, 1, 1))).is_err());
    }
}
