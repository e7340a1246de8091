//! # dx-sim: Monte Carlo Kernel for Derivatives Valuation
//!
//! Simulates geometric Brownian motion paths over calendar-date time grids
//! and discounts with a constant short rate. The resulting path ensemble is
//! what downstream payoff and present-value code consumes.
//!
//! ## Key Features
//!
//! - **Calendar Time Grids**: month/quarter/year-end or daily/weekly grids plus special dates
//! - **Variance Reduction**: antithetic variates and first/second moment matching
//! - **Correlated Risk Factors**: shared random cube mixed through a Cholesky factor
//! - **Lazy Caching**: parameter updates invalidate cached grids and paths
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use dx_sim::frame::{ConstantShortRate, MarketEnvironment};
//! use dx_sim::simulation::{GenerationConfig, GeometricBrownianMotion, PathSimulator};
//!
//! let mut env = MarketEnvironment::new("me_gbm", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
//! env.add_constant("initial_value", 36.0);
//! env.add_constant("volatility", 0.2);
//! env.add_constant("final_date", NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
//! env.add_constant("frequency", "M");
//! env.add_constant("paths", 10_000i64);
//! env.add_curve("discount_curve", ConstantShortRate::new("csr", 0.06).unwrap());
//!
//! let mut gbm = GeometricBrownianMotion::from_environment("gbm", &env, false).unwrap();
//! gbm.generate_paths(&GenerationConfig::seeded()).unwrap();
//!
//! let paths = gbm.context().instrument_values().unwrap();
//! assert_eq!(paths.dim(), (13, 10_000));
//! ```
//!
//! ## Mathematical Foundation
//!
//! Paths follow the exact log-Euler solution of `dS = r S dt + σ S dW`; see
//! [`simulation::gbm`] for details.

// Module declarations
pub mod error;
pub mod frame;
pub mod math_utils;
pub mod rng;
pub mod simulation;

// Re-export commonly used types for convenience
pub use error::{SdeError, SdeResult};
