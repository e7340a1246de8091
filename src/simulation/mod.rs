//! Path simulation: time grids, correlation wiring and the GBM simulator.

pub mod context;
pub mod correlation;
pub mod gbm;
pub mod model;
pub mod time_grid;

pub use context::{ParameterUpdate, SimulationContext, SimulationState};
pub use correlation::{CorrelationContext, CorrelationLink};
pub use gbm::GeometricBrownianMotion;
pub use model::{simulate_all, GenerationConfig, PathSimulator};
pub use time_grid::{build_time_grid, Frequency, TimeGridBuilder};
