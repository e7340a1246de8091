//! Valuation frame: calendar helpers, discounting and market data.
//!
//! These are the leaves every simulation object reads from. Nothing in this
//! module draws random numbers or mutates shared state.

pub mod market_environment;
pub mod short_rate;
pub mod year_fractions;

pub use market_environment::{Constant, MarketEnvironment};
pub use short_rate::ConstantShortRate;
pub use year_fractions::{get_year_deltas, get_year_deltas_with_day_count, DEFAULT_DAY_COUNT};
