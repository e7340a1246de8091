// demos/demo.rs
use chrono::NaiveDate;
use dx_sim::frame::{ConstantShortRate, MarketEnvironment};
use dx_sim::math_utils::Timer;
use dx_sim::simulation::{GenerationConfig, GeometricBrownianMotion, PathSimulator};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pricing_date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    let mut env = MarketEnvironment::new("me_gbm", pricing_date);
    env.add_constant("initial_value", 36.0);
    env.add_constant("volatility", 0.2);
    env.add_constant("final_date", NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid date"));
    env.add_constant("currency", "EUR");
    env.add_constant("frequency", "M");
    env.add_constant("paths", 10_000i64);
    env.add_curve(
        "discount_curve",
        ConstantShortRate::new("csr", 0.06).expect("non-negative rate"),
    );

    let mut gbm =
        GeometricBrownianMotion::from_environment("gbm", &env, false).expect("Valid market environment");

    let mut timer = Timer::new();
    timer.start();
    gbm.generate_paths(&GenerationConfig::seeded())
        .expect("Path generation succeeds");
    let elapsed = timer.elapsed_ms();

    let grid = gbm.time_grid().expect("grid built").to_vec();
    let paths = gbm.context().instrument_values().expect("paths generated");
    let curve = gbm.context().discount_curve();
    let factors = curve
        .discount_factors_from_dates(&grid)
        .expect("non-empty grid");

    println!("GBM simulation demo");
    println!("===================");
    println!("Paths: {}, grid points: {}, time: {:.2} ms\n", paths.ncols(), grid.len(), elapsed);
    println!("{:<12} {:>10} {:>10} {:>10} {:>10}", "Date", "Mean", "Min", "Max", "DF");
    for (t, (date, df)) in factors.iter().enumerate() {
        let row = paths.row(t);
        let mean = row.mean().unwrap_or(f64::NAN);
        let min = row.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        println!("{:<12} {:>10.4} {:>10.4} {:>10.4} {:>10.6}", date, mean, min, max, df);
    }
}
