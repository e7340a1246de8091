// tests/integration_test.rs
use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::NaiveDate;
use dx_sim::frame::{get_year_deltas, ConstantShortRate, MarketEnvironment};
use dx_sim::simulation::{
    GenerationConfig, GeometricBrownianMotion, ParameterUpdate, PathSimulator, SimulationState,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn market_environment(paths: i64) -> MarketEnvironment {
    let mut env = MarketEnvironment::new("me_gbm", ymd(2020, 1, 1));
    env.add_constant("initial_value", 36.0);
    env.add_constant("volatility", 0.2);
    env.add_constant("final_date", ymd(2020, 12, 31));
    env.add_constant("currency", "EUR");
    env.add_constant("frequency", "M");
    env.add_constant("paths", paths);
    env.add_curve("discount_curve", ConstantShortRate::new("csr", 0.06).unwrap());
    env
}

#[test]
fn test_year_fractions_and_discounting_end_to_end() {
    let dates = [ymd(2020, 1, 1), ymd(2020, 7, 1), ymd(2021, 1, 1)];
    let deltas = get_year_deltas(&dates).unwrap();

    assert_eq!(deltas[0], 0.0);
    assert_abs_diff_eq!(deltas[1], 0.4986, epsilon = 1e-4);
    assert_abs_diff_eq!(deltas[2], 1.0, epsilon = 3e-3);

    let csr = ConstantShortRate::new("csr", 0.05).unwrap();
    let factors = csr.discount_factors(&deltas);

    assert_eq!(factors[0], (0.0, 1.0));
    assert!(factors.windows(2).all(|w| w[1].1 < w[0].1));
    assert_abs_diff_eq!(factors[2].1, 0.9512, epsilon = 1e-3);
    for (t, df) in &factors {
        assert_relative_eq!(*df, (-0.05 * t).exp(), max_relative = 1e-15);
    }

    let by_date = csr.discount_factors_from_dates(&dates).unwrap();
    for ((date, df), (original, (_, expected))) in by_date.iter().zip(dates.iter().zip(&factors)) {
        assert_eq!(date, original);
        assert_eq!(df, expected);
    }
}

#[test]
fn test_mean_terminal_value_matches_forward() {
    let mut gbm = GeometricBrownianMotion::from_environment("gbm", &market_environment(20_000), false)
        .expect("valid market environment");
    let values = gbm.instrument_values(true).expect("paths generated").clone();

    let grid = gbm.time_grid().unwrap();
    let horizon = (*grid.last().unwrap() - grid[0]).num_days() as f64 / 365.0;
    let forward = 36.0 * (0.06 * horizon).exp();
    let mean = values.row(values.nrows() - 1).mean().unwrap();

    println!("\nMC mean terminal value: {}", mean);
    println!("Forward: {}", forward);

    let rel_error = (mean - forward).abs() / forward;
    assert!(rel_error < 0.01, "Relative error exceeds 1%: {}", rel_error);
}

#[test]
fn test_update_then_seeded_generation_is_reproducible() {
    let mut gbm = GeometricBrownianMotion::from_environment("gbm", &market_environment(1_000), false)
        .expect("valid market environment");

    gbm.update(ParameterUpdate::default().initial_value(40.0)).unwrap();
    gbm.generate_paths(&GenerationConfig::seeded()).unwrap();
    let first = gbm.context().instrument_values().unwrap().clone();
    gbm.generate_paths(&GenerationConfig::seeded()).unwrap();
    let second = gbm.context().instrument_values().unwrap().clone();

    assert_eq!(first, second);
    assert!(first.row(0).iter().all(|&v| v == 40.0));
}

#[test]
fn test_update_final_date_rebuilds_grid() {
    let mut gbm = GeometricBrownianMotion::from_environment("gbm", &market_environment(100), false)
        .expect("valid market environment");
    gbm.generate_paths(&GenerationConfig::seeded()).unwrap();
    let old_grid = gbm.time_grid().unwrap().to_vec();
    assert_eq!(old_grid.len(), 13);

    gbm.update(ParameterUpdate::default().final_date(ymd(2021, 6, 30))).unwrap();
    assert_eq!(gbm.context().state(), SimulationState::Uninitialized);

    gbm.generate_paths(&GenerationConfig::seeded()).unwrap();
    let new_grid = gbm.time_grid().unwrap();
    assert_eq!(new_grid.len(), 19);
    assert_eq!(*new_grid.last().unwrap(), ymd(2021, 6, 30));
    assert_eq!(gbm.context().instrument_values().unwrap().dim(), (19, 100));
}

#[test]
fn test_volatility_update_keeps_grid() {
    let mut gbm = GeometricBrownianMotion::from_environment("gbm", &market_environment(100), false)
        .expect("valid market environment");
    gbm.generate_paths(&GenerationConfig::seeded()).unwrap();
    let grid = gbm.time_grid().unwrap().to_vec();

    gbm.update(ParameterUpdate::default().volatility(0.35)).unwrap();
    assert_eq!(gbm.context().state(), SimulationState::GridBuilt);
    assert_eq!(gbm.time_grid().unwrap(), grid.as_slice());
}
