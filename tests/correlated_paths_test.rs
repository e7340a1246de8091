// tests/correlated_paths_test.rs
use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use dx_sim::frame::{ConstantShortRate, MarketEnvironment};
use dx_sim::rng::SamplerConfig;
use dx_sim::simulation::{
    build_time_grid, simulate_all, CorrelationContext, Frequency, GenerationConfig,
    GeometricBrownianMotion, PathSimulator,
};
use dx_sim::SdeError;
use ndarray::{array, Array1};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn market_environment(initial_value: f64, volatility: f64, paths: i64) -> MarketEnvironment {
    let mut env = MarketEnvironment::new("me", ymd(2020, 1, 1));
    env.add_constant("initial_value", initial_value);
    env.add_constant("volatility", volatility);
    env.add_constant("final_date", ymd(2020, 12, 31));
    env.add_constant("frequency", "M");
    env.add_constant("paths", paths);
    env.add_curve("discount_curve", ConstantShortRate::new("csr", 0.06).unwrap());
    env
}

fn sample_correlation(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let (ma, mb) = (a.mean().unwrap(), b.mean().unwrap());
    let cov = (a - ma).dot(&(b - mb));
    let va = (a - ma).dot(&(a - ma));
    let vb = (b - mb).dot(&(b - mb));
    cov / (va * vb).sqrt()
}

#[test]
fn test_correlated_log_returns() {
    let paths = 10_000;
    let grid = build_time_grid(ymd(2020, 1, 1), ymd(2020, 12, 31), Frequency::MonthEnd, &[]).unwrap();
    let shared = CorrelationContext::new(
        vec!["gbm_a".to_string(), "gbm_b".to_string()],
        &array![[1.0, 0.9], [0.9, 1.0]],
        grid.len(),
        paths,
        &SamplerConfig::seeded(),
    )
    .unwrap();

    let mut models = Vec::new();
    for (name, s0, vol) in [("gbm_a", 36.0, 0.2), ("gbm_b", 36.0, 0.3)] {
        let mut env = market_environment(s0, vol, paths as i64);
        env.add_list("time_grid", grid.clone());
        let mut gbm = GeometricBrownianMotion::from_environment(name, &env, true).unwrap();
        gbm.context_mut()
            .attach_correlation(shared.register(name).unwrap())
            .unwrap();
        models.push(gbm);
    }

    simulate_all(&mut models, &GenerationConfig::default()).unwrap();

    let log_returns: Vec<Array1<f64>> = models
        .iter()
        .map(|m| {
            let v = m.context().instrument_values().unwrap();
            (&v.row(1) / &v.row(0)).mapv(f64::ln)
        })
        .collect();

    let rho = sample_correlation(&log_returns[0], &log_returns[1]);
    println!("\nRealised correlation: {}", rho);
    assert_abs_diff_eq!(rho, 0.9, epsilon = 0.02);
}

#[test]
fn test_cube_shape_mismatch_rejected() {
    let shared = CorrelationContext::new(
        vec!["gbm_a".to_string()],
        &array![[1.0]],
        13,
        50,
        &SamplerConfig::seeded(),
    )
    .unwrap();

    let mut gbm = GeometricBrownianMotion::from_environment("gbm_a", &market_environment(36.0, 0.2, 60), true).unwrap();
    gbm.context_mut()
        .attach_correlation(shared.register("gbm_a").unwrap())
        .unwrap();

    assert!(matches!(
        gbm.generate_paths(&GenerationConfig::default()),
        Err(SdeError::InvalidInput { .. })
    ));
}

#[test]
fn test_parallel_independent_runs_match_sequential() {
    let env = market_environment(36.0, 0.25, 2_000);
    let mut batch: Vec<GeometricBrownianMotion> = (0..4)
        .map(|i| GeometricBrownianMotion::from_environment(format!("gbm_{}", i), &env, false).unwrap())
        .collect();
    simulate_all(&mut batch, &GenerationConfig::seeded()).unwrap();

    let mut single = GeometricBrownianMotion::from_environment("single", &env, false).unwrap();
    single.generate_paths(&GenerationConfig::seeded()).unwrap();

    for gbm in &batch {
        assert_eq!(gbm.context().instrument_values(), single.context().instrument_values());
    }
}
