// demos/correlated_demo.rs
use chrono::NaiveDate;
use dx_sim::frame::{ConstantShortRate, MarketEnvironment};
use dx_sim::rng::SamplerConfig;
use dx_sim::simulation::{
    build_time_grid, simulate_all, CorrelationContext, Frequency, GenerationConfig,
    GeometricBrownianMotion, PathSimulator,
};
use ndarray::array;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pricing_date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    let final_date = NaiveDate::from_ymd_opt(2021, 12, 31).expect("valid date");
    let paths = 50_000;

    // One grid for every risk factor so the shared cube lines up.
    let grid = build_time_grid(pricing_date, final_date, Frequency::QuarterEnd, &[])
        .expect("valid grid");

    let names = vec!["equity".to_string(), "commodity".to_string()];
    let shared = CorrelationContext::new(
        names.clone(),
        &array![[1.0, -0.4], [-0.4, 1.0]],
        grid.len(),
        paths,
        &SamplerConfig::seeded(),
    )
    .expect("valid correlation set-up");

    let mut models: Vec<GeometricBrownianMotion> = names
        .iter()
        .zip([(100.0, 0.25), (60.0, 0.4)])
        .map(|(name, (s0, vol))| {
            let mut env = MarketEnvironment::new(format!("me_{}", name), pricing_date);
            env.add_constant("initial_value", s0);
            env.add_constant("volatility", vol);
            env.add_constant("final_date", final_date);
            env.add_constant("frequency", "Q");
            env.add_constant("paths", paths as i64);
            env.add_list("time_grid", grid.clone());
            env.add_curve(
                "discount_curve",
                ConstantShortRate::new("csr", 0.03).expect("non-negative rate"),
            );

            let mut gbm = GeometricBrownianMotion::from_environment(name.as_str(), &env, true)
                .expect("Valid market environment");
            gbm.context_mut()
                .attach_correlation(shared.register(name).expect("registered factor"))
                .expect("correlated context");
            gbm
        })
        .collect();

    simulate_all(&mut models, &GenerationConfig::default()).expect("Path generation succeeds");

    println!("Correlated GBM demo ({} paths, {} grid points)", paths, grid.len());
    for gbm in &models {
        let values = gbm.context().instrument_values().expect("paths generated");
        let terminal = values.row(values.nrows() - 1);
        println!(
            "  {:<10} S0 = {:>7.2}  E[S_T] = {:>8.4}",
            gbm.context().name(),
            gbm.context().initial_value(),
            terminal.mean().unwrap_or(f64::NAN)
        );
    }
}
