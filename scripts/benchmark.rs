// scripts/benchmark.rs
use chrono::NaiveDate;
use dx_sim::frame::{ConstantShortRate, MarketEnvironment};
use dx_sim::math_utils::Timer;
use dx_sim::rng::{sn_random_numbers, SamplerConfig};
use dx_sim::simulation::{simulate_all, GenerationConfig, GeometricBrownianMotion, PathSimulator};
use std::env;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        SystemInfo {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    paths: usize,
    grid_points: usize,
    time_ms: f64,
    throughput_values_per_sec: f64,
}

impl BenchmarkResult {
    fn new(name: String, paths: usize, grid_points: usize, time_ms: f64) -> Self {
        let values = (paths * grid_points) as f64;
        BenchmarkResult {
            name,
            paths,
            grid_points,
            time_ms,
            throughput_values_per_sec: values / (time_ms / 1000.0),
        }
    }
}

fn market_environment(paths: usize, frequency: &str) -> MarketEnvironment {
    let pricing_date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
    let mut env = MarketEnvironment::new("bench", pricing_date);
    env.add_constant("initial_value", 100.0);
    env.add_constant("volatility", 0.2);
    env.add_constant("final_date", NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid date"));
    env.add_constant("frequency", frequency);
    env.add_constant("paths", paths as i64);
    env.add_curve(
        "discount_curve",
        ConstantShortRate::new("csr", 0.05).expect("non-negative rate"),
    );
    env
}

fn run_sampler_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    for &paths in &[10_000, 100_000, 1_000_000] {
        let steps = 13;
        let mut timer = Timer::new();
        timer.start();
        sn_random_numbers((1, steps, paths), &SamplerConfig::seeded()).expect("Valid shape");
        results.push(BenchmarkResult::new(
            format!("Sampler ({}k paths)", paths / 1000),
            paths,
            steps,
            timer.elapsed_ms(),
        ));
    }
    results
}

fn run_gbm_benchmarks() -> Vec<BenchmarkResult> {
    let mut results = Vec::new();
    for &(paths, frequency) in &[(100_000, "M"), (1_000_000, "M"), (10_000, "D")] {
        println!("Running GBM benchmark with {} paths ({})...", paths, frequency);
        let mut gbm = GeometricBrownianMotion::from_environment("gbm", &market_environment(paths, frequency), false)
            .expect("Valid market environment");

        let mut timer = Timer::new();
        timer.start();
        gbm.generate_paths(&GenerationConfig::seeded())
            .expect("Path generation succeeds");
        let time_ms = timer.elapsed_ms();

        let grid_points = gbm.time_grid().map(|g| g.len()).unwrap_or(0);
        results.push(BenchmarkResult::new(
            format!("GBM {} ({}k paths)", frequency, paths / 1000),
            paths,
            grid_points,
            time_ms,
        ));
    }

    let paths = 100_000;
    let env = market_environment(paths, "M");
    let mut batch: Vec<GeometricBrownianMotion> = (0..8)
        .map(|i| {
            GeometricBrownianMotion::from_environment(format!("gbm_{}", i), &env, false)
                .expect("Valid market environment")
        })
        .collect();
    let mut timer = Timer::new();
    timer.start();
    simulate_all(&mut batch, &GenerationConfig::default()).expect("Path generation succeeds");
    let time_ms = timer.elapsed_ms();
    let grid_points = batch[0].time_grid().map(|g| g.len()).unwrap_or(0);
    results.push(BenchmarkResult::new(
        "GBM batch x8 (100k paths each)".to_string(),
        paths * batch.len(),
        grid_points,
        time_ms,
    ));

    results
}

fn main() {
    println!("dx-sim Benchmark Suite");
    println!("======================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!(
        "  Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    let mut all_results = run_sampler_benchmarks();
    all_results.extend(run_gbm_benchmarks());

    println!("\n{:=<80}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<80}", "");
    println!(
        "{:<35} {:>10} {:>8} {:>12} {:>12}",
        "Benchmark", "Paths", "Points", "Time (ms)", "Values/s"
    );
    println!("{:-<80}", "");
    for result in &all_results {
        println!(
            "{:<35} {:>10} {:>8} {:>12.2} {:>12.0}",
            result.name,
            result.paths,
            result.grid_points,
            result.time_ms,
            result.throughput_values_per_sec
        );
    }
    println!("{:=<80}", "");
    println!("\nRun with: cargo run --bin benchmark --release");
}
