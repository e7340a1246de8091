// demos/error_handling_demo.rs
use chrono::NaiveDate;
use dx_sim::frame::{get_year_deltas, ConstantShortRate, MarketEnvironment};
use dx_sim::rng::{sn_random_matrix, SamplerConfig, VarianceReduction};
use dx_sim::simulation::{GenerationConfig, GeometricBrownianMotion, ParameterUpdate, PathSimulator};

fn main() {
    println!("Error Handling Demo for dx-sim");
    println!("==============================\n");

    let pricing_date = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");

    // Test 1: Negative short rate
    println!("1. Testing negative short rate...");
    match ConstantShortRate::new("csr", -0.01) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: Empty date list
    println!("\n2. Testing empty date list...");
    match get_year_deltas(&[]) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 3: Missing market data
    println!("\n3. Testing incomplete market environment...");
    let mut env = MarketEnvironment::new("me_gbm", pricing_date);
    env.add_constant("initial_value", 36.0);
    match GeometricBrownianMotion::from_environment("gbm", &env, false) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 4: Single-date time grid
    println!("\n4. Testing final date equal to pricing date...");
    env.add_constant("volatility", 0.2);
    env.add_constant("final_date", pricing_date);
    env.add_constant("frequency", "M");
    env.add_constant("paths", 1_000i64);
    env.add_curve(
        "discount_curve",
        ConstantShortRate::new("csr", 0.06).expect("non-negative rate"),
    );
    let mut gbm = GeometricBrownianMotion::from_environment("gbm", &env, false)
        .expect("Valid market environment");
    match gbm.generate_paths(&GenerationConfig::default()) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 5: Rejected update leaves state untouched
    println!("\n5. Testing negative volatility update...");
    match gbm.update(ParameterUpdate::default().volatility(-0.1)) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!(
            "   ✓ Caught error: {} (volatility still {})",
            e,
            gbm.context().volatility()
        ),
    }

    // Test 6: Correlated model without shared random numbers
    println!("\n6. Testing correlated model without correlation context...");
    env.add_constant("final_date", NaiveDate::from_ymd_opt(2020, 12, 31).expect("valid date"));
    let mut correlated = GeometricBrownianMotion::from_environment("gbm", &env, true)
        .expect("Valid market environment");
    match correlated.generate_paths(&GenerationConfig::default()) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 7: Degenerate moment matching
    println!("\n7. Testing moment matching on a single draw...");
    let cfg = SamplerConfig {
        reduction: VarianceReduction::MOMENT_MATCHING,
        fixed_seed: true,
    };
    match sn_random_matrix(1, 1, &cfg) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\nAll error cases handled.");
}
