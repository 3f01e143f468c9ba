//! rigsim Headless Simulation Harness
//!
//! Validates component logic and configuration data end to end.
//! Runs entirely in-process — no host engine, no rendering.
//!
//! Usage:
//!   cargo run -p rigsim-simtest
//!   cargo run -p rigsim-simtest -- --verbose

use rigsim_core::prelude::*;
use rigsim_logic::{BufferQueryError, ResourceBuffer};
use std::collections::HashSet;
use tracing_subscriber::filter::LevelFilter;

// ── Component configurations (shared data file) ─────────────────────────
const COMPONENTS_JSON: &str = include_str!("../../../data/components.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    if verbose {
        init_logging();
    }
    println!("=== rigsim Simulation Harness ===\n");

    let configs = match load_configs() {
        Ok(configs) => {
            log::info!("loaded {} component configs", configs.len());
            configs
        }
        Err(e) => {
            println!("  ✗ components_parse: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Configuration data
    results.extend(validate_configs(&configs));

    // 2. Buffer arithmetic sweep
    results.extend(validate_buffer_arithmetic());

    // 3. Burn until starved, then recover
    results.extend(validate_starvation_and_recovery(&configs));

    // 4. Overflow accounting
    results.extend(validate_overflow(&configs));

    // 5. Wear roller
    results.extend(validate_wear(&configs));

    // 6. Query errors
    results.extend(validate_queries(&configs));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Route `log` records from the library crates to stderr.
fn init_logging() {
    let result = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        eprintln!("logging unavailable: {}", e);
    }
}

fn load_configs() -> Result<Vec<ComponentConfig>, serde_json::Error> {
    serde_json::from_str(COMPONENTS_JSON)
}

fn config_named<'a>(configs: &'a [ComponentConfig], name: &str) -> Option<&'a ComponentConfig> {
    configs.iter().find(|c| c.name == name)
}

fn missing(name: &str, component: &str) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: format!("no '{}' in components.json", component),
    }
}

fn spawn_failed(name: &str, error: EngineError) -> TestResult {
    TestResult {
        name: name.into(),
        passed: false,
        detail: error.to_string(),
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_configs(configs: &[ComponentConfig]) -> Vec<TestResult> {
    println!("--- Component Configurations ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "configs_not_empty".into(),
        passed: !configs.is_empty(),
        detail: format!("{} components loaded", configs.len()),
    });

    let invalid: Vec<String> = configs
        .iter()
        .filter_map(|c| c.validate().err().map(|e| format!("{}: {}", c.name, e)))
        .collect();
    results.push(TestResult {
        name: "configs_valid".into(),
        passed: invalid.is_empty(),
        detail: if invalid.is_empty() {
            "all configurations validate".into()
        } else {
            invalid.join("; ")
        },
    });

    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = configs
        .iter()
        .filter(|c| !seen.insert(c.name.as_str()))
        .map(|c| c.name.as_str())
        .collect();
    results.push(TestResult {
        name: "configs_unique_names".into(),
        passed: duplicates.is_empty(),
        detail: if duplicates.is_empty() {
            "all component names unique".into()
        } else {
            format!("duplicate names: {}", duplicates.join(", "))
        },
    });

    let with_inputs = configs.iter().filter(|c| !c.inputs.is_empty()).count();
    results.push(TestResult {
        name: "configs_have_inputs".into(),
        passed: with_inputs == configs.len(),
        detail: format!("{}/{} components consume something", with_inputs, configs.len()),
    });

    let with_wear = configs
        .iter()
        .filter(|c| !c.wear_schedule().is_inert())
        .count();
    results.push(TestResult {
        name: "configs_wear_schedules".into(),
        passed: with_wear > 0,
        detail: format!("{} components carry a wear schedule", with_wear),
    });

    results
}

// ── 2. Buffer arithmetic ────────────────────────────────────────────────

fn validate_buffer_arithmetic() -> Vec<TestResult> {
    println!("--- Buffer Arithmetic ---");
    let mut results = Vec::new();

    let capacity = 10.0;
    let mut violations = 0;
    let mut cases = 0;
    for start_step in 0..=20 {
        let start = start_step as f32 * 0.5;
        for delta_step in -30..=30 {
            let amount = delta_step as f32 * 0.5;
            let mut buffer = ResourceBuffer::new(ResourceType::Fuel, capacity).with_level(start);
            let overflow = buffer.apply_delta(amount);
            cases += 1;

            let bounded = (0.0..=capacity).contains(&buffer.level());
            let reconciles = ((start + amount) - (buffer.level() + overflow)).abs() < 1e-4;
            let zero_iff_fits = (overflow == 0.0) == (0.0..=capacity).contains(&(start + amount));
            if !(bounded && reconciles && zero_iff_fits) {
                violations += 1;
            }
        }
    }
    results.push(TestResult {
        name: "buffer_clamp_and_reconcile".into(),
        passed: violations == 0,
        detail: format!("{} cases, {} violations", cases, violations),
    });

    results
}

// ── 3. Starvation & recovery ────────────────────────────────────────────

fn validate_starvation_and_recovery(configs: &[ComponentConfig]) -> Vec<TestResult> {
    println!("--- Starvation & Recovery ---");
    let mut results = Vec::new();

    let Some(config) = config_named(configs, "Auxiliary Generator") else {
        results.push(missing("starvation", "Auxiliary Generator"));
        return results;
    };
    let Some(fuel) = config.inputs.first() else {
        results.push(missing("starvation", "Auxiliary Generator input"));
        return results;
    };

    let mut engine = SimulationEngine::new();
    let generator = match engine.spawn(config) {
        Ok(entity) => entity,
        Err(e) => {
            results.push(spawn_failed("starvation", e));
            return results;
        }
    };
    let _ = engine.switch_on(generator);

    let mut ticks = 0u32;
    while engine.failed_components().is_empty() && ticks < 10_000 {
        engine.tick();
        ticks += 1;
    }

    let expected =
        ((fuel.initial_level - fuel.minimum_operational) / fuel.rate_per_tick).floor() as u32 + 2;
    results.push(TestResult {
        name: "starvation_tick".into(),
        passed: ticks == expected,
        detail: format!("failed on tick {} (expected {})", ticks, expected),
    });

    let failure = engine
        .journal()
        .failures_for(generator)
        .next()
        .map(|r| r.code());
    results.push(TestResult {
        name: "starvation_reason".into(),
        passed: failure.as_deref() == Some("LowOrZeroResource:Fuel,Auxiliary Generator"),
        detail: format!("{:?}", failure),
    });

    let _ = engine.replenish(generator, ResourceType::Fuel, fuel.capacity);
    engine.tick();
    let recovered = engine.state(generator) == Ok(ComponentState::Idle);
    engine.tick();
    let running = engine.state(generator) == Ok(ComponentState::Active);
    results.push(TestResult {
        name: "recovery_after_replenish".into(),
        passed: recovered && running,
        detail: format!("recovered={} running={}", recovered, running),
    });

    let _ = engine.switch_off(generator);
    let last: Vec<ComponentEvent> = engine
        .drain_journal()
        .into_iter()
        .rev()
        .take(1)
        .map(|e| e.event)
        .collect();
    results.push(TestResult {
        name: "switch_off_deactivates".into(),
        passed: last == vec![ComponentEvent::Deactivated],
        detail: format!("{:?}", last),
    });

    results
}

// ── 4. Overflow ─────────────────────────────────────────────────────────

fn validate_overflow(configs: &[ComponentConfig]) -> Vec<TestResult> {
    println!("--- Overflow Accounting ---");
    let mut results = Vec::new();

    let Some(config) = config_named(configs, "Radiator") else {
        results.push(missing("overflow", "Radiator"));
        return results;
    };

    let mut engine = SimulationEngine::new();
    let radiator = match engine.spawn(config) {
        Ok(entity) => entity,
        Err(e) => {
            results.push(spawn_failed("overflow", e));
            return results;
        }
    };
    let _ = engine.switch_on(radiator);

    let ticks = 10;
    engine.run(ticks);

    // Every coolant buffer gets pushed by -rate each tick; anything past capacity spills
    let expected: f32 = config
        .inputs
        .iter()
        .filter(|b| b.resource_type == ResourceType::Coolant)
        .map(|b| (b.initial_level - b.rate_per_tick * ticks as f32 - b.capacity).max(0.0))
        .sum();
    let surplus = engine
        .overflow(radiator)
        .map(|l| l.surplus(ResourceType::Coolant))
        .unwrap_or(f32::NAN);
    results.push(TestResult {
        name: "overflow_summed_per_type".into(),
        passed: (surplus - expected).abs() < 1e-3,
        detail: format!("surplus {:.2} (expected {:.2})", surplus, expected),
    });

    results
}

// ── 5. Wear ─────────────────────────────────────────────────────────────

fn wear_run(config: &ComponentConfig, seed: u64, ticks: u32) -> Vec<(u64, String)> {
    let mut engine = SimulationEngine::new().with_wear(seed);
    if let Ok(entity) = engine.spawn(config) {
        let _ = engine.switch_on(entity);
    }
    let mut failures = Vec::new();
    for _ in 0..ticks {
        engine.tick();
        for entry in engine.drain_journal() {
            if let ComponentEvent::Failed(reason) = entry.event {
                if reason.is_wear() {
                    failures.push((entry.tick, reason.code()));
                }
            }
        }
    }
    failures
}

fn validate_wear(configs: &[ComponentConfig]) -> Vec<TestResult> {
    println!("--- Wear Roller ---");
    let mut results = Vec::new();

    let Some(config) = configs.iter().find(|c| !c.wear_schedule().is_inert()) else {
        results.push(missing("wear", "component with a wear schedule"));
        return results;
    };

    let a = wear_run(config, 7, 150);
    let b = wear_run(config, 7, 150);
    results.push(TestResult {
        name: "wear_deterministic".into(),
        passed: a == b,
        detail: format!("{} wear failure(s) in both runs", a.len()),
    });

    let mut engine = SimulationEngine::new();
    let inert_ok = match engine.spawn(config) {
        Ok(entity) => {
            let _ = engine.switch_on(entity);
            engine.run(150);
            engine
                .failed_components()
                .iter()
                .all(|(_, reason)| !reason.is_wear())
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "wear_inert_without_roller".into(),
        passed: inert_ok,
        detail: "no wear failures when rolling is disabled".into(),
    });

    results
}

// ── 6. Queries ──────────────────────────────────────────────────────────

fn validate_queries(configs: &[ComponentConfig]) -> Vec<TestResult> {
    println!("--- Buffer Queries ---");
    let mut results = Vec::new();

    let bad_direction = "upstream".parse::<BufferDirection>();
    results.push(TestResult {
        name: "direction_invalid_argument".into(),
        passed: matches!(bad_direction, Err(BufferQueryError::InvalidArgument(_))),
        detail: format!("{:?}", bad_direction),
    });

    let mut engine = SimulationEngine::new();
    let mut mismatches = Vec::new();
    for config in configs {
        let Ok(entity) = engine.spawn(config) else {
            continue;
        };
        for (direction, buffers) in [
            (BufferDirection::Input, &config.inputs),
            (BufferDirection::Output, &config.outputs),
        ] {
            for buffer in buffers {
                match engine.buffer_level(entity, buffer.resource_type, direction) {
                    Ok((_, capacity)) if capacity > 0.0 => {}
                    other => mismatches.push(format!("{}/{}: {:?}", config.name, direction, other)),
                }
            }
        }
    }
    results.push(TestResult {
        name: "buffer_levels_queryable".into(),
        passed: mismatches.is_empty(),
        detail: if mismatches.is_empty() {
            format!("{} components queried", engine.component_count())
        } else {
            mismatches.join("; ")
        },
    });

    results
}
