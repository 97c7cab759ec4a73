//! QALX CLI — key derivation, gate validation and mesh propagation
//!
//! Commands:
//!   qalx metrics   — print the initialised metrics record for a modulation vector
//!   qalx derive    — derive a key and print the signed metrics record
//!   qalx validate  — run the security gate and print its report
//!   qalx mesh      — build a mesh, propagate, validate and revoke

use qalx_core::entropy::{sign, KeyDerivationEngine};
use qalx_core::mesh::MeshNetwork;
use qalx_core::metrics::{MetricsRecord, ModulationVector, TagValidator};
use qalx_core::scoring::SecurityGate;
use qalx_core::QalxConfig;
use serde::Serialize;
use std::env;
use std::process::ExitCode;

fn print_usage() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║        QALX — entropy-mixed keys + trust mesh                ║
╚══════════════════════════════════════════════════════════════╝

Usage: qalx <command> [options]

Commands:
  metrics   [--emotion T] [--intensity F] [--ethics F]         Print initialised metrics
  derive    [--emotion T] [--intensity F] [--ethics F]
            [--mesh-score F]                                   Derive a key and sign the record
  validate  [--emotion T] [--intensity F] [--ethics F]
            [--resonance F] [--mesh-score F]                   Run the security gate
  mesh      [--nodes N]                                        Mesh propagation demo

Defaults: --emotion joy --intensity 1.0 --ethics 0.9 --resonance 1.0
Set QALX_CONFIG to a JSON file to override thresholds.

Examples:
  qalx derive --emotion trust --intensity 0.95 --ethics 1.0
  qalx validate --emotion trust --intensity 0.8 --resonance 0.4
  qalx mesh --nodes 5
"#
    );
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let config = match QalxConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("  {}", e);
            return ExitCode::from(2);
        }
    };

    let result = match args[1].as_str() {
        "metrics" => cmd_metrics(&args[2..]),
        "derive" => cmd_derive(&args[2..], &config),
        "validate" => cmd_validate(&args[2..], &config),
        "mesh" => cmd_mesh(&args[2..], &config),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            Err(String::new())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("  {}", msg);
            }
            ExitCode::FAILURE
        }
    }
}

/// Value following `name` in the argument list
fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn float_flag(args: &[String], name: &str, default: f64) -> Result<f64, String> {
    match flag(args, name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("{} must be a number, got '{}'", name, raw)),
        None => Ok(default),
    }
}

fn vector_from_args(args: &[String]) -> Result<ModulationVector, String> {
    let emotion = flag(args, "--emotion").unwrap_or("joy");
    let intensity = float_flag(args, "--intensity", 1.0)?;
    let ethics = float_flag(args, "--ethics", 0.9)?;
    Ok(ModulationVector::now(emotion, intensity, ethics))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn cmd_metrics(args: &[String]) -> Result<(), String> {
    let vector = vector_from_args(args)?;
    let verdict = TagValidator::default().validate(&vector);
    println!("\n  Tag '{}': {}", vector.tag, verdict.reason);
    print_json(&MetricsRecord::with_vector(&vector))
}

fn cmd_derive(args: &[String], config: &QalxConfig) -> Result<(), String> {
    let vector = vector_from_args(args)?;
    let mesh_score = float_flag(args, "--mesh-score", config.default_mesh_score)?;
    let engine = KeyDerivationEngine::from_config(config).map_err(|e| e.to_string())?;

    let mut metrics = MetricsRecord::with_vector(&vector);
    let key = engine
        .derive_key(&metrics, &vector, mesh_score)
        .map_err(|e| e.to_string())?;
    metrics.signature = sign(&key);
    metrics.key_length = key.len();

    println!("\n  Derived {} byte key, pool {}", key.len(), engine.pool().fingerprint());
    println!("  Key (hex): {}", hex::encode(&key));
    print_json(&metrics)
}

fn cmd_validate(args: &[String], config: &QalxConfig) -> Result<(), String> {
    let vector = vector_from_args(args)?;
    let resonance = float_flag(args, "--resonance", 1.0)?;
    let mesh_score = float_flag(args, "--mesh-score", config.default_mesh_score)?;

    let metrics = MetricsRecord::with_vector(&vector);
    let report = SecurityGate::from_config(config).evaluate(&metrics, resonance, &vector, mesh_score);
    print_json(&report)?;
    if report.passed {
        println!("\n  Gate passed");
        Ok(())
    } else {
        Err("Security gate failed".to_string())
    }
}

fn cmd_mesh(args: &[String], config: &QalxConfig) -> Result<(), String> {
    let count: usize = match flag(args, "--nodes") {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("--nodes must be a positive integer, got '{}'", raw))?,
        None => 3,
    };
    if count < 2 {
        return Err("--nodes must be at least 2".to_string());
    }

    let net = MeshNetwork::new(config);
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let vector = ModulationVector::now("trust", 1.0, 1.0);
        // vary amplitude so every node carries a distinct fingerprint
        let mut metrics = MetricsRecord::with_vector(&vector);
        metrics.amplitude = 1.0 - i as f64 * 0.01;
        let node = net.admit(metrics).map_err(|e| e.to_string())?;
        println!("  Admitted node {} pattern={}", node.id, node.pattern);
        ids.push(node.id);
    }
    println!("  {}", net.summary());

    for pair in ids.windows(2) {
        net.propagate_metrics(&pair[0], &pair[1])
            .map_err(|e| e.to_string())?;
    }
    println!("  Propagated metrics along {} links", ids.len() - 1);

    let results = net.validate_all_nodes();
    let failed = results.values().filter(|r| r.is_err()).count();
    println!("  Validated {} nodes, {} failed", results.len(), failed);
    if let Some(memory) = ids.last().and_then(|id| net.validation_memory(id)) {
        println!(
            "  Tail node pass rate {:.2} over {} checks",
            memory.pass_rate(),
            memory.history.len()
        );
    }

    let revoked = net.propagate_revocation(&ids[0]);
    println!("  Revocation propagated from {} to {} nodes", ids[0], revoked);
    println!("  {}", net.summary());

    if failed > 0 {
        return Err(format!("{} nodes failed validation", failed));
    }
    Ok(())
}
