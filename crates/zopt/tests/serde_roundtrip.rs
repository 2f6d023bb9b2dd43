#![cfg(feature = "serde")]

use std::time::Duration;

use zopt::{ParamCategory, Problem, SolveOptions, SolverConfig, Status, VarKind};

#[test]
fn test_config_serializes() {
    let config = SolverConfig::new()
        .with_time_limit(Duration::from_secs(5))
        .with_gap(0.01)
        .with_param(ParamCategory::Branching, "rule", "first_fractional");

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("first_fractional"));
    let back: SolverConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_solution_serializes() {
    let mut p = Problem::new();
    p.create_variable(VarKind::Integer, 0.0, 2.0, 1.0).unwrap();
    let solution = p.maximize(SolveOptions::new()).unwrap();

    let value = serde_json::to_value(&solution).unwrap();
    assert_eq!(value["status"], "Optimal");
    assert_eq!(value["values"][0], 2.0);
    assert_eq!(
        serde_json::from_value::<Status>(value["status"].clone()).unwrap(),
        Status::Optimal
    );
}
