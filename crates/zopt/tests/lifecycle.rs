#![allow(clippy::float_cmp)]

use std::time::Duration;

use zopt::{
    Expr, ModelError, ParamCategory, Problem, SolveOptions, SolverConfig, Stage, Status, VarKind,
    VariableSpec, WarmStart, WarmStartError,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

/// maximize 5a + 4b + 3c
/// s.t. 2a + 3b + c <= 5, 4a + b + 2c <= 11, 3a + 4b + 2c <= 8
/// Optimum 13 at (2, 0, 1).
fn knapsack() -> (Problem, Vec<zopt::Variable>) {
    let mut p = Problem::new();
    let vars: Vec<_> = [5.0, 4.0, 3.0]
        .into_iter()
        .map(|c| {
            p.variable(VariableSpec::integer().upper(10.0).coefficient(c))
                .unwrap()
        })
        .collect();
    let (a, b, c) = (vars[0], vars[1], vars[2]);
    p.add_constraint((2.0 * a + 3.0 * b + c).le_scalar(5.0).unwrap())
        .unwrap();
    p.add_constraint((4.0 * a + b + 2.0 * c).le_scalar(11.0).unwrap())
        .unwrap();
    p.add_constraint((3.0 * a + 4.0 * b + 2.0 * c).le_scalar(8.0).unwrap())
        .unwrap();
    (p, vars)
}

#[test]
fn test_knapsack_optimum() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let (mut p, vars) = knapsack();
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::Optimal);
    assert!(close(solution.objective_value(), 13.0));
    let values: Vec<f64> = vars.iter().map(|v| solution[*v]).collect();
    assert!(close(values[0], 2.0) && close(values[1], 0.0) && close(values[2], 1.0));
}

#[test]
fn test_constant_in_max_and_min() {
    let mut p = Problem::new();
    let x = p.create_variable(VarKind::Continuous, 0.0, 2.0, 0.0).unwrap();
    let objective = x + 5.0;

    let max = p
        .maximize(SolveOptions::new().with_objective(objective.clone()))
        .unwrap();
    assert!(close(max.objective_value(), 7.0));

    // Solving again without an explicit restart is allowed.
    let again = p
        .maximize(SolveOptions::new().with_objective(objective.clone()))
        .unwrap();
    assert!(close(again.objective_value(), 7.0));
    assert!(!p.is_current(&max));
    assert!(p.is_current(&again));

    let min = p
        .minimize(SolveOptions::new().with_objective(objective))
        .unwrap();
    assert!(close(min.objective_value(), 5.0));
    assert!(close(min[x], 0.0));
}

#[test]
fn test_bounded_variable_objective() {
    let mut p = Problem::new();
    let x = p
        .variable(VariableSpec::continuous().bounds(1.0, 4.0).coefficient(2.0))
        .unwrap();

    let max = p.maximize(SolveOptions::new()).unwrap();
    assert!(close(max.objective_value(), 8.0));
    assert!(close(max.value(x).unwrap(), 4.0));

    let min = p.minimize(SolveOptions::new()).unwrap();
    assert!(close(min.objective_value(), 2.0));
}

#[test]
fn test_negative_and_free_variables() {
    let mut p = Problem::new();
    let x = p.variable(VariableSpec::continuous().free()).unwrap();
    let y = p
        .variable(VariableSpec::integer().bounds(-5.0, -1.0))
        .unwrap();
    p.add_constraint((x - y).between(-2.0, 3.0).unwrap())
        .unwrap();

    let solution = p
        .minimize(SolveOptions::new().with_objective(x + y))
        .unwrap();
    assert_eq!(solution.status(), Status::Optimal);
    // x >= y - 2 with y = -5 gives x = -7
    assert!(close(solution[y], -5.0));
    assert!(close(solution[x], -7.0));
    assert!(close(solution.objective_value(), -12.0));
}

#[test]
fn test_equality_constraint() {
    let mut p = Problem::new();
    let x = p.variable(VariableSpec::continuous()).unwrap();
    let y = p.variable(VariableSpec::continuous()).unwrap();
    p.add_constraint((x + y).eq_scalar(10.0).unwrap()).unwrap();
    p.add_constraint(x.ge_expr(&(2.0 * y)).unwrap()).unwrap();

    let solution = p
        .minimize(SolveOptions::new().with_objective(x))
        .unwrap();
    assert!(close(solution[x], 20.0 / 3.0));
    assert!(close(solution.evaluate(&(x + y)).unwrap(), 10.0));
}

#[test]
fn test_binary_variables() {
    let mut p = Problem::new();
    let picks: Vec<_> = [(3.0, 4.0), (4.0, 5.0), (2.0, 3.0)]
        .into_iter()
        .map(|(weight, value)| {
            let v = p
                .variable(VariableSpec::binary().coefficient(value))
                .unwrap();
            (v, weight)
        })
        .collect();
    let weight: Expr = picks.iter().map(|(v, w)| *w * *v).sum();
    p.add_constraint(weight.le_scalar(6.0).unwrap()).unwrap();

    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::Optimal);
    assert!(close(solution.objective_value(), 8.0));
    for (v, _) in &picks {
        let value = solution[*v];
        assert!(close(value, 0.0) || close(value, 1.0));
    }
}

#[test]
fn test_feasible_warm_start() {
    let (mut p, vars) = knapsack();
    let start: WarmStart = vars.iter().map(|v| (*v, 0.0)).collect();
    let solution = p
        .maximize(SolveOptions::new().with_warm_start(start))
        .unwrap();
    assert_eq!(solution.status(), Status::Optimal);
    assert!(close(solution.objective_value(), 13.0));
    assert!(solution.solutions_found() >= 2);
}

#[test]
fn test_partial_warm_start_fills_zeros() {
    let (mut p, vars) = knapsack();
    // (1, 0, 0) is feasible once b and c default to zero
    let start = WarmStart::new().with(vars[0], 1.0);
    let solution = p
        .maximize(SolveOptions::new().with_warm_start(start))
        .unwrap();
    assert!(close(solution.objective_value(), 13.0));
}

#[test]
fn test_warm_start_violating_row_is_rejected() {
    let (mut p, vars) = knapsack();
    let start = WarmStart::new().with(vars[1], 2.0);
    let err = p
        .maximize(SolveOptions::new().with_warm_start(start))
        .unwrap_err();
    match err {
        ModelError::InvalidWarmStart(WarmStartError::Rejected { violations }) => {
            assert!(!violations.is_empty());
        }
        other => panic!("Expected rejected warm start, got {other:?}"),
    }
    assert_eq!(p.stage(), Stage::Building);
}

#[test]
fn test_foreign_warm_start_variable() {
    let mut p = Problem::new();
    let mut q = Problem::new();
    p.variable(VariableSpec::default()).unwrap();
    let foreign = q.variable(VariableSpec::default()).unwrap();

    let err = p
        .maximize(SolveOptions::new().with_warm_start(WarmStart::new().with(foreign, 0.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::InvalidWarmStart(WarmStartError::ForeignVariable { .. })
    ));
}

#[test]
fn test_stage_violation_after_solve() {
    let mut p = Problem::new();
    let x = p
        .create_variable(VarKind::Integer, 0.0, 3.0, 1.0)
        .unwrap();
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert!(solution.is_optimal());

    let err = p.variable(VariableSpec::default()).unwrap_err();
    assert_eq!(err.code(), "STAGE_VIOLATION");
    assert!(matches!(
        p.add_constraint(x.le_scalar(1.0).unwrap()),
        Err(ModelError::StageViolation { stage: Stage::Solved, .. })
    ));
    assert!(p.set_objective_coefficient(x, 2.0).is_err());
    assert!(p.set_branch_priority(x, 1).is_err());

    p.restart();
    assert!(p.variable(VariableSpec::default()).is_ok());
    assert!(p.add_constraint(x.le_scalar(1.0).unwrap()).is_ok());
}

#[test]
fn test_restart_is_idempotent() {
    let (mut p, _) = knapsack();
    p.maximize(SolveOptions::new()).unwrap();

    p.restart();
    let after_first = (p.stage(), p.num_variables(), p.num_constraints(), p.generation());
    p.restart();
    let after_second = (p.stage(), p.num_variables(), p.num_constraints(), p.generation());

    assert_eq!(after_first, after_second);
    assert_eq!(after_first.0, Stage::Building);
    assert_eq!((after_first.1, after_first.2), (3, 3));
}

#[test]
fn test_configure_only_while_building() {
    let (mut p, _) = knapsack();
    let config = SolverConfig::new()
        .with_param(ParamCategory::NodeSelection, "rule", "depth_first")
        .with_param(ParamCategory::Branching, "rule", "first_fractional");
    p.configure(config.clone()).unwrap();
    assert_eq!(p.config(), &config);

    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert!(close(solution.objective_value(), 13.0));

    let err = p.configure(SolverConfig::new()).unwrap_err();
    assert_eq!(
        err,
        ModelError::StageViolation {
            operation: "configure",
            stage: Stage::Solved,
        }
    );

    // configuration survives a restart
    p.restart();
    assert_eq!(p.config(), &config);
}

#[test]
fn test_limit_reported_as_other() {
    let (mut p, vars) = knapsack();
    p.configure(SolverConfig::new().with_solution_limit(1))
        .unwrap();
    let start: WarmStart = vars.iter().map(|v| (*v, 0.0)).collect();

    let solution = p
        .maximize(SolveOptions::new().with_warm_start(start))
        .unwrap();
    assert_eq!(solution.status(), Status::Other);
    assert!(!solution.is_optimal());
    assert!(solution.has_values());
    assert!(close(solution.objective_value(), 0.0));
}

#[test]
fn test_zero_time_limit_stops_immediately() {
    let (mut p, _) = knapsack();
    p.configure(SolverConfig::new().with_time_limit(Duration::ZERO))
        .unwrap();
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::Other);
    assert!(!solution.has_values());
    assert_eq!(solution.nodes(), 0);
}

/// maximize x + y + z s.t. 2x + 2y + 2z <= 7, all integer.
/// Relaxation bound 3.5, integer optimum 3; needs real branching.
fn odd_capacity(config: SolverConfig) -> Problem {
    let mut p = Problem::new();
    let vars: Vec<_> = (0..3)
        .map(|_| p.variable(VariableSpec::integer().coefficient(1.0)).unwrap())
        .collect();
    let row: Expr = vars.iter().map(|v| 2.0 * *v).sum();
    p.add_constraint(row.le_scalar(7.0).unwrap()).unwrap();
    p.configure(config).unwrap();
    p
}

#[test]
fn test_node_limit_stops_before_incumbent() {
    let mut p = odd_capacity(SolverConfig::new().with_node_limit(1));
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::Other);
    assert!(!solution.has_values());
    assert_eq!(solution.nodes(), 1);
}

#[test]
fn test_relative_gap_stops_with_incumbent() {
    let mut p = odd_capacity(SolverConfig::new().with_gap(0.5));
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::Other);
    assert!(solution.has_values());
    assert!(close(solution.objective_value(), 3.0));
}

#[test]
fn test_absolute_gap_stops_with_incumbent() {
    let mut p = odd_capacity(SolverConfig::new().with_absolute_gap(0.6));
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::Other);
    assert!(solution.has_values());
    assert!(close(solution.objective_value(), 3.0));
}

#[test]
fn test_zero_gap_proves_optimality() {
    let mut p = odd_capacity(SolverConfig::new().with_gap(0.0));
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::Optimal);
    assert!(close(solution.objective_value(), 3.0));

    let mut unlimited = odd_capacity(SolverConfig::new());
    let full = unlimited.maximize(SolveOptions::new()).unwrap();
    assert!(solution.nodes() <= full.nodes());
}

#[test]
fn test_remove_constraint_after_solve() {
    let mut p = Problem::new();
    let x = p
        .create_variable(VarKind::Continuous, 0.0, 3.0, 1.0)
        .unwrap();
    let cap = p.add_constraint(x.le_scalar(1.0).unwrap()).unwrap();

    let capped = p.maximize(SolveOptions::new()).unwrap();
    assert!(close(capped.objective_value(), 1.0));

    let removed = p.remove_constraint(cap).unwrap();
    assert_eq!(removed.upper(), 1.0);
    assert_eq!(p.stage(), Stage::Building);
    assert_eq!(p.num_constraints(), 0);

    let free = p.maximize(SolveOptions::new()).unwrap();
    assert!(close(free.objective_value(), 3.0));
}

#[test]
fn test_foreign_constraint_handle() {
    let mut p = Problem::new();
    let mut q = Problem::new();
    let y = q.variable(VariableSpec::default()).unwrap();
    let handle = q.add_constraint(y.le_scalar(1.0).unwrap()).unwrap();

    let err = p.remove_constraint(handle).unwrap_err();
    assert_eq!(err.code(), "OWNERSHIP_VIOLATION");
    assert_eq!(q.num_constraints(), 1);
}

#[test]
fn test_ownership_is_checked() {
    let mut p = Problem::new();
    let mut q = Problem::new();
    let x = p.variable(VariableSpec::default()).unwrap();
    let y = q.variable(VariableSpec::default()).unwrap();

    // constraint built only from q's variable
    let err = p.add_constraint(y.le_scalar(1.0).unwrap()).unwrap_err();
    assert_eq!(
        err,
        ModelError::OwnershipViolation {
            expected: p.id(),
            found: q.id(),
        }
    );

    // mixing both problems fails before any problem sees it
    let err = (x + y).le_scalar(1.0).unwrap_err();
    assert_eq!(err.code(), "OWNERSHIP_VIOLATION");

    // objective from the other problem
    let err = p
        .maximize(SolveOptions::new().with_objective(y * 2.0))
        .unwrap_err();
    assert_eq!(err.code(), "OWNERSHIP_VIOLATION");
    assert_eq!(p.stage(), Stage::Building);
    assert_eq!(p.num_constraints(), 0);
}

#[test]
fn test_infeasible_constraint_is_rejected_at_construction() {
    let mut p = Problem::new();
    let x = p.variable(VariableSpec::default()).unwrap();

    let err = x.ge_scalar(3.0).and_then(|c| c.le(1.0)).unwrap_err();
    assert!(matches!(err, ModelError::InfeasibleConstraint { .. }));
    assert!((x - x).ge_scalar(1.0).is_err());
    assert_eq!(p.num_constraints(), 0);

    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert!(solution.is_optimal());
}

#[test]
fn test_branch_priority_does_not_change_optimum() {
    let (mut p, vars) = knapsack();
    p.set_branch_priority(vars[2], 10).unwrap();
    assert_eq!(p.variable_info(vars[2]).unwrap().branch_priority, 10);
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert!(close(solution.objective_value(), 13.0));
}

#[test]
fn test_integer_unbounded_relaxation() {
    let mut p = Problem::new();
    p.variable(VariableSpec::integer().coefficient(1.0))
        .unwrap();
    let solution = p.maximize(SolveOptions::new()).unwrap();
    assert_eq!(solution.status(), Status::InfeasibleOrUnbounded);
    assert!(solution.is_infeasible_or_unbounded());
    assert!(!solution.is_optimal());
}

#[test]
fn test_unbounded_minimize_reports_negative_infinity() {
    let mut p = Problem::new();
    let x = p.variable(VariableSpec::continuous().free()).unwrap();
    let solution = p
        .minimize(SolveOptions::new().with_objective(x))
        .unwrap();
    assert!(solution.is_unbounded());
    assert_eq!(solution.objective_value(), f64::NEG_INFINITY);
}
