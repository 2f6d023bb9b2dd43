use zopt::{
    Engine, EngineError, EngineOutcome, EngineRequest, ParamCategory, ParamValue, Problem,
    SolveOptions, SolverConfig, Stage, VarKind, VariableSpec, WarmStart,
};
use zopt_engine::ConstraintOp;

/// Engine double that records what the problem hands over.
#[derive(Debug, Default)]
struct RecordingEngine {
    requests: Vec<EngineRequest>,
    configs: Vec<SolverConfig>,
    resets: usize,
    fail: bool,
}

impl Engine for RecordingEngine {
    fn solve(
        &mut self,
        request: &EngineRequest,
        config: &SolverConfig,
    ) -> Result<EngineOutcome, EngineError> {
        self.requests.push(request.clone());
        self.configs.push(config.clone());
        if self.fail {
            return Err(EngineError::DimensionMismatch {
                row: "c0".to_string(),
                expected: 1,
                found: 0,
            });
        }
        let n = request.problem.num_variables();
        Ok(EngineOutcome::optimal(
            vec![0.0; n],
            request.problem.objective.constant,
        ))
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

#[test]
fn test_config_is_forwarded_unchanged() {
    let mut p = Problem::with_engine(RecordingEngine::default());
    p.variable(VariableSpec::default()).unwrap();
    let config = SolverConfig::new()
        .with_gap(0.02)
        .with_param(ParamCategory::Heuristics, "rounding", false)
        .with_param(ParamCategory::Presolving, "rounds", 3_i64);
    p.configure(config.clone()).unwrap();
    p.minimize(SolveOptions::new()).unwrap();

    let seen = &p.engine().configs[0];
    assert_eq!(seen, &config);
    assert_eq!(
        seen.param(ParamCategory::Heuristics, "rounding"),
        Some(&ParamValue::Bool(false))
    );
}

#[test]
fn test_request_materializes_model() {
    let mut p = Problem::with_engine(RecordingEngine::default());
    let x = p
        .variable(VariableSpec::integer().bounds(-1.0, 4.0).priority(2).name("x"))
        .unwrap();
    let y = p
        .create_variable(VarKind::Binary, -5.0, 5.0, 3.0)
        .unwrap();
    p.add_constraint((x + y + 1.0).between(0.0, 5.0).unwrap())
        .unwrap();
    p.add_constraint((x - y).eq_scalar(1.0).unwrap()).unwrap();
    // a row whose variables cancel never reaches the engine
    p.add_constraint((x - x).le_scalar(1.0).unwrap()).unwrap();

    let start = WarmStart::new().with(y, 1.0);
    p.maximize(
        SolveOptions::new()
            .with_objective(2.0 * x + 7.0)
            .with_warm_start(start),
    )
    .unwrap();

    let request = &p.engine().requests[0];
    let lp = &request.problem;
    assert_eq!(lp.num_variables(), 2);
    assert_eq!(lp.variables[0].name, "x");
    assert_eq!(lp.variables[0].branch_priority, 2);
    assert_eq!((lp.variables[1].lower, lp.variables[1].upper), (0.0, 1.0));
    assert!(lp.variables[1].integer);

    assert_eq!(lp.objective.coefficients, vec![2.0, 0.0]);
    assert_eq!(lp.objective.constant, 7.0);
    assert!(!lp.objective.minimize);

    let rows: Vec<(ConstraintOp, f64)> = lp.constraints.iter().map(|c| (c.op, c.rhs)).collect();
    assert_eq!(
        rows,
        vec![
            (ConstraintOp::Ge, -1.0),
            (ConstraintOp::Le, 4.0),
            (ConstraintOp::Eq, 1.0),
        ]
    );
    assert_eq!(request.warm_start, Some(vec![0.0, 1.0]));
}

#[test]
fn test_engine_failure_returns_to_building() {
    let mut p = Problem::with_engine(RecordingEngine {
        fail: true,
        ..RecordingEngine::default()
    });
    p.variable(VariableSpec::default()).unwrap();

    let err = p.maximize(SolveOptions::new()).unwrap_err();
    assert_eq!(err.code(), "ENGINE_FAILURE");
    assert_eq!(p.stage(), Stage::Building);
    assert_eq!(p.generation(), 0);
    // still editable
    assert!(p.variable(VariableSpec::default()).is_ok());
}

#[test]
fn test_restart_resets_engine_once() {
    let mut p = Problem::with_engine(RecordingEngine::default());
    p.restart();
    assert_eq!(p.engine().resets, 0);

    p.maximize(SolveOptions::new()).unwrap();
    p.restart();
    p.restart();
    assert_eq!(p.engine().resets, 1);

    // implicit restart before a re-solve
    p.maximize(SolveOptions::new()).unwrap();
    p.minimize(SolveOptions::new()).unwrap();
    assert_eq!(p.engine().resets, 2);
    assert_eq!(p.engine().requests.len(), 3);
}

#[test]
fn test_rejected_calls_never_reach_engine() {
    let mut p = Problem::with_engine(RecordingEngine::default());
    let x = p.variable(VariableSpec::default()).unwrap();

    let bad_objective = SolveOptions::new().with_objective(x * f64::NAN);
    assert_eq!(
        p.maximize(bad_objective).unwrap_err().code(),
        "EXPR_MALFORMED"
    );
    let bad_start = SolveOptions::new().with_warm_start(WarmStart::new().with(x, f64::INFINITY));
    assert_eq!(
        p.maximize(bad_start).unwrap_err().code(),
        "WARM_START_INVALID"
    );

    assert!(p.engine().requests.is_empty());
    assert_eq!(p.stage(), Stage::Building);
}
