use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Infeasible warm start: {}", .violations.join("; "))]
    InfeasibleWarmStart { violations: Vec<String> },
    #[error("Warm start has {found} values for {expected} variables")]
    WarmStartLength { expected: usize, found: usize },
    #[error("{row} has {found} coefficients for {expected} variables")]
    DimensionMismatch {
        row: String,
        expected: usize,
        found: usize,
    },
    #[error("Variable {name} has invalid bounds [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },
}
