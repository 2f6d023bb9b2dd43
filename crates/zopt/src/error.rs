//! Error taxonomy for model construction and solving.

use thiserror::Error;
use zopt_engine::EngineError;

use crate::ids::{ConstraintId, ProblemId, VariableId};
use crate::problem::Stage;
use crate::solution::Status;

/// Errors raised by expression building, problem bookkeeping and solves.
///
/// Infeasible or unbounded problems are not errors; they come back as a
/// [`Solution`](crate::Solution) with the matching status.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{operation} requires the building stage, problem is {stage}")]
    StageViolation { operation: &'static str, stage: Stage },
    #[error("Handle belongs to problem {found}, expected problem {expected}")]
    OwnershipViolation { expected: ProblemId, found: ProblemId },
    #[error("Malformed expression: {reason}")]
    MalformedExpression { reason: String },
    #[error("Constraint bounds are contradictory: lower ({lower}) > upper ({upper})")]
    InfeasibleConstraint { lower: f64, upper: f64 },
    #[error("Variable bounds invalid: lower ({lower}) > upper ({upper})")]
    InvalidVariableBounds { lower: f64, upper: f64 },
    #[error("Constraint {0} does not exist")]
    UnknownConstraint(ConstraintId),
    #[error("Variable {0} is not part of this solution")]
    UnknownVariable(VariableId),
    #[error("Solution with status {0} has no variable values")]
    NoValues(Status),
    #[error(transparent)]
    InvalidWarmStart(WarmStartError),
    #[error(transparent)]
    Engine(EngineError),
}

/// Why a warm start was refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WarmStartError {
    #[error("Warm start variable {variable} belongs to problem {found}, expected problem {expected}")]
    ForeignVariable {
        variable: VariableId,
        expected: ProblemId,
        found: ProblemId,
    },
    #[error("Warm start value for variable {variable} is not a finite number ({value})")]
    NonFinite { variable: VariableId, value: f64 },
    #[error("Engine rejected the warm start: {}", .violations.join("; "))]
    Rejected { violations: Vec<String> },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::StageViolation { .. } => "STAGE_VIOLATION",
            ModelError::OwnershipViolation { .. } => "OWNERSHIP_VIOLATION",
            ModelError::MalformedExpression { .. } => "EXPR_MALFORMED",
            ModelError::InfeasibleConstraint { .. } => "CONSTRAINT_INFEASIBLE",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::UnknownConstraint(_) => "CONSTRAINT_UNKNOWN",
            ModelError::UnknownVariable(_) => "VARIABLE_UNKNOWN",
            ModelError::NoValues(_) => "SOLUTION_NO_VALUES",
            ModelError::InvalidWarmStart(_) => "WARM_START_INVALID",
            ModelError::Engine(_) => "ENGINE_FAILURE",
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ModelError::MalformedExpression {
            reason: reason.into(),
        }
    }
}

impl From<EngineError> for ModelError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InfeasibleWarmStart { violations } => {
                ModelError::InvalidWarmStart(WarmStartError::Rejected { violations })
            }
            other => ModelError::Engine(other),
        }
    }
}
