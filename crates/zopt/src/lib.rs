pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod ids;
pub mod logging;
pub mod problem;
pub mod solution;
pub mod variable;
pub mod warm_start;

pub use config::{ParamCategory, ParamValue, SolverConfig};
pub use engine::{Engine, EngineOutcome, EngineRequest, mip_settings};
pub use error::{ModelError, WarmStartError};
pub use expr::{Constraint, Expr};
pub use ids::{ConstraintId, ProblemId, VariableId};
pub use logging::{LoggingError, enable_logging};
pub use problem::{ConstraintHandle, Problem, Sense, SolveOptions, Stage};
pub use solution::{Solution, Status};
pub use variable::{VarKind, Variable, VariableInfo, VariableSpec};
pub use warm_start::WarmStart;
pub use zopt_engine::{EngineError, MipSolver};
