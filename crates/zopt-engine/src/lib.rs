mod branch;
mod error;
mod problem;
mod settings;
mod simplex;
mod solution;
mod standard;

pub use branch::MipSolver;
pub use error::EngineError;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective, VarSpec};
pub use settings::{BranchingRule, MipSettings, NodeSelection, setting_names};
pub use simplex::Solver;
pub use solution::{SolveStats, Solution, SolutionStatus};
