//! Solve results.

use std::fmt;
use std::ops::Index;

use zopt_engine::SolutionStatus;

use crate::error::ModelError;
use crate::ids::{ProblemId, VariableId};
use crate::variable::Variable;

/// Outcome class of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
    /// The engine proved one of the two but not which.
    InfeasibleOrUnbounded,
    /// Stopped early, usually on a configured limit.
    Other,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Optimal => "optimal",
            Status::Infeasible => "infeasible",
            Status::Unbounded => "unbounded",
            Status::InfeasibleOrUnbounded => "infeasible_or_unbounded",
            Status::Other => "other",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SolutionStatus> for Status {
    fn from(status: SolutionStatus) -> Self {
        match status {
            SolutionStatus::Optimal => Status::Optimal,
            SolutionStatus::Infeasible => Status::Infeasible,
            SolutionStatus::Unbounded => Status::Unbounded,
            SolutionStatus::InfeasibleOrUnbounded => Status::InfeasibleOrUnbounded,
            SolutionStatus::LimitReached => Status::Other,
        }
    }
}

/// Immutable snapshot of one solve.
///
/// A solution belongs to the problem and generation that produced it; use
/// [`Problem::is_current`](crate::Problem::is_current) to tell whether the
/// problem has since been restarted or solved again.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    problem: ProblemId,
    generation: u64,
    status: Status,
    objective_value: f64,
    values: Vec<f64>,
    nodes: usize,
    solutions_found: usize,
}

impl Solution {
    pub(crate) fn new(
        problem: ProblemId,
        generation: u64,
        outcome: zopt_engine::Solution,
    ) -> Self {
        Self {
            problem,
            generation,
            status: outcome.status.into(),
            objective_value: outcome.objective_value,
            values: outcome.values,
            nodes: outcome.stats.nodes,
            solutions_found: outcome.stats.solutions_found,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Objective including its constant. `+inf`/`-inf` when unbounded in
    /// the optimization direction, NaN when no solution exists.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// True only for [`Status::Optimal`].
    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }

    pub fn is_infeasible(&self) -> bool {
        self.status == Status::Infeasible
    }

    pub fn is_unbounded(&self) -> bool {
        self.status == Status::Unbounded
    }

    pub fn is_infeasible_or_unbounded(&self) -> bool {
        self.status == Status::InfeasibleOrUnbounded
    }

    /// Whether variable values can be read.
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Branch-and-bound nodes processed.
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Improving solutions found, warm start included.
    pub fn solutions_found(&self) -> usize {
        self.solutions_found
    }

    pub fn problem(&self) -> ProblemId {
        self.problem
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Value of `var` in this solution.
    pub fn value(&self, var: Variable) -> Result<f64, ModelError> {
        if var.problem() != self.problem {
            return Err(ModelError::OwnershipViolation {
                expected: self.problem,
                found: var.problem(),
            });
        }
        if !self.has_values() {
            return Err(ModelError::NoValues(self.status));
        }
        self.values
            .get(var.index())
            .copied()
            .ok_or(ModelError::UnknownVariable(var.id()))
    }

    /// Evaluate a linear expression at this solution.
    pub fn evaluate(&self, expr: &crate::Expr) -> Result<f64, ModelError> {
        expr.terms().try_fold(expr.constant(), |acc, (var, coeff)| {
            Ok(acc + coeff * self.value(var)?)
        })
    }

    /// All variable values in creation order.
    pub fn values(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        let problem = self.problem;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (Variable::new(problem, VariableId::new(i as u32)), *v))
    }
}

impl Index<Variable> for Solution {
    type Output = f64;

    /// Panics when `var` is foreign or the solution has no values.
    fn index(&self, var: Variable) -> &f64 {
        if let Err(err) = self.value(var) {
            panic!("{err}");
        }
        &self.values[var.index()]
    }
}
