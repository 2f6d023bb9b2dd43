//! Problem: the staged owner of variables and constraints.
//!
//! A problem moves through three stages:
//!
//! ```text
//!   Building ──maximize/minimize──▶ Solving ──▶ Solved
//!      ▲                                          │
//!      └───────────────── restart ────────────────┘
//! ```
//!
//! Every mutating operation checks the stage first and fails with
//! [`ModelError::StageViolation`] outside `Building`. Solving again from
//! `Solved` restarts implicitly.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;
use zopt_engine::{ConstraintOp, LpProblem, MipSolver, VarSpec};

use crate::config::SolverConfig;
use crate::engine::{Engine, EngineRequest};
use crate::error::ModelError;
use crate::expr::{Constraint, Expr};
use crate::ids::{ConstraintId, ProblemId, VariableId};
use crate::solution::Solution;
use crate::variable::{VarKind, Variable, VariableInfo, VariableSpec};
use crate::warm_start::WarmStart;

/// Lifecycle stage of a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Building,
    /// Transient while the engine runs.
    Solving,
    Solved,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Building => "building",
            Stage::Solving => "solving",
            Stage::Solved => "solved",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    fn operation(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Per-call inputs of [`Problem::maximize`] / [`Problem::minimize`].
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    objective: Option<Expr>,
    warm_start: Option<WarmStart>,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `objective` instead of the per-variable coefficients for this
    /// solve. Its constant is added to the reported objective value.
    pub fn with_objective(mut self, objective: impl Into<Expr>) -> Self {
        self.objective = Some(objective.into());
        self
    }

    pub fn with_warm_start(mut self, warm_start: WarmStart) -> Self {
        self.warm_start = Some(warm_start);
        self
    }

    pub fn objective(&self) -> Option<&Expr> {
        self.objective.as_ref()
    }

    pub fn warm_start(&self) -> Option<&WarmStart> {
        self.warm_start.as_ref()
    }
}

impl From<Expr> for SolveOptions {
    fn from(objective: Expr) -> Self {
        SolveOptions::new().with_objective(objective)
    }
}

/// Handle to a constraint stored in a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle {
    problem: ProblemId,
    id: ConstraintId,
}

impl ConstraintHandle {
    pub fn id(self) -> ConstraintId {
        self.id
    }

    pub fn problem(self) -> ProblemId {
        self.problem
    }
}

/// A mixed-integer linear program under construction.
///
/// Generic over the [`Engine`] that solves it; [`Problem::new`] uses the
/// bundled [`MipSolver`].
#[derive(Debug)]
pub struct Problem<E: Engine = MipSolver> {
    id: ProblemId,
    engine: E,
    stage: Stage,
    variables: Vec<VariableInfo>,
    constraints: BTreeMap<ConstraintId, Constraint>,
    next_constraint: u32,
    config: SolverConfig,
    /// Bumped by every solve and restart; solutions carry the value they
    /// were produced under.
    generation: u64,
}

impl Problem<MipSolver> {
    pub fn new() -> Self {
        Self::with_engine(MipSolver::new())
    }
}

impl Default for Problem<MipSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> Problem<E> {
    pub fn with_engine(engine: E) -> Self {
        let id = ProblemId::next();
        debug!(
            component = "problem",
            operation = "create",
            status = "success",
            problem = id.inner(),
            "Created problem"
        );
        Self {
            id,
            engine,
            stage: Stage::Building,
            variables: Vec::new(),
            constraints: BTreeMap::new(),
            next_constraint: 0,
            config: SolverConfig::default(),
            generation: 0,
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn id(&self) -> ProblemId {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Variables in creation order.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        (0..self.variables.len()).map(|i| Variable::new(self.id, VariableId::new(i as u32)))
    }

    pub fn variable_info(&self, var: Variable) -> Result<&VariableInfo, ModelError> {
        self.check_owner(var.problem())?;
        self.variables
            .get(var.index())
            .ok_or(ModelError::UnknownVariable(var.id()))
    }

    /// Stored constraints in insertion order.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintHandle, &Constraint)> + '_ {
        self.constraints.iter().map(|(id, c)| {
            (
                ConstraintHandle {
                    problem: self.id,
                    id: *id,
                },
                c,
            )
        })
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> Result<&Constraint, ModelError> {
        self.check_owner(handle.problem)?;
        self.constraints
            .get(&handle.id)
            .ok_or(ModelError::UnknownConstraint(handle.id))
    }

    /// True when `solution` came from this problem's latest solve and the
    /// problem has not been restarted since.
    pub fn is_current(&self, solution: &Solution) -> bool {
        solution.problem() == self.id
            && solution.generation() == self.generation
            && self.stage == Stage::Solved
    }

    // ── Guards ──────────────────────────────────────────────

    fn require_building(&self, operation: &'static str) -> Result<(), ModelError> {
        if self.stage == Stage::Building {
            Ok(())
        } else {
            debug!(
                component = "problem",
                operation,
                status = "error",
                stage = self.stage.as_str(),
                "Rejected mutation outside building stage"
            );
            Err(ModelError::StageViolation {
                operation,
                stage: self.stage,
            })
        }
    }

    fn check_owner(&self, found: ProblemId) -> Result<(), ModelError> {
        if found == self.id {
            Ok(())
        } else {
            Err(ModelError::OwnershipViolation {
                expected: self.id,
                found,
            })
        }
    }

    fn check_known(
        &self,
        mut terms: impl Iterator<Item = (Variable, f64)>,
    ) -> Result<(), ModelError> {
        match terms.find(|(var, _)| var.index() >= self.variables.len()) {
            Some((var, _)) => Err(ModelError::UnknownVariable(var.id())),
            None => Ok(()),
        }
    }

    fn info_mut(&mut self, var: Variable) -> Result<&mut VariableInfo, ModelError> {
        self.check_owner(var.problem())?;
        self.variables
            .get_mut(var.index())
            .ok_or(ModelError::UnknownVariable(var.id()))
    }

    // ── Variables ───────────────────────────────────────────

    /// Create a variable from `spec`.
    pub fn variable(&mut self, spec: VariableSpec) -> Result<Variable, ModelError> {
        self.require_building("create_variable")?;
        let info = spec.into_info();
        check_bounds(info.lower, info.upper)?;
        if !info.objective_coefficient.is_finite() {
            return Err(ModelError::malformed(format!(
                "objective coefficient {} is not finite",
                info.objective_coefficient
            )));
        }

        let var = Variable::new(self.id, VariableId::new(self.variables.len() as u32));
        debug!(
            component = "problem",
            operation = "create_variable",
            status = "success",
            variable = var.id().inner(),
            kind = info.kind.as_str(),
            lower = info.lower,
            upper = info.upper,
            "Created variable"
        );
        self.variables.push(info);
        Ok(var)
    }

    pub fn create_variable(
        &mut self,
        kind: VarKind,
        lower: f64,
        upper: f64,
        coefficient: f64,
    ) -> Result<Variable, ModelError> {
        self.variable(
            VariableSpec::new(kind)
                .bounds(lower, upper)
                .coefficient(coefficient),
        )
    }

    pub fn set_objective_coefficient(
        &mut self,
        var: Variable,
        coefficient: f64,
    ) -> Result<(), ModelError> {
        self.require_building("set_objective_coefficient")?;
        if !coefficient.is_finite() {
            return Err(ModelError::malformed(format!(
                "objective coefficient {coefficient} is not finite"
            )));
        }
        self.info_mut(var)?.objective_coefficient = coefficient;
        Ok(())
    }

    /// Raise the lower bound of `var` to `bound`. A looser bound leaves the
    /// variable unchanged.
    pub fn tighten_lower_bound(&mut self, var: Variable, bound: f64) -> Result<(), ModelError> {
        self.require_building("tighten_lower_bound")?;
        let info = self.info_mut(var)?;
        let lower = if bound.is_nan() { bound } else { info.lower.max(bound) };
        check_bounds(lower, info.upper)?;
        info.lower = lower;
        Ok(())
    }

    /// Lower the upper bound of `var` to `bound`. A looser bound leaves the
    /// variable unchanged.
    pub fn tighten_upper_bound(&mut self, var: Variable, bound: f64) -> Result<(), ModelError> {
        self.require_building("tighten_upper_bound")?;
        let info = self.info_mut(var)?;
        let upper = if bound.is_nan() { bound } else { info.upper.min(bound) };
        check_bounds(info.lower, upper)?;
        info.upper = upper;
        Ok(())
    }

    /// Integer variables with higher priority are branched on first.
    pub fn set_branch_priority(&mut self, var: Variable, priority: i32) -> Result<(), ModelError> {
        self.require_building("set_branch_priority")?;
        self.info_mut(var)?.branch_priority = priority;
        Ok(())
    }

    // ── Constraints ─────────────────────────────────────────

    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintHandle, ModelError> {
        self.require_building("add_constraint")?;
        if let Some(owner) = constraint.owner() {
            self.check_owner(owner)?;
        }
        self.check_known(constraint.terms())?;

        let id = ConstraintId::new(self.next_constraint);
        self.next_constraint += 1;
        debug!(
            component = "problem",
            operation = "add_constraint",
            status = "success",
            constraint = id.inner(),
            lower = constraint.lower(),
            upper = constraint.upper(),
            "Added constraint"
        );
        self.constraints.insert(id, constraint);
        Ok(ConstraintHandle {
            problem: self.id,
            id,
        })
    }

    /// Remove a stored constraint, restarting first when solved.
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Result<Constraint, ModelError> {
        self.check_owner(handle.problem)?;
        if !self.constraints.contains_key(&handle.id) {
            return Err(ModelError::UnknownConstraint(handle.id));
        }
        if self.stage == Stage::Solved {
            self.restart();
        }
        self.require_building("remove_constraint")?;
        let removed = self
            .constraints
            .remove(&handle.id)
            .ok_or(ModelError::UnknownConstraint(handle.id))?;
        debug!(
            component = "problem",
            operation = "remove_constraint",
            status = "success",
            constraint = handle.id.inner(),
            "Removed constraint"
        );
        Ok(removed)
    }

    // ── Configuration ───────────────────────────────────────

    /// Replace the solver configuration used by subsequent solves.
    pub fn configure(&mut self, config: SolverConfig) -> Result<(), ModelError> {
        self.require_building("configure")?;
        debug!(
            component = "problem",
            operation = "configure",
            status = "success",
            config = ?config,
            "Attached solver configuration"
        );
        self.config = config;
        Ok(())
    }

    // ── Solving ─────────────────────────────────────────────

    pub fn maximize(&mut self, options: SolveOptions) -> Result<Solution, ModelError> {
        self.solve(Sense::Maximize, options)
    }

    pub fn minimize(&mut self, options: SolveOptions) -> Result<Solution, ModelError> {
        self.solve(Sense::Minimize, options)
    }

    fn solve(&mut self, sense: Sense, options: SolveOptions) -> Result<Solution, ModelError> {
        let operation = sense.operation();
        if self.stage == Stage::Solved {
            self.restart();
        }
        self.require_building(operation)?;

        if let Some(objective) = &options.objective {
            objective.check_finite()?;
            if let Some(owner) = objective.owner()? {
                self.check_owner(owner)?;
            }
            self.check_known(objective.terms())?;
        }
        let warm_start = options
            .warm_start
            .as_ref()
            .map(|ws| ws.to_dense(self.id, self.variables.len()))
            .transpose()?;
        let request = EngineRequest {
            problem: self.materialize(sense, options.objective.as_ref()),
            warm_start,
        };

        self.stage = Stage::Solving;
        debug!(
            component = "problem",
            operation,
            status = "start",
            variables = request.problem.num_variables(),
            rows = request.problem.num_constraints(),
            warm_start = request.warm_start.is_some(),
            "Solving"
        );

        match self.engine.solve(&request, &self.config) {
            Ok(outcome) => {
                self.generation += 1;
                self.stage = Stage::Solved;
                let solution = Solution::new(self.id, self.generation, outcome);
                debug!(
                    component = "problem",
                    operation,
                    status = "success",
                    outcome = solution.status().as_str(),
                    objective = solution.objective_value(),
                    nodes = solution.nodes(),
                    "Solve finished"
                );
                Ok(solution)
            }
            Err(err) => {
                self.stage = Stage::Building;
                debug!(
                    component = "problem",
                    operation,
                    status = "error",
                    error = %err,
                    "Engine rejected the request"
                );
                Err(err.into())
            }
        }
    }

    /// Return to `Building`, keeping variables, constraints and config.
    ///
    /// Engine search state is discarded and outstanding solutions become
    /// stale. A no-op while building.
    pub fn restart(&mut self) {
        if self.stage == Stage::Building {
            return;
        }
        self.engine.reset();
        self.generation += 1;
        self.stage = Stage::Building;
        debug!(
            component = "problem",
            operation = "restart",
            status = "success",
            generation = self.generation,
            "Restarted problem"
        );
    }

    /// Lower the problem into the engine's dense form.
    fn materialize(&self, sense: Sense, objective: Option<&Expr>) -> LpProblem {
        let n = self.variables.len();
        let columns = self
            .variables
            .iter()
            .enumerate()
            .map(|(i, info)| {
                let name = info.name.clone().unwrap_or_else(|| format!("x{i}"));
                let spec = if info.kind.is_integer() {
                    VarSpec::integer(name, info.lower, info.upper)
                } else {
                    VarSpec::continuous(name, info.lower, info.upper)
                };
                spec.with_priority(info.branch_priority)
            })
            .collect();
        let mut lp = LpProblem::new(columns);

        let (coefficients, constant) = match objective {
            Some(expr) => (dense(n, expr.terms()), expr.constant()),
            None => (
                self.variables.iter().map(|v| v.objective_coefficient).collect(),
                0.0,
            ),
        };
        lp.set_objective(coefficients, sense == Sense::Minimize);
        lp.set_objective_constant(constant);

        for (id, constraint) in &self.constraints {
            // Rows without variables hold by construction.
            if constraint.terms().all(|(_, c)| c == 0.0) {
                continue;
            }
            let row = dense(n, constraint.terms());
            let name = format!("c{id}");
            if constraint.is_equality() {
                lp.add_constraint(name, row, ConstraintOp::Eq, constraint.lower());
                continue;
            }
            if constraint.lower().is_finite() {
                lp.add_constraint(name.clone(), row.clone(), ConstraintOp::Ge, constraint.lower());
            }
            if constraint.upper().is_finite() {
                lp.add_constraint(name, row, ConstraintOp::Le, constraint.upper());
            }
        }
        lp
    }
}

fn check_bounds(lower: f64, upper: f64) -> Result<(), ModelError> {
    let invalid = lower.is_nan()
        || upper.is_nan()
        || lower > upper
        || lower == f64::INFINITY
        || upper == f64::NEG_INFINITY;
    if invalid {
        Err(ModelError::InvalidVariableBounds { lower, upper })
    } else {
        Ok(())
    }
}

fn dense(n: usize, terms: impl Iterator<Item = (Variable, f64)>) -> Vec<f64> {
    let mut row = vec![0.0; n];
    for (var, coeff) in terms {
        row[var.index()] += coeff;
    }
    row
}
