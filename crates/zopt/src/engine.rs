//! Seam between the modeling front-end and a solving engine.
//!
//! A [`Problem`](crate::Problem) lowers itself into an [`EngineRequest`] and
//! hands it, together with its [`SolverConfig`], to an [`Engine`]. The
//! bundled branch-and-bound [`MipSolver`] is the default engine.

use tracing::warn;
use zopt_engine::{
    BranchingRule, EngineError, LpProblem, MipSettings, MipSolver, NodeSelection, setting_names,
};

use crate::config::{ParamCategory, SolverConfig};

/// What an engine returns for a solve.
pub type EngineOutcome = zopt_engine::Solution;

/// Fully materialized problem: one column per variable in creation order,
/// rows for every finite constraint side, objective with sense and constant.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    pub problem: LpProblem,
    /// Complete starting assignment, one value per column.
    pub warm_start: Option<Vec<f64>>,
}

/// Trait for solver backends.
pub trait Engine {
    /// Solve `request` under `config`.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` when the warm start is infeasible or the
    /// request is inconsistent. Infeasible and unbounded problems are
    /// outcomes, not errors.
    fn solve(
        &mut self,
        request: &EngineRequest,
        config: &SolverConfig,
    ) -> Result<EngineOutcome, EngineError>;

    /// Discard search state from earlier solves.
    fn reset(&mut self);
}

impl Engine for MipSolver {
    fn solve(
        &mut self,
        request: &EngineRequest,
        config: &SolverConfig,
    ) -> Result<EngineOutcome, EngineError> {
        self.set_settings(mip_settings(config));
        MipSolver::solve(self, &request.problem, request.warm_start.as_deref())
    }

    fn reset(&mut self) {
        MipSolver::reset(self);
    }
}

/// Translate a front-end config into branch-and-bound settings.
///
/// The `rule` parameter of the branching and node selection categories
/// picks the strategy by name; other parameters have no counterpart in this
/// engine and are ignored.
pub fn mip_settings(config: &SolverConfig) -> MipSettings {
    let defaults = MipSettings::default();
    MipSettings {
        time_limit: config.time_limit,
        node_limit: config.node_limit,
        solution_limit: config.solution_limit,
        gap: config.gap,
        absolute_gap: config.absolute_gap,
        tolerance: config.tolerance.unwrap_or(defaults.tolerance),
        node_selection: named_rule(config, ParamCategory::NodeSelection, NodeSelection::from_name)
            .unwrap_or(defaults.node_selection),
        branching: named_rule(config, ParamCategory::Branching, BranchingRule::from_name)
            .unwrap_or(defaults.branching),
        verbosity: config.verbosity,
        ..defaults
    }
}

fn named_rule<T>(
    config: &SolverConfig,
    category: ParamCategory,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    let value = config.param(category, "rule")?;
    let parsed = value.as_str().and_then(parse);
    if parsed.is_none() {
        warn!(
            component = "engine",
            operation = "configure",
            status = "warn",
            category = category.as_str(),
            value = ?value,
            known = ?setting_names(category.as_str()),
            "Unknown rule; using engine default"
        );
    }
    parsed
}
