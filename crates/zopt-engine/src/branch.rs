//! Branch and bound over simplex relaxations.

use std::time::Instant;

use tracing::{debug, info, trace};

use crate::error::EngineError;
use crate::problem::LpProblem;
use crate::settings::{BranchingRule, MipSettings, NodeSelection};
use crate::simplex::Solver;
use crate::solution::{SolveStats, Solution, SolutionStatus};

/// Mixed-integer solver: LP relaxations via [`Solver`], integrality by branching.
#[derive(Debug, Clone, Default)]
pub struct MipSolver {
    settings: MipSettings,
    /// Best point of the last solve; dropped on reset.
    incumbent: Option<Vec<f64>>,
    solves: usize,
}

#[derive(Debug, Clone)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Parent relaxation value in maximization terms.
    bound: f64,
    depth: usize,
}

struct Incumbent {
    values: Vec<f64>,
    objective: f64,
    score: f64,
}

impl MipSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: MipSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &MipSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: MipSettings) {
        self.settings = settings;
    }

    /// Best point found by the last solve.
    pub fn incumbent(&self) -> Option<&[f64]> {
        self.incumbent.as_deref()
    }

    /// Number of solves since construction or the last reset.
    pub fn solves(&self) -> usize {
        self.solves
    }

    /// Drop all search state.
    pub fn reset(&mut self) {
        self.incumbent = None;
        self.solves = 0;
    }

    /// Check a complete assignment against bounds, integrality and rows.
    pub fn check_warm_start(&self, problem: &LpProblem, values: &[f64]) -> Result<(), EngineError> {
        if values.len() != problem.num_variables() {
            return Err(EngineError::WarmStartLength {
                expected: problem.num_variables(),
                found: values.len(),
            });
        }
        let violations = problem.violations(values, self.settings.tolerance);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InfeasibleWarmStart { violations })
        }
    }

    /// Solve `problem`, optionally seeded with a feasible `warm_start`.
    pub fn solve(&mut self, problem: &LpProblem, warm_start: Option<&[f64]>) -> Result<Solution, EngineError> {
        let started = Instant::now();
        let lp = Solver::new()
            .with_max_iterations(self.settings.max_iterations)
            .with_tolerance(1e-9);
        let minimize = problem.objective.minimize;
        let score = |objective: f64| if minimize { -objective } else { objective };

        self.solves += 1;
        self.incumbent = None;
        let mut stats = SolveStats::default();
        let mut best: Option<Incumbent> = None;

        if let Some(values) = warm_start {
            self.check_warm_start(problem, values)?;
            let objective = problem.objective_value(values);
            best = Some(Incumbent {
                values: values.to_vec(),
                objective,
                score: score(objective),
            });
            stats.solutions_found += 1;
            debug!(
                component = "engine",
                operation = "warm_start",
                status = "success",
                objective,
                "Seeded incumbent from warm start"
            );
        }

        let mut open = vec![Node {
            lower: problem.variables.iter().map(|v| v.lower).collect(),
            upper: problem.variables.iter().map(|v| v.upper).collect(),
            bound: f64::INFINITY,
            depth: 0,
        }];
        let mut complete = true;

        while let Some(node) = self.select(&mut open) {
            if self.limit_reached(started, &stats, best.as_ref(), &open, node.bound) {
                complete = false;
                break;
            }
            if let Some(inc) = &best {
                if !self.improves(node.bound, inc.score) {
                    continue;
                }
            }

            stats.nodes += 1;
            let relaxation = lp.solve_with_bounds(problem, &node.lower, &node.upper)?;
            stats.iterations += relaxation.stats.iterations;

            match relaxation.status {
                SolutionStatus::Optimal => {}
                SolutionStatus::Infeasible => continue,
                SolutionStatus::LimitReached => {
                    complete = false;
                    continue;
                }
                SolutionStatus::Unbounded | SolutionStatus::InfeasibleOrUnbounded => {
                    // A feasible point plus an unbounded relaxation is an unbounded problem.
                    let status = if !problem.has_integers() || best.is_some() {
                        SolutionStatus::Unbounded
                    } else {
                        SolutionStatus::InfeasibleOrUnbounded
                    };
                    debug!(
                        component = "engine",
                        operation = "solve",
                        status = status.as_str(),
                        depth = node.depth,
                        "Relaxation is unbounded"
                    );
                    return Ok(Solution::unbounded(minimize).with_status(status).with_stats(stats));
                }
            }

            let node_score = score(relaxation.objective_value);
            if let Some(inc) = &best {
                if !self.improves(node_score, inc.score) {
                    continue;
                }
            }

            match self.pick_branch(problem, &relaxation.values) {
                None => {
                    let values = self.round_integers(problem, relaxation.values);
                    let objective = problem.objective_value(&values);
                    stats.solutions_found += 1;
                    self.log_progress(&stats, objective, node.depth);
                    best = Some(Incumbent {
                        values,
                        objective,
                        score: score(objective),
                    });
                }
                Some(j) => {
                    let value = relaxation.values[j];
                    trace!(
                        component = "engine",
                        operation = "branch",
                        column = j,
                        value,
                        depth = node.depth,
                        "Branching on fractional column"
                    );
                    let mut down = node.clone();
                    down.upper[j] = value.floor();
                    down.bound = node_score;
                    down.depth += 1;

                    let mut up = node;
                    up.lower[j] = value.ceil();
                    up.bound = node_score;
                    up.depth += 1;

                    // Depth-first explores the last pushed child first.
                    if value - value.floor() < 0.5 {
                        open.push(up);
                        open.push(down);
                    } else {
                        open.push(down);
                        open.push(up);
                    }
                }
            }
        }

        let solution = match (best, complete) {
            (Some(inc), true) => Solution::optimal(inc.values, inc.objective),
            (Some(inc), false) => {
                Solution::optimal(inc.values, inc.objective).with_status(SolutionStatus::LimitReached)
            }
            (None, true) => Solution::infeasible(),
            (None, false) => Solution::infeasible().with_status(SolutionStatus::LimitReached),
        };
        self.incumbent = solution.has_values().then(|| solution.values.clone());

        debug!(
            component = "engine",
            operation = "solve",
            status = solution.status.as_str(),
            nodes = stats.nodes,
            iterations = stats.iterations,
            solutions = stats.solutions_found,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Branch and bound finished"
        );

        Ok(solution.with_stats(stats))
    }

    fn select(&self, open: &mut Vec<Node>) -> Option<Node> {
        match self.settings.node_selection {
            NodeSelection::DepthFirst => open.pop(),
            NodeSelection::BestFirst => {
                let best = open
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.bound.total_cmp(&b.bound))
                    .map(|(i, _)| i)?;
                Some(open.swap_remove(best))
            }
        }
    }

    fn improves(&self, bound: f64, incumbent_score: f64) -> bool {
        bound > incumbent_score + self.settings.tolerance
    }

    fn limit_reached(
        &self,
        started: Instant,
        stats: &SolveStats,
        best: Option<&Incumbent>,
        open: &[Node],
        current_bound: f64,
    ) -> bool {
        let settings = &self.settings;
        if settings.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
            return true;
        }
        if settings.node_limit.is_some_and(|limit| stats.nodes >= limit) {
            return true;
        }
        if settings.solution_limit.is_some_and(|limit| stats.solutions_found >= limit) {
            return true;
        }

        let Some(inc) = best else {
            return false;
        };
        if settings.gap.is_none() && settings.absolute_gap.is_none() {
            return false;
        }
        let dual_bound = open.iter().map(|n| n.bound).fold(current_bound, f64::max);
        let absolute = dual_bound - inc.score;
        if settings.absolute_gap.is_some_and(|limit| absolute <= limit) {
            return true;
        }
        let relative = absolute / inc.score.abs().max(1e-10);
        settings.gap.is_some_and(|limit| relative <= limit)
    }

    /// Fractional integer column to branch on, highest priority first.
    fn pick_branch(&self, problem: &LpProblem, values: &[f64]) -> Option<usize> {
        let tolerance = self.settings.tolerance;
        let fractional = problem
            .variables
            .iter()
            .zip(values)
            .enumerate()
            .filter(|(_, (spec, value))| spec.integer && (**value - value.round()).abs() > tolerance);

        let top_priority = fractional.clone().map(|(_, (spec, _))| spec.branch_priority).max()?;
        let candidates = fractional.filter(|(_, (spec, _))| spec.branch_priority == top_priority);

        match self.settings.branching {
            BranchingRule::FirstFractional => candidates.map(|(j, _)| j).next(),
            BranchingRule::MostFractional => candidates
                .map(|(j, (_, value))| {
                    let frac = value - value.floor();
                    (j, frac.min(1.0 - frac))
                })
                .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
                .map(|(j, _)| j),
        }
    }

    fn round_integers(&self, problem: &LpProblem, mut values: Vec<f64>) -> Vec<f64> {
        for (spec, value) in problem.variables.iter().zip(values.iter_mut()) {
            if spec.integer {
                *value = value.round();
            }
        }
        values
    }

    fn log_progress(&self, stats: &SolveStats, objective: f64, depth: usize) {
        if self.settings.verbosity > 0 {
            info!(
                component = "engine",
                operation = "incumbent",
                nodes = stats.nodes,
                objective,
                depth,
                "Found improving solution"
            );
        } else {
            trace!(
                component = "engine",
                operation = "incumbent",
                nodes = stats.nodes,
                objective,
                depth,
                "Found improving solution"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, VarSpec};

    fn knapsack() -> LpProblem {
        // Maximize 5a + 4b + 3c subject to 2a + 3b + c <= 5, 4a + b + 2c <= 11,
        // 3a + 4b + 2c <= 8, all integer in [0, 10]. Optimum 13 at (2, 0, 1).
        let mut problem = LpProblem::new(vec![
            VarSpec::integer("a", 0.0, 10.0),
            VarSpec::integer("b", 0.0, 10.0),
            VarSpec::integer("c", 0.0, 10.0),
        ]);
        problem.set_objective(vec![5.0, 4.0, 3.0], false);
        problem.add_constraint("r1", vec![2.0, 3.0, 1.0], ConstraintOp::Le, 5.0);
        problem.add_constraint("r2", vec![4.0, 1.0, 2.0], ConstraintOp::Le, 11.0);
        problem.add_constraint("r3", vec![3.0, 4.0, 2.0], ConstraintOp::Le, 8.0);
        problem
    }

    #[test]
    fn test_integer_optimum() {
        let solution = MipSolver::new().solve(&knapsack(), None).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 13.0).abs() < 1e-6, "obj = {}", solution.objective_value);
    }

    #[test]
    fn test_depth_first_reaches_same_optimum() {
        let settings = MipSettings {
            node_selection: NodeSelection::DepthFirst,
            branching: BranchingRule::FirstFractional,
            ..MipSettings::default()
        };
        let solution = MipSolver::with_settings(settings).solve(&knapsack(), None).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 13.0).abs() < 1e-6);
    }

    #[test]
    fn test_branching_forces_integrality() {
        // Maximize x subject to 2x <= 3, x integer: relaxation gives 1.5.
        let mut problem = LpProblem::new(vec![VarSpec::integer("x", 0.0, f64::INFINITY)]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("half", vec![2.0], ConstraintOp::Le, 3.0);

        let solution = MipSolver::new().solve(&problem, None).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![1.0]);
        assert!(solution.stats.nodes >= 2);
    }

    #[test]
    fn test_integer_infeasible() {
        // 2x = 1 has no integer solution
        let mut problem = LpProblem::new(vec![VarSpec::integer("x", 0.0, 5.0)]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("odd", vec![2.0], ConstraintOp::Eq, 1.0);

        let solution = MipSolver::new().solve(&problem, None).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(!solution.has_values());
    }

    #[test]
    fn test_unbounded_integer_relaxation() {
        let mut problem = LpProblem::new(vec![VarSpec::integer("x", 0.0, f64::INFINITY)]);
        problem.set_objective(vec![1.0], false);

        let solution = MipSolver::new().solve(&problem, None).unwrap();
        assert_eq!(solution.status, SolutionStatus::InfeasibleOrUnbounded);
    }

    #[test]
    fn test_warm_start_is_checked() {
        let mut problem = LpProblem::new(vec![VarSpec::integer("x", f64::NEG_INFINITY, 2.0)]);
        problem.set_objective(vec![1.0], false);

        let mut solver = MipSolver::new();
        let err = solver.solve(&problem, Some(&[3.0][..])).unwrap_err();
        assert!(matches!(err, EngineError::InfeasibleWarmStart { .. }));

        let solution = solver.solve(&problem, Some(&[2.0][..])).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.objective_value - 2.0).abs() < 1e-9);
        assert_eq!(solution.stats.solutions_found, 1);
    }

    #[test]
    fn test_warm_start_length_mismatch() {
        let problem = LpProblem::new(vec![VarSpec::integer("x", 0.0, 2.0)]);
        let err = MipSolver::new().solve(&problem, Some(&[][..])).unwrap_err();
        assert_eq!(err, EngineError::WarmStartLength { expected: 1, found: 0 });
    }

    #[test]
    fn test_solution_limit_stops_search() {
        let settings = MipSettings {
            solution_limit: Some(1),
            ..MipSettings::default()
        };
        // A poor feasible warm start already exhausts the limit.
        let solution = MipSolver::with_settings(settings)
            .solve(&knapsack(), Some(&[0.0, 0.0, 0.0][..]))
            .unwrap();
        assert_eq!(solution.status, SolutionStatus::LimitReached);
        assert_eq!(solution.values, vec![0.0, 0.0, 0.0]);
    }

    fn odd_capacity() -> LpProblem {
        // Maximize x + y + z subject to 2x + 2y + 2z <= 7. Relaxation 3.5, optimum 3.
        let mut problem = LpProblem::new(vec![
            VarSpec::integer("x", 0.0, f64::INFINITY),
            VarSpec::integer("y", 0.0, f64::INFINITY),
            VarSpec::integer("z", 0.0, f64::INFINITY),
        ]);
        problem.set_objective(vec![1.0, 1.0, 1.0], false);
        problem.add_constraint("cap", vec![2.0, 2.0, 2.0], ConstraintOp::Le, 7.0);
        problem
    }

    #[test]
    fn test_node_limit_stops_search() {
        let settings = MipSettings {
            node_limit: Some(1),
            ..MipSettings::default()
        };
        let solution = MipSolver::with_settings(settings).solve(&odd_capacity(), None).unwrap();
        assert_eq!(solution.status, SolutionStatus::LimitReached);
        assert!(!solution.has_values());
        assert_eq!(solution.stats.nodes, 1);
    }

    #[test]
    fn test_gap_limits_use_open_bounds() {
        let full = MipSolver::new().solve(&odd_capacity(), None).unwrap();
        assert_eq!(full.status, SolutionStatus::Optimal);
        assert!((full.objective_value - 3.0).abs() < 1e-6);

        for settings in [
            MipSettings { gap: Some(0.5), ..MipSettings::default() },
            MipSettings { absolute_gap: Some(0.6), ..MipSettings::default() },
        ] {
            let solution = MipSolver::with_settings(settings).solve(&odd_capacity(), None).unwrap();
            assert_eq!(solution.status, SolutionStatus::LimitReached);
            assert!((solution.objective_value - 3.0).abs() < 1e-6);
            assert!(solution.stats.nodes < full.stats.nodes);
        }

        let exact = MipSettings { gap: Some(0.0), ..MipSettings::default() };
        let solution = MipSolver::with_settings(exact).solve(&odd_capacity(), None).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
    }

    #[test]
    fn test_pick_branch_prefers_priority() {
        let problem = LpProblem::new(vec![
            VarSpec::integer("a", 0.0, 1.0),
            VarSpec::integer("b", 0.0, 1.0).with_priority(5),
            VarSpec::continuous("c", 0.0, 1.0),
        ]);
        let solver = MipSolver::new();
        assert_eq!(solver.pick_branch(&problem, &[0.5, 0.1, 0.5]), Some(1));
        assert_eq!(solver.pick_branch(&problem, &[0.5, 1.0, 0.5]), Some(0));
        assert_eq!(solver.pick_branch(&problem, &[1.0, 0.0, 0.5]), None);
    }

    #[test]
    fn test_reset_drops_incumbent() {
        let mut solver = MipSolver::new();
        solver.solve(&knapsack(), None).unwrap();
        assert!(solver.incumbent().is_some());
        assert_eq!(solver.solves(), 1);

        solver.reset();
        assert!(solver.incumbent().is_none());
        assert_eq!(solver.solves(), 0);
    }
}
