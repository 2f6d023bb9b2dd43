use crate::error::EngineError;
use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{SolveStats, Solution, SolutionStatus};
use crate::standard::StandardForm;

/// Degenerate pivots tolerated before pricing falls back to Bland's rule.
const DEGENERATE_LIMIT: usize = 50;

/// Simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum iterations before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Solve the LP relaxation of the problem using the two-phase simplex method.
    /// Integrality is ignored.
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, EngineError> {
        let lower: Vec<f64> = problem.variables.iter().map(|v| v.lower).collect();
        let upper: Vec<f64> = problem.variables.iter().map(|v| v.upper).collect();
        self.solve_with_bounds(problem, &lower, &upper)
    }

    /// Solve the LP relaxation with column bounds replaced by `lower`/`upper`.
    pub fn solve_with_bounds(
        &self,
        problem: &LpProblem,
        lower: &[f64],
        upper: &[f64],
    ) -> Result<Solution, EngineError> {
        if lower.iter().zip(upper).any(|(l, u)| l > u) {
            return Ok(Solution::infeasible());
        }

        let form = StandardForm::build(problem, lower, upper)?;
        let mut tableau = self.build_tableau(&form);
        let mut stats = SolveStats::default();

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut stats) {
                SimplexResult::Optimal => {}
                SimplexResult::IterationLimit => {
                    return Ok(Solution::infeasible()
                        .with_status(SolutionStatus::LimitReached)
                        .with_stats(stats));
                }
                SimplexResult::Unbounded | SimplexResult::Infeasible => {
                    return Ok(Solution::infeasible().with_stats(stats));
                }
            }
        }

        // Phase 2: Optimize
        let status = match self.phase2(&mut tableau, &mut stats) {
            SimplexResult::Optimal => SolutionStatus::Optimal,
            SimplexResult::Unbounded => {
                return Ok(Solution::unbounded(problem.objective.minimize).with_stats(stats));
            }
            SimplexResult::Infeasible => return Ok(Solution::infeasible().with_stats(stats)),
            SimplexResult::IterationLimit => SolutionStatus::LimitReached,
        };

        let values = form.recover(&tableau.primal(form.n_cols));
        let objective_value = problem.objective_value(&values);
        Ok(Solution::optimal(values, objective_value)
            .with_status(status)
            .with_stats(stats))
    }

    fn build_tableau(&self, form: &StandardForm) -> Tableau {
        let n_cols = form.n_cols;
        let n_constraints = form.rows.len();

        // Rows are normalized so every RHS is non-negative; flipping the row
        // flips the comparison.
        let rows: Vec<(Vec<f64>, ConstraintOp, f64)> = form
            .rows
            .iter()
            .map(|row| {
                if row.rhs < 0.0 {
                    let op = match row.op {
                        ConstraintOp::Le => ConstraintOp::Ge,
                        ConstraintOp::Ge => ConstraintOp::Le,
                        ConstraintOp::Eq => ConstraintOp::Eq,
                    };
                    (row.coefficients.iter().map(|a| -a).collect(), op, -row.rhs)
                } else {
                    (row.coefficients.clone(), row.op, row.rhs)
                }
            })
            .collect();

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for (_, op, _) in &rows {
            match op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_cols + n_slack + n_artificial + 1; // +1 for RHS
        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_constraints + 1],
            basic_vars: vec![0; n_constraints],
            n_cols,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_cols;
        let mut artificial_idx = n_cols + n_slack;

        for (i, (coefficients, op, rhs)) in rows.into_iter().enumerate() {
            tableau.data[i][..n_cols].copy_from_slice(&coefficients);
            tableau.data[i][total_cols - 1] = rhs;

            match op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Objective row (last row). The tableau maximizes, so minimization
        // negates the coefficients; positive entries are improving columns.
        for (j, &coef) in form.objective.iter().enumerate() {
            tableau.data[n_constraints][j] = if form.minimize { -coef } else { coef };
        }

        tableau
    }

    fn phase1(&self, tableau: &mut Tableau, stats: &mut SolveStats) -> SimplexResult {
        let n_constraints = tableau.n_rows();
        let n_cols = tableau.width();
        let art_start = tableau.artificial_start();

        // Save original objective
        let orig_obj = tableau.data[n_constraints].clone();

        // Phase 1 objective: maximize -sum(artificials)
        tableau.data[n_constraints].iter_mut().for_each(|v| *v = 0.0);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[n_constraints][j] = -1.0;
        }

        // Make the objective row canonical for the basic artificials
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, n_cols - 1, stats) {
            SimplexResult::Optimal => {}
            SimplexResult::Unbounded => return SimplexResult::Infeasible,
            other => return other,
        }

        // All artificials must have left the basis or sit at zero
        let rhs_col = n_cols - 1;
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col].abs() > self.tolerance {
                return SimplexResult::Infeasible;
            }
        }

        // Drive remaining zero-level artificials out of the basis. Rows
        // without a usable column are redundant and stay untouched.
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                if let Some(j) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                    tableau.pivot(i, j);
                }
            }
        }

        // Restore original objective and price out the basic columns
        tableau.data[n_constraints] = orig_obj;
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[n_constraints][basic];
            if ratio.abs() > 0.0 {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        SimplexResult::Optimal
    }

    fn phase2(&self, tableau: &mut Tableau, stats: &mut SolveStats) -> SimplexResult {
        // Artificial columns never re-enter
        let exclude_from = tableau.artificial_start();
        self.iterate(tableau, exclude_from, stats)
    }

    /// Pivot until no column below `exclude_from` improves the objective row.
    fn iterate(&self, tableau: &mut Tableau, exclude_from: usize, stats: &mut SolveStats) -> SimplexResult {
        let rhs_col = tableau.width() - 1;
        let mut degenerate = 0;

        for _ in 0..self.max_iterations {
            let bland = degenerate > DEGENERATE_LIMIT;
            let Some(pivot_col) = self.find_pivot_column(tableau, exclude_from, bland) else {
                return SimplexResult::Optimal;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return SimplexResult::Unbounded;
            };
            if tableau.data[pivot_row][rhs_col].abs() <= self.tolerance {
                degenerate += 1;
            } else {
                degenerate = 0;
            }
            tableau.pivot(pivot_row, pivot_col);
            stats.iterations += 1;
        }
        SimplexResult::IterationLimit
    }

    fn find_pivot_column(&self, tableau: &Tableau, exclude_from: usize, bland: bool) -> Option<usize> {
        let obj_row = &tableau.data[tableau.n_rows()];
        let candidates = (0..exclude_from).filter(|&j| obj_row[j] > self.tolerance);

        if bland {
            return candidates.into_iter().next();
        }

        // Look for the most positive reduced cost (can improve objective)
        let mut max_val = self.tolerance;
        let mut max_col = None;
        for j in candidates {
            if obj_row[j] > max_val {
                max_val = obj_row[j];
                max_col = Some(j);
            }
        }
        max_col
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.width() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..tableau.n_rows() {
            let val = tableau.data[i][col];
            if val > self.tolerance {
                let ratio = tableau.data[i][rhs_col].max(0.0) / val;
                let better = match min_row {
                    None => true,
                    Some(r) => {
                        ratio < min_ratio - self.tolerance
                            || (ratio <= min_ratio + self.tolerance
                                && tableau.basic_vars[i] < tableau.basic_vars[r])
                    }
                };
                if better {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row
    }
}

#[derive(Debug)]
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_cols: usize,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn n_rows(&self) -> usize {
        self.data.len() - 1
    }

    fn width(&self) -> usize {
        self.data[0].len()
    }

    fn artificial_start(&self) -> usize {
        self.n_cols + self.n_slack
    }

    fn pivot(&mut self, row: usize, col: usize) {
        self.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = self.data[row][col];
        self.data[row].iter_mut().for_each(|v| *v /= pivot_val);
        let pivot_row = self.data[row].clone();

        // Eliminate column in other rows
        for (i, current) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = current[col];
            if factor != 0.0 {
                for (v, p) in current.iter_mut().zip(&pivot_row) {
                    *v -= factor * p;
                }
            }
        }
    }

    /// Values of the first `n` columns at the current basis.
    fn primal(&self, n: usize) -> Vec<f64> {
        let rhs_col = self.width() - 1;
        let mut values = vec![0.0; n];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < n {
                values[basic] = self.data[i][rhs_col].max(0.0);
            }
        }
        values
    }
}

enum SimplexResult {
    Optimal,
    Unbounded,
    Infeasible,
    IterationLimit,
}
