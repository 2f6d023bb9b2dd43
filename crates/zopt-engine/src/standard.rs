//! Rewrites a bounded problem over non-negative columns.
//!
//! Each original column `x` with bounds `[l, u]` becomes one of
//! - `x = l + y`            when `l` is finite (plus the row `y <= u - l` when `u` is finite)
//! - `x = u - y`            when only `u` is finite
//! - `x = y_pos - y_neg`    when the column is free
//!
//! with every `y >= 0`, which is the only bound the tableau knows about.

use crate::error::EngineError;
use crate::problem::{ConstraintOp, LpProblem};

#[derive(Debug, Clone, Copy)]
enum ColumnMap {
    Shifted { col: usize, lower: f64 },
    Reflected { col: usize, upper: f64 },
    Split { pos: usize, neg: usize },
}

#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct StandardForm {
    pub n_cols: usize,
    pub rows: Vec<Row>,
    pub objective: Vec<f64>,
    pub minimize: bool,
    map: Vec<ColumnMap>,
}

impl StandardForm {
    /// Build the standard form of `problem` with column bounds overridden by
    /// `lower`/`upper`. Callers guarantee `lower[j] <= upper[j]`.
    pub fn build(problem: &LpProblem, lower: &[f64], upper: &[f64]) -> Result<Self, EngineError> {
        let n_vars = problem.num_variables();

        let mut map = Vec::with_capacity(n_vars);
        let mut n_cols = 0;
        for j in 0..n_vars {
            let (l, u) = (lower[j], upper[j]);
            if l.is_nan() || u.is_nan() || l == f64::INFINITY || u == f64::NEG_INFINITY {
                return Err(EngineError::InvalidBounds {
                    name: problem.variables[j].name.clone(),
                    lower: l,
                    upper: u,
                });
            }
            let entry = if l.is_finite() {
                ColumnMap::Shifted { col: n_cols, lower: l }
            } else if u.is_finite() {
                ColumnMap::Reflected { col: n_cols, upper: u }
            } else {
                n_cols += 1;
                ColumnMap::Split {
                    pos: n_cols - 1,
                    neg: n_cols,
                }
            };
            n_cols += 1;
            map.push(entry);
        }

        let mut form = Self {
            n_cols,
            rows: Vec::with_capacity(problem.num_constraints()),
            objective: vec![0.0; n_cols],
            minimize: problem.objective.minimize,
            map,
        };

        if problem.objective.coefficients.len() != n_vars {
            return Err(EngineError::DimensionMismatch {
                row: "objective".to_string(),
                expected: n_vars,
                found: problem.objective.coefficients.len(),
            });
        }
        form.objective = form.transform(&problem.objective.coefficients).0;

        for c in &problem.constraints {
            if c.coefficients.len() != n_vars {
                return Err(EngineError::DimensionMismatch {
                    row: c.name.clone(),
                    expected: n_vars,
                    found: c.coefficients.len(),
                });
            }
            let (coefficients, offset) = form.transform(&c.coefficients);
            form.rows.push(Row {
                coefficients,
                op: c.op,
                rhs: c.rhs - offset,
            });
        }

        // Finite ranges of shifted columns become explicit rows.
        for (j, entry) in form.map.clone().into_iter().enumerate() {
            if let ColumnMap::Shifted { col, lower } = entry {
                if upper[j].is_finite() {
                    let mut coefficients = vec![0.0; n_cols];
                    coefficients[col] = 1.0;
                    form.rows.push(Row {
                        coefficients,
                        op: ConstraintOp::Le,
                        rhs: upper[j] - lower,
                    });
                }
            }
        }

        Ok(form)
    }

    /// Map original coefficients onto standard columns. Returns the new
    /// coefficients and the constant contributed by the substitutions.
    fn transform(&self, coefficients: &[f64]) -> (Vec<f64>, f64) {
        let mut out = vec![0.0; self.n_cols];
        let mut offset = 0.0;
        for (entry, &a) in self.map.iter().zip(coefficients) {
            if a == 0.0 {
                continue;
            }
            match *entry {
                ColumnMap::Shifted { col, lower } => {
                    out[col] += a;
                    offset += a * lower;
                }
                ColumnMap::Reflected { col, upper } => {
                    out[col] -= a;
                    offset += a * upper;
                }
                ColumnMap::Split { pos, neg } => {
                    out[pos] += a;
                    out[neg] -= a;
                }
            }
        }
        (out, offset)
    }

    /// Original column values from standard column values.
    pub fn recover(&self, y: &[f64]) -> Vec<f64> {
        self.map
            .iter()
            .map(|entry| match *entry {
                ColumnMap::Shifted { col, lower } => lower + y[col],
                ColumnMap::Reflected { col, upper } => upper - y[col],
                ColumnMap::Split { pos, neg } => y[pos] - y[neg],
            })
            .collect()
    }
}
