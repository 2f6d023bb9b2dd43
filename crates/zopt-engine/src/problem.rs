/// A linear program with bounded, optionally integer, columns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpProblem {
    /// Column definitions
    pub variables: Vec<VarSpec>,
    /// Objective function coefficients and sense
    pub objective: Objective,
    /// Constraint rows
    pub constraints: Vec<Constraint>,
}

/// One column of the problem.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarSpec {
    /// Name used in diagnostics
    pub name: String,
    /// Lower bound, may be `f64::NEG_INFINITY`
    pub lower: f64,
    /// Upper bound, may be `f64::INFINITY`
    pub upper: f64,
    /// Whether the column must take an integral value
    pub integer: bool,
    /// Higher priorities are branched on first
    pub branch_priority: i32,
}

impl VarSpec {
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper,
            integer: false,
            branch_priority: 0,
        }
    }

    pub fn integer(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            integer: true,
            ..Self::continuous(name, lower, upper)
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.branch_priority = priority;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Constant added to the reported objective value
    pub constant: f64,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    /// Whether `lhs op rhs` holds within `tolerance`.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            ConstraintOp::Le => lhs <= rhs + tolerance,
            ConstraintOp::Ge => lhs >= rhs - tolerance,
            ConstraintOp::Eq => (lhs - rhs).abs() <= tolerance,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<VarSpec>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                constant: 0.0,
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective.coefficients = coefficients;
        self.objective.minimize = minimize;
    }

    pub fn set_objective_constant(&mut self, constant: f64) {
        self.objective.constant = constant;
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn has_integers(&self) -> bool {
        self.variables.iter().any(|v| v.integer)
    }

    /// Objective value of `values`, constant included.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            + self.objective.constant
    }

    /// Row activity of constraint `row` at `values`.
    pub fn row_activity(&self, row: usize, values: &[f64]) -> f64 {
        self.constraints[row]
            .coefficients
            .iter()
            .zip(values)
            .map(|(a, v)| a * v)
            .sum()
    }

    /// Describe every bound, integrality and row violation of `values`.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut violations = Vec::new();

        for (var, &value) in self.variables.iter().zip(values) {
            if value < var.lower - tolerance {
                violations.push(format!("{} = {} is below its lower bound {}", var.name, value, var.lower));
            }
            if value > var.upper + tolerance {
                violations.push(format!("{} = {} exceeds its upper bound {}", var.name, value, var.upper));
            }
            if var.integer && (value - value.round()).abs() > tolerance {
                violations.push(format!("{} = {} is not integral", var.name, value));
            }
        }

        for (row, c) in self.constraints.iter().enumerate() {
            let lhs = self.row_activity(row, values);
            if !c.op.holds(lhs, c.rhs, tolerance) {
                violations.push(format!(
                    "{}: {} {} {} does not hold",
                    c.name,
                    lhs,
                    c.op.as_str(),
                    c.rhs
                ));
            }
        }

        violations
    }
}
