//! Ranged linear constraints: `lower <= terms <= upper`.

use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::expr::core::Expr;
use crate::ids::ProblemId;
use crate::variable::Variable;

/// A linear inequality with the expression constant already folded into
/// the bounds.
///
/// Built from comparisons on [`Expr`] and [`Variable`], and tightened further
/// with [`Constraint::le`] / [`Constraint::ge`] to form ranges such as
/// `0 <= x + y <= 4`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    terms: BTreeMap<Variable, f64>,
    /// Constant of the source expression. Bounds passed to `le`/`ge` are
    /// shifted by it.
    offset: f64,
    lower: f64,
    upper: f64,
    owner: Option<ProblemId>,
}

impl Constraint {
    /// `lower <= expr <= upper`.
    ///
    /// Fails on mixed ownership, non-finite coefficients, NaN bounds, and
    /// bounds that no assignment can satisfy.
    pub fn new(expr: Expr, lower: f64, upper: f64) -> Result<Self, ModelError> {
        expr.check_finite()?;
        let owner = expr.owner()?;
        let (terms, offset) = expr.into_parts();
        Self {
            terms,
            offset,
            lower: lower - offset,
            upper: upper - offset,
            owner,
        }
        .checked()
    }

    /// Add an upper bound: `self <= upper` on the original expression.
    pub fn le(mut self, upper: f64) -> Result<Self, ModelError> {
        self.upper = self.upper.min(upper - self.offset);
        self.checked()
    }

    /// Add a lower bound: `self >= lower` on the original expression.
    pub fn ge(mut self, lower: f64) -> Result<Self, ModelError> {
        self.lower = self.lower.max(lower - self.offset);
        self.checked()
    }

    fn checked(self) -> Result<Self, ModelError> {
        if self.lower.is_nan() || self.upper.is_nan() {
            return Err(ModelError::malformed("constraint bound is NaN"));
        }
        let contradictory = self.lower > self.upper
            || self.lower == f64::INFINITY
            || self.upper == f64::NEG_INFINITY;
        // With every coefficient zero the row reads `lower <= 0 <= upper`.
        let unsatisfiable = self.terms.values().all(|c| *c == 0.0)
            && (self.lower > 0.0 || self.upper < 0.0);
        if contradictory || unsatisfiable {
            return Err(ModelError::InfeasibleConstraint {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(self)
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn is_equality(&self) -> bool {
        self.lower == self.upper
    }

    pub fn coefficient(&self, var: Variable) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.terms.iter().map(|(v, c)| (*v, *c))
    }

    /// Problem whose variables appear in the constraint, `None` if none do.
    pub fn owner(&self) -> Option<ProblemId> {
        self.owner
    }
}
