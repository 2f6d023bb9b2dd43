//! Core expression type: variable terms + constant.
//!
//! Terms are keyed by variable handle, so duplicates combine on insertion and
//! every expression knows which problems its variables come from. Terms whose
//! coefficient cancels to zero are kept for that reason; they are dropped when
//! the expression is lowered into a solver row.

use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::expr::constraint::Constraint;
use crate::ids::ProblemId;
use crate::variable::Variable;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expr {
    terms: BTreeMap<Variable, f64>,
    constant: f64,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Empty expression (all zeros).
    pub fn new() -> Self {
        Self::default()
    }

    /// Just a constant, no variable terms.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            ..Default::default()
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var: Variable) -> Self {
        Self::term(var, 1.0)
    }

    /// Single linear term: coeff * var.
    pub fn term(var: Variable, coeff: f64) -> Self {
        Self {
            terms: BTreeMap::from([(var, coeff)]),
            constant: 0.0,
        }
    }

    /// Sum of `coeff * var` over `terms`; repeated variables combine.
    pub fn from_terms(terms: impl IntoIterator<Item = (Variable, f64)>) -> Self {
        let mut expr = Self::new();
        for (var, coeff) in terms {
            *expr.terms.entry(var).or_insert(0.0) += coeff;
        }
        expr
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Accumulated coefficient of `var`, zero when absent.
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// All terms in variable order, cancelled ones included.
    pub fn terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.terms.iter().map(|(v, c)| (*v, *c))
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// True when no variable carries a non-zero coefficient.
    pub fn is_constant(&self) -> bool {
        self.terms.values().all(|c| *c == 0.0)
    }

    pub(crate) fn into_parts(self) -> (BTreeMap<Variable, f64>, f64) {
        (self.terms, self.constant)
    }

    /// The single problem all referenced variables belong to, or `None` for
    /// a constant expression.
    pub fn owner(&self) -> Result<Option<ProblemId>, ModelError> {
        owner_of(self.terms.keys().copied())
    }

    /// Reject NaN or infinite coefficients and constants.
    pub(crate) fn check_finite(&self) -> Result<(), ModelError> {
        if !self.constant.is_finite() {
            return Err(ModelError::malformed(format!(
                "constant {} is not finite",
                self.constant
            )));
        }
        if let Some((var, coeff)) = self.terms.iter().find(|(_, c)| !c.is_finite()) {
            return Err(ModelError::malformed(format!(
                "coefficient {} of variable {} is not finite",
                coeff,
                var.id()
            )));
        }
        Ok(())
    }

    // ── Operations ──────────────────────────────────────────

    /// Merge term maps, summing shared coefficients and constants.
    pub fn add(&self, other: &Expr) -> Self {
        let mut terms = self.terms.clone();
        for (var, coeff) in &other.terms {
            *terms.entry(*var).or_insert(0.0) += *coeff;
        }
        Self {
            terms,
            constant: self.constant + other.constant,
        }
    }

    pub fn sub(&self, other: &Expr) -> Self {
        self.add(&other.scale(-1.0))
    }

    /// Scale all terms and constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        Self {
            terms: self.terms.iter().map(|(v, c)| (*v, c * by)).collect(),
            constant: self.constant * by,
        }
    }

    /// Add a constant offset.
    pub fn add_constant(&self, value: f64) -> Self {
        Self {
            terms: self.terms.clone(),
            constant: self.constant + value,
        }
    }

    /// Product of two expressions. Only defined when at least one side is
    /// constant; anything else would not be linear.
    pub fn try_mul(&self, other: &Expr) -> Result<Self, ModelError> {
        if other.is_constant() {
            Ok(self.scale(other.constant))
        } else if self.is_constant() {
            Ok(other.scale(self.constant))
        } else {
            Err(ModelError::malformed(
                "product of two non-constant expressions is not linear",
            ))
        }
    }

    // ── Comparisons (produce Constraint) ────────────────────

    /// `lower <= self <= upper`
    pub fn between(&self, lower: f64, upper: f64) -> Result<Constraint, ModelError> {
        Constraint::new(self.clone(), lower, upper)
    }

    pub fn le_scalar(&self, rhs: f64) -> Result<Constraint, ModelError> {
        self.between(f64::NEG_INFINITY, rhs)
    }

    pub fn ge_scalar(&self, rhs: f64) -> Result<Constraint, ModelError> {
        self.between(rhs, f64::INFINITY)
    }

    pub fn eq_scalar(&self, rhs: f64) -> Result<Constraint, ModelError> {
        self.between(rhs, rhs)
    }

    pub fn le_expr(&self, rhs: &Expr) -> Result<Constraint, ModelError> {
        self.sub(rhs).le_scalar(0.0)
    }

    pub fn ge_expr(&self, rhs: &Expr) -> Result<Constraint, ModelError> {
        self.sub(rhs).ge_scalar(0.0)
    }

    pub fn eq_expr(&self, rhs: &Expr) -> Result<Constraint, ModelError> {
        self.sub(rhs).eq_scalar(0.0)
    }
}

fn owner_of(vars: impl Iterator<Item = Variable>) -> Result<Option<ProblemId>, ModelError> {
    let mut owner: Option<ProblemId> = None;
    for var in vars {
        match owner {
            None => owner = Some(var.problem()),
            Some(expected) if expected != var.problem() => {
                return Err(ModelError::OwnershipViolation {
                    expected,
                    found: var.problem(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(owner)
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Expr::var(var)
    }
}

impl From<f64> for Expr {
    fn from(constant: f64) -> Self {
        Expr::from_constant(constant)
    }
}

impl Variable {
    /// `lower <= self <= upper`
    pub fn between(self, lower: f64, upper: f64) -> Result<Constraint, ModelError> {
        Expr::var(self).between(lower, upper)
    }

    pub fn le_scalar(self, rhs: f64) -> Result<Constraint, ModelError> {
        Expr::var(self).le_scalar(rhs)
    }

    pub fn ge_scalar(self, rhs: f64) -> Result<Constraint, ModelError> {
        Expr::var(self).ge_scalar(rhs)
    }

    pub fn eq_scalar(self, rhs: f64) -> Result<Constraint, ModelError> {
        Expr::var(self).eq_scalar(rhs)
    }

    pub fn le_expr(self, rhs: &Expr) -> Result<Constraint, ModelError> {
        Expr::var(self).le_expr(rhs)
    }

    pub fn ge_expr(self, rhs: &Expr) -> Result<Constraint, ModelError> {
        Expr::var(self).ge_expr(rhs)
    }

    pub fn eq_expr(self, rhs: &Expr) -> Result<Constraint, ModelError> {
        Expr::var(self).eq_expr(rhs)
    }
}
