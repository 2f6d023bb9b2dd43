//! Partial primal assignments handed to the engine before a solve.

use std::collections::BTreeMap;

use crate::error::{ModelError, WarmStartError};
use crate::ids::ProblemId;
use crate::variable::Variable;

/// Typed map from variable to starting value.
///
/// Only structure is checked here; feasibility of the completed assignment
/// is the engine's call. Variables left out start at zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarmStart {
    values: BTreeMap<Variable, f64>,
}

impl WarmStart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `var` to `value`, replacing any earlier value.
    pub fn set(&mut self, var: Variable, value: f64) -> &mut Self {
        self.values.insert(var, value);
        self
    }

    pub fn with(mut self, var: Variable, value: f64) -> Self {
        self.values.insert(var, value);
        self
    }

    pub fn get(&self, var: Variable) -> Option<f64> {
        self.values.get(&var).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.values.iter().map(|(v, x)| (*v, *x))
    }

    /// Dense assignment over `num_variables` columns after structural checks.
    pub(crate) fn to_dense(
        &self,
        problem: ProblemId,
        num_variables: usize,
    ) -> Result<Vec<f64>, ModelError> {
        let mut dense = vec![0.0; num_variables];
        for (var, value) in self.iter() {
            if var.problem() != problem {
                return Err(ModelError::InvalidWarmStart(WarmStartError::ForeignVariable {
                    variable: var.id(),
                    expected: problem,
                    found: var.problem(),
                }));
            }
            if !value.is_finite() {
                return Err(ModelError::InvalidWarmStart(WarmStartError::NonFinite {
                    variable: var.id(),
                    value,
                }));
            }
            let slot = dense
                .get_mut(var.index())
                .ok_or(ModelError::UnknownVariable(var.id()))?;
            *slot = value;
        }
        Ok(dense)
    }
}

impl FromIterator<(Variable, f64)> for WarmStart {
    fn from_iter<I: IntoIterator<Item = (Variable, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Variable, f64)> for WarmStart {
    fn extend<I: IntoIterator<Item = (Variable, f64)>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}
