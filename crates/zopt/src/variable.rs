//! Decision variables: handles, kinds and creation specs.

use crate::ids::{ProblemId, VariableId};

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    #[default]
    Continuous,
    Integer,
    /// Integer restricted to [0, 1].
    Binary,
}

impl VarKind {
    pub fn is_integer(self) -> bool {
        !matches!(self, VarKind::Continuous)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Continuous => "continuous",
            VarKind::Integer => "integer",
            VarKind::Binary => "binary",
        }
    }
}

/// Handle to a variable owned by one [`Problem`](crate::Problem).
///
/// Handles are plain ids: copying one is free, and it is only meaningful
/// together with the problem that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    problem: ProblemId,
    id: VariableId,
}

impl Variable {
    pub(crate) fn new(problem: ProblemId, id: VariableId) -> Self {
        Self { problem, id }
    }

    pub fn id(self) -> VariableId {
        self.id
    }

    pub fn problem(self) -> ProblemId {
        self.problem
    }

    pub(crate) fn index(self) -> usize {
        self.id.inner() as usize
    }
}

/// Everything the problem stores about a variable.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableInfo {
    pub name: Option<String>,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
    pub objective_coefficient: f64,
    pub branch_priority: i32,
}

/// Creation parameters for a variable.
///
/// Defaults: continuous, bounds `[0, +inf)`, objective coefficient 0.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    info: VariableInfo,
}

impl Default for VariableSpec {
    fn default() -> Self {
        Self {
            info: VariableInfo {
                name: None,
                kind: VarKind::Continuous,
                lower: 0.0,
                upper: f64::INFINITY,
                objective_coefficient: 0.0,
                branch_priority: 0,
            },
        }
    }
}

impl VariableSpec {
    pub fn new(kind: VarKind) -> Self {
        let mut spec = Self::default();
        spec.info.kind = kind;
        spec
    }

    pub fn continuous() -> Self {
        Self::new(VarKind::Continuous)
    }

    pub fn integer() -> Self {
        Self::new(VarKind::Integer)
    }

    pub fn binary() -> Self {
        Self::new(VarKind::Binary)
    }

    pub fn lower(mut self, lower: f64) -> Self {
        self.info.lower = lower;
        self
    }

    pub fn upper(mut self, upper: f64) -> Self {
        self.info.upper = upper;
        self
    }

    pub fn bounds(self, lower: f64, upper: f64) -> Self {
        self.lower(lower).upper(upper)
    }

    /// Both bounds infinite.
    pub fn free(self) -> Self {
        self.bounds(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn coefficient(mut self, coefficient: f64) -> Self {
        self.info.objective_coefficient = coefficient;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.info.branch_priority = priority;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.info.name = Some(name.into());
        self
    }

    /// Resolve the spec into stored variable data. Binary variables have
    /// their bounds clamped into [0, 1].
    pub(crate) fn into_info(self) -> VariableInfo {
        let mut info = self.info;
        if info.kind == VarKind::Binary {
            info.lower = info.lower.max(0.0);
            info.upper = info.upper.min(1.0);
        }
        info
    }
}
