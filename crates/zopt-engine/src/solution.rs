/// The result of solving an LP or MIP problem
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Values for each variable; empty when no point is available
    pub values: Vec<f64>,
    /// Objective value, constant included
    pub objective_value: f64,
    /// Search statistics
    pub stats: SolveStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The relaxation is unbounded; integrality was not decided
    InfeasibleOrUnbounded,
    /// A time, node, solution or gap limit stopped the search
    LimitReached,
}

impl SolutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::InfeasibleOrUnbounded => "infeasible_or_unbounded",
            SolutionStatus::LimitReached => "limit_reached",
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveStats {
    /// Simplex pivots over all relaxations
    pub iterations: usize,
    /// Branch-and-bound nodes processed
    pub nodes: usize,
    /// Improving incumbents found, warm start included
    pub solutions_found: usize,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            stats: SolveStats::default(),
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::NAN,
            stats: SolveStats::default(),
        }
    }

    /// Unbounded in the direction of optimization.
    pub fn unbounded(minimize: bool) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: if minimize { f64::NEG_INFINITY } else { f64::INFINITY },
            stats: SolveStats::default(),
        }
    }

    pub fn with_status(mut self, status: SolutionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_stats(mut self, stats: SolveStats) -> Self {
        self.stats = stats;
        self
    }

    /// Whether `values` holds a point (possibly of zero columns).
    pub fn has_values(&self) -> bool {
        self.status == SolutionStatus::Optimal || !self.values.is_empty()
    }
}
