//! Solver configuration attached to a problem while building.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Tunable subsystem a named parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParamCategory {
    Branching,
    NodeSelection,
    Presolving,
    Heuristics,
    Separation,
    Propagation,
    Display,
}

impl ParamCategory {
    pub const ALL: [ParamCategory; 7] = [
        ParamCategory::Branching,
        ParamCategory::NodeSelection,
        ParamCategory::Presolving,
        ParamCategory::Heuristics,
        ParamCategory::Separation,
        ParamCategory::Propagation,
        ParamCategory::Display,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamCategory::Branching => "branching",
            ParamCategory::NodeSelection => "node_selection",
            ParamCategory::Presolving => "presolving",
            ParamCategory::Heuristics => "heuristics",
            ParamCategory::Separation => "separation",
            ParamCategory::Propagation => "propagation",
            ParamCategory::Display => "display",
        }
    }
}

impl fmt::Display for ParamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque parameter value, forwarded to the engine unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Configuration options for a solve.
///
/// One value replaces per-subsystem settings objects: typed limits for the
/// options every engine understands, and a parameter map per
/// [`ParamCategory`] for everything else. Attach it with
/// [`Problem::configure`](crate::Problem::configure).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Wall-clock limit. `None` means no limit.
    pub time_limit: Option<Duration>,
    /// Maximum number of branch-and-bound nodes.
    pub node_limit: Option<usize>,
    /// Stop after this many improving solutions.
    pub solution_limit: Option<usize>,
    /// Relative gap at which the search stops.
    pub gap: Option<f64>,
    /// Absolute gap at which the search stops.
    pub absolute_gap: Option<f64>,
    /// Feasibility and integrality tolerance. `None` uses the engine default.
    pub tolerance: Option<f64>,
    /// 0 is quiet.
    pub verbosity: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    params: BTreeMap<ParamCategory, BTreeMap<String, ParamValue>>,
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the node limit.
    pub fn with_node_limit(mut self, nodes: usize) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Set the number of improving solutions after which to stop.
    pub fn with_solution_limit(mut self, solutions: usize) -> Self {
        self.solution_limit = Some(solutions);
        self
    }

    /// Set the relative gap tolerance.
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = Some(gap);
        self
    }

    /// Set the absolute gap tolerance.
    pub fn with_absolute_gap(mut self, gap: f64) -> Self {
        self.absolute_gap = Some(gap);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = level;
        self
    }

    /// Set a named parameter in `category`, replacing any previous value.
    pub fn with_param(
        mut self,
        category: ParamCategory,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Self {
        self.set_param(category, name, value);
        self
    }

    pub fn set_param(
        &mut self,
        category: ParamCategory,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) {
        self.params
            .entry(category)
            .or_default()
            .insert(name.into(), value.into());
    }

    pub fn param(&self, category: ParamCategory, name: &str) -> Option<&ParamValue> {
        self.params.get(&category).and_then(|params| params.get(name))
    }

    /// Parameters of one category in name order.
    pub fn params(&self, category: ParamCategory) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params
            .get(&category)
            .into_iter()
            .flat_map(|params| params.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_is_empty() {
        assert!(SolverConfig::new().is_empty());
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = SolverConfig::new()
            .with_time_limit(Duration::from_secs(60))
            .with_node_limit(1000)
            .with_solution_limit(3)
            .with_gap(0.01)
            .with_absolute_gap(0.5)
            .with_tolerance(1e-7)
            .with_verbosity(2);

        assert!(!config.is_empty());
        assert_eq!(config.time_limit, Some(Duration::from_secs(60)));
        assert_eq!(config.node_limit, Some(1000));
        assert_eq!(config.solution_limit, Some(3));
        assert_eq!(config.gap, Some(0.01));
        assert_eq!(config.absolute_gap, Some(0.5));
        assert_eq!(config.tolerance, Some(1e-7));
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn test_params_are_per_category() {
        let config = SolverConfig::new()
            .with_param(ParamCategory::Branching, "rule", "first_fractional")
            .with_param(ParamCategory::Heuristics, "rounding", true)
            .with_param(ParamCategory::Heuristics, "frequency", 10_i64);

        assert_eq!(
            config
                .param(ParamCategory::Branching, "rule")
                .and_then(ParamValue::as_str),
            Some("first_fractional")
        );
        assert_eq!(config.param(ParamCategory::Presolving, "rule"), None);

        let names: Vec<&str> = config
            .params(ParamCategory::Heuristics)
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["frequency", "rounding"]);
        assert_eq!(config.params(ParamCategory::Display).count(), 0);
    }

    #[test]
    fn test_param_overwrite() {
        let mut config = SolverConfig::new().with_param(ParamCategory::Display, "freq", 1.0);
        config.set_param(ParamCategory::Display, "freq", 5.0);
        assert_eq!(
            config
                .param(ParamCategory::Display, "freq")
                .and_then(ParamValue::as_f64),
            Some(5.0)
        );
    }

    #[test]
    fn test_category_names() {
        let names: Vec<&str> = ParamCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert!(names.contains(&"node_selection"));
        assert_eq!(ParamCategory::Separation.to_string(), "separation");
    }
}
