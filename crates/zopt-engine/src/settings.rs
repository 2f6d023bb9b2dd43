//! Settings understood by the branch-and-bound driver.

use std::time::Duration;

/// Order in which open nodes are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeSelection {
    /// Node with the best relaxation bound first
    #[default]
    BestFirst,
    /// Most recently created node first
    DepthFirst,
}

/// Which fractional integer column to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchingRule {
    /// Fractional part closest to one half
    #[default]
    MostFractional,
    /// Lowest column index
    FirstFractional,
}

impl NodeSelection {
    pub const NAMES: &'static [&'static str] = &["best_first", "depth_first"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "best_first" => Some(NodeSelection::BestFirst),
            "depth_first" => Some(NodeSelection::DepthFirst),
            _ => None,
        }
    }
}

impl BranchingRule {
    pub const NAMES: &'static [&'static str] = &["most_fractional", "first_fractional"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "most_fractional" => Some(BranchingRule::MostFractional),
            "first_fractional" => Some(BranchingRule::FirstFractional),
            _ => None,
        }
    }
}

/// Branch-and-bound configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MipSettings {
    /// Wall-clock limit for the whole search.
    pub time_limit: Option<Duration>,
    /// Maximum number of processed nodes.
    pub node_limit: Option<usize>,
    /// Stop after this many improving solutions.
    pub solution_limit: Option<usize>,
    /// Stop once the relative gap falls to this value.
    pub gap: Option<f64>,
    /// Stop once the absolute gap falls to this value.
    pub absolute_gap: Option<f64>,
    /// Integrality and feasibility tolerance.
    pub tolerance: f64,
    /// Simplex iteration limit per relaxation.
    pub max_iterations: usize,
    pub node_selection: NodeSelection,
    pub branching: BranchingRule,
    /// Progress is logged at info level when non-zero.
    pub verbosity: u32,
}

impl Default for MipSettings {
    fn default() -> Self {
        Self {
            time_limit: None,
            node_limit: None,
            solution_limit: None,
            gap: None,
            absolute_gap: None,
            tolerance: 1e-6,
            max_iterations: 10000,
            node_selection: NodeSelection::default(),
            branching: BranchingRule::default(),
            verbosity: 0,
        }
    }
}

/// Setting names the engine understands for a configuration category.
/// Categories the engine has no plugins for return an empty list.
pub fn setting_names(category: &str) -> &'static [&'static str] {
    match category {
        "branching" => BranchingRule::NAMES,
        "node_selection" => NodeSelection::NAMES,
        _ => &[],
    }
}
