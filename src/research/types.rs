use std::fmt;

use serde::{Deserialize, Serialize};

/// The six stages of a research run, labelled the way the audit log tags them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Planner,
    Researcher,
    Analyzer,
    FactChecker,
    Writer,
    Visualizer,
}

impl StageKind {
    pub const ALL: [StageKind; 6] = [
        StageKind::Planner,
        StageKind::Researcher,
        StageKind::Analyzer,
        StageKind::FactChecker,
        StageKind::Writer,
        StageKind::Visualizer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StageKind::Planner => "planner",
            StageKind::Researcher => "researcher",
            StageKind::Analyzer => "analyzer",
            StageKind::FactChecker => "fact_checker",
            StageKind::Writer => "writer",
            StageKind::Visualizer => "visualizer",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
