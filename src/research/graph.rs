//! The fixed stage graph: which stage may follow which, and where routing
//! decisions are taken.
//!
//! ```text
//! planner      -(route)-> researcher
//! researcher   ---------> analyzer
//! analyzer     -(route)-> fact_checker | researcher | writer
//! fact_checker ---------> writer
//! writer       ---------> visualizer
//! visualizer   ---------> END
//! ```

use std::fmt;

use super::router::{Route, route_after_analysis, route_after_plan};
use super::state::RunState;
use super::types::StageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Stage(StageKind),
    End,
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Stage(kind) => write!(f, "{kind}"),
            Node::End => write!(f, "END"),
        }
    }
}

pub type Router = fn(&RunState) -> Route;

/// Outgoing edge of a stage.
#[derive(Clone, Copy)]
pub enum Edge {
    Direct(Node),
    Routed(Router),
}

pub const ENTRY: Node = Node::Stage(StageKind::Planner);

pub fn edge(kind: StageKind) -> Edge {
    match kind {
        StageKind::Planner => Edge::Routed(route_after_plan),
        StageKind::Researcher => Edge::Direct(Node::Stage(StageKind::Analyzer)),
        StageKind::Analyzer => Edge::Routed(route_after_analysis),
        StageKind::FactChecker => Edge::Direct(Node::Stage(StageKind::Writer)),
        StageKind::Writer => Edge::Direct(Node::Stage(StageKind::Visualizer)),
        StageKind::Visualizer => Edge::Direct(Node::End),
    }
}

pub fn successors(kind: StageKind) -> &'static [Node] {
    match kind {
        StageKind::Planner => &[Node::Stage(StageKind::Researcher)],
        StageKind::Researcher => &[Node::Stage(StageKind::Analyzer)],
        StageKind::Analyzer => &[
            Node::Stage(StageKind::FactChecker),
            Node::Stage(StageKind::Researcher),
            Node::Stage(StageKind::Writer),
        ],
        StageKind::FactChecker => &[Node::Stage(StageKind::Writer)],
        StageKind::Writer => &[Node::Stage(StageKind::Visualizer)],
        StageKind::Visualizer => &[Node::End],
    }
}

pub fn is_legal_transition(from: StageKind, to: Node) -> bool {
    successors(from).contains(&to)
}

impl Route {
    pub fn target(self) -> Node {
        match self {
            Route::Research | Route::MoreResearch => Node::Stage(StageKind::Researcher),
            Route::FactCheck => Node::Stage(StageKind::FactChecker),
            Route::Write => Node::Stage(StageKind::Writer),
        }
    }
}
