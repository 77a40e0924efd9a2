use serde::Serialize;
use thiserror::Error;

use super::graph::Node;
use super::state::{RunState, SearchResult, VisualSummary};
use super::types::StageKind;

/// Result of a completed research run, handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub query: String,
    pub report: String,
    pub confidence: f64,
    pub sources: usize,
    pub iterations: u32,
    pub agents_used: usize,
    pub visual_summary: Option<VisualSummary>,
    pub search_results: Vec<SearchResult>,
    pub full_state: RunState,
}

impl From<RunState> for ResearchOutcome {
    fn from(state: RunState) -> Self {
        Self {
            query: state.query().to_string(),
            report: state.report().to_string(),
            confidence: state.confidence(),
            sources: state.search_results().len(),
            iterations: state.iteration(),
            agents_used: state.messages().len(),
            visual_summary: state.visual_summary().cloned(),
            search_results: state.search_results().to_vec(),
            full_state: state,
        }
    }
}

/// Why a run ended without a report. Partial state is never returned.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("research query is empty")]
    EmptyQuery,
    #[error("{stage} stage failed")]
    Stage {
        stage: StageKind,
        #[source]
        source: anyhow::Error,
    },
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: StageKind, to: Node },
    #[error("run did not finish within {limit} stage invocations")]
    StepLimit { limit: usize },
}

impl ResearchError {
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            ResearchError::Stage { stage, .. } => Some(*stage),
            ResearchError::IllegalTransition { from, .. } => Some(*from),
            _ => None,
        }
    }
}
