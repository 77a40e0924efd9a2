use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::client::{DynLlmClient, OllamaClient};
use crate::config::Config;
use crate::search::{DynSearchClient, TavilyClient};

use super::graph::{self, Edge, Node};
use super::outcome::{ResearchError, ResearchOutcome};
use super::router::MAX_SEARCH_ITERATIONS;
use super::stages::{
    AnalyzeStage, FactCheckStage, PlanStage, ResearchStage, SearchStage, SummarizeStage,
    WriteStage,
};
use super::state::RunState;
use super::types::StageKind;

/// Upper bound on stage invocations for one run: planner, every search and
/// analysis pass, fact check, writer and visualizer.
pub const MAX_STAGE_INVOCATIONS: usize = 4 + 2 * MAX_SEARCH_ITERATIONS as usize;

/// Drives a research run through the stage graph.
///
/// The engine owns only immutable client handles; every call to
/// [`ResearchEngine::research`] builds and consumes its own [`RunState`].
pub struct ResearchEngine {
    stages: HashMap<StageKind, Box<dyn ResearchStage>>,
}

impl ResearchEngine {
    pub fn builder(llm: Arc<DynLlmClient>) -> ResearchEngineBuilder {
        ResearchEngineBuilder::new(llm)
    }

    /// Wires the HTTP clients described by `config`. Without a search key the
    /// engine runs with mock search results.
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm: Arc<DynLlmClient> = Arc::new(OllamaClient::new(&config.llm)?);
        let mut builder = Self::builder(llm);

        match TavilyClient::from_settings(&config.search)? {
            Some(client) => {
                info!("web search enabled");
                builder = builder.with_search(Arc::new(client));
            }
            None => warn!("no search API key configured, web search will use mock data"),
        }

        Ok(builder.build())
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub async fn research(&self, query: &str) -> Result<ResearchOutcome, ResearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResearchError::EmptyQuery);
        }

        info!(query, "research started");
        let mut state = RunState::new(query);
        self.run(&mut state).await?;
        info!(
            iterations = state.iteration(),
            confidence = state.confidence(),
            sources = state.search_results().len(),
            "research complete"
        );
        Ok(ResearchOutcome::from(state))
    }

    async fn run(&self, state: &mut RunState) -> Result<(), ResearchError> {
        let mut node = graph::ENTRY;
        let mut invocations = 0;

        while let Node::Stage(kind) = node {
            if invocations == MAX_STAGE_INVOCATIONS {
                return Err(ResearchError::StepLimit {
                    limit: MAX_STAGE_INVOCATIONS,
                });
            }
            invocations += 1;

            let stage = self.stages.get(&kind).ok_or_else(|| ResearchError::Stage {
                stage: kind,
                source: anyhow::anyhow!("no stage registered for {kind}"),
            })?;

            info!(stage = %kind, "stage started");
            stage
                .execute(state)
                .await
                .map_err(|source| ResearchError::Stage {
                    stage: kind,
                    source,
                })?;

            let next = match graph::edge(kind) {
                Edge::Direct(next) => next,
                Edge::Routed(router) => {
                    let route = router(state);
                    state.set_next_stage(route);
                    info!(stage = %kind, route = %route, "route selected");
                    route.target()
                }
            };

            if !graph::is_legal_transition(kind, next) {
                return Err(ResearchError::IllegalTransition {
                    from: kind,
                    to: next,
                });
            }
            node = next;
        }

        Ok(())
    }
}

pub struct ResearchEngineBuilder {
    llm: Arc<DynLlmClient>,
    search: Option<Arc<DynSearchClient>>,
    overrides: Vec<Box<dyn ResearchStage>>,
}

impl ResearchEngineBuilder {
    pub fn new(llm: Arc<DynLlmClient>) -> Self {
        Self {
            llm,
            search: None,
            overrides: Vec::new(),
        }
    }

    pub fn with_search(mut self, search: Arc<DynSearchClient>) -> Self {
        self.search = Some(search);
        self
    }

    /// Replaces the default stage of the same kind.
    pub fn with_stage<S>(mut self, stage: S) -> Self
    where
        S: ResearchStage + 'static,
    {
        self.overrides.push(Box::new(stage));
        self
    }

    pub fn build(self) -> ResearchEngine {
        let llm = self.llm;
        let defaults: [Box<dyn ResearchStage>; 6] = [
            Box::new(PlanStage::new(llm.clone())),
            Box::new(SearchStage::new(llm.clone(), self.search)),
            Box::new(AnalyzeStage::new(llm.clone())),
            Box::new(FactCheckStage::new(llm.clone())),
            Box::new(WriteStage::new(llm.clone())),
            Box::new(SummarizeStage::new(llm)),
        ];

        let stages = defaults
            .into_iter()
            .chain(self.overrides)
            .map(|stage| (stage.kind(), stage))
            .collect();

        ResearchEngine { stages }
    }
}
