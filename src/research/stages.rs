use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::client::{ChatMessage, DynLlmClient};
use crate::search::{DynSearchClient, SearchDepth, SearchRequest, mock_hit};

use super::parser::{AnalysisSignals, SearchPlan, structured_value};
use super::prompts::{
    ANALYZER_SYSTEM_PROMPT, FACT_CHECKER_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT,
    RESEARCHER_SYSTEM_PROMPT, VISUALIZER_SYSTEM_PROMPT, WRITER_SYSTEM_PROMPT,
};
use super::state::{RunState, SearchResult, word_count};
use super::types::StageKind;

pub const RESULTS_PER_QUERY: u32 = 3;
pub const ANALYSIS_WINDOW: usize = 10;
pub const ANALYSIS_SNIPPET_CHARS: usize = 300;
pub const WRITER_ANALYSIS_CHARS: usize = 1000;
pub const WRITER_MAX_SOURCES: usize = 10;

/// One step of a research run. Stages only mutate the state; routing happens
/// in the engine once a stage returns.
#[async_trait]
pub trait ResearchStage: Send + Sync {
    fn kind(&self) -> StageKind;

    async fn execute(&self, state: &mut RunState) -> Result<()>;
}

async fn ask(llm: &DynLlmClient, kind: StageKind, system: &str, user: String) -> Result<String> {
    llm.invoke(vec![ChatMessage::system(system), ChatMessage::user(user)])
        .await
        .with_context(|| format!("{kind} generation call failed"))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub struct PlanStage {
    llm: Arc<DynLlmClient>,
}

impl PlanStage {
    pub fn new(llm: Arc<DynLlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResearchStage for PlanStage {
    fn kind(&self) -> StageKind {
        StageKind::Planner
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        let prompt = format!("Create a research plan for: {}", state.query());
        let strategy = ask(self.llm.as_ref(), self.kind(), PLANNER_SYSTEM_PROMPT, prompt).await?;
        info!(chars = strategy.len(), "research strategy created");
        state.record_plan(strategy);
        Ok(())
    }
}

pub struct SearchStage {
    llm: Arc<DynLlmClient>,
    search: Option<Arc<DynSearchClient>>,
}

impl SearchStage {
    /// Without a search client every query yields one mock result.
    pub fn new(llm: Arc<DynLlmClient>, search: Option<Arc<DynSearchClient>>) -> Self {
        Self { llm, search }
    }

    async fn run_queries(
        &self,
        search: &DynSearchClient,
        queries: &[String],
    ) -> Vec<SearchResult> {
        let mut results = Vec::new();
        for query in queries {
            let request = SearchRequest {
                query: query.clone(),
                max_results: RESULTS_PER_QUERY,
                depth: SearchDepth::Advanced,
            };
            match search.search(&request).await {
                Ok(response) => {
                    info!(query = %query, found = response.results.len(), "search completed");
                    results.extend(
                        response
                            .results
                            .into_iter()
                            .map(|hit| SearchResult::from_hit(query, hit)),
                    );
                }
                Err(error) => {
                    warn!(query = %query, "search failed, skipping query: {error:#}");
                }
            }
        }
        results
    }
}

#[async_trait]
impl ResearchStage for SearchStage {
    fn kind(&self) -> StageKind {
        StageKind::Researcher
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        let iteration = state.iteration();
        let prompt = format!(
            "Original query: {}\nCurrent iteration: {}\nPrevious findings count: {}\n\nWhat should we search for next?",
            state.query(),
            iteration,
            state.search_results().len()
        );
        let reply = ask(self.llm.as_ref(), self.kind(), RESEARCHER_SYSTEM_PROMPT, prompt).await?;

        let plan = SearchPlan::from_reply(&reply, state.query());
        if plan.fell_back {
            warn!("could not read search queries from reply, using the original query");
        } else {
            info!(
                queries = plan.queries.len(),
                reasoning = plan.reasoning.as_deref().unwrap_or_default(),
                "search queries planned"
            );
        }

        let results = match &self.search {
            Some(search) => self.run_queries(search.as_ref(), &plan.queries).await,
            None => {
                warn!(iteration, "no search backend configured, using mock results");
                plan.queries
                    .iter()
                    .map(|query| SearchResult::from_hit(query, mock_hit(query, iteration)))
                    .collect()
            }
        };

        info!(iteration = iteration + 1, found = results.len(), "research pass finished");
        state.record_search(reply, results);
        Ok(())
    }
}

pub struct AnalyzeStage {
    llm: Arc<DynLlmClient>,
}

impl AnalyzeStage {
    pub fn new(llm: Arc<DynLlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResearchStage for AnalyzeStage {
    fn kind(&self) -> StageKind {
        StageKind::Analyzer
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        let results = state.search_results();
        let recent: Vec<_> = results[results.len().saturating_sub(ANALYSIS_WINDOW)..]
            .iter()
            .map(|result| {
                json!({
                    "title": result.title,
                    "content": truncate_chars(&result.content, ANALYSIS_SNIPPET_CHARS),
                    "url": result.url,
                })
            })
            .collect();
        let summary =
            serde_json::to_string_pretty(&recent).context("Failed to serialize result summary")?;

        let prompt = format!(
            "Query: {}\nResearch results found: {}\nLatest results: {}\n\nAnalyze these findings.",
            state.query(),
            results.len(),
            summary
        );
        let reply = ask(self.llm.as_ref(), self.kind(), ANALYZER_SYSTEM_PROMPT, prompt).await?;

        let signals = AnalysisSignals::from_reply(&reply);
        info!(
            confidence = signals.confidence,
            needs_more_research = signals.needs_more_research,
            "analysis complete"
        );
        state.record_analysis(reply, signals.confidence, signals.needs_more_research);
        Ok(())
    }
}

pub struct FactCheckStage {
    llm: Arc<DynLlmClient>,
}

impl FactCheckStage {
    pub fn new(llm: Arc<DynLlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResearchStage for FactCheckStage {
    fn kind(&self) -> StageKind {
        StageKind::FactChecker
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        let analysis = state
            .analysis()
            .map(|analysis| analysis.raw_text.as_str())
            .unwrap_or_default();
        let prompt = format!(
            "Query: {}\nAnalysis: {}\nNumber of sources: {}\n\nVerify the key claims.",
            state.query(),
            analysis,
            state.search_results().len()
        );
        let checks = ask(self.llm.as_ref(), self.kind(), FACT_CHECKER_SYSTEM_PROMPT, prompt).await?;
        info!("fact-checking complete");
        state.record_fact_check(checks);
        Ok(())
    }
}

pub struct WriteStage {
    llm: Arc<DynLlmClient>,
}

impl WriteStage {
    pub fn new(llm: Arc<DynLlmClient>) -> Self {
        Self { llm }
    }
}

fn citation_list(results: &[SearchResult]) -> String {
    results
        .iter()
        .take(WRITER_MAX_SOURCES)
        .enumerate()
        .map(|(idx, result)| {
            let title = if result.title.trim().is_empty() {
                "Untitled"
            } else {
                result.title.as_str()
            };
            format!("[{}] {} - {}", idx + 1, title, result.url)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ResearchStage for WriteStage {
    fn kind(&self) -> StageKind {
        StageKind::Writer
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        let analysis = state
            .analysis()
            .map(|analysis| truncate_chars(&analysis.raw_text, WRITER_ANALYSIS_CHARS))
            .unwrap_or_default();
        let fact_checks =
            serde_json::to_string(state.fact_checks()).context("Failed to serialize fact checks")?;
        let prompt = format!(
            "Query: {}\n\nNumber of sources researched: {}\n\nAnalysis summary: {}\n\nFact checks: {}\n\nAvailable sources:\n{}\n\nCreate the final report.",
            state.query(),
            state.search_results().len(),
            analysis,
            fact_checks,
            citation_list(state.search_results())
        );
        let report = ask(self.llm.as_ref(), self.kind(), WRITER_SYSTEM_PROMPT, prompt).await?;
        state.record_report(report)?;
        let words = word_count(state.report());
        info!(words, "report generated");
        Ok(())
    }
}

pub struct SummarizeStage {
    llm: Arc<DynLlmClient>,
}

impl SummarizeStage {
    pub fn new(llm: Arc<DynLlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResearchStage for SummarizeStage {
    fn kind(&self) -> StageKind {
        StageKind::Visualizer
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        let prompt = format!(
            "Query: {}\nReport length: {} characters\nConfidence score: {}\nSources used: {}\n\nCreate visual summary data.",
            state.query(),
            state.report().chars().count(),
            state.confidence(),
            state.search_results().len()
        );
        let data = ask(self.llm.as_ref(), self.kind(), VISUALIZER_SYSTEM_PROMPT, prompt).await?;
        let parsed = structured_value(&data);
        info!(structured = parsed.is_some(), "visual summary created");
        state.record_visual_summary(data, parsed);
        Ok(())
    }
}
