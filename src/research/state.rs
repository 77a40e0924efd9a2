use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::search::SearchHit;

use super::router::Route;
use super::types::StageKind;

/// One external search hit, tagged with the sub-query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl SearchResult {
    pub fn from_hit(query: &str, hit: SearchHit) -> Self {
        Self {
            query: query.to_string(),
            title: hit.title,
            url: hit.url,
            content: hit.content,
            score: hit.score,
            published_date: hit.published_date.filter(|date| !date.trim().is_empty()),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub raw_text: String,
    pub confidence: f64,
    pub needs_more_research: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactCheckResult {
    pub checks: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualSummary {
    /// The generation service's reply, verbatim.
    pub data: String,
    /// Best-effort structured reading of `data`, when it holds JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Audit entry appended once per stage invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: StageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_found: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
}

impl StageRecord {
    fn new(stage: StageKind, content: impl Into<String>) -> Self {
        Self {
            stage,
            content: content.into(),
            timestamp: Utc::now(),
            results_found: None,
            word_count: None,
        }
    }
}

/// Mutable record threaded through every stage of a single run.
///
/// Fields are only reachable through the `record_*` methods, which keep the
/// audit log, the iteration counter and the result list consistent with each
/// other.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunState {
    query: String,
    search_results: Vec<SearchResult>,
    analysis: Option<AnalysisResult>,
    fact_checks: Vec<FactCheckResult>,
    report: String,
    visual_summary: Option<VisualSummary>,
    messages: Vec<StageRecord>,
    next_stage: Option<Route>,
    iteration: u32,
    confidence: f64,
}

impl RunState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            search_results: Vec::new(),
            analysis: None,
            fact_checks: Vec::new(),
            report: String::new(),
            visual_summary: None,
            messages: Vec::new(),
            next_stage: None,
            iteration: 0,
            confidence: 0.0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn fact_checks(&self) -> &[FactCheckResult] {
        &self.fact_checks
    }

    pub fn report(&self) -> &str {
        &self.report
    }

    pub fn visual_summary(&self) -> Option<&VisualSummary> {
        self.visual_summary.as_ref()
    }

    pub fn messages(&self) -> &[StageRecord] {
        &self.messages
    }

    pub fn next_stage(&self) -> Option<Route> {
        self.next_stage
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn needs_more_research(&self) -> bool {
        self.analysis
            .as_ref()
            .is_some_and(|analysis| analysis.needs_more_research)
    }

    pub fn records_for(&self, stage: StageKind) -> usize {
        self.messages
            .iter()
            .filter(|record| record.stage == stage)
            .count()
    }

    pub fn record_plan(&mut self, content: impl Into<String>) {
        self.messages
            .push(StageRecord::new(StageKind::Planner, content));
    }

    /// Appends one search pass: its results, its audit record and one iteration.
    pub fn record_search(&mut self, content: impl Into<String>, results: Vec<SearchResult>) {
        let mut record = StageRecord::new(StageKind::Researcher, content);
        record.results_found = Some(results.len());
        self.search_results.extend(results);
        self.messages.push(record);
        self.iteration += 1;
    }

    pub fn record_analysis(
        &mut self,
        raw_text: impl Into<String>,
        confidence: f64,
        needs_more_research: bool,
    ) {
        let raw_text = raw_text.into();
        let confidence = clamp_confidence(confidence);
        self.confidence = confidence;
        self.analysis = Some(AnalysisResult {
            raw_text: raw_text.clone(),
            confidence,
            needs_more_research,
            timestamp: Utc::now(),
        });
        self.messages
            .push(StageRecord::new(StageKind::Analyzer, raw_text));
    }

    pub fn record_fact_check(&mut self, checks: impl Into<String>) {
        let checks = checks.into();
        self.fact_checks.push(FactCheckResult {
            checks: checks.clone(),
            timestamp: Utc::now(),
        });
        self.messages
            .push(StageRecord::new(StageKind::FactChecker, checks));
    }

    /// Stores the final report. A report, once written, is never replaced.
    pub fn record_report(&mut self, report: impl Into<String>) -> Result<()> {
        if self.records_for(StageKind::Writer) > 0 {
            bail!("report has already been written for this run");
        }

        let report = report.into();
        let mut record = StageRecord::new(StageKind::Writer, report.clone());
        record.word_count = Some(word_count(&report));
        self.report = report;
        self.messages.push(record);
        Ok(())
    }

    pub fn record_visual_summary(&mut self, data: impl Into<String>, parsed: Option<serde_json::Value>) {
        let data = data.into();
        self.visual_summary = Some(VisualSummary {
            data: data.clone(),
            parsed,
            timestamp: Utc::now(),
        });
        self.messages
            .push(StageRecord::new(StageKind::Visualizer, data));
    }

    pub fn set_next_stage(&mut self, route: Route) {
        self.next_stage = Some(route);
    }
}

pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
